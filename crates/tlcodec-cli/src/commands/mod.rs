pub mod check;
pub mod codec_common;
pub mod decode;
pub mod dump;
pub mod encode;
pub mod schema_loader;
pub mod units;
