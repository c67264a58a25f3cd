// Adapters layer: concrete implementations for files, encodings and the executive API.

pub mod csv_codec;
pub mod encoding;
pub mod http;
pub mod storage;

pub use storage::LocalStorage;
