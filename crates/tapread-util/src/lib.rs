pub mod bytes;
pub mod result_ext;

pub use bytes::{InputEncoding, InputError, decode_input};
