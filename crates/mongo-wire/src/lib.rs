#![warn(clippy::pedantic)]

pub mod error;
pub mod header;
pub mod primitives;

pub use error::WireError;
pub use header::{HEADER_SIZE, MsgHeader};
