#![warn(clippy::pedantic)]

pub mod ascii;
pub mod ebcdic;
pub mod error;
pub mod frame;
pub mod ints;

pub use error::WireError;
pub use frame::FrameTransport;
