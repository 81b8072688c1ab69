#![warn(clippy::pedantic)]

pub mod ack;
pub mod config;
pub mod error;
pub mod extract;
pub mod receive;
pub mod records;
pub mod send;
pub mod txid;

pub use config::ProtocolConfig;
pub use error::ProtocolError;
pub use receive::{receive_file, ReceiveReport};
pub use send::{send_file, SendReport};
pub use txid::{Direction, JulianDayClock, SystemJulianDayClock, TransmissionId};
