//! IntCode network
//!
//! Many VM instances run copies of one program, each identified by an address
//! it reads as its first input. Output triples `(destination, x, y)` are
//! routed between rounds into the destination's input channel.

pub mod error;
pub mod network;
pub mod nic;
pub mod packet;
pub mod settings;

pub use error::NetworkError;
pub use network::{Network, NetworkReport, RoundSummary};
pub use nic::{Activity, Nic};
pub use packet::{Packet, Route};
pub use settings::NetworkConfig;
