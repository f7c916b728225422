//! Network protocol module
//!
//! RESP codec and the client connection used to reach a FalkorDB server.

pub mod connection;
pub mod resp;

pub use connection::FalkorConnection;
pub use resp::{RespDecoder, RespError, RespResult, RespValue};
