//! Transport layer for HTTP exchanges.
//!
//! This module provides:
//! - The `Transport` boundary the courier dispatches through
//! - A reqwest-backed transport with persistent basic authentication
//! - Parsing of raw exchange results into responses

mod client;
mod parser;
mod transport;

pub use client::ReqwestTransport;
pub use parser::{DefaultResponseParser, ResponseParser};
pub use transport::{codes, RawResponse, Transport, TransportError};
