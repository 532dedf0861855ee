//! Value types shared by the courier, transports and caches.

mod request;
mod response;

pub use request::*;
pub use response::*;
