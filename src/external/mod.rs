//! Outbound HTTP plumbing shared by every notification provider.

pub mod client;
pub mod transport;

pub use client::ReqwestTransport;
pub use transport::{
    HttpRequest, HttpResponse, MAX_TIMEOUT_SECS, RequestOptions, Transport, TransportError,
};
