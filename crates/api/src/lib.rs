//! Wire protocol for minicoin.
//!
//! - **Messages**: requests, responses and their fixed-size wire records
//! - **Codec**: header + payload framing over any async stream
//! - **Client**: one-request-per-connection TCP client

pub mod client;
pub mod codec;
pub mod messages;

// Re-export commonly used types
pub use client::Client;
pub use codec::{recv_package, send_package, CodecError, Message};
pub use messages::{
    FailReason, PackageType, Request, RequestKind, Response, ResponseError, Status, HEADER_LEN,
    REQUEST_LEN, RESPONSE_LEN,
};
