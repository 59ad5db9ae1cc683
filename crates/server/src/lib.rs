//! minicoin ledger server.
//!
//! - **Dispatcher**: routes requests to the ledger, frozen while tainted
//! - **Handler**: one request and one response per connection
//! - **Server**: TCP accept loop, one task per connection
//!
//! # Example
//!
//! ```rust,no_run
//! use minicoin_server::{Server, ServerConfig};
//!
//! # async fn run() -> minicoin_server::Result<()> {
//! let config = ServerConfig {
//!     corrupt_after: 2,
//!     ..ServerConfig::with_port(8080)
//! };
//! Server::bind(config).await?.run().await
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod server;

// Re-export commonly used types
pub use config::{ServerConfig, DEFAULT_PORT};
pub use dispatcher::{Dispatcher, SharedLedger};
pub use error::{Result, ServerError};
pub use handler::handle_connection;
pub use server::Server;
