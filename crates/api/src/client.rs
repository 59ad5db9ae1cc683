//! Client side of the protocol.

use crate::codec::{recv_package, send_package, Result};
use crate::messages::{Request, Response};
use minicoin_core::AccountId;
use tokio::net::TcpStream;
use tracing::debug;

/// Talks to a minicoin server on behalf of one account.
///
/// The server answers exactly one request per connection, so every call
/// opens a fresh connection.
#[derive(Debug, Clone)]
pub struct Client {
    addr: String,
    account: AccountId,
}

impl Client {
    /// Create a client for `account` against the server at `addr` (`host:port`).
    pub fn new(addr: impl Into<String>, account: AccountId) -> Self {
        Self {
            addr: addr.into(),
            account,
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Query the account balance.
    pub async fn balance(&self) -> Result<Response> {
        self.request(Request::check_balance(self.account)).await
    }

    /// Credit (positive) or debit (negative) the account.
    pub async fn transact(&self, amount: i64) -> Result<Response> {
        self.request(Request::transaction(self.account, amount)).await
    }

    /// Ask the server to verify the chain.
    pub async fn check_integrity(&self) -> Result<Response> {
        self.request(Request::check_integrity(self.account)).await
    }

    /// Send one request on a new connection and wait for the response.
    pub async fn request(&self, request: Request) -> Result<Response> {
        let mut stream = TcpStream::connect(&self.addr).await?;
        debug!(addr = %self.addr, ?request, "sending request");

        send_package(&mut stream, &request).await?;
        let response: Response = recv_package(&mut stream).await?;

        debug!(?response, "received response");
        Ok(response)
    }
}
