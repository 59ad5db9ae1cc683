//! TCP accept loop.

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, ServerError};
use crate::handler::handle_connection;
use minicoin_chain::Ledger;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, info_span, warn, Instrument};

/// A bound minicoin server.
pub struct Server {
    listener: TcpListener,
    dispatcher: Dispatcher,
    config: ServerConfig,
}

impl Server {
    /// Bind the listener and create a fresh ledger armed with the configured
    /// fault countdown.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.listen_addr,
                source,
            })?;
        let dispatcher = Dispatcher::new(Ledger::new(config.corrupt_after));

        info!(
            addr = %listener.local_addr()?,
            corrupt_after = config.corrupt_after,
            "ledger initialized, listening"
        );

        Ok(Self {
            listener,
            dispatcher,
            config,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Accept connections forever.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Each connection is served on its own task; the loop never waits for
    /// one to finish.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                },
            }
        }
    }

    fn spawn_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        let dispatcher = self.dispatcher.clone();
        let io_timeout = self.config.io_timeout;

        let task = async move {
            debug!("serving");
            match handle_connection(&mut stream, &dispatcher, io_timeout).await {
                Ok(response) => debug!(?response, "response sent"),
                Err(e) => warn!(error = %e, "connection dropped"),
            }
        };
        tokio::spawn(task.instrument(info_span!("conn", %peer)));
    }
}
