//! Run the ledger server.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use minicoin_server::{Server, ServerConfig, DEFAULT_PORT};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "MINICOIN_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind
    #[arg(short, long, env = "MINICOIN_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Corrupt the N-th appended block (0 or negative disables)
    #[arg(long, env = "MINICOIN_CORRUPT_AFTER", default_value_t = -1, allow_negative_numbers = true)]
    corrupt_after: i64,

    /// Per-connection read/write deadline in milliseconds
    #[arg(long, env = "MINICOIN_IO_TIMEOUT_MS")]
    io_timeout_ms: Option<u64>,
}

impl ServeArgs {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: SocketAddr::new(self.bind, self.port),
            corrupt_after: self.corrupt_after,
            io_timeout: self.io_timeout_ms.map(Duration::from_millis),
        }
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let config = args.config();
    let server = Server::bind(config.clone())
        .await
        .with_context(|| format!("Failed to start server on {}", config.listen_addr))?;

    println!(
        "{}  Listening on {}",
        "✓".green().bold(),
        server.local_addr()?.to_string().bright_yellow()
    );
    if config.corrupt_after > 0 {
        println!(
            "{}  Fault injector armed: block {} will be corrupted",
            "!".yellow().bold(),
            config.corrupt_after.to_string().bright_cyan()
        );
    }

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
