//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;

mod client;
mod serve;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ledger server
    Serve(serve::ServeArgs),
    /// Check an account balance
    Balance(client::ConnectArgs),
    /// Credit (positive) or debit (negative) an account
    Transact(client::TransactArgs),
    /// Check the integrity of the chain
    Verify(client::ConnectArgs),
}

pub async fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Balance(args) => client::balance(args).await,
        Commands::Transact(args) => client::transact(args).await,
        Commands::Verify(args) => client::verify(args).await,
    }
}
