//! Client commands: balance, transact, verify.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use minicoin_api::{Client, Response};
use minicoin_server::DEFAULT_PORT;

#[derive(Args)]
pub struct ConnectArgs {
    /// Server host
    #[arg(short, long, env = "MINICOIN_ADDR", default_value = "localhost")]
    addr: String,

    /// Server port
    #[arg(short, long, env = "MINICOIN_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Account identifier
    #[arg(short, long)]
    id: u32,

    /// Print the raw response as JSON
    #[arg(long)]
    json: bool,
}

impl ConnectArgs {
    fn client(&self) -> Client {
        Client::new(format!("{}:{}", self.addr, self.port), self.id)
    }
}

#[derive(Args)]
pub struct TransactArgs {
    #[command(flatten)]
    connect: ConnectArgs,

    /// Amount to transfer (negative for a debit)
    #[arg(allow_negative_numbers = true)]
    amount: i64,
}

pub async fn balance(args: ConnectArgs) -> Result<()> {
    let client = args.client();
    let response = client
        .balance()
        .await
        .with_context(|| format!("Failed to query server at {}", client.addr()))?;

    if args.json {
        return print_json(&response);
    }

    let balance = response.into_result()?;
    println!();
    println!("  Account: {}", args.id.to_string().bright_yellow());
    println!("  Balance: {}", balance.to_string().bright_cyan());
    println!();

    Ok(())
}

pub async fn transact(args: TransactArgs) -> Result<()> {
    let client = args.connect.client();
    let response = client
        .transact(args.amount)
        .await
        .with_context(|| format!("Failed to send transaction to {}", client.addr()))?;

    if args.connect.json {
        return print_json(&response);
    }

    let balance = response.into_result()?;
    println!(
        "{}  Transaction successful, balance is {}",
        "✓".green().bold(),
        balance.to_string().bright_cyan()
    );

    Ok(())
}

pub async fn verify(args: ConnectArgs) -> Result<()> {
    let client = args.client();
    let response = client
        .check_integrity()
        .await
        .with_context(|| format!("Failed to query server at {}", client.addr()))?;

    if args.json {
        return print_json(&response);
    }

    response.into_result()?;
    if response.chain_corrupted {
        println!("{}  {}", "✗".red().bold(), "Blockchain corrupted!".red().bold());
    } else {
        println!("{}  Blockchain is fine", "✓".green().bold());
    }

    Ok(())
}

fn print_json(response: &Response) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
