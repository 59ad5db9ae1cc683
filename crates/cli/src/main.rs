//! minicoin CLI entry point.

use clap::Parser;

mod commands;
mod logging;

use logging::LogFormat;

#[derive(Parser)]
#[command(name = "minicoin")]
#[command(about = "A minimal hash-chained ledger", long_about = None)]
struct Cli {
    /// Default log filter, overridden by RUST_LOG
    #[arg(long, global = true, env = "MINICOIN_LOG", default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<commands::Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Some(cmd) => {
            if let Err(e) = commands::run(cmd).await {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("minicoin - A minimal hash-chained ledger");
            println!("Run 'minicoin --help' for usage information.");
        }
    }
}
