//! tokenwire CLI - access-token protocol client
//!
//! Runs exactly one token operation against the server and prints its result.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use tokenwire::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
use tokenwire::protocol::Gas;
use tokenwire::{ClientConfig, TokenClient, TokenWireError};

/// tokenwire - SAS/GAS access-token client
#[derive(Parser, Debug)]
#[command(name = "tokenwire")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Token server host name or address
    host: String,

    /// Token server UDP port
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Seconds to wait for a reply before re-sending
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Send attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Individual token request
    Itr {
        /// Student id (up to 12 characters)
        id: String,
        #[arg(allow_negative_numbers = true)]
        nonce: i32,
    },
    /// Individual token validation
    Itv {
        /// SAS as id:nonce:token
        sas: String,
    },
    /// Group token request
    Gtr {
        /// Number of SAS entries that follow
        n: usize,
        #[arg(required = true)]
        sas: Vec<String>,
    },
    /// Group token validation
    Gtv {
        /// Expected number of SAS entries in the GAS
        #[arg(long)]
        count: Option<usize>,
        /// GAS as sas+sas+...+group_token
        gas: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the result
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(args: Args) -> Result<String, TokenWireError> {
    let config = ClientConfig::default()
        .with_timeout(Duration::from_secs(args.timeout))
        .with_max_attempts(args.attempts);
    let client = TokenClient::new(args.host, args.port, config)?;

    match args.command {
        Command::Itr { id, nonce } => client.individual_token_request(&id, nonce).await,
        Command::Itv { sas } => client
            .individual_token_validation(&sas)
            .await
            .map(|status| status.to_string()),
        // count(sas) == N is enforced by the client before anything is sent
        Command::Gtr { n, sas } => client.group_token_request(n, &sas).await,
        Command::Gtv { count, gas } => {
            if let Some(expected) = count {
                gas.parse::<Gas>()?.expect_len(expected)?;
            }
            client
                .group_token_validation(&gas)
                .await
                .map(|status| status.to_string())
        }
    }
}
