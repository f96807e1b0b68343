use std::path::PathBuf;

use bitcoin::Network;
use clap::Parser;

/// unspent: spendable balance of Bitcoin addresses from an address-indexed UTXO API.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Addresses to query.
    #[arg(required = true)]
    pub addresses: Vec<String>,

    /// Balance-query endpoint; queried with `q=unspent&key=...&active=<address>`.
    #[arg(
        long,
        default_value = "https://chainz.cryptoid.info/btc/api.dws",
        env = "UNSPENT_API_URL"
    )]
    pub api_url: String,

    /// API access key.
    #[arg(long, env = "UNSPENT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// File holding the API access key on its first line.
    #[arg(long, env = "UNSPENT_API_KEY_FILE")]
    pub api_key_file: Option<PathBuf>,

    /// Network the addresses must belong to.
    #[arg(long, default_value = "bitcoin", env = "UNSPENT_NETWORK")]
    pub network: Network,

    /// Connect timeout in milliseconds.
    #[arg(long, default_value = "15000")]
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds.
    #[arg(long, default_value = "15000")]
    pub read_timeout_ms: u64,

    /// Client identifier sent as the User-Agent header.
    #[arg(long, env = "UNSPENT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Print reconstructed transactions as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}
