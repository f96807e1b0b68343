mod cli;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network};
use clap::Parser;
use eyre::{eyre, WrapErr};

use unspent_core::config::resolve_api_key;
use unspent_core::delivery::callback_channel;
use unspent_core::fetch::{HttpFetcher, UnspentSource};
use unspent_core::types::total_balance;
use unspent_core::{
    ApiConfig, BalanceError, BalanceRequester, PseudoTransaction, ReconstructionError,
    ResultCallback,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    // Validate every address up front so a typo does not leave other
    // requests half-reported.
    let addresses = args
        .addresses
        .iter()
        .map(|raw| parse_address(raw, args.network))
        .collect::<eyre::Result<Vec<_>>>()?;

    let api_key = resolve_api_key(args.api_key.as_deref(), args.api_key_file.as_deref())
        .context("resolve API access key")?;
    let mut config = ApiConfig::new(&args.api_url, api_key)
        .context("configure balance endpoint")?
        .with_timeouts(
            Duration::from_millis(args.connect_timeout_ms),
            Duration::from_millis(args.read_timeout_ms),
        )
        .context("configure timeouts")?;
    if let Some(user_agent) = &args.user_agent {
        config = config.with_user_agent(user_agent);
    }
    tracing::debug!(?config, "balance endpoint configured");

    let source: Arc<dyn UnspentSource> =
        Arc::new(HttpFetcher::new(config).context("build HTTP client")?);
    let failures = Arc::new(AtomicUsize::new(0));
    let (poster, callbacks) = callback_channel();
    let poster = Arc::new(poster);

    for address in addresses {
        let printer = Arc::new(Printer {
            address: address.to_string(),
            json: args.json,
            failures: Arc::clone(&failures),
        });
        BalanceRequester::new(
            tokio::runtime::Handle::current(),
            Arc::clone(&source),
            poster.clone(),
            printer,
        )
        .request_balance(address);
    }
    // The callback loop ends once every in-flight request has released its
    // poster.
    drop(poster);
    callbacks.run().await;

    let failures = failures.load(Ordering::SeqCst);
    if failures > 0 {
        return Err(eyre!("{failures} of {} requests failed", args.addresses.len()));
    }
    Ok(())
}

fn parse_address(raw: &str, network: Network) -> eyre::Result<Address> {
    raw.parse::<Address<NetworkUnchecked>>()
        .wrap_err_with(|| format!("invalid address `{raw}`"))?
        .require_network(network)
        .wrap_err_with(|| format!("address `{raw}` is not valid on {network}"))
}

// ==============================================================================
// Result Printer
// ==============================================================================

/// Callback consumer that renders one address's outcome as it is delivered.
struct Printer {
    address: String,
    json: bool,
    failures: Arc<AtomicUsize>,
}

impl ResultCallback for Printer {
    fn on_result(&self, transactions: Vec<PseudoTransaction>) {
        if self.json {
            let rendered = serde_json::json!({
                "address": self.address,
                "transactions": transactions,
            });
            match serde_json::to_string_pretty(&rendered) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => {
                    eprintln!("{}: error: render result as JSON: {err}", self.address);
                    self.failures.fetch_add(1, Ordering::SeqCst);
                }
            }
            return;
        }

        let outputs: usize = transactions.iter().map(|tx| tx.real_outputs().count()).sum();
        match total_balance(&transactions) {
            Some(balance) => println!(
                "{}: {} transactions, {outputs} unspent outputs, balance {balance}",
                self.address,
                transactions.len()
            ),
            None => {
                eprintln!("{}: error: balance overflows", self.address);
                self.failures.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn on_fail(&self, error: BalanceError) {
        eprintln!("{}: error ({:?}): {error}", self.address, error.kind());
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_invariant_violation(&self, violation: ReconstructionError) {
        eprintln!(
            "{}: internal error: the API returned inconsistent data: {violation}",
            self.address
        );
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}
