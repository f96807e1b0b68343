use std::sync::Arc;

use bitcoin::Address;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::delivery::CallbackExecutor;
use crate::error::{BalanceError, ReconstructionError};
use crate::fetch::{HttpFetcher, UnspentSource};
use crate::parsing::parse_unspent_outputs;
use crate::reconstruct::reconstruct;
use crate::types::PseudoTransaction;

// ==============================================================================
// Result Callback
// ==============================================================================

/// Receiver of request outcomes. Exactly one method is invoked per request,
/// always on the callback executor.
pub trait ResultCallback: Send + Sync + 'static {
    fn on_result(&self, transactions: Vec<PseudoTransaction>);

    fn on_fail(&self, error: BalanceError);

    /// Called instead of `on_fail` when the API reported the same output
    /// twice. Forwards to `on_fail` unless overridden.
    fn on_invariant_violation(&self, violation: ReconstructionError) {
        self.on_fail(BalanceError::Reconstruction(violation));
    }
}

// ==============================================================================
// Request State
// ==============================================================================

/// Progress of a single request. There is no retry state: a failure in any
/// stage goes straight to `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestState {
    Idle,
    Fetching,
    Parsing,
    Reconstructing,
    Delivered,
}

// ==============================================================================
// Balance Requester
// ==============================================================================

/// Schedules balance requests on a worker runtime and posts their outcomes
/// to a callback executor.
///
/// Requests are independent: each one owns its working state, so any number
/// may be in flight at once.
#[derive(Clone)]
pub struct BalanceRequester {
    worker: Handle,
    source: Arc<dyn UnspentSource>,
    callbacks: Arc<dyn CallbackExecutor>,
    result_callback: Arc<dyn ResultCallback>,
}

impl BalanceRequester {
    pub fn new(
        worker: Handle,
        source: Arc<dyn UnspentSource>,
        callbacks: Arc<dyn CallbackExecutor>,
        result_callback: Arc<dyn ResultCallback>,
    ) -> Self {
        Self {
            worker,
            source,
            callbacks,
            result_callback,
        }
    }

    /// Build a requester backed by [`HttpFetcher`].
    pub fn http(
        worker: Handle,
        config: ApiConfig,
        callbacks: Arc<dyn CallbackExecutor>,
        result_callback: Arc<dyn ResultCallback>,
    ) -> Result<Self, BalanceError> {
        let source = Arc::new(HttpFetcher::new(config)?);
        Ok(Self::new(worker, source, callbacks, result_callback))
    }

    /// Fetch, parse and reconstruct the unspent outputs of `address` on the
    /// worker runtime, then post the outcome. Returns without waiting.
    ///
    /// The returned handle completes once the outcome has been posted.
    /// Dropping it does not cancel the request.
    pub fn request_balance(&self, address: Address) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let callbacks = Arc::clone(&self.callbacks);
        let result_callback = Arc::clone(&self.result_callback);

        self.worker.spawn(async move {
            let mut state = RequestState::Idle;
            let outcome = run_request(source.as_ref(), &address, &mut state).await;
            deliver(callbacks.as_ref(), result_callback, &address, state, outcome);
        })
    }
}

async fn run_request(
    source: &dyn UnspentSource,
    address: &Address,
    state: &mut RequestState,
) -> Result<Vec<PseudoTransaction>, BalanceError> {
    advance(state, RequestState::Fetching, address);
    let body = source.fetch_unspent(address).await?;

    advance(state, RequestState::Parsing, address);
    let records = parse_unspent_outputs(&body)?;
    drop(body);

    advance(state, RequestState::Reconstructing, address);
    let transactions = reconstruct(&records, || address.script_pubkey())?;

    Ok(transactions)
}

fn advance(state: &mut RequestState, next: RequestState, address: &Address) {
    debug!(%address, from = ?state, to = ?next, "balance request state");
    *state = next;
}

fn deliver(
    callbacks: &dyn CallbackExecutor,
    result_callback: Arc<dyn ResultCallback>,
    address: &Address,
    stage: RequestState,
    outcome: Result<Vec<PseudoTransaction>, BalanceError>,
) {
    debug!(%address, from = ?stage, to = ?RequestState::Delivered, "balance request state");
    match outcome {
        Ok(transactions) => {
            let output_count: usize = transactions.iter().map(|tx| tx.outputs.len()).sum();
            info!(
                %address,
                tx_count = transactions.len(),
                output_count,
                "reconstructed unspent outputs"
            );
            callbacks.post(Box::new(move || result_callback.on_result(transactions)));
        }
        Err(BalanceError::Reconstruction(violation)) => {
            error!(%address, error = %violation, "unspent output reconstruction invariant violated");
            callbacks.post(Box::new(move || {
                result_callback.on_invariant_violation(violation)
            }));
        }
        Err(err) => {
            info!(%address, ?stage, error = %err, "balance request failed");
            callbacks.post(Box::new(move || result_callback.on_fail(err)));
        }
    }
}
