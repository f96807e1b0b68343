pub mod config;
pub mod delivery;
pub mod error;
pub mod fetch;
pub mod parsing;
pub mod pipeline;
pub mod reconstruct;
pub mod types;

#[cfg(test)]
mod test_util;

pub use config::ApiConfig;
pub use error::{BalanceError, FailureKind, ReconstructionError};
pub use pipeline::{BalanceRequester, ResultCallback};
pub use types::{OutputRecord, OutputSlot, PseudoTransaction};
