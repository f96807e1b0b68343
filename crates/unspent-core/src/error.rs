use bitcoin::Txid;

/// Coarse failure classification handed to callback consumers that map
/// failures onto user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NetworkIo,
    HttpStatus,
    Parse,
    ReconstructionInvariant,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("network I/O failure: {0}")]
    NetworkIo(String),

    #[error("HTTP status {code}: {message}")]
    HttpStatus { code: u16, message: String },

    #[error("unspent output parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BalanceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NetworkIo(_) => FailureKind::NetworkIo,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::Parse(_) => FailureKind::Parse,
            Self::Reconstruction(_) => FailureKind::ReconstructionInvariant,
            Self::Config(_) => FailureKind::Config,
        }
    }
}

/// Raised when the reconstructed output list for a transaction would have to
/// overwrite data it already holds. Indicates either a misbehaving API or a
/// reconstruction bug; it is never a user-facing condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructionError {
    #[error("output {txid}:{vout} reported more than once")]
    DuplicateOutput { txid: Txid, vout: u32 },
}
