//! Domain types for balance-only transaction reconstruction.
//!
//! An [`OutputRecord`] is what the indexing API reports for one unspent
//! output. A [`PseudoTransaction`] is the dense, index-aligned view rebuilt
//! from those records, where every output position the API did not report is
//! filled with an [`OutputSlot::Placeholder`].

use std::hash::{Hash, Hasher};

use bitcoin::{Amount, Script, ScriptBuf, SignedAmount, Txid};
use serde::Serialize;

// ==============================================================================
// Output Record
// ==============================================================================

/// One unspent output as reported by the API, in response order.
///
/// The output script is not part of the response; it is derived from the
/// queried address during reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRecord {
    pub txid: Txid,
    pub vout: u32,
    pub value: Amount,
}

impl OutputRecord {
    pub fn new(txid: Txid, vout: u32, value: Amount) -> Self {
        Self { txid, vout, value }
    }
}

// ==============================================================================
// Output Slot
// ==============================================================================

/// Value reported for a placeholder slot. Real outputs are unsigned, so this
/// can never collide with one.
pub const PLACEHOLDER_VALUE: SignedAmount = SignedAmount::from_sat(-1);

/// A single position in a reconstructed transaction's output list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputSlot {
    /// Output backed by an API record.
    Real {
        value: Amount,
        script_pub_key: ScriptBuf,
    },
    /// Output that exists on-chain at this index but is unknown to us;
    /// presumed spent or owned by someone else.
    Placeholder,
}

impl OutputSlot {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Slot value, with [`PLACEHOLDER_VALUE`] standing in for unknown outputs.
    pub fn value(&self) -> SignedAmount {
        match self {
            Self::Real { value, .. } => value.to_signed().unwrap_or(SignedAmount::MAX),
            Self::Placeholder => PLACEHOLDER_VALUE,
        }
    }

    /// Output script; empty for placeholders.
    pub fn script_pub_key(&self) -> &Script {
        match self {
            Self::Real { script_pub_key, .. } => script_pub_key.as_script(),
            Self::Placeholder => Script::new(),
        }
    }
}

// ==============================================================================
// Pseudo Transaction
// ==============================================================================

/// Coarse confirmation state. Reconstructed transactions are always treated
/// as on-chain; confirmation depth is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Building,
}

/// Minimal transaction sufficient to compute a wallet's spendable balance.
///
/// Identity is the txid alone: two values with the same txid compare equal
/// and hash the same regardless of their outputs.
#[derive(Debug, Clone, Serialize)]
pub struct PseudoTransaction {
    pub txid: Txid,
    pub outputs: Vec<OutputSlot>,
    pub confidence: Confidence,
}

impl PseudoTransaction {
    pub fn new(txid: Txid) -> Self {
        Self {
            txid,
            outputs: Vec::new(),
            confidence: Confidence::Building,
        }
    }

    /// Real outputs with their positions, skipping placeholders.
    pub fn real_outputs(&self) -> impl Iterator<Item = (u32, Amount, &Script)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .filter_map(|(vout, slot)| match slot {
                OutputSlot::Real {
                    value,
                    script_pub_key,
                } => Some((vout as u32, *value, script_pub_key.as_script())),
                OutputSlot::Placeholder => None,
            })
    }

    /// Sum of all real outputs. `None` on overflow.
    pub fn balance(&self) -> Option<Amount> {
        self.real_outputs()
            .try_fold(Amount::ZERO, |acc, (_, value, _)| acc.checked_add(value))
    }
}

impl PartialEq for PseudoTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.txid == other.txid
    }
}

impl Eq for PseudoTransaction {}

impl Hash for PseudoTransaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.txid.hash(state);
    }
}

/// Spendable balance across a reconstructed result. `None` on overflow.
pub fn total_balance(transactions: &[PseudoTransaction]) -> Option<Amount> {
    transactions
        .iter()
        .try_fold(Amount::ZERO, |acc, tx| acc.checked_add(tx.balance()?))
}
