use std::collections::HashMap;

use bitcoin::{ScriptBuf, Txid};

use crate::error::ReconstructionError;
use crate::types::{OutputRecord, OutputSlot, PseudoTransaction};

// ==============================================================================
// Transaction Reconstruction
// ==============================================================================

/// Rebuild dense, index-aligned transactions from sparse output records.
///
/// Records are applied in order. Every output position the API did not
/// report becomes an [`OutputSlot::Placeholder`], so a real output always
/// sits at its on-chain index. `script_for_address` is called once per record
/// to produce the script of the queried address.
///
/// Transactions are returned in the order their txid was first seen.
pub fn reconstruct<F>(
    records: &[OutputRecord],
    mut script_for_address: F,
) -> Result<Vec<PseudoTransaction>, ReconstructionError>
where
    F: FnMut() -> ScriptBuf,
{
    let mut set = TransactionSet::with_capacity(records.len());
    for record in records {
        set.apply(record, script_for_address())?;
    }
    Ok(set.into_transactions())
}

/// Working state of one reconstruction: txid → transaction, plus first-seen
/// order. Never shared across requests.
#[derive(Debug, Default)]
struct TransactionSet {
    index: HashMap<Txid, usize>,
    transactions: Vec<PseudoTransaction>,
}

impl TransactionSet {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            transactions: Vec::with_capacity(capacity),
        }
    }

    fn get_or_insert(&mut self, txid: Txid) -> &mut PseudoTransaction {
        let position = *self.index.entry(txid).or_insert_with(|| {
            self.transactions.push(PseudoTransaction::new(txid));
            self.transactions.len() - 1
        });
        &mut self.transactions[position]
    }

    fn apply(
        &mut self,
        record: &OutputRecord,
        script_pub_key: ScriptBuf,
    ) -> Result<(), ReconstructionError> {
        let tx = self.get_or_insert(record.txid);
        let vout = record.vout as usize;
        let real = OutputSlot::Real {
            value: record.value,
            script_pub_key,
        };

        if let Some(slot) = tx.outputs.get_mut(vout) {
            if !slot.is_placeholder() {
                return Err(ReconstructionError::DuplicateOutput {
                    txid: record.txid,
                    vout: record.vout,
                });
            }
            *slot = real;
        } else {
            tx.outputs.resize(vout, OutputSlot::Placeholder);
            tx.outputs.push(real);
        }
        Ok(())
    }

    fn into_transactions(self) -> Vec<PseudoTransaction> {
        self.transactions
    }
}
