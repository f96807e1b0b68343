//! Parser for the address-indexed `unspent` query response.
//!
//! Expected shape:
//!
//! ```text
//! { "unspent_outputs": [ { "tx_hash": "<hex>", "tx_ouput_n": <int>, "value": <int> }, ... ] }
//! ```
//!
//! `tx_ouput_n` is spelled the way the upstream API spells it. Integer fields
//! may also arrive as decimal strings (`"value":"5000"`).

use bitcoin::{Amount, Txid};

use crate::error::BalanceError;
use crate::types::OutputRecord;

const OUTPUTS_FIELD: &str = "unspent_outputs";
const TX_HASH_FIELD: &str = "tx_hash";
const OUTPUT_INDEX_FIELD: &str = "tx_ouput_n";
const VALUE_FIELD: &str = "value";

/// Upper bound on outputs in a single transaction: the block weight limit
/// divided by the 36 WU of the smallest possible output.
pub const MAX_OUTPUTS_PER_TX: u32 = 111_111;

/// Parse a response body into records, in payload order.
///
/// All-or-nothing: any malformed entry fails the whole payload.
pub fn parse_unspent_outputs(body: &str) -> Result<Vec<OutputRecord>, BalanceError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| BalanceError::Parse(format!("invalid JSON: {e}")))?;

    let outputs = json
        .get(OUTPUTS_FIELD)
        .ok_or_else(|| BalanceError::Parse(format!("missing {OUTPUTS_FIELD}")))?
        .as_array()
        .ok_or_else(|| BalanceError::Parse(format!("{OUTPUTS_FIELD} is not an array")))?;

    outputs
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            parse_output_record(entry)
                .map_err(|e| BalanceError::Parse(format!("{OUTPUTS_FIELD}[{position}]: {e}")))
        })
        .collect()
}

fn parse_output_record(entry: &serde_json::Value) -> Result<OutputRecord, String> {
    if !entry.is_object() {
        return Err(format!("expected object, got: {entry}"));
    }

    let txid = parse_txid(entry.get(TX_HASH_FIELD), TX_HASH_FIELD)?;

    let index = parse_i64(entry.get(OUTPUT_INDEX_FIELD), OUTPUT_INDEX_FIELD)?;
    let vout = u32::try_from(index)
        .ok()
        .filter(|vout| *vout < MAX_OUTPUTS_PER_TX)
        .ok_or_else(|| format!("{OUTPUT_INDEX_FIELD} out of range: {index}"))?;

    let sats = parse_i64(entry.get(VALUE_FIELD), VALUE_FIELD)?;
    let sats = u64::try_from(sats).map_err(|_| format!("{VALUE_FIELD} is negative: {sats}"))?;

    Ok(OutputRecord::new(txid, vout, Amount::from_sat(sats)))
}

fn parse_txid(value: Option<&serde_json::Value>, field: &str) -> Result<Txid, String> {
    let value = value
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| format!("missing {field}"))?;
    value.parse().map_err(|e| format!("invalid {field}: {e}"))
}

fn parse_i64(value: Option<&serde_json::Value>, field: &str) -> Result<i64, String> {
    let Some(value) = value else {
        return Err(format!("missing {field}"));
    };
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| format!("{field} is not an integer: {value}"))
}
