//! Shared test helpers for `unspent-core` unit tests.

use bitcoin::address::NetworkUnchecked;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, Network, ScriptBuf, Txid};

use crate::types::OutputRecord;

pub const TEST_ADDRESS: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

pub fn test_address() -> Address {
    TEST_ADDRESS
        .parse::<Address<NetworkUnchecked>>()
        .expect("static test address must parse")
        .require_network(Network::Bitcoin)
        .expect("static test address must be mainnet")
}

pub fn address_script() -> ScriptBuf {
    test_address().script_pubkey()
}

pub fn record(txid: Txid, vout: u32, sats: u64) -> OutputRecord {
    OutputRecord::new(txid, vout, Amount::from_sat(sats))
}

/// Render records the way the API does, including its `tx_ouput_n` spelling.
pub fn unspent_body(records: &[OutputRecord]) -> String {
    let outputs: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            serde_json::json!({
                "tx_hash": r.txid.to_string(),
                "tx_ouput_n": r.vout,
                "value": r.value.to_sat(),
            })
        })
        .collect();
    serde_json::json!({ "unspent_outputs": outputs }).to_string()
}
