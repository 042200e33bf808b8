use bincode::Options;
use serde::Deserialize;
use serde::Serialize;

use super::ChainHash;
use crate::Result;

/// Upper bound on an announced transaction payload.
///
/// Bounds the allocation a malformed length prefix can request while
/// decoding.
pub const MAX_TX_PAYLOAD: u64 = 1_310_720;

/// Transaction tree an outpoint belongs to.
pub const TX_TREE_REGULAR: i8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: ChainHash,
    pub index: u32,
    pub tree: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub previous_outpoint: OutPoint,
    pub sequence: u32,
    pub value_in: i64,
    pub block_height: u32,
    pub block_index: u32,
    pub signature_script: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: i64,
    pub version: u16,
    pub pk_script: Vec<u8>,
}

/// A transaction announced through a `relevanttxaccepted` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub expiry: u32,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_TX_PAYLOAD)
        .reject_trailing_bytes()
}

impl Transaction {
    /// Decode a raw transaction as delivered by the node.
    pub fn deserialize(raw: &[u8]) -> Result<Self> {
        Ok(wire_options().deserialize(raw)?)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(wire_options().serialize(self)?)
    }
}
