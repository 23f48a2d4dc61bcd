//! Events delivered by the wallet layer.
//!
//! The wallet watches the payment addresses of open orders and reports every transaction that touches one of them.
//! These types are the boundary: the engine never sees raw blockchain data.
use serde::{Deserialize, Serialize};

use crate::db_types::Amount;

/// A transaction that pays into and/or spends from one or more watched addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCallback {
    pub txid: String,
    #[serde(default)]
    pub outputs: Vec<TransactionOutput>,
    #[serde(default)]
    pub inputs: Vec<TransactionInput>,
}

impl TransactionCallback {
    pub fn new(txid: impl Into<String>) -> Self {
        Self { txid: txid.into(), outputs: vec![], inputs: vec![] }
    }

    pub fn with_output(mut self, address: impl Into<String>, value: i64, index: u32) -> Self {
        self.outputs.push(TransactionOutput { address: address.into(), value: Amount::from(value), index });
        self
    }

    pub fn with_input(
        mut self,
        linked_address: impl Into<String>,
        outpoint_hash: impl Into<String>,
        outpoint_index: u32,
        value: i64,
    ) -> Self {
        self.inputs.push(TransactionInput {
            linked_address: linked_address.into(),
            outpoint_hash: outpoint_hash.into(),
            outpoint_index,
            value: Amount::from(value),
        });
        self
    }

    /// Every watched address this callback touches, outputs first.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.address.as_str()).chain(self.inputs.iter().map(|i| i.linked_address.as_str()))
    }
}

/// Funds received into a watched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub address: String,
    pub value: Amount,
    pub index: u32,
}

/// Funds spent out of a watched address. `linked_address` is the address the spent output originally paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub linked_address: String,
    pub outpoint_hash: String,
    pub outpoint_index: u32,
    pub value: Amount,
}
