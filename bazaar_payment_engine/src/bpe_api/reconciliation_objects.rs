use serde::{Deserialize, Serialize};

use crate::{
    bpe_api::errors::ReconcilerError,
    db_types::{OrderId, OrderState, Role},
    wallet_types::{TransactionInput, TransactionOutput},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Output,
    Input,
}

/// Identifies one output or input of a callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    pub kind: UnitKind,
    pub address: String,
    /// The output's vout for outputs, the spent outpoint's index for inputs
    pub index: u32,
}

impl From<&TransactionOutput> for UnitRef {
    fn from(output: &TransactionOutput) -> Self {
        Self { kind: UnitKind::Output, address: output.address.clone(), index: output.index }
    }
}

impl From<&TransactionInput> for UnitRef {
    fn from(input: &TransactionInput) -> Self {
        Self { kind: UnitKind::Input, address: input.linked_address.clone(), index: input.outpoint_index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnitOutcome {
    /// The address is not watched on behalf of any order
    NotMine,
    /// The ledger already holds this event
    AlreadyProcessed { role: Role, order_id: OrderId },
    Skipped { reason: String },
    Recorded {
        role: Role,
        order_id: OrderId,
        funded: bool,
        state: OrderState,
        /// This event pushed the order over its funding threshold
        newly_funded: bool,
        /// This event completed a dispute payout
        resolved: bool,
    },
    Failed { error: String, retryable: bool },
}

impl UnitOutcome {
    pub fn failed(error: &ReconcilerError) -> Self {
        Self::Failed { error: error.to_string(), retryable: error.is_retryable() }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UnitOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: UnitRef,
    #[serde(flatten)]
    pub outcome: UnitOutcome,
}

/// What happened to every output and input of one wallet callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub txid: String,
    pub units: Vec<UnitReport>,
}

impl ReconciliationReport {
    pub fn new(txid: impl Into<String>) -> Self {
        Self { txid: txid.into(), units: vec![] }
    }

    pub fn push(&mut self, unit: UnitRef, outcome: UnitOutcome) {
        self.units.push(UnitReport { unit, outcome });
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| u.outcome.is_failure())
    }

    /// True if the wallet should deliver this callback again.
    pub fn should_redeliver(&self) -> bool {
        self.units.iter().any(|u| matches!(u.outcome, UnitOutcome::Failed { retryable: true, .. }))
    }

    pub fn recorded_count(&self) -> usize {
        self.units.iter().filter(|u| matches!(u.outcome, UnitOutcome::Recorded { .. })).count()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| u.unit.kind == UnitKind::Output)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| u.unit.kind == UnitKind::Input)
    }
}
