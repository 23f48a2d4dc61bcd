use std::{fmt::Display, str::FromStr};

pub use bazaar_common::Amount;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::contract::Contract;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The canonical order id: the content hash of the buyer's order proposal. See
/// [`calculate_order_id`](crate::helpers::calculate_order_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------          Role          ---------------------------------------------------------
/// Which side of a contract this peer holds. Sales and purchases are kept in separate views of the store, even though
/// they describe the same kind of contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// This peer is the vendor
    Sale,
    /// This peer is the buyer
    Purchase,
}

impl Role {
    pub fn table_name(&self) -> &'static str {
        match self {
            Role::Sale => "sales",
            Role::Purchase => "purchases",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Sale => write!(f, "sale"),
            Role::Purchase => write!(f, "purchase"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sale" | "sales" => Ok(Self::Sale),
            "purchase" | "purchases" => Ok(Self::Purchase),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------       OrderState      ---------------------------------------------------------
/// The lifecycle state of an order.
///
/// The reconciler only ever drives the funding transitions (`AwaitingPayment` -> `Pending`/`AwaitingFulfillment`) and
/// the dispute payout transition (`Decided` -> `Resolved`). Every other transition belongs to other parts of the
/// marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Pending,
    AwaitingPayment,
    AwaitingPickup,
    AwaitingFulfillment,
    PartiallyFulfilled,
    Fulfilled,
    Completed,
    Canceled,
    Declined,
    Refunded,
    Disputed,
    Decided,
    Resolved,
    PaymentFinalized,
    ProcessingError,
}

impl OrderState {
    /// The state an order moves to once it is fully funded, or `None` if funding does not move this state.
    pub fn funding_transition(&self, vendor_confirmed: bool) -> Option<OrderState> {
        match (self, vendor_confirmed) {
            (OrderState::AwaitingPayment, true) => Some(OrderState::AwaitingFulfillment),
            (OrderState::AwaitingPayment, false) => Some(OrderState::Pending),
            _ => None,
        }
    }

    /// The state an order moves to once all of its escrowed funds have been paid out.
    pub fn payout_transition(&self) -> Option<OrderState> {
        match self {
            OrderState::Decided => Some(OrderState::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "PENDING",
            OrderState::AwaitingPayment => "AWAITING_PAYMENT",
            OrderState::AwaitingPickup => "AWAITING_PICKUP",
            OrderState::AwaitingFulfillment => "AWAITING_FULFILLMENT",
            OrderState::PartiallyFulfilled => "PARTIALLY_FULFILLED",
            OrderState::Fulfilled => "FULFILLED",
            OrderState::Completed => "COMPLETED",
            OrderState::Canceled => "CANCELED",
            OrderState::Declined => "DECLINED",
            OrderState::Refunded => "REFUNDED",
            OrderState::Disputed => "DISPUTED",
            OrderState::Decided => "DECIDED",
            OrderState::Resolved => "RESOLVED",
            OrderState::PaymentFinalized => "PAYMENT_FINALIZED",
            OrderState::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "AWAITING_PAYMENT" => Ok(Self::AwaitingPayment),
            "AWAITING_PICKUP" => Ok(Self::AwaitingPickup),
            "AWAITING_FULFILLMENT" => Ok(Self::AwaitingFulfillment),
            "PARTIALLY_FULFILLED" => Ok(Self::PartiallyFulfilled),
            "FULFILLED" => Ok(Self::Fulfilled),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            "DECLINED" => Ok(Self::Declined),
            "REFUNDED" => Ok(Self::Refunded),
            "DISPUTED" => Ok(Self::Disputed),
            "DECIDED" => Ok(Self::Decided),
            "RESOLVED" => Ok(Self::Resolved),
            "PAYMENT_FINALIZED" => Ok(Self::PaymentFinalized),
            "PROCESSING_ERROR" => Ok(Self::ProcessingError),
            s => Err(ConversionError(format!("Invalid order state: {s}"))),
        }
    }
}

impl From<String> for OrderState {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order state: {value}. But this conversion cannot fail. Defaulting to PROCESSING_ERROR");
            OrderState::ProcessingError
        })
    }
}

//--------------------------------------   TransactionRecord   ---------------------------------------------------------
/// One entry in an order's funding ledger.
///
/// `value` is positive for funds received into the watched address and negative for funds spent out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub txid: String,
    pub index: u32,
    pub value: Amount,
    pub address: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub spent: bool,
    /// For a spend, the hash of the outpoint it consumed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outpoint: Option<String>,
}

impl TransactionRecord {
    pub fn new(txid: impl Into<String>, index: u32, value: Amount, address: impl Into<String>) -> Self {
        Self {
            txid: txid.into(),
            index,
            value,
            address: address.into(),
            timestamp: Utc::now(),
            spent: false,
            outpoint: None,
        }
    }

    /// A negative record for funds leaving `address` through the outpoint `outpoint_hash:index`.
    pub fn spend(
        txid: impl Into<String>,
        outpoint_hash: impl Into<String>,
        index: u32,
        value: Amount,
        address: impl Into<String>,
    ) -> Self {
        Self { outpoint: Some(outpoint_hash.into()), ..Self::new(txid, index, -value, address) }
    }

    /// Whether this is the spend of `hash:index` made by transaction `txid`.
    pub fn is_spend_of(&self, txid: &str, hash: &str, index: u32) -> bool {
        !self.value.is_positive() && self.txid == txid && self.index == index && self.outpoint.as_deref() == Some(hash)
    }

    pub fn is_outpoint(&self, hash: &str, index: u32) -> bool {
        self.txid == hash && self.index == index
    }
}

/// Running total of a funding ledger
pub fn ledger_total(records: &[TransactionRecord]) -> Amount {
    records.iter().map(|r| r.value).sum()
}

/// True when the ledger has received funds and every positive record has been spent.
pub fn all_funds_released(records: &[TransactionRecord]) -> bool {
    let mut received = records.iter().filter(|r| r.value.is_positive()).peekable();
    received.peek().is_some() && received.all(|r| r.spent)
}

//--------------------------------------      OrderRecord      ---------------------------------------------------------
/// A sale or purchase as held by the order store, including its funding ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub payment_address: String,
    pub contract: Contract,
    pub state: OrderState,
    pub funded: bool,
    pub records: Vec<TransactionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     NewOrderRecord    ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub order_id: OrderId,
    /// The address the wallet watches on behalf of this order
    pub payment_address: String,
    pub contract: Contract,
    pub state: OrderState,
}

impl NewOrderRecord {
    pub fn new(order_id: OrderId, payment_address: impl Into<String>, contract: Contract, state: OrderState) -> Self {
        Self { order_id, payment_address: payment_address.into(), contract, state }
    }
}

//--------------------------------------     FundingUpdate     ---------------------------------------------------------
/// Everything the reconciler changes on an order in response to a single output or input. Backends should write it
/// as one unit.
#[derive(Debug, Clone)]
pub struct FundingUpdate {
    pub order_id: OrderId,
    pub funded: bool,
    pub records: Vec<TransactionRecord>,
    pub new_state: Option<OrderState>,
    pub contract: Option<Contract>,
}

impl FundingUpdate {
    pub fn new(order_id: OrderId, funded: bool, records: Vec<TransactionRecord>) -> Self {
        Self { order_id, funded, records, new_state: None, contract: None }
    }

    pub fn with_state(mut self, state: Option<OrderState>) -> Self {
        self.new_state = state;
        self
    }

    pub fn with_contract(mut self, contract: Contract) -> Self {
        self.contract = Some(contract);
        self
    }
}

//--------------------------------------       TxMetadata      ---------------------------------------------------------
/// Display metadata for a wallet transaction, keyed by txid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TxMetadata {
    pub txid: String,
    pub address: String,
    pub memo: String,
    pub order_id: String,
    pub thumbnail: String,
    pub can_bump_fee: bool,
}

//--------------------------------------     InventoryLevel    ---------------------------------------------------------
/// Stock count for a SKU. A negative count means the SKU is not tracked and stock is unlimited.
pub const UNLIMITED_INVENTORY: i64 = -1;
