//! User-facing notifications produced by the reconciler.
//!
//! Notifications are immutable once built. Each carries a fresh `notificationId` and the id of the order it concerns;
//! funding notifications also carry the txid, so a consumer that sees the same notification twice can drop the copy.
use serde::{Deserialize, Serialize};

use crate::{
    contract::{Contract, PeerIdentity, Thumbnail},
    currency::CurrencyValue,
    db_types::OrderId,
    helpers::new_notification_id,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    /// A sale has been fully funded
    Order(OrderNotification),
    /// A payment towards a purchase was received
    Payment(PaymentNotification),
    /// A decided dispute has been paid out
    DisputeAccepted(DisputeAcceptedNotification),
    /// A funded sale asked for more stock than was on hand
    InventoryWarning(InventoryWarningNotification),
}

impl Notification {
    pub fn notification_id(&self) -> &str {
        match self {
            Notification::Order(n) => &n.notification_id,
            Notification::Payment(n) => &n.notification_id,
            Notification::DisputeAccepted(n) => &n.notification_id,
            Notification::InventoryWarning(n) => &n.notification_id,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        match self {
            Notification::Order(n) => &n.order_id,
            Notification::Payment(n) => &n.order_id,
            Notification::DisputeAccepted(n) => &n.order_id,
            Notification::InventoryWarning(n) => &n.order_id,
        }
    }

    pub fn notification_type(&self) -> &'static str {
        match self {
            Notification::Order(_) => "order",
            Notification::Payment(_) => "payment",
            Notification::DisputeAccepted(_) => "disputeAccepted",
            Notification::InventoryWarning(_) => "inventoryWarning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotification {
    pub notification_id: String,
    pub order_id: OrderId,
    pub txid: String,
    pub buyer_id: String,
    pub buyer_handle: String,
    pub listing_type: String,
    pub price: CurrencyValue,
    pub slug: String,
    pub thumbnail: Thumbnail,
    pub title: String,
}

impl OrderNotification {
    /// Describes a funded sale, using the first listing of the contract for display.
    pub fn new(order_id: OrderId, txid: impl Into<String>, contract: &Contract, price: CurrencyValue) -> Self {
        let listing = contract.first_listing();
        Self {
            notification_id: new_notification_id(),
            order_id,
            txid: txid.into(),
            buyer_id: contract.buyer_order.buyer.peer_id.clone(),
            buyer_handle: contract.buyer_order.buyer.handle.clone(),
            listing_type: listing.map(|l| l.metadata.contract_type.to_string()).unwrap_or_default(),
            price,
            slug: listing.map(|l| l.slug.clone()).unwrap_or_default(),
            thumbnail: contract.thumbnail(),
            title: contract.title().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    pub notification_id: String,
    pub order_id: OrderId,
    pub txid: String,
    /// Running total of the funding ledger, including the payment that triggered this notification
    pub funding_total: CurrencyValue,
}

impl PaymentNotification {
    pub fn new(order_id: OrderId, txid: impl Into<String>, funding_total: CurrencyValue) -> Self {
        Self { notification_id: new_notification_id(), order_id, txid: txid.into(), funding_total }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeAcceptedNotification {
    pub notification_id: String,
    pub order_id: OrderId,
    pub thumbnail: Thumbnail,
    pub closed_by: String,
    pub counterparty_id: String,
    pub counterparty_handle: String,
    pub buyer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryWarningNotification {
    pub notification_id: String,
    pub order_id: OrderId,
    pub slug: String,
    pub variant: i64,
    pub on_hand: i64,
    pub requested: i64,
}

impl InventoryWarningNotification {
    pub fn new(order_id: OrderId, slug: impl Into<String>, variant: i64, on_hand: i64, requested: i64) -> Self {
        Self { notification_id: new_notification_id(), order_id, slug: slug.into(), variant, on_hand, requested }
    }
}

impl DisputeAcceptedNotification {
    pub fn new(order_id: OrderId, thumbnail: Thumbnail, counterparty: &PeerIdentity, buyer: &str) -> Self {
        Self {
            notification_id: new_notification_id(),
            order_id,
            thumbnail,
            closed_by: counterparty.peer_id.clone(),
            counterparty_id: counterparty.peer_id.clone(),
            counterparty_handle: counterparty.handle.clone(),
            buyer: buyer.to_string(),
        }
    }
}

impl From<OrderNotification> for Notification {
    fn from(n: OrderNotification) -> Self {
        Self::Order(n)
    }
}

impl From<PaymentNotification> for Notification {
    fn from(n: PaymentNotification) -> Self {
        Self::Payment(n)
    }
}

impl From<DisputeAcceptedNotification> for Notification {
    fn from(n: DisputeAcceptedNotification) -> Self {
        Self::DisputeAccepted(n)
    }
}

impl From<InventoryWarningNotification> for Notification {
    fn from(n: InventoryWarningNotification) -> Self {
        Self::InventoryWarning(n)
    }
}
