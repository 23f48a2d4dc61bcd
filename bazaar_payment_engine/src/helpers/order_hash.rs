//! Content hashes used as cross-reference keys.
//!
//! Both the sale and the purchase view of an order are keyed by the same id, which is derived from the buyer's order
//! proposal. Since both peers hold an identical copy of the proposal, they derive identical ids without ever
//! exchanging them.
use blake2::{Blake2s256, Digest};
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

use crate::{
    contract::{BuyerOrder, VendorListing},
    db_types::OrderId,
};

#[derive(Debug, Clone, Error)]
#[error("Could not derive an order reference: {0}")]
pub struct OrderIdError(String);

impl From<serde_json::Error> for OrderIdError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

fn hash_json<T: Serialize>(value: &T) -> Result<String, OrderIdError> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Blake2s256::digest(&bytes);
    Ok(to_hex(digest.as_slice()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The canonical id of an order: the hex-encoded Blake2s-256 digest of the serialized buyer order.
pub fn calculate_order_id(order: &BuyerOrder) -> Result<OrderId, OrderIdError> {
    hash_json(order).map(OrderId)
}

/// Order items reference the listing they were bought from by this hash.
pub fn listing_hash(listing: &VendorListing) -> Result<String, OrderIdError> {
    hash_json(listing)
}

/// A fresh random id for a notification.
pub fn new_notification_id() -> String {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    to_hex(Blake2s256::digest(seed).as_slice())
}
