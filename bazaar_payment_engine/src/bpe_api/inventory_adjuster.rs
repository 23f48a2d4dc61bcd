//! Stock decrements for funded sales.
//!
//! Every line item of a funded sale is matched to its listing and SKU, and the stored count for that SKU is reduced
//! by the quantity ordered. Counts never go below zero. An untracked SKU (count -1) is left alone.
use log::*;

use crate::{
    contract::{Contract, OrderItem, VendorListing},
    db_types::{OrderId, UNLIMITED_INVENTORY},
    events::InventoryChange,
    helpers::listing_hash,
    notifications::InventoryWarningNotification,
    traits::{InventoryManagement, StoreError},
};

/// The outcome of adjusting stock for one order.
#[derive(Debug, Clone, Default)]
pub struct InventoryAdjustment {
    /// Counts that were written
    pub changes: Vec<InventoryChange>,
    /// SKUs that were oversold
    pub warnings: Vec<InventoryWarningNotification>,
    /// Store failures for individual items. The remaining items are still adjusted.
    pub errors: Vec<StoreError>,
}

impl InventoryAdjustment {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.warnings.is_empty()
    }
}

/// The count to store after selling `quantity` units from `on_hand`, and whether the sale exceeded stock.
pub fn decrement(on_hand: i64, quantity: i64) -> (i64, bool) {
    if on_hand < 0 {
        return (UNLIMITED_INVENTORY, false);
    }
    let remaining = on_hand - quantity;
    if remaining < 0 {
        (0, true)
    } else {
        (remaining, false)
    }
}

/// Finds the SKU index for the options the buyer picked. A listing without options has a single SKU at index 0.
pub fn selected_variant(listing: &VendorListing, item: &OrderItem) -> Option<i64> {
    if listing.item.options.is_empty() {
        return Some(0);
    }
    listing
        .item
        .skus
        .iter()
        .position(|sku| {
            sku.selections.len() == item.options.len() &&
                sku.selections.iter().all(|sel| {
                    item.options.iter().any(|opt| opt.name.eq_ignore_ascii_case(&sel.option) && opt.value == sel.variant)
                })
        })
        .map(|i| i as i64)
}

fn listing_for_item<'c>(contract: &'c Contract, item: &OrderItem) -> Option<&'c VendorListing> {
    contract.vendor_listings.iter().find(|l| match listing_hash(l) {
        Ok(hash) => hash == item.listing_hash,
        Err(e) => {
            warn!("📦️ Could not hash listing {}. {e}", l.slug);
            false
        },
    })
}

pub struct InventoryAdjuster<B> {
    db: B,
}

impl<B> InventoryAdjuster<B>
where B: InventoryManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Decrements stock for every item in the contract's buyer order.
    ///
    /// Items that cannot be matched to a listing or SKU, that have no stored count, or that have a non-positive
    /// quantity are skipped.
    pub async fn adjust_for_order(&self, order_id: &OrderId, contract: &Contract) -> InventoryAdjustment {
        let mut result = InventoryAdjustment::default();
        for item in &contract.buyer_order.items {
            let Some(listing) = listing_for_item(contract, item) else {
                debug!("📦️ No listing in order {order_id} matches hash {}", item.listing_hash);
                continue;
            };
            let Some(variant) = selected_variant(listing, item) else {
                warn!("📦️ Order {order_id} selected options that match no SKU of {}", listing.slug);
                continue;
            };
            if item.quantity <= 0 {
                let qty = item.quantity;
                error!("📦️ Unable to update inventory for {}:{variant} with invalid quantity {qty}", listing.slug);
                continue;
            }
            let on_hand = match self.db.fetch_inventory(&listing.slug, variant).await {
                Ok(Some(c)) => c,
                Ok(None) => {
                    trace!("📦️ Inventory for {}:{variant} is not tracked", listing.slug);
                    continue;
                },
                Err(e) => {
                    error!("📦️ Could not read inventory for {}:{variant}. {e}", listing.slug);
                    result.errors.push(e);
                    continue;
                },
            };
            let (new_count, oversold) = decrement(on_hand, item.quantity);
            if oversold {
                warn!("📦️ Order {order_id} purchased more inventory for {} than we have on hand", listing.slug);
                result.warnings.push(InventoryWarningNotification::new(
                    order_id.clone(),
                    listing.slug.clone(),
                    variant,
                    on_hand,
                    item.quantity,
                ));
            }
            if new_count == on_hand {
                continue;
            }
            if let Err(e) = self.db.update_inventory(&listing.slug, variant, new_count).await {
                error!("📦️ Failed updating inventory for listing ({}, {variant}). {e}", listing.slug);
                result.errors.push(e);
                continue;
            }
            debug!("📦️ Adjusted inventory for {}:{variant} from {on_hand} to {new_count}", listing.slug);
            result.changes.push(InventoryChange { slug: listing.slug.clone(), variant, old_count: on_hand, new_count });
        }
        result
    }
}
