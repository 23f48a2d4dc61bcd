//! Canned contracts and orders.
use chrono::{TimeZone, Utc};

use crate::{
    contract::{
        BuyerOrder,
        Contract,
        ContractType,
        Image,
        ItemOption,
        ListingItem,
        ListingMetadata,
        ListingOption,
        OrderItem,
        OrderPayment,
        PaymentMethod,
        PeerIdentity,
        PriceCurrency,
        Sku,
        SkuSelection,
        VendorListing,
        VendorOrderConfirmation,
    },
    db_types::{Amount, NewOrderRecord, OrderRecord, OrderState, Role},
    helpers::{calculate_order_id, listing_hash},
    traits::OrderStore,
};

pub const BUYER_ID: &str = "QmBuyer";
pub const VENDOR_ID: &str = "QmVendor";

/// A physical good priced in BTC with no options.
pub fn listing(slug: &str) -> VendorListing {
    VendorListing {
        slug: slug.to_string(),
        vendor: PeerIdentity::new(VENDOR_ID, "vendor"),
        metadata: ListingMetadata { contract_type: ContractType::PhysicalGood, price_modifier: 0.0 },
        item: ListingItem {
            title: format!("Listing {slug}"),
            images: vec![Image { tiny: format!("zb{slug}tiny"), small: format!("zb{slug}small") }],
            price_currency: PriceCurrency { code: "BTC".into(), divisibility: 8 },
            options: vec![],
            skus: vec![],
        },
    }
}

/// A listing with a single "Size" option. SKU `i` is the `i`th size.
pub fn sized_listing(slug: &str, sizes: &[&str]) -> VendorListing {
    let mut result = listing(slug);
    let variants = sizes.iter().map(|s| s.to_string()).collect();
    result.item.options = vec![ListingOption { name: "Size".into(), variants }];
    result.item.skus = sizes
        .iter()
        .map(|s| Sku {
            selections: vec![SkuSelection { option: "Size".into(), variant: s.to_string() }],
            product_id: String::new(),
        })
        .collect();
    result
}

pub fn item_for(listing: &VendorListing, quantity: i64, options: &[(&str, &str)]) -> OrderItem {
    OrderItem {
        listing_hash: listing_hash(listing).expect("listing is serializable"),
        quantity,
        options: options.iter().map(|(n, v)| ItemOption::new(*n, *v)).collect(),
    }
}

/// A contract for one unit of [`listing`]`("widget")`, paid to `address`.
pub fn contract(method: PaymentMethod, amount: i64, address: &str) -> Contract {
    let listing = listing("widget");
    let item = item_for(&listing, 1, &[]);
    contract_for(method, amount, address, vec![listing], vec![item])
}

pub fn contract_for(
    method: PaymentMethod,
    amount: i64,
    address: &str,
    listings: Vec<VendorListing>,
    items: Vec<OrderItem>,
) -> Contract {
    let buyer_order = BuyerOrder {
        buyer: PeerIdentity::new(BUYER_ID, "buyer"),
        payment: OrderPayment {
            method,
            amount: Amount::from(amount),
            currency_code: "BTC".into(),
            address: address.to_string(),
        },
        items,
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    };
    Contract::new(buyer_order, listings)
}

/// Marks the contract as confirmed by the vendor. Address-request orders get their payment address this way.
pub fn confirm(mut contract: Contract, payment_address: Option<&str>) -> Contract {
    contract.vendor_order_confirmation = Some(VendorOrderConfirmation {
        payment_address: payment_address.map(String::from),
        timestamp: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
    });
    contract
}

/// Stores `contract` under its content-derived order id, watching the contract's payment address.
pub async fn insert_order<B: OrderStore>(db: &B, role: Role, contract: Contract, state: OrderState) -> OrderRecord {
    let order_id = calculate_order_id(&contract.buyer_order).expect("buyer order is serializable");
    let address = contract.payment_address().unwrap_or_default().to_string();
    db.insert_order(role, NewOrderRecord::new(order_id, address, contract, state))
        .await
        .expect("Error inserting order")
}
