//! The marketplace contract, as far as the payment engine needs to see it.
//!
//! A contract bundles the buyer's order proposal, the vendor listings being purchased, and whatever the parties have
//! added since (order confirmation, dispute acceptance). Both the sale and the purchase views of an order hold the
//! same contract.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub buyer_order: BuyerOrder,
    #[serde(default)]
    pub vendor_listings: Vec<VendorListing>,
    #[serde(default)]
    pub vendor_order_confirmation: Option<VendorOrderConfirmation>,
    #[serde(default)]
    pub dispute_acceptance: Option<DisputeAcceptance>,
}

impl Contract {
    pub fn new(buyer_order: BuyerOrder, vendor_listings: Vec<VendorListing>) -> Self {
        Self { buyer_order, vendor_listings, vendor_order_confirmation: None, dispute_acceptance: None }
    }

    /// The address the wallet watches for this order. Address-request orders are paid to an address the vendor
    /// supplies in the order confirmation.
    pub fn payment_address(&self) -> Option<&str> {
        match self.buyer_order.payment.method {
            PaymentMethod::Direct | PaymentMethod::Moderated => Some(self.buyer_order.payment.address.as_str()),
            PaymentMethod::AddressRequest => {
                self.vendor_order_confirmation.as_ref().and_then(|c| c.payment_address.as_deref())
            },
        }
    }

    pub fn is_vendor_confirmed(&self) -> bool {
        self.vendor_order_confirmation.is_some()
    }

    pub fn first_listing(&self) -> Option<&VendorListing> {
        self.vendor_listings.first()
    }

    /// Thumbnail of the first image of the first listing, if there is one.
    pub fn thumbnail(&self) -> Thumbnail {
        self.first_listing().and_then(|l| l.item.images.first()).map(Thumbnail::from).unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.first_listing().map(|l| l.item.title.as_str()).unwrap_or_default()
    }

    /// The vendor's identity, taken from the first listing.
    pub fn vendor(&self) -> Option<&PeerIdentity> {
        self.first_listing().map(|l| &l.vendor)
    }
}

//--------------------------------------       BuyerOrder      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerOrder {
    pub buyer: PeerIdentity,
    pub payment: OrderPayment,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentity {
    pub peer_id: String,
    #[serde(default)]
    pub handle: String,
}

impl PeerIdentity {
    pub fn new(peer_id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self { peer_id: peer_id.into(), handle: handle.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Paid straight to the vendor
    Direct,
    /// Paid into a multisig escrow that a moderator can release
    Moderated,
    /// Paid to an address the vendor supplies after confirming the order
    AddressRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayment {
    pub method: PaymentMethod,
    /// The amount the buyer must pay, in the smallest unit of `currency_code`
    pub amount: Amount,
    pub currency_code: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Content hash of the listing this item was bought from. See [`crate::helpers::listing_hash`].
    pub listing_hash: String,
    pub quantity: i64,
    #[serde(default)]
    pub options: Vec<ItemOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOption {
    pub name: String,
    pub value: String,
}

impl ItemOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

//--------------------------------------     VendorListing     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorListing {
    pub slug: String,
    pub vendor: PeerIdentity,
    pub metadata: ListingMetadata,
    pub item: ListingItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    PhysicalGood,
    DigitalGood,
    Service,
    Cryptocurrency,
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContractType::PhysicalGood => "PHYSICAL_GOOD",
            ContractType::DigitalGood => "DIGITAL_GOOD",
            ContractType::Service => "SERVICE",
            ContractType::Cryptocurrency => "CRYPTOCURRENCY",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingMetadata {
    pub contract_type: ContractType,
    #[serde(default)]
    pub price_modifier: f32,
}

// f32 price modifiers are never NaN in practice; listings are compared structurally.
impl Eq for ListingMetadata {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub title: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub price_currency: PriceCurrency,
    #[serde(default)]
    pub options: Vec<ListingOption>,
    #[serde(default)]
    pub skus: Vec<Sku>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCurrency {
    pub code: String,
    /// Number of decimal places. Zero means "use the currency dictionary".
    #[serde(default)]
    pub divisibility: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub tiny: String,
    pub small: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingOption {
    pub name: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// One entry per listing option, naming the variant this SKU represents
    pub selections: Vec<SkuSelection>,
    #[serde(default)]
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuSelection {
    pub option: String,
    pub variant: String,
}

//--------------------------------------   Confirmation etc.   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorOrderConfirmation {
    #[serde(default)]
    pub payment_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Set exactly once, when a decided dispute has been paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeAcceptance {
    /// Peer id of the party on the other side of the order from the one finalizing the payout
    pub closed_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub tiny: String,
    pub small: String,
}

impl From<&Image> for Thumbnail {
    fn from(image: &Image) -> Self {
        Self { tiny: image.tiny.clone(), small: image.small.clone() }
    }
}
