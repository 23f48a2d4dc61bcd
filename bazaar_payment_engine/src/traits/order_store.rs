use crate::{
    contract::Contract,
    db_types::{FundingUpdate, NewOrderRecord, OrderId, OrderRecord, OrderState, Role, TransactionRecord},
    traits::StoreError,
};

/// The result of looking up a watched address across both views of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressMatch {
    Sale(OrderRecord),
    Purchase(OrderRecord),
    NotFound,
}

impl AddressMatch {
    pub fn role(&self) -> Option<Role> {
        match self {
            AddressMatch::Sale(_) => Some(Role::Sale),
            AddressMatch::Purchase(_) => Some(Role::Purchase),
            AddressMatch::NotFound => None,
        }
    }

    pub fn into_order(self) -> Option<(Role, OrderRecord)> {
        match self {
            AddressMatch::Sale(o) => Some((Role::Sale, o)),
            AddressMatch::Purchase(o) => Some((Role::Purchase, o)),
            AddressMatch::NotFound => None,
        }
    }
}

/// Sales and purchases are two views with an identical shape, so a single trait serves both, parameterised by
/// [`Role`].
///
/// Backends must guarantee that a payment address is unique within each view. Whether an address may appear in both
/// views is checked by [`OrderStore::resolve_payment_address`].
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Fetch the order whose watched payment address is `address`, if any.
    async fn fetch_order_by_payment_address(&self, role: Role, address: &str)
        -> Result<Option<OrderRecord>, StoreError>;

    async fn fetch_order_by_id(&self, role: Role, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError>;

    /// Stores a new order with an empty funding ledger. Fails if the order id already exists in this view.
    async fn insert_order(&self, role: Role, order: NewOrderRecord) -> Result<OrderRecord, StoreError>;

    /// Overwrites the `funded` flag and the entire funding ledger of an order.
    async fn update_funding(
        &self,
        role: Role,
        order_id: &OrderId,
        funded: bool,
        records: &[TransactionRecord],
    ) -> Result<(), StoreError>;

    /// Overwrites the contract and state of an order.
    async fn update_order(
        &self,
        role: Role,
        order_id: &OrderId,
        contract: &Contract,
        state: OrderState,
    ) -> Result<(), StoreError>;

    /// Writes everything in `update` and returns the order as stored afterwards.
    ///
    /// The default implementation is two separate writes. Backends that support transactions should override this
    /// so that a failure leaves the order untouched.
    async fn apply_funding_update(&self, role: Role, update: &FundingUpdate) -> Result<OrderRecord, StoreError> {
        if update.new_state.is_some() || update.contract.is_some() {
            let current = self
                .fetch_order_by_id(role, &update.order_id)
                .await?
                .ok_or_else(|| StoreError::OrderNotFound(role, update.order_id.clone()))?;
            let contract = update.contract.as_ref().unwrap_or(&current.contract);
            let state = update.new_state.unwrap_or(current.state);
            self.update_order(role, &update.order_id, contract, state).await?;
        }
        self.update_funding(role, &update.order_id, update.funded, &update.records).await?;
        self.fetch_order_by_id(role, &update.order_id)
            .await?
            .ok_or_else(|| StoreError::OrderNotFound(role, update.order_id.clone()))
    }

    /// Looks `address` up in both views with a single call.
    ///
    /// An address that belongs to both a sale and a purchase is reported as [`StoreError::AddressConflict`] rather
    /// than silently preferring one of them.
    async fn resolve_payment_address(&self, address: &str) -> Result<AddressMatch, StoreError> {
        let sale = self.fetch_order_by_payment_address(Role::Sale, address).await?;
        let purchase = self.fetch_order_by_payment_address(Role::Purchase, address).await?;
        match (sale, purchase) {
            (Some(_), Some(_)) => Err(StoreError::AddressConflict(address.to_string())),
            (Some(o), None) => Ok(AddressMatch::Sale(o)),
            (None, Some(o)) => Ok(AddressMatch::Purchase(o)),
            (None, None) => Ok(AddressMatch::NotFound),
        }
    }
}
