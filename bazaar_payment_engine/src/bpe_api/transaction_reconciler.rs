//! `TransactionReconciler` is the entry point for wallet transaction callbacks.
//!
//! Each output of a callback is money arriving at a watched address; each input is money leaving one. The reconciler
//! finds the sale or purchase that owns the address, folds the event into that order's funding ledger, and advances
//! the order when the ledger says so:
//!
//! * an order whose received total reaches the required amount becomes funded, and moves from `AWAITING_PAYMENT` to
//!   `AWAITING_FULFILLMENT` (vendor already confirmed) or `PENDING`;
//! * a `DECIDED` order whose received outputs have all been spent has been paid out, and moves to `RESOLVED`.
//!
//! Ledger writes always happen before anything is announced. If a write fails, nothing is emitted and the unit is
//! reported as failed, so a redelivery of the same callback is processed from scratch. Once a write has committed the
//! unit is `Recorded`, whatever happens to the notifications and bookkeeping that follow it.
use std::{fmt::Debug, future::Future, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    bpe_api::{
        config::ReconcilerConfig,
        errors::ReconcilerError,
        inventory_adjuster::InventoryAdjuster,
        lock_shards::ShardedLocks,
        reconciliation_objects::{ReconciliationReport, UnitOutcome, UnitRef},
    },
    contract::{Contract, ContractType, DisputeAcceptance, PaymentMethod, PeerIdentity},
    currency::{CurrencyDefinition, CurrencyDictionary, CurrencyValue},
    db_types::{
        all_funds_released,
        ledger_total,
        Amount,
        FundingUpdate,
        OrderId,
        OrderRecord,
        OrderState,
        Role,
        TransactionRecord,
        TxMetadata,
    },
    events::{EventProducers, EventType, InventoryUpdatedEvent, NotificationEvent},
    helpers::calculate_order_id,
    notifications::{DisputeAcceptedNotification, Notification, OrderNotification, PaymentNotification},
    traits::{AddressMatch, InventoryManagement, MarketplaceDatabase, StoreError},
    wallet_types::{TransactionCallback, TransactionInput, TransactionOutput},
};

pub struct TransactionReconciler<B> {
    db: B,
    producers: EventProducers,
    locks: ShardedLocks,
    unit_timeout: Duration,
    currencies: CurrencyDictionary,
    inventory: InventoryAdjuster<B>,
}

/// Work left over after a unit's ledger write has committed.
enum FollowUp {
    SalePayment {
        order_id: OrderId,
        txid: String,
        output: TransactionOutput,
        contract: Contract,
        /// The price to announce, when this payment funded the sale
        funded_price: Option<Amount>,
    },
    Notify(Notification),
}

struct Processed {
    outcome: UnitOutcome,
    follow_up: Option<FollowUp>,
}

impl Processed {
    fn then(outcome: UnitOutcome, follow_up: FollowUp) -> Self {
        Self { outcome, follow_up: Some(follow_up) }
    }
}

impl From<UnitOutcome> for Processed {
    fn from(outcome: UnitOutcome) -> Self {
        Self { outcome, follow_up: None }
    }
}

impl<B> Debug for TransactionReconciler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionReconciler ({} lock stripes, {:?} unit timeout)", self.locks.len(), self.unit_timeout)
    }
}

impl<B: Clone + InventoryManagement> TransactionReconciler<B> {
    pub fn new(db: B, producers: EventProducers, config: ReconcilerConfig) -> Self {
        let inventory = InventoryAdjuster::new(db.clone());
        Self {
            db,
            producers,
            locks: ShardedLocks::new(config.lock_shards),
            unit_timeout: config.unit_timeout,
            currencies: CurrencyDictionary::default(),
            inventory,
        }
    }

    pub fn with_currencies(mut self, currencies: CurrencyDictionary) -> Self {
        self.currencies = currencies;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> TransactionReconciler<B>
where B: MarketplaceDatabase
{
    /// Reconciles every output and input of `callback` against the order store.
    ///
    /// This never fails as a whole. Each unit's outcome is listed in the returned report, and a unit that failed
    /// for a transient reason is flagged as retryable so the wallet can deliver the callback again.
    pub async fn on_transaction_received(&self, callback: &TransactionCallback) -> ReconciliationReport {
        info!(
            "🧾️ Transaction {} received with {} outputs and {} inputs",
            callback.txid,
            callback.outputs.len(),
            callback.inputs.len()
        );
        let _guard = self.locks.lock_all(callback.addresses()).await;
        let mut report = ReconciliationReport::new(&callback.txid);
        for output in &callback.outputs {
            let processed = self.bounded(self.process_output(&callback.txid, output)).await;
            trace!("🧾️ Output {}:{} -> {:?}", callback.txid, output.index, processed.outcome);
            report.push(UnitRef::from(output), processed.outcome);
            if let Some(follow_up) = processed.follow_up {
                self.follow_up(follow_up).await;
            }
        }
        for input in &callback.inputs {
            let processed = self.bounded(self.process_input(&callback.txid, input)).await;
            trace!("🧾️ Input {}:{} -> {:?}", input.outpoint_hash, input.outpoint_index, processed.outcome);
            report.push(UnitRef::from(input), processed.outcome);
            if let Some(follow_up) = processed.follow_up {
                self.follow_up(follow_up).await;
            }
        }
        if report.should_redeliver() {
            warn!("🧾️ Transaction {} was only partially reconciled. It should be delivered again.", callback.txid);
        }
        report
    }

    /// Bounds the lookup and ledger write of one unit. Follow-up work is not covered.
    async fn bounded<F>(&self, unit: F) -> Processed
    where F: Future<Output = Result<Processed, ReconcilerError>> {
        let result = match tokio::time::timeout(self.unit_timeout, unit).await {
            Ok(result) => result,
            Err(_) => Err(ReconcilerError::Timeout(self.unit_timeout)),
        };
        result.unwrap_or_else(|e| {
            error!("🧾️ {e}");
            UnitOutcome::failed(&e).into()
        })
    }

    /// A sale in `PROCESSING_ERROR` is invisible to payments. Its address then belongs to the purchase that shares
    /// it, if any, and the pair is not treated as a conflict.
    async fn resolve_output_address(&self, address: &str) -> Result<Option<(Role, OrderRecord)>, ReconcilerError> {
        match self.db.resolve_payment_address(address).await {
            Ok(AddressMatch::Sale(order)) if order.state == OrderState::ProcessingError => {
                debug!("🧾️ Sale {} is in PROCESSING_ERROR. Ignoring payment to {address}", order.order_id);
                Ok(None)
            },
            Ok(m) => Ok(m.into_order()),
            Err(StoreError::AddressConflict(a)) => {
                let sale = self.db.fetch_order_by_payment_address(Role::Sale, address).await?;
                if sale.is_some_and(|o| o.state == OrderState::ProcessingError) {
                    debug!("🧾️ Sale at {address} is in PROCESSING_ERROR. Crediting the purchase instead");
                    let purchase = self.db.fetch_order_by_payment_address(Role::Purchase, address).await?;
                    return Ok(purchase.map(|o| (Role::Purchase, o)));
                }
                Err(StoreError::AddressConflict(a).into())
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn process_output(&self, txid: &str, output: &TransactionOutput) -> Result<Processed, ReconcilerError> {
        let Some((role, order)) = self.resolve_output_address(&output.address).await? else {
            return Ok(UnitOutcome::NotMine.into());
        };
        if order.records.iter().any(|r| r.txid == txid) {
            debug!("🧾️ {role} {} has already seen transaction {txid}", order.order_id);
            return Ok(UnitOutcome::AlreadyProcessed { role, order_id: order.order_id }.into());
        }
        let order_id = match calculate_order_id(&order.contract.buyer_order) {
            Ok(id) => id,
            Err(e) => {
                warn!("🧾️ Skipping output {txid}:{} for {role} {}. {e}", output.index, order.order_id);
                return Ok(UnitOutcome::Skipped { reason: e.to_string() }.into());
            },
        };
        let funding = output.value + ledger_total(&order.records);
        let required = order.contract.buyer_order.payment.amount;
        let newly_funded = !order.funded && funding >= required;
        let new_state =
            if newly_funded { order.state.funding_transition(order.contract.is_vendor_confirmed()) } else { None };
        let mut records = order.records.clone();
        records.push(TransactionRecord::new(txid, output.index, output.value, output.address.as_str()));
        let update = FundingUpdate::new(order_id.clone(), order.funded || newly_funded, records).with_state(new_state);
        let updated = self.db.apply_funding_update(role, &update).await?;
        debug!("🧾️ {role} {order_id} received {} ({funding} of {required})", output.value);
        if newly_funded {
            info!("🧾️ {role} {order_id} is fully funded. State: {} -> {}", order.state, updated.state);
        }
        let outcome = UnitOutcome::Recorded {
            role,
            order_id: order_id.clone(),
            funded: updated.funded,
            state: updated.state,
            newly_funded,
            resolved: false,
        };
        let follow_up = match role {
            Role::Sale => FollowUp::SalePayment {
                order_id,
                txid: txid.to_string(),
                output: output.clone(),
                contract: updated.contract,
                funded_price: newly_funded.then_some(required),
            },
            Role::Purchase => {
                let total = CurrencyValue::new(funding, self.payment_currency(&updated.contract));
                FollowUp::Notify(PaymentNotification::new(order_id, txid, total).into())
            },
        };
        Ok(Processed::then(outcome, follow_up))
    }

    async fn process_input(&self, txid: &str, input: &TransactionInput) -> Result<Processed, ReconcilerError> {
        let Some((role, order)) = self.db.resolve_payment_address(&input.linked_address).await?.into_order() else {
            return Ok(UnitOutcome::NotMine.into());
        };
        if role == Role::Sale && order.contract.buyer_order.payment.method == PaymentMethod::AddressRequest {
            trace!("🧾️ Ignoring spend from address-request sale {}", order.order_id);
            let reason = "Spends from address-request sales are not tracked".to_string();
            return Ok(UnitOutcome::Skipped { reason }.into());
        }
        let order_id = match calculate_order_id(&order.contract.buyer_order) {
            Ok(id) => id,
            Err(e) => {
                warn!("🧾️ Skipping spend {txid} for {role} {}. {e}", order.order_id);
                return Ok(UnitOutcome::Skipped { reason: e.to_string() }.into());
            },
        };
        if order.records.iter().any(|r| r.is_spend_of(txid, &input.outpoint_hash, input.outpoint_index)) {
            let outpoint = format!("{}:{}", input.outpoint_hash, input.outpoint_index);
            debug!("🧾️ {role} {order_id} has already recorded the spend of {outpoint}");
            return Ok(UnitOutcome::AlreadyProcessed { role, order_id }.into());
        }

        let mut records = order.records.clone();
        records
            .iter_mut()
            .filter(|r| r.is_outpoint(&input.outpoint_hash, input.outpoint_index))
            .for_each(|r| r.spent = true);
        let funds_released = all_funds_released(&records);
        records.push(TransactionRecord::spend(
            txid,
            input.outpoint_hash.as_str(),
            input.outpoint_index,
            input.value,
            input.linked_address.as_str(),
        ));
        let mut update = FundingUpdate::new(order_id.clone(), order.funded, records);

        let mut acceptance = None;
        let payout_complete = order.state == OrderState::Decided && funds_released;
        if payout_complete {
            update = update.with_state(order.state.payout_transition());
            match (&order.contract.dispute_acceptance, counterparty(role, &order.contract)) {
                (Some(existing), _) => {
                    debug!("🧾️ Dispute on {role} {order_id} was already accepted by {}", existing.closed_by);
                },
                (None, None) => {
                    warn!("🧾️ {role} {order_id} names no counterparty. Resolving without a dispute acceptance.");
                },
                (None, Some(counterparty)) => {
                    let mut contract = order.contract.clone();
                    contract.dispute_acceptance =
                        Some(DisputeAcceptance { closed_by: counterparty.peer_id.clone(), timestamp: Utc::now() });
                    update = update.with_contract(contract);
                    acceptance = Some(DisputeAcceptedNotification::new(
                        order_id.clone(),
                        order.contract.thumbnail(),
                        counterparty,
                        &order.contract.buyer_order.buyer.peer_id,
                    ));
                },
            }
        }
        let updated = self.db.apply_funding_update(role, &update).await?;
        debug!("🧾️ {role} {order_id} spent {} from {}", input.value, input.linked_address);
        if payout_complete {
            info!("🧾️ Dispute payout for {role} {order_id} is complete. State: {} -> {}", order.state, updated.state);
        }
        let outcome = UnitOutcome::Recorded {
            role,
            order_id,
            funded: updated.funded,
            state: updated.state,
            newly_funded: false,
            resolved: payout_complete,
        };
        Ok(match acceptance {
            Some(notification) => Processed::then(outcome, FollowUp::Notify(notification.into())),
            None => outcome.into(),
        })
    }

    async fn follow_up(&self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::SalePayment { order_id, txid, output, contract, funded_price } => {
                if let Some(required) = funded_price {
                    self.adjust_inventory(&order_id, &contract).await;
                    let price = CurrencyValue::new(required, self.listing_currency(&contract));
                    self.broadcast(OrderNotification::new(order_id.clone(), txid.as_str(), &contract, price).into())
                        .await;
                }
                self.save_tx_metadata(&txid, &output, &order_id, &contract).await;
            },
            FollowUp::Notify(notification) => self.broadcast(notification).await,
        }
    }

    async fn adjust_inventory(&self, order_id: &OrderId, contract: &Contract) {
        let adjustment = self.inventory.adjust_for_order(order_id, contract).await;
        for warning in adjustment.warnings {
            self.broadcast(warning.into()).await;
        }
        if !adjustment.changes.is_empty() {
            let event = InventoryUpdatedEvent::new(order_id.clone(), adjustment.changes);
            self.publish(EventType::InventoryUpdated(event)).await;
        }
    }

    async fn save_tx_metadata(&self, txid: &str, output: &TransactionOutput, order_id: &OrderId, contract: &Contract) {
        let metadata = TxMetadata {
            txid: txid.to_string(),
            address: output.address.clone(),
            memo: contract.title().to_string(),
            order_id: order_id.to_string(),
            thumbnail: contract.thumbnail().tiny,
            can_bump_fee: contract.buyer_order.payment.method != PaymentMethod::Moderated,
        };
        if let Err(e) = self.db.save_tx_metadata(&metadata).await {
            error!("🧾️ Failed updating tx metadata ({txid}). {e}");
        }
    }

    /// Keeps a copy of the notification in the store, then publishes it to the notification hooks.
    async fn broadcast(&self, notification: Notification) {
        let kind = notification.notification_type();
        trace!("🧾️ Broadcasting {kind} notification for {}", notification.order_id());
        if let Err(e) = self.db.save_notification(&notification).await {
            error!("🧾️ Could not persist {kind} notification {}. {e}", notification.notification_id());
        }
        self.publish(EventType::Notification(NotificationEvent::new(notification))).await;
    }

    /// A hook that stops draining its channel cannot hold up reconciliation. Events it has not accepted within the
    /// unit timeout are dropped.
    async fn publish(&self, event: EventType) {
        if tokio::time::timeout(self.unit_timeout, self.producers.publish(event)).await.is_err() {
            error!("🧾️ Event hooks did not accept an event within {:?}. It has been dropped.", self.unit_timeout);
        }
    }

    fn payment_currency(&self, contract: &Contract) -> CurrencyDefinition {
        let code = &contract.buyer_order.payment.currency_code;
        self.currencies.lookup(code).unwrap_or_else(|e| {
            warn!("🧾️ {e}. Annotating notification as unknown currency.");
            CurrencyDefinition::unknown(code)
        })
    }

    /// Listings priced in something other than a cryptocurrency may carry their own divisibility.
    fn listing_currency(&self, contract: &Contract) -> CurrencyDefinition {
        let mut currency = self.payment_currency(contract);
        if let Some(listing) = contract.first_listing() {
            let custom = listing.item.price_currency.divisibility;
            if listing.metadata.contract_type != ContractType::Cryptocurrency && custom != 0 {
                currency.divisibility = custom;
            }
        }
        currency
    }
}

/// The party credited with closing a dispute: the buyer when we are the vendor, the vendor when we are the buyer.
fn counterparty(role: Role, contract: &Contract) -> Option<&PeerIdentity> {
    let peer = match role {
        Role::Sale => Some(&contract.buyer_order.buyer),
        Role::Purchase => contract.vendor(),
    };
    peer.filter(|p| !p.peer_id.is_empty())
}

