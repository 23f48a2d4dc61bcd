use bazaar_payment_engine::db_types::{ledger_total, Amount, OrderId, OrderRecord, OrderState, Role, TransactionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The funding view of a single sale or purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerView {
    pub role: Role,
    pub order_id: OrderId,
    pub payment_address: String,
    pub state: OrderState,
    pub funded: bool,
    pub required: Amount,
    pub total: Amount,
    pub records: Vec<TransactionRecord>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerView {
    pub fn new(role: Role, order: OrderRecord) -> Self {
        Self {
            role,
            required: order.contract.buyer_order.payment.amount,
            total: ledger_total(&order.records),
            order_id: order.order_id,
            payment_address: order.payment_address,
            state: order.state,
            funded: order.funded,
            records: order.records,
            updated_at: order.updated_at,
        }
    }
}
