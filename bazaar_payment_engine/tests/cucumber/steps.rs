use bazaar_payment_engine::{
    db_types::{OrderState, Role},
    notifications::Notification,
    wallet_types::TransactionCallback,
    InventoryManagement,
    NotificationStore,
    UnitOutcome,
};
use cucumber::{then, when};

use crate::cucumber::MarketplaceWorld;

#[when(expr = "the wallet reports txid [{word}] paying {int} to '{word}'")]
async fn wallet_output(world: &mut MarketplaceWorld, txid: String, value: i64, address: String) {
    let cb = TransactionCallback::new(txid).with_output(address, value, 0);
    let report = world.api().on_transaction_received(&cb).await;
    assert_eq!(report.failures().count(), 0, "Reconciliation failed: {report:?}");
}

#[when(expr = "the wallet reports txid [{word}] spending [{word}:{int}] worth {int} from '{word}'")]
async fn wallet_input(
    world: &mut MarketplaceWorld,
    txid: String,
    outpoint: String,
    index: u32,
    value: i64,
    address: String,
) {
    let cb = TransactionCallback::new(txid).with_input(address, outpoint, index, value);
    let report = world.api().on_transaction_received(&cb).await;
    assert_eq!(report.failures().count(), 0, "Reconciliation failed: {report:?}");
}

#[when(expr = "the wallet reports txid [{word}] spending [{word}:{int}] and [{word}:{int}] worth {int} each from '{word}'")]
async fn wallet_payout(
    world: &mut MarketplaceWorld,
    txid: String,
    first: String,
    first_index: u32,
    second: String,
    second_index: u32,
    value: i64,
    address: String,
) {
    let cb = TransactionCallback::new(txid)
        .with_input(address.as_str(), first, first_index, value)
        .with_input(address.as_str(), second, second_index, value);
    let report = world.api().on_transaction_received(&cb).await;
    assert_eq!(report.failures().count(), 0, "Reconciliation failed: {report:?}");
}

#[then(expr = "the {word} at '{word}' is funded")]
async fn is_funded(world: &mut MarketplaceWorld, role: String, address: String) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    assert!(order.funded, "Order {} is not funded", order.order_id);
}

#[then(expr = "the {word} at '{word}' is not funded")]
async fn is_not_funded(world: &mut MarketplaceWorld, role: String, address: String) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    assert!(!order.funded, "Order {} is funded", order.order_id);
}

#[then(expr = "the {word} at '{word}' is in state {word}")]
async fn check_state(world: &mut MarketplaceWorld, role: String, address: String, state: String) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    let state = state.parse::<OrderState>().expect("Invalid order state");
    assert_eq!(order.state, state);
}

#[then(expr = "the {word} at '{word}' has {int} ledger record(s)")]
async fn check_records(world: &mut MarketplaceWorld, role: String, address: String, count: usize) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    assert_eq!(order.records.len(), count);
}

#[then(expr = "the {word} at '{word}' has {int} {word} notification(s)")]
async fn check_notifications(world: &mut MarketplaceWorld, role: String, address: String, count: usize, kind: String) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    let notifications =
        world.api().db().fetch_notifications(&order.order_id).await.expect("Error fetching notifications");
    let matching = notifications.iter().filter(|n| n.notification_type() == kind).count();
    assert_eq!(matching, count, "Notifications: {notifications:?}");
}

#[then(expr = "the last payment notification for the {word} at '{word}' shows a total of {int}")]
async fn check_payment_total(world: &mut MarketplaceWorld, role: String, address: String, total: i64) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    let notifications =
        world.api().db().fetch_notifications(&order.order_id).await.expect("Error fetching notifications");
    let last = notifications
        .into_iter()
        .filter_map(|n| match n {
            Notification::Payment(p) => Some(p),
            _ => None,
        })
        .last()
        .expect("No payment notifications");
    assert_eq!(last.funding_total.amount.value(), total);
}

#[then(expr = "the {word} at '{word}' has a dispute acceptance closed by '{word}'")]
async fn check_acceptance(world: &mut MarketplaceWorld, role: String, address: String, peer: String) {
    let order = world.order(role.parse::<Role>().expect("Invalid role"), &address).await;
    let acceptance = order.contract.dispute_acceptance.expect("No dispute acceptance");
    assert_eq!(acceptance.closed_by, peer);
}

#[then(expr = "inventory for '{word}' variant {int} is {int}")]
async fn check_inventory(world: &mut MarketplaceWorld, slug: String, variant: i64, count: i64) {
    let stored = world.api().db().fetch_inventory(&slug, variant).await.expect("Error fetching inventory");
    assert_eq!(stored, Some(count));
}

#[then(expr = "txid [{word}] sent to '{word}' was already processed")]
async fn check_redelivery(world: &mut MarketplaceWorld, txid: String, address: String) {
    let cb = TransactionCallback::new(txid).with_output(address, 1, 0);
    let report = world.api().on_transaction_received(&cb).await;
    assert!(matches!(report.units[0].outcome, UnitOutcome::AlreadyProcessed { .. }), "{report:?}");
}
