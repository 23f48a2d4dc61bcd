use bazaar_payment_engine::{
    contract::PaymentMethod,
    db_types::{OrderState, Role},
    test_utils::fixtures::{confirm, contract, insert_order},
    InventoryManagement,
    OrderStore,
};
use cucumber::given;

use crate::cucumber::{marketplace_world::ReconcilerSystem, MarketplaceWorld};

fn payment_method(s: &str) -> PaymentMethod {
    match s {
        "DIRECT" => PaymentMethod::Direct,
        "MODERATED" => PaymentMethod::Moderated,
        "ADDRESS_REQUEST" => PaymentMethod::AddressRequest,
        s => panic!("Unknown payment method {s}"),
    }
}

#[given("a fresh install")]
async fn fresh_database(world: &mut MarketplaceWorld) {
    let system = ReconcilerSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a {word} requiring {int} with {word} payment to '{word}'")]
async fn new_order(world: &mut MarketplaceWorld, role: String, amount: i64, method: String, address: String) {
    let role = role.parse::<Role>().expect("Invalid role");
    let c = contract(payment_method(&method), amount, &address);
    insert_order(world.api().db(), role, c, OrderState::AwaitingPayment).await;
}

#[given(expr = "a confirmed {word} requiring {int} with {word} payment to '{word}'")]
async fn new_confirmed_order(world: &mut MarketplaceWorld, role: String, amount: i64, method: String, address: String) {
    let role = role.parse::<Role>().expect("Invalid role");
    let method = payment_method(&method);
    let c = match method {
        PaymentMethod::AddressRequest => confirm(contract(method, amount, ""), Some(&address)),
        _ => confirm(contract(method, amount, &address), None),
    };
    insert_order(world.api().db(), role, c, OrderState::AwaitingPayment).await;
}

#[given(expr = "the {word} at '{word}' moves to state {word}")]
async fn set_state(world: &mut MarketplaceWorld, role: String, address: String, state: String) {
    let role = role.parse::<Role>().expect("Invalid role");
    let state = state.parse::<OrderState>().expect("Invalid order state");
    let order = world.order(role, &address).await;
    world.api().db().update_order(role, &order.order_id, &order.contract, state).await.expect("Error updating order");
}

#[given(expr = "inventory for '{word}' variant {int} is {int}")]
async fn set_inventory(world: &mut MarketplaceWorld, slug: String, variant: i64, count: i64) {
    world.api().db().update_inventory(&slug, variant, count).await.expect("Error setting inventory");
}
