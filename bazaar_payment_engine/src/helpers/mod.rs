mod order_hash;

pub use order_hash::{calculate_order_id, listing_hash, new_notification_id, OrderIdError};
