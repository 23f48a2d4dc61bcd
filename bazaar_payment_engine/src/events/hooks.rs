use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{EventHandler, EventProducer, EventType, Handler, InventoryUpdatedEvent, NotificationEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub notification_producer: Vec<EventProducer<NotificationEvent>>,
    pub inventory_updated_producer: Vec<EventProducer<InventoryUpdatedEvent>>,
}

impl EventProducers {
    /// Fan an event out to every producer registered for its type.
    pub async fn publish(&self, event: EventType) {
        match event {
            EventType::Notification(ev) => {
                for producer in &self.notification_producer {
                    producer.publish_event(ev.clone()).await;
                }
            },
            EventType::InventoryUpdated(ev) => {
                for producer in &self.inventory_updated_producer {
                    producer.publish_event(ev.clone()).await;
                }
            },
        }
    }
}

pub struct EventHandlers {
    pub on_notification: Option<EventHandler<NotificationEvent>>,
    pub on_inventory_updated: Option<EventHandler<InventoryUpdatedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_notification = hooks.on_notification.map(|f| EventHandler::new(buffer_size, f));
        let on_inventory_updated = hooks.on_inventory_updated.map(|f| EventHandler::new(buffer_size, f));
        Self { on_notification, on_inventory_updated }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_notification {
            result.notification_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_inventory_updated {
            result.inventory_updated_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_notification {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_inventory_updated {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        debug!("📬️ Event handlers started");
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_notification: Option<Handler<NotificationEvent>>,
    pub on_inventory_updated: Option<Handler<InventoryUpdatedEvent>>,
}

impl EventHooks {
    pub fn on_notification<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(NotificationEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_notification = Some(Arc::new(f));
        self
    }

    pub fn on_inventory_updated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(InventoryUpdatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_inventory_updated = Some(Arc::new(f));
        self
    }
}
