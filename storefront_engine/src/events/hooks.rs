use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderPaymentChangedEvent,
    SkuCreatedEvent,
    SkuUpdatedEvent,
};

type EventFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// The producer side of every registered hook. APIs hold a copy and publish into it.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub sku_created_producer: Vec<EventProducer<SkuCreatedEvent>>,
    pub sku_updated_producer: Vec<EventProducer<SkuUpdatedEvent>>,
    pub payment_changed_producer: Vec<EventProducer<OrderPaymentChangedEvent>>,
}

impl EventProducers {
    pub async fn publish_sku_created(&self, event: SkuCreatedEvent) {
        for emitter in &self.sku_created_producer {
            trace!("📬️ Notifying SKU created hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_sku_updated(&self, event: SkuUpdatedEvent) {
        for emitter in &self.sku_updated_producer {
            trace!("📬️ Notifying SKU updated hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_payment_changed(&self, event: OrderPaymentChangedEvent) {
        for emitter in &self.payment_changed_producer {
            trace!("📬️ Notifying payment changed hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_sku_created: Option<EventHandler<SkuCreatedEvent>>,
    pub on_sku_updated: Option<EventHandler<SkuUpdatedEvent>>,
    pub on_payment_changed: Option<EventHandler<OrderPaymentChangedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_sku_created = hooks.on_sku_created.map(|f| EventHandler::new(buffer_size, f));
        let on_sku_updated = hooks.on_sku_updated.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_changed = hooks.on_payment_changed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_sku_created, on_sku_updated, on_payment_changed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_sku_created {
            result.sku_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_sku_updated {
            result.sku_updated_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_changed {
            result.payment_changed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task for each registered handler and returns immediately.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_sku_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_sku_updated {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_payment_changed {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_sku_created: Option<Handler<SkuCreatedEvent>>,
    pub on_sku_updated: Option<Handler<SkuUpdatedEvent>>,
    pub on_payment_changed: Option<Handler<OrderPaymentChangedEvent>>,
}

impl EventHooks {
    pub fn on_sku_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SkuCreatedEvent) -> EventFuture) + Send + Sync + 'static {
        self.on_sku_created = Some(Arc::new(f));
        self
    }

    pub fn on_sku_updated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SkuUpdatedEvent) -> EventFuture) + Send + Sync + 'static {
        self.on_sku_updated = Some(Arc::new(f));
        self
    }

    pub fn on_payment_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPaymentChangedEvent) -> EventFuture) + Send + Sync + 'static {
        self.on_payment_changed = Some(Arc::new(f));
        self
    }
}
