//! Self-contained event + command dispatcher.

use std::sync::Arc;

use crate::config::BusConfig;
use crate::error::BusError;
use crate::registry::{Fanout, HandlerKey, MessageKey, Registration, Registry, Single};
use crate::status::BusSnapshot;
use crate::typed::{Command, CommandHandler, Event, EventHandler, HandlerAdapter};

use super::{Bus, commands};

/// Owns its event and command registries directly and never touches the
/// generic message layer.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use courier_core::{Bus, CombinedBus, Event, EventHandler, Message};
///
/// struct OrderPlaced {
///     id: u32,
/// }
/// impl Message for OrderPlaced {}
/// impl Event for OrderPlaced {}
///
/// #[derive(Default)]
/// struct LastOrder(Mutex<Option<u32>>);
/// impl EventHandler<OrderPlaced> for LastOrder {
///     fn handle(&self, event: &OrderPlaced) {
///         *self.0.lock().unwrap() = Some(event.id);
///     }
/// }
///
/// let bus = CombinedBus::new();
/// let handler = Arc::new(LastOrder::default());
/// bus.subscribe::<OrderPlaced, _>(Arc::clone(&handler)).unwrap();
/// bus.publish(&OrderPlaced { id: 7 }).unwrap();
/// assert_eq!(*handler.0.lock().unwrap(), Some(7));
/// ```
#[derive(Default)]
pub struct CombinedBus {
    events: Registry<Fanout>,
    commands: Registry<Single>,
    config: BusConfig,
}

impl CombinedBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            events: Registry::new(),
            commands: Registry::new(),
            config,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn handler_count<T: Event>(&self) -> Result<usize, BusError> {
        self.events.len(MessageKey::of::<T>())
    }

    pub fn has_handler<T: Command>(&self) -> Result<bool, BusError> {
        self.commands.contains(MessageKey::of::<T>())
    }

    pub fn clear(&self) -> Result<(), BusError> {
        self.events.clear()?;
        self.commands.clear()
    }
}

impl Bus for CombinedBus {
    fn subscribe<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Event,
        H: EventHandler<T> + 'static,
    {
        self.events
            .insert(Arc::new(HandlerAdapter::<T, H>::for_event(handler)))
    }

    fn unsubscribe<T, H>(&self, _handler: &Arc<H>) -> Result<bool, BusError>
    where
        T: Event,
        H: EventHandler<T> + 'static,
    {
        self.events
            .remove(MessageKey::of::<T>(), HandlerKey::of::<H>())
    }

    fn register<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Command,
        H: CommandHandler<T> + 'static,
    {
        commands::bind::<T, H>(&self.commands, &self.config, handler)
    }

    fn publish_dyn(&self, event: &dyn Event) -> Result<usize, BusError> {
        self.events
            .dispatch(MessageKey::of_value(event), event.as_any())
    }

    fn send_dyn(&self, command: &dyn Command) -> Result<bool, BusError> {
        commands::dispatch(&self.commands, &self.config, command)
    }

    fn snapshot(&self) -> Result<BusSnapshot, BusError> {
        Ok(BusSnapshot {
            subscriptions: self.events.snapshot()?,
            commands: self.commands.snapshot()?,
        })
    }
}
