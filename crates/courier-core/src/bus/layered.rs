//! Event + command dispatcher layered on top of [`MessageBus`].

use std::sync::Arc;

use crate::config::BusConfig;
use crate::error::BusError;
use crate::registry::{MessageKey, Registration, Registry, Single};
use crate::status::BusSnapshot;
use crate::typed::{Command, CommandHandler, Event, EventHandler, HandlerAdapter, Message};

use super::{Bus, MessageBus, commands};

/// Events go through the inner `MessageBus` registry; commands get their own
/// registry with at most one handler per command type.
#[derive(Default)]
pub struct LayeredBus {
    base: MessageBus,
    commands: Registry<Single>,
    config: BusConfig,
}

impl LayeredBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            base: MessageBus::new(),
            commands: Registry::new(),
            config,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// The underlying generic dispatcher that holds the event subscriptions.
    pub fn as_message_bus(&self) -> &MessageBus {
        &self.base
    }

    pub fn handler_count<T: Message>(&self) -> Result<usize, BusError> {
        self.base.handler_count::<T>()
    }

    pub fn has_handler<T: Command>(&self) -> Result<bool, BusError> {
        self.commands.contains(MessageKey::of::<T>())
    }

    pub fn clear(&self) -> Result<(), BusError> {
        self.base.clear()?;
        self.commands.clear()
    }
}

impl Bus for LayeredBus {
    fn subscribe<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Event,
        H: EventHandler<T> + 'static,
    {
        self.base.attach(HandlerAdapter::<T, H>::for_event(handler))
    }

    fn unsubscribe<T, H>(&self, _handler: &Arc<H>) -> Result<bool, BusError>
    where
        T: Event,
        H: EventHandler<T> + 'static,
    {
        self.base.detach::<T, H>()
    }

    fn register<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Command,
        H: CommandHandler<T> + 'static,
    {
        commands::bind::<T, H>(&self.commands, &self.config, handler)
    }

    fn publish_dyn(&self, event: &dyn Event) -> Result<usize, BusError> {
        self.base.publish_dyn(event)
    }

    fn send_dyn(&self, command: &dyn Command) -> Result<bool, BusError> {
        commands::dispatch(&self.commands, &self.config, command)
    }

    fn snapshot(&self) -> Result<BusSnapshot, BusError> {
        Ok(BusSnapshot {
            subscriptions: self.base.snapshot()?.subscriptions,
            commands: self.commands.snapshot()?,
        })
    }
}
