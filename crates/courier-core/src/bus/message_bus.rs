//! Generic dispatcher: messages only, 0..N handlers per message type.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::BusError;
use crate::registry::{Fanout, HandlerKey, MessageKey, Registration, Registry};
use crate::status::BusSnapshot;
use crate::typed::{HandlerAdapter, Message, MessageHandler};

static GLOBAL: OnceLock<MessageBus> = OnceLock::new();

/// Low-level bus that only knows about [`Message`].
///
/// Routing uses the message's concrete runtime type. A handler type is
/// subscribed at most once per message type, no matter how many instances
/// are passed in.
#[derive(Default)]
pub struct MessageBus {
    messages: Registry<Fanout>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            messages: Registry::new(),
        }
    }

    /// Process-wide default instance, built once on first use.
    ///
    /// Prefer passing a bus around explicitly; this exists for call sites
    /// that cannot hold a reference. Use [`clear`](Self::clear) to reset it
    /// between tests.
    pub fn global() -> &'static MessageBus {
        GLOBAL.get_or_init(|| {
            debug!("global message bus initialised");
            MessageBus::new()
        })
    }

    pub fn subscribe<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Message,
        H: MessageHandler<T> + 'static,
    {
        self.attach(HandlerAdapter::<T, H>::for_message(handler))
    }

    /// Remove the subscription of `H` for `T`. Only the handler's type matters.
    pub fn unsubscribe<T, H>(&self, _handler: &Arc<H>) -> Result<bool, BusError>
    where
        T: Message,
        H: MessageHandler<T> + 'static,
    {
        self.detach::<T, H>()
    }

    pub fn publish<T: Message>(&self, message: &T) -> Result<usize, BusError> {
        self.publish_dyn(message)
    }

    /// Publish a type-erased message; it is routed by its runtime type.
    pub fn publish_dyn(&self, message: &dyn Message) -> Result<usize, BusError> {
        self.messages
            .dispatch(MessageKey::of_value(message), message.as_any())
    }

    pub fn handler_count<T: Message>(&self) -> Result<usize, BusError> {
        self.messages.len(MessageKey::of::<T>())
    }

    pub fn clear(&self) -> Result<(), BusError> {
        self.messages.clear()
    }

    pub fn snapshot(&self) -> Result<BusSnapshot, BusError> {
        Ok(BusSnapshot {
            subscriptions: self.messages.snapshot()?,
            commands: Vec::new(),
        })
    }

    pub(crate) fn attach<T, H>(
        &self,
        adapter: HandlerAdapter<T, H>,
    ) -> Result<Registration, BusError>
    where
        T: Message,
        H: Send + Sync + 'static,
    {
        self.messages.insert(Arc::new(adapter))
    }

    pub(crate) fn detach<T: Message, H: 'static>(&self) -> Result<bool, BusError> {
        self.messages
            .remove(MessageKey::of::<T>(), HandlerKey::of::<H>())
    }
}
