//! Dispatchers.
//!
//! - [`MessageBus`]: generic messages only (0..N handlers per type).
//! - [`LayeredBus`]: a `MessageBus` for events plus a command registry.
//! - [`CombinedBus`]: self-contained event and command registries. Start here
//!   for new integrations.
//!
//! Publish an event: 0..N subscribers, subscribe / unsubscribe at any time.
//! Send a command: exactly one handler per command type.
//!
//! Every operation runs synchronously on the calling thread.

mod combined;
mod commands;
mod layered;
mod message_bus;

use std::sync::Arc;

use crate::error::BusError;
use crate::registry::Registration;
use crate::status::BusSnapshot;
use crate::typed::{Command, CommandHandler, Event, EventHandler};

pub use self::combined::CombinedBus;
pub use self::layered::LayeredBus;
pub use self::message_bus::MessageBus;

/// Operation surface shared by the event + command dispatchers.
pub trait Bus: Send + Sync {
    /// Subscribe `handler` to `T`. A second handler of the same type is a no-op.
    fn subscribe<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Event,
        H: EventHandler<T> + 'static;

    /// Remove the subscription of `H` for `T`. Unknown subscriptions are a no-op.
    fn unsubscribe<T, H>(&self, handler: &Arc<H>) -> Result<bool, BusError>
    where
        T: Event,
        H: EventHandler<T> + 'static;

    /// Bind `handler` to the command `T`. The first binding wins.
    fn register<T, H>(&self, handler: Arc<H>) -> Result<Registration, BusError>
    where
        T: Command,
        H: CommandHandler<T> + 'static;

    /// Deliver `event` to every subscriber of its runtime type.
    /// Returns the number of handlers called.
    fn publish_dyn(&self, event: &dyn Event) -> Result<usize, BusError>;

    /// Deliver `command` to the handler bound to its runtime type.
    /// Returns whether a handler ran.
    fn send_dyn(&self, command: &dyn Command) -> Result<bool, BusError>;

    fn snapshot(&self) -> Result<BusSnapshot, BusError>;

    fn publish<T: Event>(&self, event: &T) -> Result<usize, BusError> {
        self.publish_dyn(event)
    }

    fn send<T: Command>(&self, command: &T) -> Result<bool, BusError> {
        self.send_dyn(command)
    }
}

#[cfg(test)]
mod tests {
    //! `LayeredBus` と `CombinedBus` は外から見て同じ振る舞いをするので、
    //! 同じテストを両方に対して生成する。

    use super::*;
    use crate::config::BusConfig;
    use crate::registry::HandlerKey;
    use crate::testing::{
        OtherEvent, OtherEventHandler, TestCommand, TestCommandHandler1, TestCommandHandler2,
        TestEvent, TestEventHandler1, TestEventHandler2,
    };
    use ulid::Ulid;

    fn fresh() -> String {
        Ulid::new().to_string()
    }

    fn publish_reaches_subscriber<B: Bus>(bus: B) {
        let value = fresh();
        let handler = Arc::new(TestEventHandler1::default());

        bus.subscribe::<TestEvent, _>(Arc::clone(&handler)).unwrap();
        bus.publish(&TestEvent::new(value.clone())).unwrap();

        assert_eq!(handler.data(), Some(value));
    }

    fn publish_fans_out<B: Bus>(bus: B) {
        let handler1 = Arc::new(TestEventHandler1::default());
        let handler2 = Arc::new(TestEventHandler2::default());
        bus.subscribe::<TestEvent, _>(Arc::clone(&handler1)).unwrap();
        bus.subscribe::<TestEvent, _>(Arc::clone(&handler2)).unwrap();

        for _ in 0..10 {
            let value = fresh();
            assert_eq!(bus.publish(&TestEvent::new(value.clone())).unwrap(), 2);
            assert_eq!(handler1.data(), Some(value.clone()));
            assert_eq!(handler2.data(), Some(value));
        }
        assert_eq!(handler1.calls(), 10);
        assert_eq!(handler2.calls(), 10);
    }

    fn subscribe_is_idempotent<B: Bus>(bus: B) {
        let first = Arc::new(TestEventHandler1::default());
        let again = Arc::new(TestEventHandler1::default());

        assert_eq!(
            bus.subscribe::<TestEvent, _>(Arc::clone(&first)).unwrap(),
            Registration::Added
        );
        assert_eq!(
            bus.subscribe::<TestEvent, _>(Arc::clone(&first)).unwrap(),
            Registration::AlreadyPresent
        );
        assert_eq!(
            bus.subscribe::<TestEvent, _>(Arc::clone(&again)).unwrap(),
            Registration::AlreadyPresent
        );

        assert_eq!(bus.publish(&TestEvent::new("once")).unwrap(), 1);
        assert_eq!(first.calls(), 1);
        assert_eq!(again.calls(), 0);
    }

    fn no_cross_type_leakage<B: Bus>(bus: B) {
        let test_handler = Arc::new(TestEventHandler1::default());
        let other_handler = Arc::new(OtherEventHandler::default());
        bus.subscribe::<TestEvent, _>(Arc::clone(&test_handler)).unwrap();
        bus.subscribe::<OtherEvent, _>(Arc::clone(&other_handler))
            .unwrap();

        bus.publish(&OtherEvent { value: 42 }).unwrap();

        assert_eq!(test_handler.calls(), 0);
        assert_eq!(other_handler.data().as_deref(), Some("42"));
    }

    fn unsubscribe_removes_exactly_one<B: Bus>(bus: B) {
        let leaving = Arc::new(TestEventHandler1::default());
        let staying = Arc::new(TestEventHandler2::default());
        bus.subscribe::<TestEvent, _>(Arc::clone(&leaving)).unwrap();
        bus.subscribe::<TestEvent, _>(Arc::clone(&staying)).unwrap();
        bus.publish(&TestEvent::new("before")).unwrap();

        assert!(bus.unsubscribe::<TestEvent, _>(&leaving).unwrap());
        bus.publish(&TestEvent::new("after")).unwrap();

        assert_eq!(leaving.data().as_deref(), Some("before"));
        assert_eq!(staying.data().as_deref(), Some("after"));
    }

    fn unsubscribe_unknown_is_noop<B: Bus>(bus: B) {
        let subscribed = Arc::new(TestEventHandler1::default());
        bus.subscribe::<TestEvent, _>(Arc::clone(&subscribed)).unwrap();
        let before = bus.snapshot().unwrap();

        let never_subscribed = Arc::new(TestEventHandler2::default());
        let never_published = Arc::new(OtherEventHandler::default());
        assert!(!bus.unsubscribe::<TestEvent, _>(&never_subscribed).unwrap());
        assert!(!bus.unsubscribe::<OtherEvent, _>(&never_published).unwrap());

        assert_eq!(bus.snapshot().unwrap(), before);
    }

    fn send_reaches_command_handler<B: Bus>(bus: B) {
        let value = fresh();
        let handler = Arc::new(TestCommandHandler1::default());

        assert_eq!(
            bus.register::<TestCommand, _>(Arc::clone(&handler)).unwrap(),
            Registration::Added
        );
        assert!(bus.send(&TestCommand::new(value.clone())).unwrap());

        assert_eq!(handler.data(), Some(value));
    }

    fn first_command_handler_wins<B: Bus>(bus: B) {
        let first = Arc::new(TestCommandHandler1::default());
        let second = Arc::new(TestCommandHandler2::default());

        bus.register::<TestCommand, _>(Arc::clone(&first)).unwrap();
        let outcome = bus.register::<TestCommand, _>(Arc::clone(&second)).unwrap();
        bus.send(&TestCommand::new("w")).unwrap();

        assert_eq!(
            outcome,
            Registration::Occupied {
                existing: HandlerKey::of::<TestCommandHandler1>()
            }
        );
        assert_eq!(first.data().as_deref(), Some("w"));
        assert_eq!(second.data(), None);
    }

    fn unknown_message_is_noop<B: Bus>(bus: B) {
        bus.subscribe::<TestEvent, _>(Arc::new(TestEventHandler1::default()))
            .unwrap();
        let before = bus.snapshot().unwrap();

        assert_eq!(bus.publish(&OtherEvent { value: 1 }).unwrap(), 0);
        assert!(!bus.send(&TestCommand::new("nobody")).unwrap());

        assert_eq!(bus.snapshot().unwrap(), before);
    }

    fn dyn_dispatch_uses_runtime_type<B: Bus>(bus: B) {
        let event_handler = Arc::new(TestEventHandler1::default());
        let command_handler = Arc::new(TestCommandHandler1::default());
        bus.subscribe::<TestEvent, _>(Arc::clone(&event_handler))
            .unwrap();
        bus.register::<TestCommand, _>(Arc::clone(&command_handler))
            .unwrap();

        let events: Vec<Box<dyn Event>> = vec![
            Box::new(OtherEvent { value: 3 }),
            Box::new(TestEvent::new("erased")),
        ];
        for event in &events {
            bus.publish_dyn(&**event).unwrap();
        }
        let command: Box<dyn Command> = Box::new(TestCommand::new("erased command"));
        assert!(bus.send_dyn(&*command).unwrap());

        assert_eq!(event_handler.calls(), 1);
        assert_eq!(event_handler.data().as_deref(), Some("erased"));
        assert_eq!(command_handler.data().as_deref(), Some("erased command"));
    }

    fn strict_rejects_duplicate_command<B: Bus>(bus: B) {
        bus.register::<TestCommand, _>(Arc::new(TestCommandHandler1::default()))
            .unwrap();

        let err = bus
            .register::<TestCommand, _>(Arc::new(TestCommandHandler2::default()))
            .unwrap_err();

        assert!(matches!(
            err,
            BusError::DuplicateCommandHandler { existing, rejected, .. }
                if existing.ends_with("TestCommandHandler1")
                    && rejected.ends_with("TestCommandHandler2")
        ));

        // 同じ Handler 型の再登録はエラーにしない
        assert_eq!(
            bus.register::<TestCommand, _>(Arc::new(TestCommandHandler1::default()))
                .unwrap(),
            Registration::AlreadyPresent
        );
    }

    fn strict_rejects_unhandled_command<B: Bus>(bus: B) {
        let err = bus.send(&TestCommand::new("lost")).unwrap_err();
        assert!(matches!(
            err,
            BusError::NoCommandHandler { command } if command.ends_with("TestCommand")
        ));
    }

    macro_rules! bus_conformance {
        ($name:ident, $bus:ty) => {
            mod $name {
                use super::*;

                #[test]
                fn publish_reaches_subscriber() {
                    super::publish_reaches_subscriber(<$bus>::new());
                }

                #[test]
                fn publish_fans_out() {
                    super::publish_fans_out(<$bus>::new());
                }

                #[test]
                fn subscribe_is_idempotent() {
                    super::subscribe_is_idempotent(<$bus>::new());
                }

                #[test]
                fn no_cross_type_leakage() {
                    super::no_cross_type_leakage(<$bus>::new());
                }

                #[test]
                fn unsubscribe_removes_exactly_one() {
                    super::unsubscribe_removes_exactly_one(<$bus>::new());
                }

                #[test]
                fn unsubscribe_unknown_is_noop() {
                    super::unsubscribe_unknown_is_noop(<$bus>::new());
                }

                #[test]
                fn send_reaches_command_handler() {
                    super::send_reaches_command_handler(<$bus>::new());
                }

                #[test]
                fn first_command_handler_wins() {
                    super::first_command_handler_wins(<$bus>::new());
                }

                #[test]
                fn unknown_message_is_noop() {
                    super::unknown_message_is_noop(<$bus>::new());
                }

                #[test]
                fn dyn_dispatch_uses_runtime_type() {
                    super::dyn_dispatch_uses_runtime_type(<$bus>::new());
                }

                #[test]
                fn strict_rejects_duplicate_command() {
                    let bus = <$bus>::with_config(BusConfig::strict());
                    super::strict_rejects_duplicate_command(bus);
                }

                #[test]
                fn strict_rejects_unhandled_command() {
                    let bus = <$bus>::with_config(BusConfig::strict());
                    super::strict_rejects_unhandled_command(bus);
                }
            }
        };
    }

    bus_conformance!(layered, LayeredBus);
    bus_conformance!(combined, CombinedBus);
}
