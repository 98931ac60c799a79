//! Test fixtures shared by the unit tests of every module.

use std::ops::Deref;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::typed::{
    Command, CommandHandler, Event, EventHandler, Message, MessageHandler,
};

#[derive(Debug, Clone)]
pub struct TestMessage {
    pub data: String,
}

impl TestMessage {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

impl Message for TestMessage {}

#[derive(Debug, Clone)]
pub struct TestEvent {
    pub data: String,
}

impl TestEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

impl Message for TestEvent {}
impl Event for TestEvent {}

#[derive(Debug, Clone)]
pub struct OtherEvent {
    pub value: u32,
}

impl Message for OtherEvent {}
impl Event for OtherEvent {}

#[derive(Debug, Clone)]
pub struct TestCommand {
    pub data: String,
}

impl TestCommand {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

impl Message for TestCommand {}
impl Command for TestCommand {}

/// Last payload seen plus the number of calls.
#[derive(Debug, Default)]
pub struct Recorder {
    data: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl Recorder {
    pub fn record(&self, data: &str) {
        *self.data.lock().unwrap() = Some(data.to_string());
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn data(&self) -> Option<String> {
        self.data.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

macro_rules! recording_handler {
    ($name:ident, $role:ident<$message:ty>, |$m:ident| $payload:expr) => {
        #[derive(Debug, Default)]
        pub struct $name(Recorder);

        impl Deref for $name {
            type Target = Recorder;

            fn deref(&self) -> &Recorder {
                &self.0
            }
        }

        impl $role<$message> for $name {
            fn handle(&self, $m: &$message) {
                self.0.record(&$payload);
            }
        }
    };
}

recording_handler!(TestHandler1, MessageHandler<TestMessage>, |m| m.data);
recording_handler!(TestHandler2, MessageHandler<TestMessage>, |m| m.data);
recording_handler!(TestEventHandler1, EventHandler<TestEvent>, |e| e.data);
recording_handler!(TestEventHandler2, EventHandler<TestEvent>, |e| e.data);
recording_handler!(OtherEventHandler, EventHandler<OtherEvent>, |e| e.value.to_string());
recording_handler!(TestCommandHandler1, CommandHandler<TestCommand>, |c| c.data);
recording_handler!(TestCommandHandler2, CommandHandler<TestCommand>, |c| c.data);
