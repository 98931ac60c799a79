//! courier-core
//!
//! In-process message bus: typed handlers, type-indexed registries and
//! synchronous dispatch for messages, events and commands.
//!
//! # モジュール構成
//! - **typed**: 型付き API（Message / Event / Command trait, Handler trait, HandlerAdapter）
//! - **registry**: 型 ID をキーにした Handler の登録と管理（Fanout: 0..N, Single: 0..1）
//! - **bus**: dispatcher 本体（MessageBus, LayeredBus, CombinedBus）
//! - **config**: BusConfig（重複 command / 未登録 command の扱い）
//! - **status**: registry のスナップショット（serde でシリアライズ可能）
//! - **error**: エラー型

pub mod bus;
pub mod config;
pub mod error;
pub mod registry;
pub mod status;
pub mod typed;

#[cfg(test)]
pub(crate) mod testing;

pub use self::bus::{Bus, CombinedBus, LayeredBus, MessageBus};
pub use self::config::{BusConfig, DuplicateCommandPolicy, UnhandledCommandPolicy};
pub use self::error::BusError;
pub use self::registry::{HandlerKey, MessageKey, Registration};
pub use self::status::{BusSnapshot, RouteStatus};
pub use self::typed::{Command, CommandHandler, Event, EventHandler, Message, MessageHandler};
