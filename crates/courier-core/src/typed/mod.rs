//! Typed - 型付き Message / Handler API
//!
//! このモジュールは「どの型のメッセージをどの Handler が受け取るか」を
//! コンパイル時に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Message` / `Event` / `Command` trait と
//!   `MessageHandler<T>` / `EventHandler<T>` / `CommandHandler<T>` - 型安全
//! - **内部（Dyn）**: `ErasedHandler` trait - object-safe, type erasure

pub mod handler;
pub mod message;

// 主要な trait/型 を再エクスポート
pub use self::handler::{
    CommandHandler, Delivery, ErasedHandler, EventHandler, HandlerAdapter, MessageHandler,
};
pub use self::message::{AsAny, Command, Event, Message};
