//! Handler trait - Message を処理する Handler の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (`MessageHandler<T>`, `EventHandler<T>`, `CommandHandler<T>`)
//! - Object-safe trait (`ErasedHandler`)
//! - Type erasure パターン (`HandlerAdapter<T, H>` → `dyn ErasedHandler`)
//! - 登録時に関数ポインタを選ぶことで、役割ごとの Adapter を 1 つに統一

use std::any::Any;
use std::sync::Arc;

use super::message::{Command, Event, Message};
use crate::registry::key::{HandlerKey, MessageKey};

/// MessageHandler は汎用 Message を処理する
///
/// Handler は `&self` で呼ばれます。状態を持つ場合は `Mutex` などの
/// interior mutability を使ってください。
///
/// # 使用例
/// ```
/// use std::sync::Mutex;
/// use courier_core::{Message, MessageHandler};
///
/// struct Ping(u64);
/// impl Message for Ping {}
///
/// #[derive(Default)]
/// struct LastPing(Mutex<Option<u64>>);
///
/// impl MessageHandler<Ping> for LastPing {
///     fn handle(&self, message: &Ping) {
///         *self.0.lock().unwrap() = Some(message.0);
///     }
/// }
/// ```
pub trait MessageHandler<T: Message>: Send + Sync {
    fn handle(&self, message: &T);
}

/// EventHandler は Event を処理する（1 つの Event に複数の Handler が付く）
pub trait EventHandler<T: Event>: Send + Sync {
    fn handle(&self, event: &T);
}

/// CommandHandler は Command を処理する（1 つの Command に Handler は 1 つ）
pub trait CommandHandler<T: Command>: Send + Sync {
    fn handle(&self, command: &T);
}

/// Delivery は Adapter への配送結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 型が一致し、Handler が呼ばれた
    Handled,
    /// 型が一致しなかったので何もしなかった
    Skipped,
}

/// ErasedHandler は object-safe な Handler の抽象化
///
/// `HandlerAdapter<T, H>` を `Arc<dyn ErasedHandler>` に変換することで、
/// 型の異なる Handler を 1 つの registry に格納できます。
pub trait ErasedHandler: Send + Sync {
    /// この Adapter が受け取る Message 型
    fn message_key(&self) -> MessageKey;

    /// 包んでいる Handler の具体型（重複排除のキー）
    fn handler_key(&self) -> HandlerKey;

    /// `message` を `T` にダウンキャストし、成功すれば Handler を呼ぶ
    fn deliver(&self, message: &dyn Any) -> Delivery;
}

/// HandlerAdapter は型付き Handler を `ErasedHandler` に変換する
///
/// `invoke` は登録時に選ばれる（`for_message` / `for_event` / `for_command`）。
/// Handler 自体は `Arc` で共有され、呼び出し側も同じ Handler を保持できます。
pub struct HandlerAdapter<T, H> {
    handler: Arc<H>,
    invoke: fn(&H, &T),
}

impl<T: Message, H: Send + Sync + 'static> HandlerAdapter<T, H> {
    pub fn new(handler: Arc<H>, invoke: fn(&H, &T)) -> Self {
        Self { handler, invoke }
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }
}

impl<T: Message, H: MessageHandler<T> + 'static> HandlerAdapter<T, H> {
    pub fn for_message(handler: Arc<H>) -> Self {
        Self::new(handler, <H as MessageHandler<T>>::handle)
    }
}

impl<T: Event, H: EventHandler<T> + 'static> HandlerAdapter<T, H> {
    pub fn for_event(handler: Arc<H>) -> Self {
        Self::new(handler, <H as EventHandler<T>>::handle)
    }
}

impl<T: Command, H: CommandHandler<T> + 'static> HandlerAdapter<T, H> {
    pub fn for_command(handler: Arc<H>) -> Self {
        Self::new(handler, <H as CommandHandler<T>>::handle)
    }
}

impl<T: Message, H: Send + Sync + 'static> ErasedHandler for HandlerAdapter<T, H> {
    fn message_key(&self) -> MessageKey {
        MessageKey::of::<T>()
    }

    fn handler_key(&self) -> HandlerKey {
        HandlerKey::of::<H>()
    }

    fn deliver(&self, message: &dyn Any) -> Delivery {
        match message.downcast_ref::<T>() {
            Some(message) => {
                (self.invoke)(&*self.handler, message);
                Delivery::Handled
            }
            None => Delivery::Skipped,
        }
    }
}
