//! Registry - 型 ID をキーにした Handler の登録と管理
//!
//! # 学習ポイント
//! - `HashMap<MessageKey, Route>` での型消去された trait object の管理
//! - Phantom type (`Registry<C: Cardinality>`) による 0..N / 0..1 の切り替え
//! - `RwLock` + スナップショットによる、ロックを握らない配送
//!
//! # 不変条件
//! - 1 つの Message 型に対して、同じ Handler 型のエントリは高々 1 つ
//! - `Single` では Message 型ごとに Handler は高々 1 つ（先勝ち）
//! - 空の Route は残さない（最後の Handler を外したらキーごと削除）
//! - 配送順は登録順（`Vec` なので同じ registry 内では常に安定）

pub mod cardinality;
pub mod key;

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::error::BusError;
use crate::status::RouteStatus;
use crate::typed::{Delivery, ErasedHandler};

pub use self::cardinality::{Cardinality, Fanout, Single};
pub use self::key::{HandlerKey, MessageKey};

/// Registration は登録操作の結果
///
/// どのケースもエラーではありません。呼び出し側が結果を確認できるように
/// 返しているだけです。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// 新しい Adapter を登録した
    Added,
    /// 同じ Handler 型が既に登録済み（何もしていない）
    AlreadyPresent,
    /// 上限に達していて別の Handler 型が登録済み（何もしていない）
    Occupied { existing: HandlerKey },
}

struct Entry {
    handler: HandlerKey,
    adapter: Arc<dyn ErasedHandler>,
}

struct Route {
    message: MessageKey,
    entries: Vec<Entry>,
}

type Routes = HashMap<MessageKey, Route>;

/// Registry は Message 型ごとに Adapter を保持する
///
/// # 使用例
/// ```
/// use std::sync::Arc;
/// use courier_core::registry::{Fanout, MessageKey, Registration, Registry};
/// use courier_core::typed::HandlerAdapter;
/// use courier_core::{Event, EventHandler};
///
/// struct Tick;
/// impl courier_core::Message for Tick {}
/// impl Event for Tick {}
///
/// struct Counter;
/// impl EventHandler<Tick> for Counter {
///     fn handle(&self, _event: &Tick) {}
/// }
///
/// let registry = Registry::<Fanout>::new();
/// let adapter = Arc::new(HandlerAdapter::<Tick, _>::for_event(Arc::new(Counter)));
/// assert_eq!(registry.insert(adapter).unwrap(), Registration::Added);
/// assert_eq!(registry.dispatch(MessageKey::of::<Tick>(), &Tick).unwrap(), 1);
/// ```
pub struct Registry<C: Cardinality> {
    routes: RwLock<Routes>,
    _cardinality: PhantomData<fn() -> C>,
}

impl<C: Cardinality> Registry<C> {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            _cardinality: PhantomData,
        }
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Routes>, BusError> {
        self.routes
            .read()
            .map_err(|_| BusError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Routes>, BusError> {
        self.routes
            .write()
            .map_err(|_| BusError::LockPoisoned(operation))
    }

    /// Adapter を登録する
    ///
    /// Message 型と Handler 型は Adapter 自身から取得します。
    pub fn insert(&self, adapter: Arc<dyn ErasedHandler>) -> Result<Registration, BusError> {
        let message = adapter.message_key();
        let handler = adapter.handler_key();
        let mut routes = self.write("insert")?;

        let route = routes.entry(message).or_insert_with(|| Route {
            message,
            entries: Vec::new(),
        });

        if route.entries.iter().any(|e| e.handler == handler) {
            trace!(kind = C::LABEL, %message, %handler, "handler already present");
            return Ok(Registration::AlreadyPresent);
        }

        if let Some(limit) = C::LIMIT
            && route.entries.len() >= limit
        {
            let existing = route.entries[0].handler;
            return Ok(Registration::Occupied { existing });
        }

        route.entries.push(Entry { handler, adapter });
        debug!(kind = C::LABEL, %message, %handler, "handler registered");
        Ok(Registration::Added)
    }

    /// Handler を外す。外れたら `true`、見つからなければ `false`（エラーではない）
    pub fn remove(&self, message: MessageKey, handler: HandlerKey) -> Result<bool, BusError> {
        let mut routes = self.write("remove")?;

        let Some(route) = routes.get_mut(&message) else {
            return Ok(false);
        };

        let before = route.entries.len();
        route.entries.retain(|e| e.handler != handler);
        let removed = route.entries.len() != before;

        if route.entries.is_empty() {
            routes.remove(&message);
        }

        if removed {
            debug!(kind = C::LABEL, %message, %handler, "handler removed");
        }
        Ok(removed)
    }

    /// 登録順の Adapter のスナップショットを返す
    pub fn handlers(&self, message: MessageKey) -> Result<Vec<Arc<dyn ErasedHandler>>, BusError> {
        let routes = self.read("lookup")?;
        Ok(routes
            .get(&message)
            .map(|route| route.entries.iter().map(|e| Arc::clone(&e.adapter)).collect())
            .unwrap_or_default())
    }

    /// `message` を登録済みの全 Adapter に同期的に配送する
    ///
    /// ロックはスナップショットを取る間だけ保持します。Handler の中から
    /// 同じ registry に publish / subscribe しても deadlock しません。
    /// 戻り値は実際に Handler が呼ばれた数です。
    pub fn dispatch(&self, key: MessageKey, message: &dyn Any) -> Result<usize, BusError> {
        let handlers = self.handlers(key)?;
        if handlers.is_empty() {
            trace!(kind = C::LABEL, message = %key, "no handlers");
            return Ok(0);
        }

        let mut handled = 0;
        for adapter in &handlers {
            match adapter.deliver(message) {
                Delivery::Handled => handled += 1,
                Delivery::Skipped => {
                    debug!(
                        kind = C::LABEL,
                        message = %key,
                        handler = %adapter.handler_key(),
                        "adapter skipped message of another type"
                    );
                }
            }
        }

        trace!(kind = C::LABEL, message = %key, handled, "dispatched");
        Ok(handled)
    }

    pub fn len(&self, message: MessageKey) -> Result<usize, BusError> {
        let routes = self.read("len")?;
        Ok(routes.get(&message).map_or(0, |route| route.entries.len()))
    }

    pub fn contains(&self, message: MessageKey) -> Result<bool, BusError> {
        Ok(self.len(message)? > 0)
    }

    pub fn is_empty(&self) -> Result<bool, BusError> {
        Ok(self.read("is_empty")?.is_empty())
    }

    /// 全ての Route を削除する（テストの分離用）
    pub fn clear(&self) -> Result<(), BusError> {
        let mut routes = self.write("clear")?;
        let dropped = routes.len();
        routes.clear();
        debug!(kind = C::LABEL, routes = dropped, "registry cleared");
        Ok(())
    }

    /// Route の一覧（Message 型名でソート、Handler は登録順）
    pub fn snapshot(&self) -> Result<Vec<RouteStatus>, BusError> {
        let routes = self.read("snapshot")?;
        let mut status: Vec<RouteStatus> = routes
            .values()
            .map(|route| RouteStatus {
                message_type: route.message.name().to_string(),
                handlers: route
                    .entries
                    .iter()
                    .map(|e| e.handler.name().to_string())
                    .collect(),
            })
            .collect();
        status.sort_by(|a, b| a.message_type.cmp(&b.message_type));
        Ok(status)
    }
}

impl<C: Cardinality> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}
