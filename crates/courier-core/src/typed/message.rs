//! Message taxonomy - Message / Event / Command の定義
//!
//! # 学習ポイント
//! - Marker trait と supertrait の組み合わせ
//! - `Any` による実行時の型識別（`AsAny` の blanket impl）

use std::any::Any;

/// AsAny は具体型の `&dyn Any` と型名を取り出す
///
/// 全ての `Any + Send + Sync` 型に blanket impl されるので、利用者が
/// 実装する必要はありません。`&dyn Event` のような trait object からも
/// vtable 経由で具体型の `TypeId` を取得できます。
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// 具体型の名前（ログ・スナップショット用、識別には使わない）
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Message は bus に流せる全ての値の基底
///
/// # 使用例
/// ```
/// use courier_core::Message;
///
/// struct Ping {
///     seq: u64,
/// }
///
/// impl Message for Ping {}
/// ```
///
/// # Trait Bounds
/// - `Any`: 実行時の型でルーティングするため（`'static` を含む）
/// - `Send + Sync`: 複数スレッドから同じ bus を使えるため
pub trait Message: AsAny {}

/// Event は 0..N 個の subscriber に配送される Message
///
/// 親 trait (`Message`) を共有していても、ルーティングは具体型のみで
/// 行われます（共変性なし）。
pub trait Event: Message {}

/// Command はちょうど 1 つの Handler が処理する Message
pub trait Command: Message {}
