//! Status - registry のスナップショット
//!
//! CLI やログから「どの Message 型にどの Handler が付いているか」を
//! 確認するための serde 対応のビューです。

use serde::{Deserialize, Serialize};

/// 1 つの Message 型と、それに登録された Handler 型（登録順）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStatus {
    pub message_type: String,
    pub handlers: Vec<String>,
}

/// Bus 全体のスナップショット
///
/// - `subscriptions`: Message / Event の Route（0..N）
/// - `commands`: Command の Route（0..1）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSnapshot {
    pub subscriptions: Vec<RouteStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<RouteStatus>,
}

impl BusSnapshot {
    /// 登録されている Handler の総数
    pub fn handler_count(&self) -> usize {
        self.subscriptions
            .iter()
            .chain(self.commands.iter())
            .map(|route| route.handlers.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty() && self.commands.is_empty()
    }
}
