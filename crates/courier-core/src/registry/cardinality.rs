//! Cardinality policy for a registry: how many handlers one message type may have.

/// Cardinality is the per-message-type handler limit of a [`Registry`](super::Registry).
pub trait Cardinality: Send + Sync + 'static {
    /// Label used in logs and snapshots.
    const LABEL: &'static str;

    /// Maximum number of distinct handler types per message type.
    /// `None` means unbounded.
    const LIMIT: Option<usize>;
}

/// 0..N handlers per message type (messages and events).
#[derive(Debug, Clone, Copy, Default)]
pub struct Fanout;

impl Cardinality for Fanout {
    const LABEL: &'static str = "fanout";
    const LIMIT: Option<usize> = None;
}

/// 0..1 handler per message type (commands). The first registration wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Single;

impl Cardinality for Single {
    const LABEL: &'static str = "single";
    const LIMIT: Option<usize> = Some(1);
}
