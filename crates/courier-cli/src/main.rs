use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ulid::Ulid;

use courier_core::{
    Bus, BusConfig, CombinedBus, Command, CommandHandler, Event, EventHandler, Message,
};

#[derive(Debug, Clone, Serialize)]
struct PlaceOrder {
    order_id: Ulid,
    item: String,
    quantity: u32,
}

impl Message for PlaceOrder {}
impl Command for PlaceOrder {}

#[derive(Debug, Clone, Serialize)]
struct OrderPlaced {
    order_id: Ulid,
    item: String,
    quantity: u32,
}

impl Message for OrderPlaced {}
impl Event for OrderPlaced {}

/// command handler：受け付けた注文を OrderPlaced として publish し直す
///
/// bus が handler を保持するので、handler からは `Weak` で参照する（循環参照を避ける）
struct PlaceOrderHandler {
    bus: Weak<CombinedBus>,
}

impl CommandHandler<PlaceOrder> for PlaceOrderHandler {
    fn handle(&self, command: &PlaceOrder) {
        let Some(bus) = self.bus.upgrade() else {
            warn!(order_id = %command.order_id, "bus already dropped");
            return;
        };

        let event = OrderPlaced {
            order_id: command.order_id,
            item: command.item.clone(),
            quantity: command.quantity,
        };
        if let Err(e) = bus.publish(&event) {
            warn!(order_id = %command.order_id, error = %e, "publish failed");
        }
    }
}

struct AuditLog;

impl EventHandler<OrderPlaced> for AuditLog {
    fn handle(&self, event: &OrderPlaced) {
        match serde_json::to_string(event) {
            Ok(json) => println!("audit: {json}"),
            Err(e) => warn!(error = %e, "audit encode failed"),
        }
    }
}

#[derive(Default)]
struct StockCounter {
    reserved: AtomicUsize,
}

impl EventHandler<OrderPlaced> for StockCounter {
    fn handle(&self, event: &OrderPlaced) {
        let total = self
            .reserved
            .fetch_add(event.quantity as usize, Ordering::SeqCst)
            + event.quantity as usize;
        info!(item = %event.item, total, "stock reserved");
    }
}

fn load_config() -> Result<BusConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = BusConfig::from_json(&json)?;
            info!(%path, ?config, "config loaded");
            Ok(config)
        }
        None => Ok(BusConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) 設定を読み込んで bus を用意
    let bus = Arc::new(CombinedBus::with_config(load_config()?));

    // (B) event の subscriber を 2 つ、command の handler を 1 つ登録
    let stock = Arc::new(StockCounter::default());
    bus.subscribe::<OrderPlaced, _>(Arc::new(AuditLog))?;
    bus.subscribe::<OrderPlaced, _>(Arc::clone(&stock))?;
    bus.register::<PlaceOrder, _>(Arc::new(PlaceOrderHandler {
        bus: Arc::downgrade(&bus),
    }))?;

    // (C) command を送る（handler の中から OrderPlaced が publish される）
    for (item, quantity) in [("apple", 3), ("pear", 1), ("apple", 2)] {
        let command = PlaceOrder {
            order_id: Ulid::new(),
            item: item.to_string(),
            quantity,
        };
        let handled = bus.send(&command)?;
        info!(order_id = %command.order_id, handled, "command sent");
    }

    // (D) subscriber を 1 つ外すと、以降の publish は AuditLog だけに届く
    bus.unsubscribe::<OrderPlaced, _>(&stock)?;
    let handled = bus.publish(&OrderPlaced {
        order_id: Ulid::new(),
        item: "manual".to_string(),
        quantity: 1,
    })?;
    info!(handled, "event published after unsubscribe");

    // (E) 登録状況を JSON で出力
    println!("{}", serde_json::to_string_pretty(&bus.snapshot()?)?);
    println!("reserved: {}", stock.reserved.load(Ordering::SeqCst));

    Ok(())
}
