//! Persistence service — single-writer snapshot queue for product saves.
//!
//! DESIGN
//! ======
//! Every mutation enqueues a full snapshot of the sequence. One worker task
//! drains the queue and writes snapshots in the order they were enqueued, so
//! a slow write can never be overtaken by a newer one landing first. Under a
//! backlog the worker keeps only the newest pending snapshot; each entry is
//! the full sequence, so later entries supersede earlier ones.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is logged and dropped: no retry, no rollback. The
//! sequence keeps serving from memory and the next mutation enqueues a
//! fresh snapshot of the then-current state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::state::{AppState, Product};
use crate::store::{PRODUCTS_KEY, ProductStore, StoreError};

const DEFAULT_SAVE_QUEUE_CAPACITY: usize = 64;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Spawn the save worker and return its queue sender.
///
/// The worker runs until every sender is dropped, then drains what is left
/// and exits.
#[must_use]
pub fn spawn_save_worker(store: Arc<dyn ProductStore>) -> mpsc::Sender<Vec<Product>> {
    let capacity = env_parse("SAVE_QUEUE_CAPACITY", DEFAULT_SAVE_QUEUE_CAPACITY);
    let (tx, rx) = mpsc::channel::<Vec<Product>>(capacity);
    info!(capacity, "save worker configured");

    tokio::spawn(run_save_worker(store, rx));
    tx
}

async fn run_save_worker(store: Arc<dyn ProductStore>, mut rx: mpsc::Receiver<Vec<Product>>) {
    while let Some(mut snapshot) = rx.recv().await {
        // EDGE: coalesce a backlog down to the newest snapshot.
        while let Ok(newer) = rx.try_recv() {
            snapshot = newer;
        }
        if let Err(e) = save_products(store.as_ref(), &snapshot).await {
            error!(error = %e, count = snapshot.len(), "products save failed");
        }
    }
}

/// Best-effort, non-blocking snapshot enqueue.
///
/// Uses `try_send` so mutation latency never depends on the store. A full or
/// closed queue drops the snapshot with a warning; any later mutation
/// enqueues a newer full snapshot.
pub fn enqueue_save(state: &AppState, products: &[Product]) {
    let Some(tx) = &state.save_tx else {
        return;
    };

    match tx.try_send(products.to_vec()) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(count = products.len(), "save queue full; dropping snapshot");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            warn!(count = products.len(), "save queue closed; dropping snapshot");
        }
    }
}

/// Serialize one snapshot and write it to the fixed key.
///
/// # Errors
///
/// Returns an error if encoding or the store write fails.
pub async fn save_products(store: &dyn ProductStore, products: &[Product]) -> Result<(), StoreError> {
    let blob = serde_json::to_string(products)?;
    store.set(PRODUCTS_KEY, &blob).await
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
