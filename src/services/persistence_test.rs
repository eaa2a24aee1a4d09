use super::*;
use crate::state::test_helpers;
use crate::store::MemoryStore;

use std::time::Duration;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__TEST_NONEXISTENT_KEY_98765__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_SAVE_EP_INVALID__", "notanumber") };
    let val: usize = env_parse("__TEST_SAVE_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_SAVE_EP_INVALID__") };
}

// =============================================================================
// enqueue_save
// =============================================================================

#[tokio::test]
async fn enqueue_save_no_sender_is_noop() {
    let state = test_helpers::test_app_state();
    assert!(state.save_tx.is_none());
    enqueue_save(&state, &[test_helpers::dummy_product("A")]);
}

#[tokio::test]
async fn enqueue_save_sends_snapshot_to_channel() {
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let mut state = test_helpers::test_app_state();
    state.save_tx = Some(tx);

    let product = test_helpers::dummy_product("A");
    enqueue_save(&state, std::slice::from_ref(&product));

    let snapshot = rx.try_recv().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, product.id);
}

#[tokio::test]
async fn enqueue_save_full_channel_drops_snapshot() {
    let (tx, _rx) = tokio::sync::mpsc::channel(1);
    let mut state = test_helpers::test_app_state();
    state.save_tx = Some(tx);

    enqueue_save(&state, &[test_helpers::dummy_product("A")]);
    // Channel is full (capacity 1), second enqueue must not panic or block.
    enqueue_save(&state, &[test_helpers::dummy_product("B")]);
}

#[tokio::test]
async fn enqueue_save_closed_channel_drops_snapshot() {
    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let mut state = test_helpers::test_app_state();
    state.save_tx = Some(tx);

    drop(rx);
    enqueue_save(&state, &[test_helpers::dummy_product("A")]);
}

// =============================================================================
// save_products
// =============================================================================

#[tokio::test]
async fn save_products_writes_blob_at_fixed_key() {
    let store = MemoryStore::new();
    let products = vec![test_helpers::dummy_product("A")];

    save_products(&store, &products).await.unwrap();

    let blob = store.get(PRODUCTS_KEY).await.unwrap().unwrap();
    let restored: Vec<Product> = serde_json::from_str(&blob).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].id, products[0].id);
}

#[tokio::test]
async fn save_products_store_failure_surfaces_error() {
    let store = MemoryStore::failing();
    let result = save_products(&store, &[test_helpers::dummy_product("A")]).await;
    assert!(matches!(result, Err(StoreError::Io(_))));
}

// =============================================================================
// save worker
// =============================================================================

/// Poll the store until its blob decodes to `expected_names`, or panic after
/// a generous deadline.
async fn wait_for_store_names(store: &MemoryStore, expected_names: &[&str]) {
    for _ in 0..200 {
        if let Some(blob) = store.get(PRODUCTS_KEY).await.unwrap() {
            let products: Vec<Product> = serde_json::from_str(&blob).unwrap();
            let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
            if names == expected_names {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("store never reached expected snapshot {expected_names:?}");
}

#[tokio::test]
async fn worker_writes_enqueued_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let tx = spawn_save_worker(store.clone());

    tx.send(vec![test_helpers::dummy_product("A")]).await.unwrap();

    wait_for_store_names(&store, &["A"]).await;
}

#[tokio::test]
async fn worker_final_store_state_matches_last_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let tx = spawn_save_worker(store.clone());

    // A burst of snapshots; the store must end at the newest one regardless
    // of how many intermediate writes the worker coalesced away.
    let mut products = Vec::new();
    for name in ["A", "B", "C", "D"] {
        products.push(test_helpers::dummy_product(name));
        tx.send(products.clone()).await.unwrap();
    }

    wait_for_store_names(&store, &["A", "B", "C", "D"]).await;
}

#[tokio::test]
async fn worker_survives_store_failures() {
    let store = Arc::new(MemoryStore::failing());
    let tx = spawn_save_worker(store.clone());

    tx.send(vec![test_helpers::dummy_product("A")]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The write failed and was dropped, but the worker still drains the queue.
    tx.send(vec![test_helpers::dummy_product("B")]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.write_count(), 0);
}
