mod screen;
mod services;
mod state;
mod store;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let data_dir = std::env::var("STOCKPAD_DATA_DIR").unwrap_or_else(|_| "data".into());

    let file_store = store::FileStore::open(&data_dir)
        .await
        .expect("store init failed");

    let mut state = state::AppState::new(Arc::new(file_store));
    state.save_tx = Some(services::persistence::spawn_save_worker(state.store.clone()));

    // Hydrate once; a missing or unreadable blob just starts empty.
    services::inventory::load_products(&state).await;

    tracing::info!(%data_dir, "stockpad ready");
    screen::run(&state).await;
}
