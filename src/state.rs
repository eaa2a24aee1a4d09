//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is the cloneable handle passed to the screen loop and the save
//! worker. It holds the product store, the live inventory behind an async
//! lock, and the snapshot sender for deferred saves. The in-memory sequence
//! is authoritative; the store only ever sees full snapshots of it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::store::ProductStore;

// =============================================================================
// PRODUCT
// =============================================================================

/// A single inventory record. Mirrors one element of the persisted blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub quantity: i64,
}

// =============================================================================
// EDIT DRAFT
// =============================================================================

/// Field buffers staged while one record is being edited. Buffers hold raw
/// text exactly as the form fields do; nothing is parsed until commit.
#[derive(Debug, Clone)]
pub struct EditDraft {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub quantity: String,
}

// =============================================================================
// INVENTORY STATE
// =============================================================================

/// Live inventory state: the product sequence in insertion order, plus the
/// editing-mode draft when one record's fields are staged.
pub struct InventoryState {
    pub products: Vec<Product>,
    pub editing: Option<EditDraft>,
}

impl InventoryState {
    #[must_use]
    pub fn new() -> Self {
        Self { products: Vec::new(), editing: None }
    }

    /// Position of a product in the sequence, if present.
    #[must_use]
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }
}

impl Default for InventoryState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is cheap — all inner fields are
/// Arc-wrapped or absent.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub inventory: Arc<RwLock<InventoryState>>,
    /// Snapshot queue feeding the save worker. `None` until the worker is
    /// spawned; mutations then run without deferred persistence.
    pub save_tx: Option<mpsc::Sender<Vec<Product>>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store, inventory: Arc::new(RwLock::new(InventoryState::new())), save_tx: None }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
