//! Inventory service — load, add, edit, and delete on the product sequence.
//!
//! DESIGN
//! ======
//! Mutations update in-memory state immediately under the write lock, then
//! enqueue a full-sequence snapshot for the save worker and return. Callers
//! never wait on storage. Editing mode stages one record's fields as raw
//! text until commit; add and commit validate identically, so an unparsable
//! field can never reach the sequence.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures are returned to the caller with nothing mutated.
//! Load and save failures are logged and swallowed; the sequence keeps
//! serving from memory even with the store permanently unreachable.

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::persistence;
use crate::state::{AppState, EditDraft, Product};
use crate::store::PRODUCTS_KEY;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("product name must not be empty")]
    EmptyName,
    #[error("product value is not a number: {raw:?}")]
    InvalidValue { raw: String },
    #[error("product quantity is not an integer: {raw:?}")]
    InvalidQuantity { raw: String },
}

/// Parse and validate the three raw form fields.
///
/// The name is trimmed; the numeric fields must parse, and the value must be
/// finite. Sign is not checked; negative values and quantities pass through.
fn validate_fields(
    name: &str,
    raw_value: &str,
    raw_quantity: &str,
) -> Result<(String, f64, i64), InventoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InventoryError::EmptyName);
    }

    let value = raw_value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InventoryError::InvalidValue { raw: raw_value.to_owned() })?;

    let quantity = raw_quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| InventoryError::InvalidQuantity { raw: raw_quantity.to_owned() })?;

    Ok((name.to_owned(), value, quantity))
}

// =============================================================================
// LOAD
// =============================================================================

/// Hydrate the sequence from the store. Called once at startup.
///
/// Failures are logged, never surfaced: a missing or unreadable blob leaves
/// the sequence empty and the screen fully functional.
pub async fn load_products(state: &AppState) {
    let blob = match state.store.get(PRODUCTS_KEY).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            info!("no persisted products; starting empty");
            return;
        }
        Err(e) => {
            error!(error = %e, "products load failed; starting empty");
            return;
        }
    };

    match serde_json::from_str::<Vec<Product>>(&blob) {
        Ok(products) => {
            let count = products.len();
            let mut inventory = state.inventory.write().await;
            inventory.products = products;
            info!(count, "hydrated products from store");
        }
        Err(e) => {
            error!(error = %e, "persisted products blob is malformed; starting empty");
        }
    }
}

// =============================================================================
// ADD
// =============================================================================

/// Add a new product from raw form input and snapshot the sequence.
///
/// # Errors
///
/// Returns a validation error if the name is blank after trimming or either
/// numeric field fails to parse; the sequence is untouched in that case.
pub async fn add_product(
    state: &AppState,
    name: &str,
    raw_value: &str,
    raw_quantity: &str,
) -> Result<Product, InventoryError> {
    let (name, value, quantity) = validate_fields(name, raw_value, raw_quantity)?;

    let product = Product { id: Uuid::new_v4(), name, value, quantity };
    let result = product.clone();

    let mut inventory = state.inventory.write().await;
    inventory.products.push(product);
    persistence::enqueue_save(state, &inventory.products);
    drop(inventory);

    info!(id = %result.id, name = %result.name, "product added");
    Ok(result)
}

// =============================================================================
// EDIT
// =============================================================================

/// Enter editing mode for `id`, staging its fields as text.
///
/// Unknown ids are a no-op: the screen may hold a stale trigger for a
/// record that was just deleted.
pub async fn begin_edit(state: &AppState, id: Uuid) -> Option<EditDraft> {
    let mut inventory = state.inventory.write().await;
    let Some(product) = inventory.products.iter().find(|p| p.id == id) else {
        debug!(%id, "edit requested for unknown product");
        return None;
    };

    let draft = EditDraft {
        id,
        name: product.name.clone(),
        value: product.value.to_string(),
        quantity: product.quantity.to_string(),
    };
    inventory.editing = Some(draft.clone());
    Some(draft)
}

/// Commit the staged edit from raw form input and snapshot the sequence.
///
/// The record keeps its id and position. Outside editing mode this is a
/// no-op. If the target was deleted while its fields were staged, nothing is
/// mutated and editing mode ends.
///
/// # Errors
///
/// Returns the same validation errors as [`add_product`]; the record, the
/// sequence, and editing mode are all untouched in that case.
pub async fn commit_edit(
    state: &AppState,
    name: &str,
    raw_value: &str,
    raw_quantity: &str,
) -> Result<Option<Product>, InventoryError> {
    let mut inventory = state.inventory.write().await;
    let Some(draft) = inventory.editing.as_ref() else {
        debug!("commit without an active edit");
        return Ok(None);
    };
    let id = draft.id;

    let (name, value, quantity) = validate_fields(name, raw_value, raw_quantity)?;

    let updated = inventory.products.iter_mut().find(|p| p.id == id).map(|product| {
        product.name = name;
        product.value = value;
        product.quantity = quantity;
        product.clone()
    });

    // Editing mode ends on commit whether or not the target still exists.
    inventory.editing = None;

    let Some(result) = updated else {
        warn!(%id, "edited product no longer exists; draft discarded");
        return Ok(None);
    };

    persistence::enqueue_save(state, &inventory.products);
    drop(inventory);

    info!(id = %result.id, name = %result.name, "product updated");
    Ok(Some(result))
}

/// Leave editing mode without touching the sequence.
pub async fn cancel_edit(state: &AppState) {
    let mut inventory = state.inventory.write().await;
    if inventory.editing.take().is_some() {
        debug!("edit canceled");
    }
}

// =============================================================================
// DELETE
// =============================================================================

/// Delete `id` if present, then snapshot the resulting sequence either way,
/// mirroring the screen's unconditional re-save on delete. Editing mode is
/// left alone even when the deleted record is the one being edited; commit
/// then takes the vanished-target path.
pub async fn delete_product(state: &AppState, id: Uuid) -> bool {
    let mut inventory = state.inventory.write().await;
    let removed = match inventory.position(id) {
        Some(pos) => {
            inventory.products.remove(pos);
            true
        }
        None => false,
    };
    persistence::enqueue_save(state, &inventory.products);
    drop(inventory);

    if removed {
        info!(%id, "product deleted");
    } else {
        debug!(%id, "delete requested for unknown product");
    }
    removed
}

// =============================================================================
// READ
// =============================================================================

/// Snapshot of the current sequence, in insertion order.
pub async fn list_products(state: &AppState) -> Vec<Product> {
    state.inventory.read().await.products.clone()
}

#[cfg(test)]
#[path = "inventory_test.rs"]
mod tests;
