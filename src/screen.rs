//! Screen — the single inventory screen as a line-driven terminal loop.
//!
//! DESIGN
//! ======
//! One form, one grid. The form's submit is `add` in idle mode and `update`
//! while a record is being edited, matching the two-mode screen. Edit and
//! delete take a record id (any unambiguous prefix); the grid prints name,
//! unit value to two decimals, and quantity. Validation failures come back
//! from the inventory service and are shown as blocking notifications; the
//! loop then continues.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::services::inventory;
use crate::state::{AppState, Product};

// =============================================================================
// COMMANDS
// =============================================================================

/// A parsed screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { name: String, value: String, quantity: String },
    Edit { id: String },
    Update { name: String, value: String, quantity: String },
    Cancel,
    Delete { id: String },
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    #[error("unknown command: {0:?} (try `help`)")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("no product id starts with {0:?}")]
    UnknownId(String),
    #[error("id prefix {0:?} is ambiguous")]
    AmbiguousId(String),
}

/// Parse one input line into a command.
///
/// `add` and `update` read the two trailing tokens as value and quantity so
/// product names may contain spaces.
///
/// # Errors
///
/// Returns `UnknownCommand` or `Usage` for lines that do not parse.
pub fn parse_command(line: &str) -> Result<Command, ScreenError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = tokens.split_first() else {
        return Err(ScreenError::UnknownCommand(String::new()));
    };

    match keyword {
        "add" => {
            let (name, value, quantity) = parse_form(args, "add <name> <value> <quantity>")?;
            Ok(Command::Add { name, value, quantity })
        }
        "update" => {
            let (name, value, quantity) = parse_form(args, "update <name> <value> <quantity>")?;
            Ok(Command::Update { name, value, quantity })
        }
        "edit" => match args {
            [id] => Ok(Command::Edit { id: (*id).to_owned() }),
            _ => Err(ScreenError::Usage("edit <id>")),
        },
        "delete" => match args {
            [id] => Ok(Command::Delete { id: (*id).to_owned() }),
            _ => Err(ScreenError::Usage("delete <id>")),
        },
        "cancel" => Ok(Command::Cancel),
        "list" | "ls" => Ok(Command::List),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ScreenError::UnknownCommand(other.to_owned())),
    }
}

fn parse_form(args: &[&str], usage: &'static str) -> Result<(String, String, String), ScreenError> {
    let [name @ .., value, quantity] = args else {
        return Err(ScreenError::Usage(usage));
    };
    if name.is_empty() {
        return Err(ScreenError::Usage(usage));
    }
    Ok((name.join(" "), (*value).to_owned(), (*quantity).to_owned()))
}

/// Resolve an id prefix against the current sequence.
///
/// # Errors
///
/// Returns `UnknownId` when nothing matches and `AmbiguousId` when more than
/// one record does.
pub fn resolve_id(products: &[Product], prefix: &str) -> Result<Uuid, ScreenError> {
    let prefix = prefix.to_lowercase();
    let mut matches = products.iter().filter(|p| p.id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(product), None) => Ok(product.id),
        (Some(_), Some(_)) => Err(ScreenError::AmbiguousId(prefix)),
        (None, _) => Err(ScreenError::UnknownId(prefix)),
    }
}

// =============================================================================
// RENDERING
// =============================================================================

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_owned()
}

fn grid_line(product: &Product) -> String {
    format!(
        "{:<10} {:<24} {:>10.2} {:>6}",
        short_id(product.id),
        product.name,
        product.value,
        product.quantity
    )
}

fn render_grid(products: &[Product]) {
    if products.is_empty() {
        println!("(no products)");
        return;
    }
    println!("{:<10} {:<24} {:>10} {:>6}", "id", "name", "value", "qty");
    for product in products {
        println!("{}", grid_line(product));
    }
}

fn print_help() {
    println!("add <name> <value> <quantity>     add a product");
    println!("edit <id>                         stage a product for editing");
    println!("update <name> <value> <quantity>  submit the staged edit");
    println!("cancel                            leave editing mode");
    println!("delete <id>                       remove a product");
    println!("list                              show the grid");
    println!("quit                              exit");
}

// =============================================================================
// LOOP
// =============================================================================

/// Run the screen loop until `quit` or stdin closes.
pub async fn run(state: &AppState) {
    render_grid(&inventory::list_products(state).await);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let editing = state.inventory.read().await.editing.is_some();
        print!("{}", if editing { "edit> " } else { "add> " });
        let _ = std::io::stdout().flush();

        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(command) => {
                if !dispatch(state, command).await {
                    break;
                }
            }
            Err(e) => println!("! {e}"),
        }
    }
}

async fn dispatch(state: &AppState, command: Command) -> bool {
    match command {
        Command::Add { name, value, quantity } => {
            match inventory::add_product(state, &name, &value, &quantity).await {
                Ok(product) => println!("added {}", grid_line(&product)),
                Err(e) => println!("! {e}"),
            }
        }
        Command::Edit { id } => {
            let products = inventory::list_products(state).await;
            match resolve_id(&products, &id) {
                Ok(id) => {
                    if let Some(draft) = inventory::begin_edit(state, id).await {
                        println!(
                            "editing {}: name={:?} value={} quantity={}",
                            short_id(draft.id),
                            draft.name,
                            draft.value,
                            draft.quantity
                        );
                        println!("submit with `update <name> <value> <quantity>` or `cancel`");
                    }
                }
                Err(e) => println!("! {e}"),
            }
        }
        Command::Update { name, value, quantity } => {
            let was_editing = state.inventory.read().await.editing.is_some();
            match inventory::commit_edit(state, &name, &value, &quantity).await {
                Ok(Some(product)) => println!("updated {}", grid_line(&product)),
                Ok(None) if was_editing => println!("! edited product no longer exists"),
                Ok(None) => println!("! nothing is being edited (try `edit <id>`)"),
                Err(e) => println!("! {e}"),
            }
        }
        Command::Cancel => {
            inventory::cancel_edit(state).await;
        }
        Command::Delete { id } => {
            let products = inventory::list_products(state).await;
            match resolve_id(&products, &id) {
                Ok(id) => {
                    inventory::delete_product(state, id).await;
                    println!("deleted {}", short_id(id));
                }
                Err(e) => println!("! {e}"),
            }
        }
        Command::List => render_grid(&inventory::list_products(state).await),
        Command::Help => print_help(),
        Command::Quit => return false,
    }
    true
}

#[cfg(test)]
#[path = "screen_test.rs"]
mod tests;
