//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `inventory_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use inventory_core::{ItemDraft, ItemService, Store};

fn main() {
    println!("inventory_core version={}", inventory_core::core_version());
    match smoke() {
        Ok(count) => println!("inventory_core smoke=ok items={count}"),
        Err(err) => {
            eprintln!("inventory_core smoke=error {err}");
            std::process::exit(1);
        }
    }
}

// One in-memory create/list cycle through the service layer.
fn smoke() -> Result<usize, Box<dyn std::error::Error>> {
    let store = Store::open_in_memory()?;
    let service = ItemService::new(store);
    service.create_item(&ItemDraft::new("Bolt", 0.50, 100))?;
    Ok(service.items()?.len())
}
