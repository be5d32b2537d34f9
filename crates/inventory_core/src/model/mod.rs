//! Domain model for inventory records.
//!
//! # Responsibility
//! - Define the canonical item record persisted in the store.
//! - Map raw form input into validated drafts for the entry/edit flows.
//!
//! # Invariants
//! - Every persisted item is identified by a stable engine-assigned `ItemId`.
//! - Price and quantity conventions are checked before persistence, not by
//!   the storage schema.

pub mod form;
pub mod item;
