//! Use-case services over the item store.
//!
//! # Responsibility
//! - Orchestrate form mapping and store calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod item_service;
