//! Item record and write-side validation.
//!
//! # Responsibility
//! - Define the persisted item shape and its identity-less draft form.
//! - Enforce the application conventions (finite, non-negative price and
//!   non-negative quantity) ahead of every write.
//!
//! # Invariants
//! - `id` is assigned by the storage engine and never changes afterwards.
//! - Name is free-form; no uniqueness is implied.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable engine-assigned identifier of a persisted item.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = i64;

/// One persisted inventory row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Engine-assigned identity, stable for the record lifetime.
    pub id: ItemId,
    /// Free-form display name.
    pub name: String,
    /// Unit price. Finite and non-negative by application convention.
    pub price: f64,
    /// Units on hand. Non-negative by application convention.
    pub quantity: i64,
}

/// An item without identity, used as insert input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Convention violations caught before a write reaches SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValidationError {
    NonFinitePrice(f64),
    NegativePrice(f64),
    NegativeQuantity(i64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinitePrice(value) => write!(f, "price must be finite, got {value}"),
            Self::NegativePrice(value) => write!(f, "price must be non-negative, got {value}"),
            Self::NegativeQuantity(value) => {
                write!(f, "quantity must be non-negative, got {value}")
            }
        }
    }
}

impl Error for ItemValidationError {}

impl Item {
    /// Checks the write-side conventions for this record.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_fields(self.price, self.quantity)
    }

    /// Price rendered for display, e.g. `$0.50`.
    pub fn formatted_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Checks the write-side conventions for this draft.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_fields(self.price, self.quantity)
    }

    /// Attaches an identity, producing a full record.
    ///
    /// Used by update flows where the identity is already known.
    pub fn with_id(&self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}

fn validate_fields(price: f64, quantity: i64) -> Result<(), ItemValidationError> {
    if !price.is_finite() {
        return Err(ItemValidationError::NonFinitePrice(price));
    }
    if price < 0.0 {
        return Err(ItemValidationError::NegativePrice(price));
    }
    if quantity < 0 {
        return Err(ItemValidationError::NegativeQuantity(quantity));
    }
    Ok(())
}
