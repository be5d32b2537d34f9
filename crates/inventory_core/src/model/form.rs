//! Form-state mapping for the entry and edit flows.
//!
//! # Responsibility
//! - Hold item fields as the raw strings a UI layer collects.
//! - Convert them into a validated [`ItemDraft`] with field-level errors.

use crate::model::item::{Item, ItemDraft};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw-string form state for one item.
///
/// A default instance models an empty entry form; [`ItemForm::from`] an
/// existing [`Item`] seeds the edit flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
}

/// Field-level failures when parsing form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    BlankName,
    InvalidPrice(String),
    InvalidQuantity(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidPrice(value) => write!(f, "price is not a valid number: `{value}`"),
            Self::InvalidQuantity(value) => {
                write!(f, "quantity is not a valid integer: `{value}`")
            }
        }
    }
}

impl Error for FormError {}

impl ItemForm {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Parses the raw fields into an insert-ready draft.
    ///
    /// Surrounding whitespace is trimmed on every field. Convention checks
    /// (non-negative price/quantity) stay with the repository write path;
    /// this only rejects input that has no numeric meaning at all.
    pub fn parse(&self) -> Result<ItemDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::BlankName);
        }

        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidPrice(self.price.clone()))?;

        let quantity: i64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidQuantity(self.quantity.clone()))?;

        Ok(ItemDraft::new(name, price, quantity))
    }
}

impl From<&Item> for ItemForm {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price.to_string(),
            quantity: item.quantity.to_string(),
        }
    }
}
