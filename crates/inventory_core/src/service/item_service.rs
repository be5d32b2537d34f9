//! Item use-case service.
//!
//! # Responsibility
//! - Provide the entry/edit/list/detail flows as stable entry points.
//! - Delegate persistence to the store; never bypass its notification seam.

use crate::model::form::{FormError, ItemForm};
use crate::model::item::{Item, ItemDraft, ItemId};
use crate::repo::item_repo::{RepoError, RepoResult};
use crate::store::Store;
use crate::watch::{ItemWatch, ItemsWatch};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a form-based use case: either the input did not parse or the
/// write itself failed.
#[derive(Debug)]
pub enum ServiceError {
    Form(FormError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case wrapper over one store handle.
pub struct ItemService {
    store: Store,
}

impl ItemService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Creates an item from an already-built draft.
    pub fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemId> {
        self.store.insert(draft)
    }

    /// Entry-screen flow: parse the form, then persist.
    pub fn create_from_form(&self, form: &ItemForm) -> Result<ItemId, ServiceError> {
        let draft = form.parse()?;
        Ok(self.store.insert(&draft)?)
    }

    /// Replaces an existing item; `false` when no such row exists.
    pub fn update_item(&self, item: &Item) -> RepoResult<bool> {
        self.store.update(item)
    }

    /// Edit-screen flow: parse the form and replace the row keyed by `id`.
    pub fn update_from_form(&self, id: ItemId, form: &ItemForm) -> Result<bool, ServiceError> {
        let draft = form.parse()?;
        Ok(self.store.update(&draft.with_id(id))?)
    }

    /// Removes an item; `false` when no such row exists.
    pub fn delete_item(&self, id: ItemId) -> RepoResult<bool> {
        self.store.delete(id)
    }

    pub fn item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.store.get(id)
    }

    /// Full inventory ordered by name.
    pub fn items(&self) -> RepoResult<Vec<Item>> {
        self.store.list_all()
    }

    pub fn watch_items(&self) -> ItemsWatch {
        self.store.watch_items()
    }

    pub fn watch_item(&self, id: ItemId) -> ItemWatch {
        self.store.watch_item(id)
    }
}
