//! Store lifecycle and the mutation/notification seam.
//!
//! # Responsibility
//! - Own exactly one connection (plus the change hub) per store handle and
//!   keep both behind the access interface.
//! - Publish change events after effective committed writes.
//! - Offer an optional process-wide shared instance behind one-time
//!   initialization.
//!
//! # Invariants
//! - Callers never see the connection; all access goes through store
//!   methods or watch handles.
//! - Concurrent first calls to `open_shared` construct exactly one store;
//!   every caller observes the same instance.
//! - Re-initialization of the shared store with a different path is
//!   rejected, never silently honored.

use crate::db::{open_db, open_db_in_memory, DbError, SchemaMismatchPolicy};
use crate::model::item::{Item, ItemDraft, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoResult, SqliteItemRepository};
use crate::watch::{ChangeHub, ItemWatch, ItemsWatch, StoreEvent};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default on-disk file name of the item store.
pub const STORE_FILE_NAME: &str = "item_database.sqlite3";

static SHARED_STORE: OnceCell<Store> = OnceCell::new();

/// Where and how to open a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    path: PathBuf,
    mismatch_policy: SchemaMismatchPolicy,
}

impl StoreConfig {
    /// Configuration for a store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mismatch_policy: SchemaMismatchPolicy::default(),
        }
    }

    /// Configuration for the default store file inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(STORE_FILE_NAME))
    }

    /// Opts into a schema-mismatch policy other than the default reject.
    pub fn on_schema_mismatch(mut self, policy: SchemaMismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// The shared store is already bound to a different file.
    SharedConfigConflict {
        active: PathBuf,
        requested: PathBuf,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SharedConfigConflict { active, requested } => write!(
                f,
                "shared store already open at `{}`; refusing to switch to `{}`",
                active.display(),
                requested.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SharedConfigConflict { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

pub(crate) struct StoreInner {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
    hub: ChangeHub,
}

impl StoreInner {
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock still guards a usable connection.
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Shared handle to one open item store.
///
/// Cloning is cheap and every clone refers to the same store. The intended
/// wiring is dependency injection: open the store once at startup and pass
/// handles to whoever needs them.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Opens (creating if missing) the store file named by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = open_db(config.path(), config.mismatch_policy)?;
        Ok(Self::from_connection(Some(config.path.clone()), conn))
    }

    /// Opens a private in-memory store, mainly for tests and smoke probes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = open_db_in_memory()?;
        Ok(Self::from_connection(None, conn))
    }

    /// Returns the process-wide shared store, constructing it on first call.
    ///
    /// Concurrent first callers all observe the same instance. Later calls
    /// with a config naming a different path are rejected.
    pub fn open_shared(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = SHARED_STORE.get_or_try_init(|| Self::open(config))?;
        if store.inner.path.as_deref() != Some(config.path()) {
            return Err(StoreError::SharedConfigConflict {
                active: store
                    .inner
                    .path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(":memory:")),
                requested: config.path.clone(),
            });
        }
        Ok(store.clone())
    }

    /// Returns the shared store if `open_shared` has run, without opening.
    pub fn shared() -> Option<Self> {
        SHARED_STORE.get().cloned()
    }

    /// Whether two handles refer to the same underlying store.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// File path backing this store; `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    fn from_connection(path: Option<PathBuf>, conn: Connection) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path,
                conn: Mutex::new(conn),
                hub: ChangeHub::new(),
            }),
        }
    }

    /// Adds an item with engine-assigned identity.
    pub fn insert(&self, draft: &ItemDraft) -> RepoResult<ItemId> {
        let id = {
            let conn = self.inner.conn();
            SqliteItemRepository::new(&conn).insert(draft)?
        };
        self.inner.hub.publish(StoreEvent::Inserted(id));
        Ok(id)
    }

    /// Adds an item under an explicit identity; `false` when a duplicate
    /// identity made the insert a no-op.
    pub fn insert_with_id(&self, item: &Item) -> RepoResult<bool> {
        let inserted = {
            let conn = self.inner.conn();
            SqliteItemRepository::new(&conn).insert_with_id(item)?
        };
        if inserted {
            self.inner.hub.publish(StoreEvent::Inserted(item.id));
        }
        Ok(inserted)
    }

    /// Replaces the row keyed by `item.id`; `false` when absent.
    pub fn update(&self, item: &Item) -> RepoResult<bool> {
        let changed = {
            let conn = self.inner.conn();
            SqliteItemRepository::new(&conn).update(item)?
        };
        if changed {
            self.inner.hub.publish(StoreEvent::Updated(item.id));
        }
        Ok(changed)
    }

    /// Removes the row keyed by `id`; `false` when absent.
    pub fn delete(&self, id: ItemId) -> RepoResult<bool> {
        let deleted = {
            let conn = self.inner.conn();
            SqliteItemRepository::new(&conn).delete(id)?
        };
        if deleted {
            self.inner.hub.publish(StoreEvent::Deleted(id));
        }
        Ok(deleted)
    }

    pub fn get(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let conn = self.inner.conn();
        SqliteItemRepository::new(&conn).get(id)
    }

    pub fn list_all(&self) -> RepoResult<Vec<Item>> {
        let conn = self.inner.conn();
        SqliteItemRepository::new(&conn).list_all()
    }

    /// Subscribes to full-list snapshots ordered by name.
    pub fn watch_items(&self) -> ItemsWatch {
        ItemsWatch::new(Arc::downgrade(&self.inner), self.inner.hub.subscribe())
    }

    /// Subscribes to snapshots of the row keyed by `id`.
    pub fn watch_item(&self, id: ItemId) -> ItemWatch {
        ItemWatch::new(Arc::downgrade(&self.inner), self.inner.hub.subscribe(), id)
    }
}
