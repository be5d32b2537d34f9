//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the only permitted channel between callers and the `items`
//!   table.
//! - Map rows to [`Item`] records with hand-written column access.
//!
//! # Invariants
//! - `insert` lets the engine assign identity; it cannot conflict.
//! - `insert_with_id` uses `INSERT OR IGNORE`: a duplicate identity is a
//!   reported no-op, not a failure.
//! - `update`/`delete` against a missing row return `false`, not an error.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{Item, ItemDraft, ItemId, ItemValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT id, name, price, quantity FROM items";

const REQUIRED_COLUMNS: [&str; 4] = ["id", "name", "price", "quantity"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and connection readiness.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected \
                 {expected_version}; open the store through the bootstrap path first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` does not exist")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` does not exist")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// The access interface: the fixed set of operations through which all
/// item access occurs.
pub trait ItemRepository {
    /// Adds a row with engine-assigned identity and returns that identity.
    fn insert(&self, draft: &ItemDraft) -> RepoResult<ItemId>;
    /// Adds a row under an explicit identity; returns `false` when a
    /// duplicate identity caused the insert to be ignored.
    fn insert_with_id(&self, item: &Item) -> RepoResult<bool>;
    /// Replaces the row keyed by `item.id`; returns `false` when absent.
    fn update(&self, item: &Item) -> RepoResult<bool>;
    /// Removes the row keyed by `id`; returns `false` when absent.
    fn delete(&self, id: ItemId) -> RepoResult<bool>;
    fn get(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Full row set ordered by name ascending (engine default collation).
    fn list_all(&self) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Creates a repository after checking the connection is ready: the
    /// schema version matches this binary and the `items` table carries all
    /// required columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    // Store-owned connections go through the bootstrap path, which already
    // guarantees readiness.
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert(&self, draft: &ItemDraft) -> RepoResult<ItemId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO items (name, price, quantity) VALUES (?1, ?2, ?3);",
            params![draft.name.as_str(), draft.price, draft.quantity],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_with_id(&self, item: &Item) -> RepoResult<bool> {
        item.validate()?;

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO items (id, name, price, quantity) VALUES (?1, ?2, ?3, ?4);",
            params![item.id, item.name.as_str(), item.price, item.quantity],
        )?;

        Ok(changed > 0)
    }

    fn update(&self, item: &Item) -> RepoResult<bool> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE items SET name = ?1, price = ?2, quantity = ?3 WHERE id = ?4;",
            params![item.name.as_str(), item.price, item.quantity, item.id],
        )?;

        Ok(changed > 0)
    }

    fn delete(&self, id: ItemId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id])?;

        Ok(changed > 0)
    }

    fn get(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY name ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        price: row.get("price")?,
        quantity: row.get("quantity")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "items")? {
        return Err(RepoError::MissingRequiredTable("items"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "items", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "items",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
