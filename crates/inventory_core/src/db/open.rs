//! Connection bootstrap for the item store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply migrations before returning a usable connection.
//! - Carry out the destructive rebuild when the caller opted into it.
//!
//! # Invariants
//! - Returned connections have all migrations applied.
//! - Rebuilds remove the database file and its sidecars before reopening.

use super::migrations::apply_migrations;
use super::{DbError, DbResult, SchemaMismatchPolicy};
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the store database file and applies all pending migrations.
///
/// When the file's schema version is ahead of this binary, `policy` decides
/// between failing the open and rebuilding the store from scratch.
///
/// # Side effects
/// - Emits `store_open` events; a rebuild additionally emits `store_rebuild`
///   at `warn` level since it destroys user data.
pub fn open_db(path: impl AsRef<Path>, policy: SchemaMismatchPolicy) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=file");

    match try_open(path) {
        Ok(conn) => {
            info!(
                "event=store_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(DbError::SchemaVersionAhead {
            db_version,
            latest_supported,
        }) if policy == SchemaMismatchPolicy::Rebuild => {
            warn!(
                "event=store_rebuild module=db status=start db_version={db_version} \
                 latest_supported={latest_supported}"
            );
            remove_store_files(path)?;
            let conn = try_open(path)?;
            warn!(
                "event=store_rebuild module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory store and applies all pending migrations.
///
/// A fresh in-memory database always starts at version zero, so no mismatch
/// policy applies.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=memory");

    let mut conn = Connection::open_in_memory()?;
    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=memory duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn try_open(path: &Path) -> DbResult<Connection> {
    let mut conn = Connection::open(path)?;
    bootstrap_connection(&mut conn)?;
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

fn remove_store_files(path: &Path) -> DbResult<()> {
    std::fs::remove_file(path).map_err(DbError::Rebuild)?;
    // SQLite sidecars may exist depending on the journal mode the file was
    // last used with.
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut sidecar = path.as_os_str().to_os_string();
        sidecar.push(suffix);
        let sidecar = std::path::PathBuf::from(sidecar);
        if sidecar.exists() {
            std::fs::remove_file(&sidecar).map_err(DbError::Rebuild)?;
        }
    }
    Ok(())
}
