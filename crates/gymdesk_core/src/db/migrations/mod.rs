//! Schema steps for the local attendance database.
//!
//! # Responsibility
//! - Version 1 creates the roster tables: employees, members, classes and
//!   class enrollment.
//! - Version 2 adds `staff_attendance` (keyed by employee and day) and
//!   `class_attendance` (keyed by class and member), each with a status CHECK.
//!
//! # Invariants
//! - Steps are numbered from 1 without gaps; the last one is what
//!   `SqliteAttendanceStore::try_new` expects to find.
//! - All pending steps commit together with the bumped `PRAGMA user_version`.
//! - A file stamped with a higher version than this build knows is refused.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_attendance.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Pending steps run in one transaction; a failing step leaves the schema
/// at its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    info!(
        "event=db_migrate module=db status=start from_version={current_version} to_version={latest}"
    );
    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok version={latest}");
    Ok(())
}

/// Reads the schema version mirrored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
