//! Version/description extraction for migration identifiers.
//!
//! Migrations are named `<version>_<description>`. When registered through
//! [`submit_migration!`](crate::submit_migration) the identifier is the
//! source file path (`file!()`), so `src/migrations/1_setup_indexes.rs`
//! yields version `1` and description `setup_indexes`.

use crate::errors::{MigrateError, MigrateResult};

/// Suffix every migration source file must carry.
pub const MIGRATION_SOURCE_SUFFIX: &str = ".rs";

const DELIMITER: char = '_';

/// Parse a bare `<version>_<description>` identifier.
pub fn parse_identifier(identifier: &str) -> MigrateResult<(u64, String)> {
    let Some((prefix, description)) = identifier.split_once(DELIMITER) else {
        return Err(MigrateError::invalid_identifier(identifier, "missing '_' delimiter"));
    };

    // u64::from_str also accepts a leading '+'
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MigrateError::invalid_identifier(identifier, "version prefix is not numeric"));
    }

    let version = prefix
        .parse::<u64>()
        .map_err(|err| MigrateError::invalid_identifier(identifier, format!("invalid version: {err}")))?;

    Ok((version, description.to_string()))
}

/// Parse a migration source path such as `migrations/2_backfill_slugs.rs`.
///
/// Only the final path component is considered, and it must end with
/// [`MIGRATION_SOURCE_SUFFIX`].
pub fn parse_source_path(path: &str) -> MigrateResult<(u64, String)> {
    let base = file_name(path);

    let Some(stem) = base.strip_suffix(MIGRATION_SOURCE_SUFFIX) else {
        return Err(MigrateError::invalid_identifier(
            base,
            format!("expected a {MIGRATION_SOURCE_SUFFIX} migration source"),
        ));
    };

    parse_identifier(stem).map_err(|err| match err {
        MigrateError::InvalidIdentifier { reason, .. } => MigrateError::invalid_identifier(base, reason),
        other => other,
    })
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
