//! SQL ordering for version listings
//!
//! Mirrors [`compare_entities`](crate::version::entity::compare_entities) so that
//! rows ordered by the database come back in the same order an in-memory sort
//! would produce. Version rows store the parsed `major`, `minor`, `patch` and
//! `pre_release` columns next to the raw string.

use crate::version::entity::SortDirection;

/// Build the body of an `ORDER BY` clause for version rows.
///
/// `prefix` is the table alias without the dot (empty for none). Label
/// comparison relies on SQLite's default BINARY collation, which matches
/// byte-wise `str` ordering.
pub fn order_by_clause(prefix: &str, direction: SortDirection) -> String {
    let col = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    };

    let (numeric, release_rank, label) = match direction {
        // Pre-releases (rank 0) before the final release (rank 1)
        SortDirection::Ascending => ("ASC", "1 ELSE 0", "ASC"),
        // Final release (rank 0) before its pre-releases (rank 1)
        SortDirection::LatestFirst => ("DESC", "0 ELSE 1", "DESC"),
    };

    format!(
        "{major} {numeric}, {minor} {numeric}, {patch} {numeric}, \
         CASE WHEN {pre} = '' THEN {release_rank} END, {pre} {label}, {id} ASC",
        major = col("major"),
        minor = col("minor"),
        patch = col("patch"),
        pre = col("pre_release"),
        id = col("id"),
    )
}
