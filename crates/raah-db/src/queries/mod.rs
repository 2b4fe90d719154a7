pub mod consultants;
pub mod jobs;
pub mod messaging;
pub mod profiles;
pub mod proposals;
pub mod reviews;
pub mod stats;
pub mod users;

use anyhow::Result;
use rusqlite::Row;

use crate::models::IdentityRow;

/// Builds the aliased identity column list every populated JOIN selects,
/// in `read_identity` order.
pub(crate) fn identity_cols(alias: &str) -> String {
    ["id", "name", "email", "profile_image", "is_online", "account_type"]
        .map(|col| format!("{alias}.{col}"))
        .join(", ")
}

/// Reads an identity projection starting at `offset` within a joined row.
pub(crate) fn read_identity(row: &Row, offset: usize) -> rusqlite::Result<IdentityRow> {
    Ok(IdentityRow {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        email: row.get(offset + 2)?,
        profile_image: row.get(offset + 3)?,
        is_online: row.get(offset + 4)?,
        account_type: row.get(offset + 5)?,
    })
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
