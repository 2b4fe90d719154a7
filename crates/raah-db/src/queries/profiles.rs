use anyhow::Result;
use rusqlite::Row;

use super::OptionalExt;
use crate::Database;
use crate::models::ProfileRow;

impl Database {
    pub fn create_profile(
        &self,
        id: &str,
        user_id: &str,
        fullname: &str,
        bio: &str,
        contact_number: &str,
        portfolio_links_json: &str,
        verification_docs_json: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (id, user_id, fullname, bio, contact_number, portfolio_links, verification_docs)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    user_id,
                    fullname,
                    bio,
                    contact_number,
                    portfolio_links_json,
                    verification_docs_json
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_profile_by_user(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, fullname, bio, contact_number, portfolio_links, verification_docs, created_at, updated_at
                 FROM profiles WHERE user_id = ?1",
            )?;
            let row = stmt.query_row([user_id], read_profile).optional()?;
            Ok(row)
        })
    }

    /// Full-row update; the caller merges partial input into the existing row.
    pub fn update_profile(
        &self,
        user_id: &str,
        fullname: &str,
        bio: &str,
        contact_number: &str,
        portfolio_links_json: &str,
        verification_docs_json: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE profiles
                 SET fullname = ?2, bio = ?3, contact_number = ?4, portfolio_links = ?5,
                     verification_docs = ?6, updated_at = datetime('now')
                 WHERE user_id = ?1",
                rusqlite::params![
                    user_id,
                    fullname,
                    bio,
                    contact_number,
                    portfolio_links_json,
                    verification_docs_json
                ],
            )?;
            Ok(changed > 0)
        })
    }
}

fn read_profile(row: &Row) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        fullname: row.get(2)?,
        bio: row.get(3)?,
        contact_number: row.get(4)?,
        portfolio_links: row.get(5)?,
        verification_docs: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn one_profile_per_user() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "A", "a@raah.dev", "hash", "buyer", "[]").unwrap();

        db.create_profile("p1", "u1", "A Person", "", "+9779800000000", "[]", "[]").unwrap();
        assert!(
            db.create_profile("p2", "u1", "A Person", "", "+9779800000000", "[]", "[]").is_err()
        );

        let profile = db.get_profile_by_user("u1").unwrap().unwrap();
        assert_eq!(profile.id, "p1");
        assert_eq!(profile.fullname, "A Person");
    }

    #[test]
    fn update_replaces_fields() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "A", "a@raah.dev", "hash", "buyer", "[]").unwrap();
        db.create_profile("p1", "u1", "A Person", "", "+977", "[]", "[]").unwrap();

        assert!(
            db.update_profile("u1", "A Person", "builds things", "+977", "[\"https://a.dev\"]", "[]")
                .unwrap()
        );
        let profile = db.get_profile_by_user("u1").unwrap().unwrap();
        assert_eq!(profile.bio, "builds things");
        assert_eq!(profile.portfolio_links, "[\"https://a.dev\"]");

        assert!(!db.update_profile("missing", "x", "", "", "[]", "[]").unwrap());
    }
}
