use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::UserRow;

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        password_hash: &str,
        account_type: &str,
        roles_json: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password, account_type, roles)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, email, password_hash, account_type, roles_json],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn set_user_online(&self, id: &str, online: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET is_online = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, online],
            )?;
            Ok(())
        })
    }

    /// The bootstrap-provisioned support account (roles contains \"admin\").
    pub fn find_admin_user(&self) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLS} FROM users WHERE roles LIKE '%\"admin\"%' LIMIT 1"))?;
            let row = stmt.query_row([], read_user).optional()?;
            Ok(row)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLS} FROM users ORDER BY created_at DESC"))?;
            let rows = stmt
                .query_map([], read_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_users_by_account_type(&self, account_type: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLS} FROM users WHERE account_type = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt
                .query_map([account_type], read_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no such user exists.
    pub fn set_user_banned(&self, id: &str, banned: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_banned = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, banned],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

const USER_COLS: &str = "id, name, email, password, account_type, roles, profile_image, phone, \
                         is_verified, is_banned, is_online, created_at, updated_at";

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLS} FROM users WHERE {column} = ?1"))?;
    let row = stmt.query_row([value], read_user).optional()?;
    Ok(row)
}

fn read_user(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        account_type: row.get(4)?,
        roles: row.get(5)?,
        profile_image: row.get(6)?,
        phone: row.get(7)?,
        is_verified: row.get(8)?,
        is_banned: row.get(9)?,
        is_online: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn seed_user(db: &Database, id: &str, email: &str) {
        db.create_user(id, "Test User", email, "hash", "buyer", "[]").unwrap();
    }

    #[test]
    fn create_and_fetch_by_email_and_id() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "u1", "a@raah.dev");

        let by_email = db.get_user_by_email("a@raah.dev").unwrap().unwrap();
        assert_eq!(by_email.id, "u1");
        assert!(!by_email.is_banned);

        let by_id = db.get_user_by_id("u1").unwrap().unwrap();
        assert_eq!(by_id.email, "a@raah.dev");

        assert!(db.get_user_by_id("missing").unwrap().is_none());
        assert!(db.user_exists("u1").unwrap());
        assert!(!db.user_exists("missing").unwrap());
    }

    #[test]
    fn duplicate_email_is_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "u1", "a@raah.dev");
        let err = db.create_user("u2", "Other", "a@raah.dev", "hash", "buyer", "[]");
        assert!(err.is_err());
    }

    #[test]
    fn ban_unban_and_delete() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "u1", "a@raah.dev");

        assert!(db.set_user_banned("u1", true).unwrap());
        assert!(db.get_user_by_id("u1").unwrap().unwrap().is_banned);
        assert!(db.set_user_banned("u1", false).unwrap());
        assert!(!db.set_user_banned("missing", true).unwrap());

        assert!(db.delete_user("u1").unwrap());
        assert!(!db.delete_user("u1").unwrap());
    }

    #[test]
    fn find_admin_matches_role_entry() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "u1", "a@raah.dev");
        assert!(db.find_admin_user().unwrap().is_none());

        db.create_user("adm", "Admin", "admin@raah.dev", "hash", "buyer", "[\"admin\"]").unwrap();
        let admin = db.find_admin_user().unwrap().unwrap();
        assert_eq!(admin.id, "adm");
    }
}
