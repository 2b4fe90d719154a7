use anyhow::Result;
use rusqlite::Connection;

use crate::Database;
use crate::models::StatsRow;

impl Database {
    /// Dashboard aggregates, computed fresh on every call.
    pub fn admin_stats(&self) -> Result<StatsRow> {
        self.with_conn(|conn| {
            Ok(StatsRow {
                total_users: count(conn, "SELECT COUNT(*) FROM users")?,
                total_buyers: count(conn, "SELECT COUNT(*) FROM users WHERE account_type = 'buyer'")?,
                total_consultants: count(conn, "SELECT COUNT(*) FROM consultants")?,
                verified_consultants: count(
                    conn,
                    "SELECT COUNT(*) FROM consultants WHERE verification = 'verified'",
                )?,
                pending_consultants: count(
                    conn,
                    "SELECT COUNT(*) FROM consultants WHERE verification = 'pending'",
                )?,
                total_jobs: count(conn, "SELECT COUNT(*) FROM jobs")?,
                open_jobs: count(conn, "SELECT COUNT(*) FROM jobs WHERE status = 'open'")?,
                total_proposals: count(conn, "SELECT COUNT(*) FROM proposals")?,
                total_reviews: count(conn, "SELECT COUNT(*) FROM reviews")?,
                total_messages: count(conn, "SELECT COUNT(*) FROM messages")?,
            })
        })
    }
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    let n = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn counts_reflect_inserts() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("b1", "Buyer", "b@raah.dev", "hash", "buyer", "[]").unwrap();
        db.create_user("cu1", "C", "c@raah.dev", "hash", "consultant", "[]").unwrap();
        db.create_consultant("c1", "cu1", "Engineer", "", "[]", 40.0, "", "[]").unwrap();
        db.create_job("j1", "b1", "engineering", "Survey", "d", 100.0, 400.0, "2w", "KTM", "[]", "[]")
            .unwrap();
        db.create_proposal("p1", "j1", "c1", 250.0, "10 days", "cover").unwrap();

        let stats = db.admin_stats().unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_buyers, 1);
        assert_eq!(stats.total_consultants, 1);
        assert_eq!(stats.verified_consultants, 0);
        assert_eq!(stats.total_jobs, 1);
        assert_eq!(stats.open_jobs, 1);
        assert_eq!(stats.total_proposals, 1);
        assert_eq!(stats.total_messages, 0);
    }
}
