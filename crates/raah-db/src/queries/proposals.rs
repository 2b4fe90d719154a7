use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::ToSql;

use super::{OptionalExt, identity_cols};
use crate::Database;
use crate::models::{ConsultantBriefRow, JobBriefRow, ProposalRow};

/// Outcome of a bid insert; one proposal per (job, consultant).
#[derive(Debug, PartialEq, Eq)]
pub enum ProposalCreate {
    Created,
    Duplicate,
}

impl Database {
    /// Inserts the bid and bumps the job's proposal counter in one
    /// transaction. The counter moves in SQL, never read-then-write here.
    pub fn create_proposal(
        &self,
        id: &str,
        job_id: &str,
        consultant_id: &str,
        bid_amount: f64,
        delivery_time: &str,
        cover_letter: &str,
    ) -> Result<ProposalCreate> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM proposals WHERE job_id = ?1 AND consultant_id = ?2",
                    rusqlite::params![job_id, consultant_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(ProposalCreate::Duplicate);
            }

            tx.execute(
                "INSERT INTO proposals (id, job_id, consultant_id, bid_amount, delivery_time, cover_letter)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, job_id, consultant_id, bid_amount, delivery_time, cover_letter],
            )?;
            tx.execute(
                "UPDATE jobs SET proposals_count = proposals_count + 1, updated_at = datetime('now')
                 WHERE id = ?1",
                [job_id],
            )?;

            tx.commit()?;
            Ok(ProposalCreate::Created)
        })
    }

    pub fn get_proposal(&self, id: &str) -> Result<Option<ProposalRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE p.id = ?1", select_proposal_base()))?;
            let row = stmt.query_row([id], read_proposal).optional()?;
            Ok(row)
        })
    }

    pub fn list_proposals(
        &self,
        status: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<ProposalRow>, i64)> {
        let (where_clause, values): (String, Vec<Box<dyn ToSql>>) = match status {
            Some(status) => (" WHERE p.status = ?1".into(), vec![Box::new(status.to_string())]),
            None => (String::new(), Vec::new()),
        };

        self.with_conn(|conn| {
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM proposals p{where_clause}"),
                params.as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "{}{} ORDER BY p.created_at DESC LIMIT {} OFFSET {}",
                select_proposal_base(),
                where_clause,
                limit,
                offset
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), read_proposal)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, total))
        })
    }

    pub fn proposals_by_job(&self, job_id: &str) -> Result<Vec<ProposalRow>> {
        self.query_proposals("p.job_id = ?1", job_id)
    }

    pub fn proposals_by_consultant(&self, consultant_id: &str) -> Result<Vec<ProposalRow>> {
        self.query_proposals("p.consultant_id = ?1", consultant_id)
    }

    /// Proposals received across all of a buyer's jobs.
    pub fn proposals_by_buyer(&self, buyer_id: &str) -> Result<Vec<ProposalRow>> {
        self.query_proposals("j.buyer_id = ?1", buyer_id)
    }

    fn query_proposals(&self, condition: &str, value: &str) -> Result<Vec<ProposalRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE {condition} ORDER BY p.created_at DESC",
                select_proposal_base()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([value], read_proposal)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Full-row update; the caller merges partial input into the existing row.
    pub fn update_proposal(
        &self,
        id: &str,
        bid_amount: f64,
        delivery_time: &str,
        cover_letter: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE proposals
                 SET bid_amount = ?2, delivery_time = ?3, cover_letter = ?4, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, bid_amount, delivery_time, cover_letter],
            )?;
            Ok(changed > 0)
        })
    }

    /// Accepting a bid settles the whole job in one transaction: the proposal
    /// is accepted, its siblings still pending are rejected, and the job moves
    /// to in_progress with the consultant attached.
    pub fn accept_proposal(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let target: Option<(String, String)> = tx
                .query_row(
                    "SELECT job_id, consultant_id FROM proposals WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((job_id, consultant_id)) = target else {
                return Ok(false);
            };

            tx.execute(
                "UPDATE proposals SET status = 'accepted', updated_at = datetime('now') WHERE id = ?1",
                [id],
            )?;
            tx.execute(
                "UPDATE proposals SET status = 'rejected', updated_at = datetime('now')
                 WHERE job_id = ?1 AND id <> ?2 AND status = 'pending'",
                rusqlite::params![job_id, id],
            )?;
            tx.execute(
                "UPDATE jobs SET status = 'in_progress', hired_consultant_id = ?2, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![job_id, consultant_id],
            )?;

            tx.commit()?;
            Ok(true)
        })
    }

    pub fn set_proposal_status(&self, id: &str, status: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE proposals SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, status],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_proposal(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let job_id: Option<String> = tx
                .query_row("SELECT job_id FROM proposals WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            let Some(job_id) = job_id else {
                return Ok(false);
            };

            tx.execute("DELETE FROM proposals WHERE id = ?1", [id])?;
            tx.execute(
                "UPDATE jobs SET proposals_count = MAX(proposals_count - 1, 0), updated_at = datetime('now')
                 WHERE id = ?1",
                [&job_id],
            )?;

            tx.commit()?;
            Ok(true)
        })
    }
}

fn select_proposal_base() -> String {
    format!(
        "SELECT p.id, p.bid_amount, p.delivery_time, p.cover_letter, p.status, p.created_at, p.updated_at,
                j.id, j.title, j.category, j.description, j.budget_min, j.budget_max, j.status,
                c.id, c.title, c.hourly_rate, c.rating,
                {}
         FROM proposals p
         JOIN jobs j ON j.id = p.job_id
         JOIN consultants c ON c.id = p.consultant_id
         JOIN users u ON u.id = c.user_id",
        identity_cols("u")
    )
}

fn read_proposal(row: &Row) -> rusqlite::Result<ProposalRow> {
    Ok(ProposalRow {
        id: row.get(0)?,
        bid_amount: row.get(1)?,
        delivery_time: row.get(2)?,
        cover_letter: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        job: JobBriefRow {
            id: row.get(7)?,
            title: row.get(8)?,
            category: row.get(9)?,
            description: row.get(10)?,
            budget_min: row.get(11)?,
            budget_max: row.get(12)?,
            status: row.get(13)?,
        },
        consultant: ConsultantBriefRow {
            id: row.get(14)?,
            title: row.get(15)?,
            hourly_rate: row.get(16)?,
            rating: row.get(17)?,
            user: super::read_identity(row, 18)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::ProposalCreate;
    use crate::Database;

    fn seed(db: &Database) {
        db.create_user("b1", "Buyer", "b@raah.dev", "hash", "buyer", "[]").unwrap();
        db.create_user("cu1", "C1", "c1@raah.dev", "hash", "consultant", "[]").unwrap();
        db.create_user("cu2", "C2", "c2@raah.dev", "hash", "consultant", "[]").unwrap();
        db.create_consultant("c1", "cu1", "Engineer", "", "[]", 40.0, "", "[]").unwrap();
        db.create_consultant("c2", "cu2", "Surveyor", "", "[]", 30.0, "", "[]").unwrap();
        db.create_job("j1", "b1", "engineering", "Survey", "desc", 100.0, 400.0, "2 weeks",
                      "Kathmandu", "[]", "[]")
            .unwrap();
    }

    #[test]
    fn create_bumps_counter_and_blocks_duplicates() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let outcome = db.create_proposal("p1", "j1", "c1", 250.0, "10 days", "I can do it").unwrap();
        assert_eq!(outcome, ProposalCreate::Created);
        assert_eq!(db.get_job("j1").unwrap().unwrap().proposals_count, 1);

        let outcome = db.create_proposal("p-dup", "j1", "c1", 300.0, "7 days", "again").unwrap();
        assert_eq!(outcome, ProposalCreate::Duplicate);
        assert_eq!(db.get_job("j1").unwrap().unwrap().proposals_count, 1);
    }

    #[test]
    fn populated_lookup_carries_job_and_consultant() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.create_proposal("p1", "j1", "c1", 250.0, "10 days", "cover").unwrap();

        let row = db.get_proposal("p1").unwrap().unwrap();
        assert_eq!(row.job.title, "Survey");
        assert_eq!(row.consultant.user.id, "cu1");
        assert_eq!(row.status, "pending");

        assert_eq!(db.proposals_by_job("j1").unwrap().len(), 1);
        assert_eq!(db.proposals_by_consultant("c1").unwrap().len(), 1);
        assert_eq!(db.proposals_by_buyer("b1").unwrap().len(), 1);
    }

    #[test]
    fn accept_settles_job_and_rejects_siblings() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.create_proposal("p1", "j1", "c1", 250.0, "10 days", "cover").unwrap();
        db.create_proposal("p2", "j1", "c2", 200.0, "12 days", "cover").unwrap();

        assert!(db.accept_proposal("p1").unwrap());

        assert_eq!(db.get_proposal("p1").unwrap().unwrap().status, "accepted");
        assert_eq!(db.get_proposal("p2").unwrap().unwrap().status, "rejected");
        let job = db.get_job("j1").unwrap().unwrap();
        assert_eq!(job.status, "in_progress");
        assert_eq!(job.hired_consultant_id.as_deref(), Some("c1"));

        assert!(!db.accept_proposal("missing").unwrap());
    }

    #[test]
    fn delete_restores_counter() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.create_proposal("p1", "j1", "c1", 250.0, "10 days", "cover").unwrap();

        assert!(db.delete_proposal("p1").unwrap());
        assert_eq!(db.get_job("j1").unwrap().unwrap().proposals_count, 0);
        assert!(!db.delete_proposal("p1").unwrap());
    }
}
