use anyhow::Result;
use rusqlite::{Connection, Row};

use super::{OptionalExt, identity_cols};
use crate::Database;
use crate::models::ReviewRow;

/// Outcome of a review insert; one review per (job, buyer).
#[derive(Debug, PartialEq, Eq)]
pub enum ReviewCreate {
    Created,
    Duplicate,
}

impl Database {
    /// Inserts the review and recomputes the consultant's aggregate rating in
    /// the same transaction, so the average never drifts from the rows.
    pub fn create_review(
        &self,
        id: &str,
        job_id: &str,
        buyer_id: &str,
        consultant_id: &str,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewCreate> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM reviews WHERE job_id = ?1 AND buyer_id = ?2",
                    rusqlite::params![job_id, buyer_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(ReviewCreate::Duplicate);
            }

            tx.execute(
                "INSERT INTO reviews (id, job_id, buyer_id, consultant_id, rating, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, job_id, buyer_id, consultant_id, rating, comment],
            )?;
            recompute_rating(&tx, consultant_id)?;

            tx.commit()?;
            Ok(ReviewCreate::Created)
        })
    }

    pub fn get_review(&self, id: &str) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE r.id = ?1", select_review_base()))?;
            let row = stmt.query_row([id], read_review).optional()?;
            Ok(row)
        })
    }

    pub fn reviews_by_consultant(&self, consultant_id: &str) -> Result<Vec<ReviewRow>> {
        self.query_reviews("r.consultant_id = ?1", consultant_id)
    }

    pub fn reviews_by_job(&self, job_id: &str) -> Result<Vec<ReviewRow>> {
        self.query_reviews("r.job_id = ?1", job_id)
    }

    fn query_reviews(&self, condition: &str, value: &str) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE {condition} ORDER BY r.created_at DESC", select_review_base());
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([value], read_review)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_review(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let consultant_id: Option<String> = tx
                .query_row("SELECT consultant_id FROM reviews WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            let Some(consultant_id) = consultant_id else {
                return Ok(false);
            };

            tx.execute("DELETE FROM reviews WHERE id = ?1", [id])?;
            recompute_rating(&tx, &consultant_id)?;

            tx.commit()?;
            Ok(true)
        })
    }
}

fn recompute_rating(conn: &Connection, consultant_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE consultants
         SET rating = COALESCE((SELECT AVG(rating) FROM reviews WHERE consultant_id = ?1), 0),
             updated_at = datetime('now')
         WHERE id = ?1",
        [consultant_id],
    )?;
    Ok(())
}

fn select_review_base() -> String {
    format!(
        "SELECT r.id, r.job_id, r.consultant_id, r.rating, r.comment, r.created_at, {}
         FROM reviews r
         JOIN users u ON u.id = r.buyer_id",
        identity_cols("u")
    )
}

fn read_review(row: &Row) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        job_id: row.get(1)?,
        consultant_id: row.get(2)?,
        rating: row.get(3)?,
        comment: row.get(4)?,
        created_at: row.get(5)?,
        buyer: super::read_identity(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::ReviewCreate;
    use crate::Database;

    fn seed(db: &Database) {
        db.create_user("b1", "Buyer", "b@raah.dev", "hash", "buyer", "[]").unwrap();
        db.create_user("b2", "Buyer 2", "b2@raah.dev", "hash", "buyer", "[]").unwrap();
        db.create_user("cu1", "C", "c@raah.dev", "hash", "consultant", "[]").unwrap();
        db.create_consultant("c1", "cu1", "Engineer", "", "[]", 40.0, "", "[]").unwrap();
        db.create_job("j1", "b1", "engineering", "Survey", "d", 100.0, 400.0, "2w", "KTM", "[]", "[]")
            .unwrap();
        db.create_job("j2", "b2", "engineering", "Audit", "d", 100.0, 400.0, "2w", "KTM", "[]", "[]")
            .unwrap();
    }

    #[test]
    fn rating_tracks_the_average() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        db.create_review("r1", "j1", "b1", "c1", 5, "excellent").unwrap();
        assert_eq!(db.get_consultant("c1").unwrap().unwrap().rating, 5.0);

        db.create_review("r2", "j2", "b2", "c1", 2, "late delivery").unwrap();
        assert_eq!(db.get_consultant("c1").unwrap().unwrap().rating, 3.5);

        assert!(db.delete_review("r2").unwrap());
        assert_eq!(db.get_consultant("c1").unwrap().unwrap().rating, 5.0);

        assert!(db.delete_review("r1").unwrap());
        assert_eq!(db.get_consultant("c1").unwrap().unwrap().rating, 0.0);
    }

    #[test]
    fn one_review_per_job_and_buyer() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        assert_eq!(
            db.create_review("r1", "j1", "b1", "c1", 4, "good").unwrap(),
            ReviewCreate::Created
        );
        assert_eq!(
            db.create_review("r-dup", "j1", "b1", "c1", 1, "changed my mind").unwrap(),
            ReviewCreate::Duplicate
        );
        assert_eq!(db.reviews_by_consultant("c1").unwrap().len(), 1);
    }

    #[test]
    fn populated_listing_carries_reviewer() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.create_review("r1", "j1", "b1", "c1", 4, "good").unwrap();

        let rows = db.reviews_by_job("j1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].buyer.id, "b1");
        assert_eq!(rows[0].rating, 4);
    }
}
