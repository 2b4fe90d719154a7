use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::ToSql;

use super::{OptionalExt, identity_cols};
use crate::Database;
use crate::models::JobRow;

#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub location: Option<String>,
}

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn create_job(
        &self,
        id: &str,
        buyer_id: &str,
        category: &str,
        title: &str,
        description: &str,
        budget_min: f64,
        budget_max: f64,
        timeline: &str,
        location: &str,
        skills_json: &str,
        attachments_json: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO jobs (id, buyer_id, category, title, description, budget_min, budget_max,
                                   timeline, location, skills, attachments)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    id,
                    buyer_id,
                    category,
                    title,
                    description,
                    budget_min,
                    budget_max,
                    timeline,
                    location,
                    skills_json,
                    attachments_json
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_job(&self, id: &str) -> Result<Option<JobRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE j.id = ?1", select_job_base()))?;
            let row = stmt.query_row([id], read_job).optional()?;
            Ok(row)
        })
    }

    pub fn list_jobs(&self, filter: &JobFilter, limit: u64, offset: u64) -> Result<(Vec<JobRow>, i64)> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(category) = &filter.category {
            conditions.push(format!("j.category = ?{}", values.len() + 1));
            values.push(Box::new(category.clone()));
        }
        if let Some(status) = &filter.status {
            conditions.push(format!("j.status = ?{}", values.len() + 1));
            values.push(Box::new(status.clone()));
        }
        // Budget filters match any overlap with the requested range.
        if let Some(min_budget) = filter.min_budget {
            conditions.push(format!("j.budget_max >= ?{}", values.len() + 1));
            values.push(Box::new(min_budget));
        }
        if let Some(max_budget) = filter.max_budget {
            conditions.push(format!("j.budget_min <= ?{}", values.len() + 1));
            values.push(Box::new(max_budget));
        }
        if let Some(location) = &filter.location {
            conditions.push(format!("j.location LIKE ?{}", values.len() + 1));
            values.push(Box::new(format!("%{}%", location)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        self.with_conn(|conn| {
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM jobs j{where_clause}"),
                params.as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "{}{} ORDER BY j.created_at DESC LIMIT {} OFFSET {}",
                select_job_base(),
                where_clause,
                limit,
                offset
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), read_job)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, total))
        })
    }

    pub fn jobs_by_buyer(&self, buyer_id: &str) -> Result<Vec<JobRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE j.buyer_id = ?1 ORDER BY j.created_at DESC", select_job_base());
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([buyer_id], read_job)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Full-row update; the caller merges partial input into the existing row.
    #[allow(clippy::too_many_arguments)]
    pub fn update_job(
        &self,
        id: &str,
        category: &str,
        title: &str,
        description: &str,
        budget_min: f64,
        budget_max: f64,
        timeline: &str,
        location: &str,
        skills_json: &str,
        attachments_json: &str,
        status: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE jobs
                 SET category = ?2, title = ?3, description = ?4, budget_min = ?5, budget_max = ?6,
                     timeline = ?7, location = ?8, skills = ?9, attachments = ?10, status = ?11,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    category,
                    title,
                    description,
                    budget_min,
                    budget_max,
                    timeline,
                    location,
                    skills_json,
                    attachments_json,
                    status
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_job(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM jobs WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn select_job_base() -> String {
    format!(
        "SELECT j.id, {}, j.category, j.title, j.description, j.budget_min, j.budget_max,
                j.timeline, j.location, j.skills, j.attachments, j.status, j.proposals_count,
                j.hired_consultant_id, j.created_at, j.updated_at
         FROM jobs j
         JOIN users u ON u.id = j.buyer_id",
        identity_cols("u")
    )
}

fn read_job(row: &Row) -> rusqlite::Result<JobRow> {
    Ok(JobRow {
        id: row.get(0)?,
        buyer: super::read_identity(row, 1)?,
        category: row.get(7)?,
        title: row.get(8)?,
        description: row.get(9)?,
        budget_min: row.get(10)?,
        budget_max: row.get(11)?,
        timeline: row.get(12)?,
        location: row.get(13)?,
        skills: row.get(14)?,
        attachments: row.get(15)?,
        status: row.get(16)?,
        proposals_count: row.get(17)?,
        hired_consultant_id: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}

#[cfg(test)]
mod tests {
    use super::JobFilter;
    use crate::Database;

    fn seed_job(db: &Database, id: &str, buyer: &str, category: &str, min: f64, max: f64) {
        db.create_job(
            id,
            buyer,
            category,
            "Site survey",
            "Survey a 2-storey residential build",
            min,
            max,
            "2 weeks",
            "Kathmandu",
            "[\"surveying\"]",
            "[]",
        )
        .unwrap();
    }

    #[test]
    fn create_get_and_list_by_buyer() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("b1", "Buyer", "b@raah.dev", "hash", "buyer", "[]").unwrap();
        seed_job(&db, "j1", "b1", "engineering", 100.0, 400.0);

        let job = db.get_job("j1").unwrap().unwrap();
        assert_eq!(job.buyer.id, "b1");
        assert_eq!(job.status, "open");
        assert_eq!(job.proposals_count, 0);

        assert_eq!(db.jobs_by_buyer("b1").unwrap().len(), 1);
        assert!(db.get_job("missing").unwrap().is_none());
    }

    #[test]
    fn budget_filter_matches_overlapping_ranges() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("b1", "Buyer", "b@raah.dev", "hash", "buyer", "[]").unwrap();
        seed_job(&db, "cheap", "b1", "engineering", 50.0, 150.0);
        seed_job(&db, "mid", "b1", "engineering", 200.0, 600.0);
        seed_job(&db, "high", "b1", "legal", 1000.0, 2000.0);

        let filter = JobFilter { min_budget: Some(180.0), max_budget: Some(700.0), ..Default::default() };
        let (rows, total) = db.list_jobs(&filter, 50, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "mid");

        let filter = JobFilter { category: Some("legal".into()), ..Default::default() };
        let (rows, _) = db.list_jobs(&filter, 50, 0).unwrap();
        assert_eq!(rows[0].id, "high");
    }

    #[test]
    fn update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("b1", "Buyer", "b@raah.dev", "hash", "buyer", "[]").unwrap();
        seed_job(&db, "j1", "b1", "engineering", 100.0, 400.0);

        assert!(
            db.update_job("j1", "engineering", "New title", "desc", 100.0, 500.0, "3 weeks",
                          "Pokhara", "[]", "[]", "completed")
                .unwrap()
        );
        let job = db.get_job("j1").unwrap().unwrap();
        assert_eq!(job.title, "New title");
        assert_eq!(job.status, "completed");

        assert!(db.delete_job("j1").unwrap());
        assert!(!db.delete_job("j1").unwrap());
    }
}
