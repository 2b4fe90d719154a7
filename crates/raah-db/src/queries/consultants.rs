use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::ToSql;

use super::{OptionalExt, identity_cols};
use crate::Database;
use crate::models::ConsultantRow;

/// Optional filters for the consultant directory listing.
#[derive(Debug, Default, Clone)]
pub struct ConsultantFilter {
    pub specialization: Option<String>,
    pub availability: Option<String>,
    pub min_rating: Option<f64>,
    pub verified: Option<bool>,
}

impl Database {
    pub fn create_consultant(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        bio: &str,
        specialization_json: &str,
        hourly_rate: f64,
        experience: &str,
        skills_json: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO consultants (id, user_id, title, bio, specialization, hourly_rate, experience, skills)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id,
                    user_id,
                    title,
                    bio,
                    specialization_json,
                    hourly_rate,
                    experience,
                    skills_json
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_consultant(&self, id: &str) -> Result<Option<ConsultantRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_consultant("c.id = ?1"))?;
            let row = stmt.query_row([id], read_consultant).optional()?;
            Ok(row)
        })
    }

    pub fn get_consultant_by_user(&self, user_id: &str) -> Result<Option<ConsultantRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_consultant("c.user_id = ?1"))?;
            let row = stmt.query_row([user_id], read_consultant).optional()?;
            Ok(row)
        })
    }

    /// Filtered directory page plus the total matching count.
    pub fn list_consultants(
        &self,
        filter: &ConsultantFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<ConsultantRow>, i64)> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(specialization) = &filter.specialization {
            // JSON-array containment via the quoted-element pattern.
            conditions.push(format!("c.specialization LIKE ?{}", values.len() + 1));
            values.push(Box::new(format!("%\"{}\"%", specialization)));
        }
        if let Some(avail) = &filter.availability {
            conditions.push(format!("c.availability = ?{}", values.len() + 1));
            values.push(Box::new(avail.clone()));
        }
        if let Some(min_rating) = filter.min_rating {
            conditions.push(format!("c.rating >= ?{}", values.len() + 1));
            values.push(Box::new(min_rating));
        }
        if let Some(verified) = filter.verified {
            if verified {
                conditions.push("c.verification = 'verified'".into());
            } else {
                conditions.push("c.verification <> 'verified'".into());
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        self.with_conn(|conn| {
            let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM consultants c{where_clause}"),
                params.as_slice(),
                |row| row.get(0),
            )?;

            let sql = format!(
                "{}{} ORDER BY c.rating DESC, c.created_at DESC LIMIT {} OFFSET {}",
                select_consultant_base(),
                where_clause,
                limit,
                offset
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), read_consultant)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((rows, total))
        })
    }

    /// Full-row update; the caller merges partial input into the existing row.
    pub fn update_consultant(
        &self,
        id: &str,
        title: &str,
        bio: &str,
        specialization_json: &str,
        hourly_rate: f64,
        availability: &str,
        experience: &str,
        skills_json: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE consultants
                 SET title = ?2, bio = ?3, specialization = ?4, hourly_rate = ?5,
                     availability = ?6, experience = ?7, skills = ?8, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    title,
                    bio,
                    specialization_json,
                    hourly_rate,
                    availability,
                    experience,
                    skills_json
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Storing documents moves the consultant into the verification queue.
    pub fn set_consultant_documents(
        &self,
        id: &str,
        id_card_front: Option<&str>,
        id_card_back: Option<&str>,
        supporting_documents_json: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE consultants
                 SET id_card_front = ?2, id_card_back = ?3, supporting_documents = ?4,
                     verification = 'pending', updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, id_card_front, id_card_back, supporting_documents_json],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn set_consultant_verification(&self, id: &str, verification: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE consultants SET verification = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, verification],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn pending_consultants(&self) -> Result<Vec<ConsultantRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE c.verification = 'pending' ORDER BY c.updated_at ASC",
                select_consultant_base()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], read_consultant)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_consultant(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM consultants WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn select_consultant_base() -> String {
    format!(
        "SELECT c.id, {}, c.title, c.bio, c.specialization, c.hourly_rate, c.availability,
                c.experience, c.skills, c.id_card_front, c.id_card_back, c.supporting_documents,
                c.verification, c.rating, c.total_projects, c.total_earnings, c.created_at, c.updated_at
         FROM consultants c
         JOIN users u ON u.id = c.user_id",
        identity_cols("u")
    )
}

fn select_consultant(condition: &str) -> String {
    format!("{} WHERE {condition}", select_consultant_base())
}

fn read_consultant(row: &Row) -> rusqlite::Result<ConsultantRow> {
    Ok(ConsultantRow {
        id: row.get(0)?,
        user: super::read_identity(row, 1)?,
        title: row.get(7)?,
        bio: row.get(8)?,
        specialization: row.get(9)?,
        hourly_rate: row.get(10)?,
        availability: row.get(11)?,
        experience: row.get(12)?,
        skills: row.get(13)?,
        id_card_front: row.get(14)?,
        id_card_back: row.get(15)?,
        supporting_documents: row.get(16)?,
        verification: row.get(17)?,
        rating: row.get(18)?,
        total_projects: row.get(19)?,
        total_earnings: row.get(20)?,
        created_at: row.get(21)?,
        updated_at: row.get(22)?,
    })
}

#[cfg(test)]
mod tests {
    use super::ConsultantFilter;
    use crate::Database;

    fn seed(db: &Database, n: u32) -> String {
        let user_id = format!("u{n}");
        let consultant_id = format!("c{n}");
        db.create_user(&user_id, "C", &format!("c{n}@raah.dev"), "hash", "consultant", "[]")
            .unwrap();
        db.create_consultant(
            &consultant_id,
            &user_id,
            "Structural engineer",
            "",
            "[\"structural\"]",
            40.0,
            "5 years",
            "[\"autocad\"]",
        )
        .unwrap();
        consultant_id
    }

    #[test]
    fn one_consultant_record_per_user() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, 1);
        assert!(
            db.create_consultant("c-dup", "u1", "Again", "", "[]", 10.0, "", "[]").is_err()
        );
    }

    #[test]
    fn lookup_by_id_and_by_user() {
        let db = Database::open_in_memory().unwrap();
        let id = seed(&db, 1);

        let row = db.get_consultant(&id).unwrap().unwrap();
        assert_eq!(row.user.id, "u1");
        assert_eq!(row.verification, "unverified");

        let by_user = db.get_consultant_by_user("u1").unwrap().unwrap();
        assert_eq!(by_user.id, id);
        assert!(db.get_consultant_by_user("nobody").unwrap().is_none());
    }

    #[test]
    fn document_upload_enters_verification_queue() {
        let db = Database::open_in_memory().unwrap();
        let id = seed(&db, 1);
        assert!(db.pending_consultants().unwrap().is_empty());

        db.set_consultant_documents(&id, Some("https://docs/front.png"), None, "[]").unwrap();
        let pending = db.pending_consultants().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);

        db.set_consultant_verification(&id, "verified").unwrap();
        assert!(db.pending_consultants().unwrap().is_empty());
        assert_eq!(db.get_consultant(&id).unwrap().unwrap().verification, "verified");
    }

    #[test]
    fn directory_filters_apply() {
        let db = Database::open_in_memory().unwrap();
        let c1 = seed(&db, 1);
        let c2 = seed(&db, 2);
        db.set_consultant_verification(&c1, "verified").unwrap();
        db.update_consultant(&c2, "T", "", "[\"electrical\"]", 55.0, "limited", "", "[]").unwrap();

        let (all, total) = db.list_consultants(&ConsultantFilter::default(), 50, 0).unwrap();
        assert_eq!((all.len(), total), (2, 2));

        let verified_only = ConsultantFilter { verified: Some(true), ..Default::default() };
        let (rows, total) = db.list_consultants(&verified_only, 50, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, c1);

        let electrical = ConsultantFilter {
            specialization: Some("electrical".into()),
            availability: Some("limited".into()),
            ..Default::default()
        };
        let (rows, total) = db.list_consultants(&electrical, 50, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, c2);
    }
}
