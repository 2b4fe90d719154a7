use anyhow::Result;
use rusqlite::Row;

use super::{OptionalExt, identity_cols};
use crate::Database;
use crate::models::{ConversationListRow, ConversationRow, MessageRow};

fn read_conversation(row: &Row) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        participant_a: row.get(1)?,
        participant_b: row.get(2)?,
        last_message: row.get(3)?,
        last_message_at: row.get(4)?,
        unread_a: row.get(5)?,
        unread_b: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Outcome of a sender-scoped message delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteMessage {
    Deleted,
    NotFound,
    NotSender,
}

/// Participants are stored canonically ordered so the unordered pair
/// {x, y} always lands on the same row.
fn canonical_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if x <= y { (x, y) } else { (y, x) }
}

impl Database {
    pub fn find_conversation(&self, user_a: &str, user_b: &str) -> Result<Option<ConversationRow>> {
        let (a, b) = canonical_pair(user_a, user_b);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, participant_a, participant_b, last_message, last_message_at,
                        unread_a, unread_b, created_at, updated_at
                 FROM conversations
                 WHERE participant_a = ?1 AND participant_b = ?2",
            )?;
            let row = stmt.query_row([a, b], read_conversation).optional()?;
            Ok(row)
        })
    }

    /// Persists a message and its conversation bookkeeping in one
    /// transaction: find-or-create the pair's conversation, insert the
    /// message unread, refresh the preview, and bump the receiver's counter.
    /// The increment happens inside the UPDATE so concurrent sends to the
    /// same pair cannot lose a count. Returns the conversation id;
    /// `new_conversation_id` is used only when the pair had none yet.
    pub fn send_message(
        &self,
        message_id: &str,
        new_conversation_id: &str,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        preview: &str,
        attachments_json: &str,
    ) -> Result<String> {
        let (a, b) = canonical_pair(sender_id, receiver_id);
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM conversations WHERE participant_a = ?1 AND participant_b = ?2",
                    [a, b],
                    |row| row.get(0),
                )
                .optional()?;

            let conversation_id = match existing {
                Some(id) => id,
                None => {
                    tx.execute(
                        "INSERT INTO conversations (id, participant_a, participant_b)
                         VALUES (?1, ?2, ?3)",
                        rusqlite::params![new_conversation_id, a, b],
                    )?;
                    new_conversation_id.to_string()
                }
            };

            tx.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, receiver_id, content, attachments)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![message_id, conversation_id, sender_id, receiver_id, content, attachments_json],
            )?;

            tx.execute(
                "UPDATE conversations
                 SET last_message = ?2,
                     last_message_at = datetime('now'),
                     updated_at = datetime('now'),
                     unread_a = CASE WHEN participant_a = ?3 THEN unread_a + 1 ELSE unread_a END,
                     unread_b = CASE WHEN participant_b = ?3 THEN unread_b + 1 ELSE unread_b END
                 WHERE id = ?1",
                rusqlite::params![conversation_id, preview, receiver_id],
            )?;

            tx.commit()?;
            Ok(conversation_id)
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE m.id = ?1", select_message_base()))?;
            let row = stmt.query_row([id], read_message).optional()?;
            Ok(row)
        })
    }

    /// The user's inbox: every conversation they participate in, annotated
    /// with their unread counter and the other participant's identity.
    /// Ordered by last activity, falling back to the row's updated_at.
    pub fn conversations_for_user(&self, user_id: &str) -> Result<Vec<ConversationListRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT c.id,
                        CASE WHEN c.participant_a = ?1 THEN c.unread_a ELSE c.unread_b END,
                        c.last_message, c.last_message_at, c.created_at, c.updated_at,
                        {}
                 FROM conversations c
                 JOIN users u ON u.id = CASE WHEN c.participant_a = ?1
                                             THEN c.participant_b ELSE c.participant_a END
                 WHERE c.participant_a = ?1 OR c.participant_b = ?1
                 ORDER BY COALESCE(c.last_message_at, c.updated_at) DESC, c.rowid DESC",
                identity_cols("u")
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ConversationListRow {
                        id: row.get(0)?,
                        unread_count: row.get(1)?,
                        last_message: row.get(2)?,
                        last_message_at: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                        other_user: super::read_identity(row, 6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_messages(&self, conversation_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                [conversation_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// One page of history, chronological within the window. The query walks
    /// newest-first (rowid breaks same-second ties) and the page is reversed
    /// before returning, so page 1 always ends at the latest message.
    pub fn messages_page(
        &self,
        conversation_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE m.conversation_id = ?1
                 ORDER BY m.created_at DESC, m.rowid DESC
                 LIMIT {limit} OFFSET {offset}",
                select_message_base()
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt
                .query_map([conversation_id], read_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.reverse();
            Ok(rows)
        })
    }

    /// Marks everything addressed to `user_id` in the pair's conversation as
    /// read and zeroes their counter, in one transaction. Returns false when
    /// the pair has no conversation.
    pub fn mark_messages_read(&self, user_id: &str, other_user_id: &str) -> Result<bool> {
        let (a, b) = canonical_pair(user_id, other_user_id);
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let conversation_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM conversations WHERE participant_a = ?1 AND participant_b = ?2",
                    [a, b],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(conversation_id) = conversation_id else {
                return Ok(false);
            };

            tx.execute(
                "UPDATE messages SET is_read = 1
                 WHERE conversation_id = ?1 AND receiver_id = ?2 AND is_read = 0",
                rusqlite::params![conversation_id, user_id],
            )?;
            tx.execute(
                "UPDATE conversations
                 SET unread_a = CASE WHEN participant_a = ?2 THEN 0 ELSE unread_a END,
                     unread_b = CASE WHEN participant_b = ?2 THEN 0 ELSE unread_b END,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![conversation_id, user_id],
            )?;

            tx.commit()?;
            Ok(true)
        })
    }

    /// Total pending messages for the user across all conversations.
    pub fn unread_total(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COALESCE(SUM(CASE WHEN participant_a = ?1 THEN unread_a ELSE unread_b END), 0)
                 FROM conversations
                 WHERE participant_a = ?1 OR participant_b = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(total)
        })
    }

    /// Sender-only delete. The conversation preview and counters are left
    /// untouched; see DESIGN.md on the accepted drift.
    pub fn delete_message(&self, message_id: &str, user_id: &str) -> Result<DeleteMessage> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let sender_id: Option<String> = tx
                .query_row("SELECT sender_id FROM messages WHERE id = ?1", [message_id], |row| {
                    row.get(0)
                })
                .optional()?;
            let Some(sender_id) = sender_id else {
                return Ok(DeleteMessage::NotFound);
            };
            if sender_id != user_id {
                return Ok(DeleteMessage::NotSender);
            }

            tx.execute("DELETE FROM messages WHERE id = ?1", [message_id])?;
            tx.commit()?;
            Ok(DeleteMessage::Deleted)
        })
    }
}

fn select_message_base() -> String {
    format!(
        "SELECT m.id, m.conversation_id, m.content, m.is_read, m.attachments, m.created_at, {}, {}
         FROM messages m
         JOIN users s ON s.id = m.sender_id
         JOIN users r ON r.id = m.receiver_id",
        identity_cols("s"),
        identity_cols("r")
    )
}

fn read_message(row: &Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        is_read: row.get(3)?,
        attachments: row.get(4)?,
        created_at: row.get(5)?,
        sender: super::read_identity(row, 6)?,
        receiver: super::read_identity(row, 12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::DeleteMessage;
    use crate::Database;

    fn seed_users(db: &Database) {
        db.create_user("alice", "Alice", "alice@raah.dev", "hash", "buyer", "[]").unwrap();
        db.create_user("bob", "Bob", "bob@raah.dev", "hash", "consultant", "[]").unwrap();
        db.create_user("carol", "Carol", "carol@raah.dev", "hash", "buyer", "[]").unwrap();
    }

    fn send(db: &Database, n: u32, from: &str, to: &str, content: &str) -> String {
        db.send_message(&format!("m{n}"), &format!("conv{n}"), from, to, content, content, "[]")
            .unwrap()
    }

    #[test]
    fn pair_identity_is_order_independent() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);

        let first = send(&db, 1, "alice", "bob", "hi");
        let second = send(&db, 2, "bob", "alice", "hello");
        let third = send(&db, 3, "alice", "bob", "how are you");
        assert_eq!(first, second);
        assert_eq!(first, third);

        assert!(db.find_conversation("bob", "alice").unwrap().is_some());
        assert!(db.find_conversation("alice", "carol").unwrap().is_none());
    }

    #[test]
    fn unread_counters_follow_the_scenario() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);

        send(&db, 1, "alice", "bob", "Hello");
        let conv = db.find_conversation("alice", "bob").unwrap().unwrap();
        let (alice_unread, bob_unread) = if conv.participant_a == "alice" {
            (conv.unread_a, conv.unread_b)
        } else {
            (conv.unread_b, conv.unread_a)
        };
        assert_eq!((alice_unread, bob_unread), (0, 1));
        assert!(!db.get_message("m1").unwrap().unwrap().is_read);

        send(&db, 2, "bob", "alice", "Hey");
        let conv = db.find_conversation("alice", "bob").unwrap().unwrap();
        let (alice_unread, bob_unread) = if conv.participant_a == "alice" {
            (conv.unread_a, conv.unread_b)
        } else {
            (conv.unread_b, conv.unread_a)
        };
        assert_eq!((alice_unread, bob_unread), (1, 1));
    }

    #[test]
    fn mark_read_flips_rows_and_resets_counter() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);

        let conv_id = send(&db, 1, "alice", "bob", "one");
        send(&db, 2, "alice", "bob", "two");
        assert_eq!(db.unread_total("bob").unwrap(), 2);

        assert!(db.mark_messages_read("bob", "alice").unwrap());
        assert_eq!(db.unread_total("bob").unwrap(), 0);
        for row in db.messages_page(&conv_id, 50, 0).unwrap() {
            assert!(row.is_read);
        }

        // the pair with no history is a miss, not a no-op
        assert!(!db.mark_messages_read("bob", "carol").unwrap());
    }

    #[test]
    fn unread_total_spans_conversations() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);

        send(&db, 1, "alice", "bob", "hi bob");
        send(&db, 2, "carol", "bob", "hi from carol");
        send(&db, 3, "carol", "bob", "are you there?");
        assert_eq!(db.unread_total("bob").unwrap(), 3);
        assert_eq!(db.unread_total("alice").unwrap(), 0);
    }

    #[test]
    fn history_window_is_chronological() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);

        let mut conv_id = String::new();
        for n in 1..=25 {
            conv_id = send(&db, n, "alice", "bob", &format!("message {n}"));
        }

        assert_eq!(db.count_messages(&conv_id).unwrap(), 25);

        // page 2 of limit 10 holds messages 11..=20, oldest first
        let page = db.messages_page(&conv_id, 10, 10).unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].content, "message 11");
        assert_eq!(page[9].content, "message 20");

        // the final page is short
        let page = db.messages_page(&conv_id, 10, 20).unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[4].content, "message 25");
    }

    #[test]
    fn delete_is_sender_scoped() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);
        let conv_id = send(&db, 1, "alice", "bob", "oops");

        assert_eq!(db.delete_message("m1", "bob").unwrap(), DeleteMessage::NotSender);
        assert_eq!(db.count_messages(&conv_id).unwrap(), 1);

        assert_eq!(db.delete_message("m1", "alice").unwrap(), DeleteMessage::Deleted);
        assert_eq!(db.count_messages(&conv_id).unwrap(), 0);

        assert_eq!(db.delete_message("m1", "alice").unwrap(), DeleteMessage::NotFound);
    }

    #[test]
    fn conversation_listing_annotates_the_other_side() {
        let db = Database::open_in_memory().unwrap();
        seed_users(&db);

        send(&db, 1, "alice", "bob", "hi bob");
        send(&db, 2, "carol", "bob", "hi from carol");

        let inbox = db.conversations_for_user("bob").unwrap();
        assert_eq!(inbox.len(), 2);
        // most recent activity first
        assert_eq!(inbox[0].other_user.id, "carol");
        assert_eq!(inbox[1].other_user.id, "alice");
        assert_eq!(inbox[0].unread_count, 1);
        assert_eq!(inbox[0].last_message.as_deref(), Some("hi from carol"));

        assert!(db.conversations_for_user("nobody").unwrap().is_empty());
    }
}
