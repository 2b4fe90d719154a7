use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            account_type    TEXT NOT NULL DEFAULT 'buyer',
            roles           TEXT NOT NULL DEFAULT '[]',
            profile_image   TEXT,
            phone           TEXT,
            is_verified     INTEGER NOT NULL DEFAULT 0,
            is_banned       INTEGER NOT NULL DEFAULT 0,
            is_online       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS profiles (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            fullname        TEXT NOT NULL,
            bio             TEXT NOT NULL DEFAULT '',
            contact_number  TEXT NOT NULL,
            portfolio_links TEXT NOT NULL DEFAULT '[]',
            verification_docs TEXT NOT NULL DEFAULT '[]',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS consultants (
            id                   TEXT PRIMARY KEY,
            user_id              TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            title                TEXT NOT NULL,
            bio                  TEXT NOT NULL DEFAULT '',
            specialization       TEXT NOT NULL DEFAULT '[]',
            hourly_rate          REAL NOT NULL DEFAULT 0,
            availability         TEXT NOT NULL DEFAULT 'available',
            experience           TEXT NOT NULL DEFAULT '',
            skills               TEXT NOT NULL DEFAULT '[]',
            id_card_front        TEXT,
            id_card_back         TEXT,
            supporting_documents TEXT NOT NULL DEFAULT '[]',
            verification         TEXT NOT NULL DEFAULT 'unverified',
            rating               REAL NOT NULL DEFAULT 0,
            total_projects       INTEGER NOT NULL DEFAULT 0,
            total_earnings       REAL NOT NULL DEFAULT 0,
            created_at           TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at           TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_consultants_verification
            ON consultants(verification);

        CREATE TABLE IF NOT EXISTS jobs (
            id                  TEXT PRIMARY KEY,
            buyer_id            TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category            TEXT NOT NULL,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL,
            budget_min          REAL NOT NULL,
            budget_max          REAL NOT NULL,
            timeline            TEXT NOT NULL,
            location            TEXT NOT NULL,
            skills              TEXT NOT NULL DEFAULT '[]',
            attachments         TEXT NOT NULL DEFAULT '[]',
            status              TEXT NOT NULL DEFAULT 'open',
            proposals_count     INTEGER NOT NULL DEFAULT 0,
            hired_consultant_id TEXT REFERENCES consultants(id) ON DELETE SET NULL,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_buyer ON jobs(buyer_id);
        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
        CREATE INDEX IF NOT EXISTS idx_jobs_category ON jobs(category);

        CREATE TABLE IF NOT EXISTS proposals (
            id            TEXT PRIMARY KEY,
            job_id        TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            consultant_id TEXT NOT NULL REFERENCES consultants(id) ON DELETE CASCADE,
            bid_amount    REAL NOT NULL,
            delivery_time TEXT NOT NULL,
            cover_letter  TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'pending',
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(job_id, consultant_id)
        );

        CREATE INDEX IF NOT EXISTS idx_proposals_job ON proposals(job_id);
        CREATE INDEX IF NOT EXISTS idx_proposals_consultant ON proposals(consultant_id);

        CREATE TABLE IF NOT EXISTS reviews (
            id            TEXT PRIMARY KEY,
            job_id        TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            buyer_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            consultant_id TEXT NOT NULL REFERENCES consultants(id) ON DELETE CASCADE,
            rating        INTEGER NOT NULL,
            comment       TEXT NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(job_id, buyer_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_consultant ON reviews(consultant_id);

        -- Exactly one conversation per unordered user pair: participants are
        -- stored canonically ordered (participant_a < participant_b) and the
        -- pair is unique. Unread counters live on the participant slots.
        CREATE TABLE IF NOT EXISTS conversations (
            id              TEXT PRIMARY KEY,
            participant_a   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            participant_b   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            last_message    TEXT,
            last_message_at TEXT,
            unread_a        INTEGER NOT NULL DEFAULT 0,
            unread_b        INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(participant_a, participant_b)
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_a ON conversations(participant_a);
        CREATE INDEX IF NOT EXISTS idx_conversations_b ON conversations(participant_b);

        CREATE TABLE IF NOT EXISTS messages (
            id              TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            sender_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            receiver_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content         TEXT NOT NULL,
            is_read         INTEGER NOT NULL DEFAULT 0,
            attachments     TEXT NOT NULL DEFAULT '[]',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages(conversation_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_messages_unread
            ON messages(conversation_id, receiver_id, is_read);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
