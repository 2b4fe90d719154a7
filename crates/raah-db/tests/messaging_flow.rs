//! Integration test: walk a buyer/consultant pair through the full inbox
//! lifecycle against a real (in-memory) database: first contact, replies,
//! read receipts, pagination, and sender-scoped deletion.

use raah_db::Database;
use raah_db::queries::messaging::DeleteMessage;

fn setup() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.create_user("buyer", "Nisha", "nisha@raah.dev", "hash", "buyer", "[]").unwrap();
    db.create_user("consultant", "Prakash", "prakash@raah.dev", "hash", "consultant", "[]")
        .unwrap();
    db
}

#[test]
fn inbox_lifecycle() {
    let db = setup();

    // First contact creates the conversation lazily.
    assert!(db.find_conversation("buyer", "consultant").unwrap().is_none());
    let conv_id = db
        .send_message("m1", "conv1", "buyer", "consultant", "Hello", "Hello", "[]")
        .unwrap();
    assert_eq!(conv_id, "conv1");

    // The reply reuses it, whichever direction it comes from.
    let reused = db
        .send_message("m2", "conv-ignored", "consultant", "buyer", "Hi Nisha", "Hi Nisha", "[]")
        .unwrap();
    assert_eq!(reused, "conv1");

    // Both sides now owe each other one read.
    assert_eq!(db.unread_total("buyer").unwrap(), 1);
    assert_eq!(db.unread_total("consultant").unwrap(), 1);

    // The buyer opens the thread.
    assert!(db.mark_messages_read("buyer", "consultant").unwrap());
    assert_eq!(db.unread_total("buyer").unwrap(), 0);
    assert_eq!(db.unread_total("consultant").unwrap(), 1);

    // Inbox annotation is per-viewer.
    let inbox = db.conversations_for_user("consultant").unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].other_user.name, "Nisha");
    assert_eq!(inbox[0].unread_count, 1);
    assert_eq!(inbox[0].last_message.as_deref(), Some("Hi Nisha"));
}

#[test]
fn pagination_across_a_long_thread() {
    let db = setup();

    let mut conv_id = String::new();
    for n in 1..=25 {
        conv_id = db
            .send_message(
                &format!("m{n}"),
                "conv1",
                "buyer",
                "consultant",
                &format!("update {n}"),
                &format!("update {n}"),
                "[]",
            )
            .unwrap();
    }

    let total = db.count_messages(&conv_id).unwrap();
    assert_eq!(total, 25);

    let page2 = db.messages_page(&conv_id, 10, 10).unwrap();
    let contents: Vec<_> = page2.iter().map(|m| m.content.as_str()).collect();
    let expected: Vec<String> = (11..=20).map(|n| format!("update {n}")).collect();
    assert_eq!(contents, expected.iter().map(String::as_str).collect::<Vec<_>>());

    // An untouched thread keeps every message unread for the receiver.
    assert!(page2.iter().all(|m| !m.is_read));
    assert_eq!(db.unread_total("consultant").unwrap(), 25);
}

#[test]
fn deletion_leaves_bookkeeping_alone() {
    let db = setup();

    let conv_id = db
        .send_message("m1", "conv1", "buyer", "consultant", "sent in error", "sent in error", "[]")
        .unwrap();

    assert_eq!(db.delete_message("m1", "consultant").unwrap(), DeleteMessage::NotSender);
    assert_eq!(db.delete_message("m1", "buyer").unwrap(), DeleteMessage::Deleted);
    assert_eq!(db.count_messages(&conv_id).unwrap(), 0);

    // Preview and counter drift is accepted behavior on delete.
    let conv = db.find_conversation("buyer", "consultant").unwrap().unwrap();
    assert_eq!(conv.last_message.as_deref(), Some("sent in error"));
    assert_eq!(db.unread_total("consultant").unwrap(), 1);
}
