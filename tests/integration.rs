//! Integration tests for the session and note stores

use ai_notes::{Message, Note, NoteStore, Role, Session, SessionStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn session_with_chat(id: &str, chat: Vec<Message>) -> Session {
    let mut session = Session::new();
    session.id = id.to_string();
    session.chat = chat;
    session
}

/// Saving then loading a session reproduces id, creation time, and the
/// exact message sequence.
#[tokio::test]
async fn test_session_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path());

    let chats: Vec<Vec<Message>> = vec![
        vec![],
        vec![Message::assistant("Welcome to AI Notes!")],
        vec![
            Message::assistant("Welcome to AI Notes!"),
            Message::user("hello"),
            Message::assistant("hi there"),
            Message::system("injected context"),
            Message::user("thanks"),
        ],
    ];

    for (i, chat) in chats.into_iter().enumerate() {
        let session = session_with_chat(&format!("20240101T10000{}", i), chat);
        store.save(&session).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        let found = loaded
            .iter()
            .find(|s| s.id == session.id)
            .expect("saved session should load");
        assert_eq!(found.id, session.id);
        assert_eq!(
            found.created_at.timestamp(),
            session.created_at.timestamp()
        );
        assert_eq!(found.chat, session.chat);
    }
}

/// Save → load → save again must not reorder messages.
#[tokio::test]
async fn test_session_resave_preserves_order() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path());

    let session = session_with_chat(
        "20240101T120000",
        vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ],
    );
    store.save(&session).await.unwrap();

    let mut loaded = store.load_all().await.unwrap().remove(0);
    loaded.chat.push(Message::assistant("four"));
    store.save(&loaded).await.unwrap();

    let reloaded = store.load_all().await.unwrap().remove(0);
    let contents: Vec<&str> = reloaded.chat.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three", "four"]);
}

/// Sessions come back newest first.
#[tokio::test]
async fn test_sessions_sorted_newest_first() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path());

    let mut old = session_with_chat("20230101T000000", vec![]);
    old.created_at = old.created_at - chrono::Duration::days(400);
    let new = session_with_chat("20240401T000000", vec![]);
    store.save(&old).await.unwrap();
    store.save(&new).await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, "20240401T000000");
    assert_eq!(loaded[1].id, "20230101T000000");
}

/// A missing sessions directory means zero records, not an error.
#[tokio::test]
async fn test_missing_directories_are_zero_records() {
    let temp = TempDir::new().unwrap();
    let sessions = SessionStore::new(temp.path());
    let notes = NoteStore::new(temp.path());

    assert!(sessions.load_all().await.unwrap().is_empty());
    assert!(notes.load_all().await.unwrap().is_empty());
}

/// A malformed session file is skipped; the rest still load.
#[tokio::test]
async fn test_malformed_session_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path());

    let good = session_with_chat("20240101T100000", vec![Message::user("hi")]);
    store.save(&good).await.unwrap();
    std::fs::write(
        temp.path().join("sessions").join("20240101T100001.json"),
        "{not json",
    )
    .unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "20240101T100000");
}

/// Deleting one session removes exactly that record.
#[tokio::test]
async fn test_delete_removes_exactly_one_session() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path());

    let a = session_with_chat("20240101T100000", vec![]);
    let b = session_with_chat("20240101T110000", vec![]);
    store.save(&a).await.unwrap();
    store.save(&b).await.unwrap();

    store.delete("20240101T100000").await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "20240101T110000");
}

/// Saving then loading a note recovers session id, note id, and body.
#[tokio::test]
async fn test_note_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = NoteStore::new(temp.path());

    let note = Note::new("20240101T100000", "- point one\n- point two");
    let path = store.save(&note).await.unwrap();
    assert!(path.ends_with(format!("{}.md", note.id)));

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, note.id);
    assert_eq!(loaded[0].session_id, "20240101T100000");
    assert_eq!(loaded[0].title, note.title);
    assert_eq!(loaded[0].body, "- point one\n- point two");
}

/// A note whose title does not match the three-part form derives its id
/// from the filename.
#[tokio::test]
async fn test_note_title_fallback_to_filename() {
    let temp = TempDir::new().unwrap();
    let store = NoteStore::new(temp.path());
    let notes_dir = temp.path().join("notes");
    std::fs::create_dir_all(&notes_dir).unwrap();
    std::fs::write(
        notes_dir.join("20240215T093000.md"),
        "# Meeting summary\n\n- discussed roadmap",
    )
    .unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "20240215T093000");
    assert_eq!(loaded[0].session_id, "");
    assert_eq!(loaded[0].title, "Meeting summary");
    assert_eq!(loaded[0].body, "- discussed roadmap");
    assert!(loaded[0].created_at.is_some());
}

/// A note whose id is not a timestamp still loads and sorts last.
#[tokio::test]
async fn test_note_with_bad_timestamp_sorts_last() {
    let temp = TempDir::new().unwrap();
    let store = NoteStore::new(temp.path());
    let notes_dir = temp.path().join("notes");
    std::fs::create_dir_all(&notes_dir).unwrap();
    std::fs::write(notes_dir.join("scratch.md"), "# scratch\n\nloose thoughts").unwrap();

    let dated = Note::new("20240101T100000", "dated body");
    store.save(&dated).await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, dated.id);
    assert_eq!(loaded[1].id, "scratch");
    assert!(loaded[1].created_at.is_none());
}

/// Non-matching files in the store directories are ignored.
#[tokio::test]
async fn test_foreign_files_are_ignored() {
    let temp = TempDir::new().unwrap();
    let sessions = SessionStore::new(temp.path());
    let notes = NoteStore::new(temp.path());

    std::fs::create_dir_all(temp.path().join("sessions")).unwrap();
    std::fs::create_dir_all(temp.path().join("notes")).unwrap();
    std::fs::write(temp.path().join("sessions").join("README.txt"), "hi").unwrap();
    std::fs::write(temp.path().join("notes").join("data.json"), "{}").unwrap();

    assert!(sessions.load_all().await.unwrap().is_empty());
    assert!(notes.load_all().await.unwrap().is_empty());
}

/// Roles survive the session file format.
#[tokio::test]
async fn test_roles_survive_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path());

    let session = session_with_chat(
        "20240101T100000",
        vec![
            Message::user("u"),
            Message::assistant("a"),
            Message::system("s"),
        ],
    );
    store.save(&session).await.unwrap();

    let loaded = store.load_all().await.unwrap().remove(0);
    let roles: Vec<Role> = loaded.chat.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::System]);
}
