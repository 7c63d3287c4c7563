/// Integration tests for the complete host pipeline
/// Tests disk → document → edits → disk, with snapshot and command log
use quire_editor::{Command, DocumentKind, DocumentState, EditSession, TreeMutation};
use quire_workspace::{
    CommandLog, EditTimer, JsonSnapshotStore, PathValidator, RealFileSystem, SnapshotStore,
    Storage, WorkspaceSnapshot,
};
use std::fs;
use std::path::Path;

const BOOKS: &str = r#"# log -e edit-text
<?xml version="1.0" encoding="UTF-8"?>
<bookstore id="root">
    <book id="book1">
        <title id="title1">Everyday Italian</title>
    </book>
</bookstore>
"#;

fn extensions() -> Vec<String> {
    vec!["txt".to_string(), "xml".to_string(), "log".to_string()]
}

#[test]
fn test_load_edit_save_pipeline() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("books.xml"), BOOKS)?;

    let storage = Storage::new(RealFileSystem, PathValidator::new(dir.path(), extensions()));
    let effects = (
        CommandLog::new(RealFileSystem, dir.path()),
        EditTimer::new(),
    );
    let mut session = EditSession::new(effects);

    let path = storage.check_path("books.xml")?;
    session.open(storage.load(&path)?)?;
    assert!(session.effects().0.is_enabled(&path));

    session.execute(&Command::Tree(TreeMutation::AppendChild {
        tag: "price".to_string(),
        new_id: "price1".to_string(),
        parent_id: "book1".to_string(),
        text: Some("30.00".to_string()),
    }))?;
    session.execute(&Command::Tree(TreeMutation::SetText {
        id: "title1".to_string(),
        text: Some("Everyday Cooking".to_string()),
    }))?;

    storage.save(session.workspace().get(&path)?)?;
    session.mark_saved(&path)?;
    session.notify(&path, "save books.xml")?;
    assert_eq!(session.workspace().get(&path)?.state(), DocumentState::Normal);

    let saved = fs::read_to_string(dir.path().join("books.xml"))?;
    assert_eq!(
        saved,
        r#"# log -e edit-text
<?xml version="1.0" encoding="UTF-8"?>
<bookstore id="root">
    <book id="book1">
        <title id="title1">Everyday Cooking</title>
        <price id="price1">30.00</price>
    </book>
</bookstore>
"#
    );

    let log = session.effects().0.show(&path)?;
    assert_eq!(log.len(), 3);
    assert!(log[0].starts_with("session start at "));
    assert!(log[1].ends_with(r#" append-child price price1 book1 "30.00""#));
    assert!(log[2].ends_with(" save books.xml"));
    assert!(dir.path().join(".books.xml.log").exists());
    Ok(())
}

#[test]
fn test_snapshot_survives_restart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Storage::new(RealFileSystem, PathValidator::new(dir.path(), extensions()));
    let store = JsonSnapshotStore::new(RealFileSystem, dir.path().join(".quire/workspace.json"));

    {
        let mut session = EditSession::default();
        let draft = storage.init(DocumentKind::Flat, false, |p| session.workspace().contains(p));
        session.open(draft)?;
        session.open(storage.load(Path::new("notes.xml"))?)?;
        session.activate(Path::new("untitled-1.txt"))?;
        store.save(&WorkspaceSnapshot::capture(session.workspace()))?;
    }

    let snapshot = store.load()?.expect("snapshot written");
    let mut session = EditSession::default();
    assert_eq!(snapshot.restore(&mut session), 2);

    let ws = session.workspace();
    assert_eq!(ws.active_path(), Some(Path::new("untitled-1.txt")));
    assert!(ws.current()?.is_modified());
    assert_eq!(
        ws.get(Path::new("notes.xml"))?.serialize(),
        vec![
            r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
            r#"<root id="root"></root>"#.to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_paths_outside_root_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(RealFileSystem, PathValidator::new(dir.path(), extensions()));

    assert!(storage.check_path("../escape.txt").is_err());
    assert!(storage.check_path("missing/dir.txt").is_err());
    assert!(storage.check_path("image.png").is_err());
    assert!(storage.check_path("ok.log").is_ok());
}
