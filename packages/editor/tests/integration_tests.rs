//! Workspace-level scenarios: several documents, each with its own history

use quire_editor::{
    Command, CommandOutput, Document, DocumentKind, DocumentState, EditSession, EditorError,
    Position, Query, TextMutation, TreeMutation,
};
use std::path::{Path, PathBuf};

fn append(text: &str) -> Command {
    Command::Text(TextMutation::Append {
        text: text.to_string(),
    })
}

fn append_child(id: &str) -> Command {
    Command::Tree(TreeMutation::AppendChild {
        tag: "item".to_string(),
        new_id: id.to_string(),
        parent_id: "root".to_string(),
        text: None,
    })
}

#[test]
fn test_histories_are_per_document() -> anyhow::Result<()> {
    let mut session = EditSession::default();
    session.open(Document::empty("notes.txt", DocumentKind::Flat))?;
    session.execute(&append("first"))?;

    session.open(Document::empty("items.xml", DocumentKind::Structural))?;
    session.execute(&append_child("i1"))?;
    session.execute(&append_child("i2"))?;

    // Undo in notes.txt only touches notes.txt
    session.activate(Path::new("notes.txt"))?;
    session.undo()?;

    let ws = session.workspace();
    assert_eq!(ws.get(Path::new("notes.txt"))?.serialize(), Vec::<String>::new());
    assert_eq!(ws.get(Path::new("notes.txt"))?.state(), DocumentState::Normal);

    let items = ws.get(Path::new("items.xml"))?;
    assert_eq!(items.undo_levels(), 2);
    assert!(items.tree().unwrap().contains_id("i2"));
    assert!(items.is_modified());
    Ok(())
}

#[test]
fn test_commands_without_active_document() {
    let mut session = EditSession::default();
    assert_eq!(
        session.execute(&append("x")).unwrap_err(),
        EditorError::NoActiveDocument
    );
    assert_eq!(session.redo().unwrap_err(), EditorError::NoActiveDocument);
}

#[test]
fn test_delete_dispatches_on_active_kind() -> anyhow::Result<()> {
    let mut session = EditSession::default();
    session.open(Document::flat("a.txt", vec!["abcdef".to_string()]))?;

    // A structural delete on a flat document is a kind error
    let err = session
        .execute(&Command::Tree(TreeMutation::DeleteSubtree {
            id: "x".to_string(),
        }))
        .unwrap_err();
    assert!(matches!(err, EditorError::WrongKind { .. }));

    session.execute(&Command::Text(TextMutation::Delete {
        at: Position::new(1, 1),
        len: 3,
    }))?;
    assert_eq!(
        session.workspace().current()?.serialize(),
        vec!["def".to_string()]
    );
    Ok(())
}

#[test]
fn test_close_modified_is_caller_decision() -> anyhow::Result<()> {
    let mut session = EditSession::default();
    session.open(Document::empty("a.txt", DocumentKind::Flat))?;
    session.execute(&append("unsaved"))?;

    let closed = session.close(Path::new("a.txt"))?;
    assert!(closed.is_modified());
    assert_eq!(closed.serialize(), vec!["unsaved".to_string()]);
    assert!(session.workspace().is_empty());
    Ok(())
}

#[test]
fn test_reopen_starts_fresh_history() -> anyhow::Result<()> {
    let mut session = EditSession::default();
    session.open(Document::empty("a.txt", DocumentKind::Flat))?;
    session.execute(&append("x"))?;
    let lines = session.close(Path::new("a.txt"))?.serialize();

    session.open(Document::flat("a.txt", lines))?;
    let doc = session.workspace().current()?;
    assert!(!doc.can_undo());
    assert_eq!(doc.state(), DocumentState::Normal);
    Ok(())
}

#[test]
fn test_show_and_tree_queries() -> anyhow::Result<()> {
    let mut session = EditSession::default();
    session.open(Document::flat(
        "a.txt",
        vec!["one".to_string(), "two".to_string(), "three".to_string()],
    ))?;

    let output = session.execute(&Command::Query(Query::Show {
        range: Some("2:3".parse()?),
    }))?;
    assert_eq!(
        output,
        CommandOutput::Report(vec!["2: two".to_string(), "3: three".to_string()])
    );

    let err = session.execute(&Command::Query(Query::Tree)).unwrap_err();
    assert!(matches!(err, EditorError::WrongKind { .. }));
    assert!(!session.workspace().current()?.is_modified());
    Ok(())
}

#[test]
fn test_registry_invariants_through_session() -> anyhow::Result<()> {
    let mut session = EditSession::default();
    for name in ["a.txt", "b.txt", "c.xml"] {
        let kind = DocumentKind::from_path(Path::new(name));
        session.open(Document::empty(name, kind))?;
        session.workspace().check_invariants().map_err(anyhow::Error::msg)?;
    }

    session.activate(Path::new("a.txt"))?;
    session.close(Path::new("a.txt"))?;
    session.workspace().check_invariants().map_err(anyhow::Error::msg)?;

    assert_eq!(
        session.workspace().active_path(),
        Some(Path::new("c.xml"))
    );
    assert_eq!(
        session.workspace().recent(),
        &[PathBuf::from("b.txt"), PathBuf::from("c.xml")]
    );
    Ok(())
}

#[test]
fn test_markup_text_survives_save_and_reload() -> anyhow::Result<()> {
    let mut doc = Document::empty("items.xml", DocumentKind::Structural);
    doc.apply(&append_child("b1"))?;
    doc.apply(&Command::Tree(TreeMutation::SetText {
        id: "b1".to_string(),
        text: Some("x < y </b> z & w".to_string()),
    }))?;

    let reloaded = Document::from_lines("items.xml", DocumentKind::Structural, doc.serialize())?;
    assert_eq!(reloaded.tree(), doc.tree());
    assert_eq!(
        reloaded.tree().unwrap().element("b1").unwrap().text(),
        Some("x < y </b> z & w")
    );
    assert_eq!(reloaded.tree().unwrap().root_element().text(), None);
    Ok(())
}
