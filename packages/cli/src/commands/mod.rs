//! Command-line grammar: one request per line.

pub mod tokens;

use anyhow::{anyhow, bail, Result};
use quire_editor::{Command, DocumentKind, Query, TextMutation, TreeMutation};
use tokens::{split_arguments, Arguments};

pub const HELP: &[&str] = &[
    "Workspace:",
    "  load <file>                   open a file (created if missing)",
    "  save [file|all]               write to disk",
    "  init <text|xml> [with-log]    start an untitled document",
    "  close [file]                  close, asking to save changes",
    "  edit <file>                   switch to an open document",
    "  editor-list                   open documents with editing time",
    "  dir-tree                      open documents as a directory tree",
    "  undo | redo",
    "  log-on | log-off | log-show [file]",
    "  spell-check [file]",
    "Text documents:",
    "  append \"text\"",
    "  insert <line:col> \"text\"",
    "  delete <line:col> <len>",
    "  replace <line:col> <len> \"text\"",
    "  show [start:end]",
    "XML documents:",
    "  insert-before <tag> <newId> <targetId> [\"text\"]",
    "  append-child <tag> <newId> <parentId> [\"text\"]",
    "  edit-id <oldId> <newId>",
    "  edit-text <id> [\"text\"]",
    "  delete <id>",
    "  xml-tree [file]",
    "help | exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Active,
    All,
    File(String),
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Load(String),
    Save(SaveTarget),
    Init { kind: DocumentKind, with_log: bool },
    Close(Option<String>),
    Activate(String),
    EditorList,
    DirTree,
    Undo,
    Redo,
    /// Edit or query of the active document
    Execute(Command),
    /// Element-tree view of a named document
    TreeOf(String),
    LogOn(Option<String>),
    LogOff(Option<String>),
    LogShow(Option<String>),
    SpellCheck(Option<String>),
    Help,
    Exit,
}

/// Parse a non-empty line. `delete` depends on the kind of the active
/// document; without one it is read as a text delete.
pub fn parse_request(line: &str, active: Option<DocumentKind>) -> Result<Request> {
    let args = split_arguments(line)?;
    let Some(verb) = args.verb() else {
        bail!("empty command");
    };
    let rest = args.rest();

    let request = match verb {
        "load" => Request::Load(one(&args, "load <file>")?),
        "save" => Request::Save(match optional(&args, "save [file|all]")? {
            None => SaveTarget::Active,
            Some(arg) if arg == "all" => SaveTarget::All,
            Some(file) => SaveTarget::File(file),
        }),
        "init" => parse_init(&args)?,
        "close" => Request::Close(optional(&args, "close [file]")?),
        "edit" => Request::Activate(one(&args, "edit <file>")?),
        "editor-list" => bare(&args, Request::EditorList, "editor-list")?,
        "dir-tree" => bare(&args, Request::DirTree, "dir-tree")?,
        "undo" => bare(&args, Request::Undo, "undo")?,
        "redo" => bare(&args, Request::Redo, "redo")?,
        "log-on" => Request::LogOn(optional(&args, "log-on [file]")?),
        "log-off" => Request::LogOff(optional(&args, "log-off [file]")?),
        "log-show" => Request::LogShow(optional(&args, "log-show [file]")?),
        "spell-check" => Request::SpellCheck(optional(&args, "spell-check [file]")?),
        "help" => bare(&args, Request::Help, "help")?,
        "exit" => bare(&args, Request::Exit, "exit")?,
        "xml-tree" => match optional(&args, "xml-tree [file]")? {
            Some(file) => Request::TreeOf(file),
            None => Request::Execute(Command::Query(Query::Tree)),
        },

        "append" => match (rest, &args.text) {
            ([], Some(text)) => text_command(TextMutation::Append { text: text.clone() }),
            _ => usage("append \"text\"")?,
        },
        "insert" => match (rest, &args.text) {
            ([at], Some(text)) => text_command(TextMutation::Insert {
                at: at.parse()?,
                text: text.clone(),
            }),
            _ => usage("insert <line:col> \"text\"")?,
        },
        "replace" => match (rest, &args.text) {
            ([at, len], Some(text)) => text_command(TextMutation::Replace {
                at: at.parse()?,
                len: length(len)?,
                text: text.clone(),
            }),
            _ => usage("replace <line:col> <len> \"text\"")?,
        },
        "show" => match (rest, &args.text) {
            ([], None) => Request::Execute(Command::Query(Query::Show { range: None })),
            ([range], None) => Request::Execute(Command::Query(Query::Show {
                range: Some(range.parse()?),
            })),
            _ => usage("show [start:end]")?,
        },
        "delete" => parse_delete(&args, active)?,

        "insert-before" => match (rest, &args.text) {
            ([tag, new_id, target_id], text) => tree_command(TreeMutation::InsertBefore {
                tag: tag.clone(),
                new_id: new_id.clone(),
                target_id: target_id.clone(),
                text: text.clone(),
            }),
            _ => usage("insert-before <tag> <newId> <targetId> [\"text\"]")?,
        },
        "append-child" => match (rest, &args.text) {
            ([tag, new_id, parent_id], text) => tree_command(TreeMutation::AppendChild {
                tag: tag.clone(),
                new_id: new_id.clone(),
                parent_id: parent_id.clone(),
                text: text.clone(),
            }),
            _ => usage("append-child <tag> <newId> <parentId> [\"text\"]")?,
        },
        "edit-id" => match (rest, &args.text) {
            ([old_id, new_id], None) => tree_command(TreeMutation::SetId {
                old_id: old_id.clone(),
                new_id: new_id.clone(),
            }),
            _ => usage("edit-id <oldId> <newId>")?,
        },
        "edit-text" => match (rest, &args.text) {
            ([id], text) => tree_command(TreeMutation::SetText {
                id: id.clone(),
                text: text.clone(),
            }),
            _ => usage("edit-text <id> [\"text\"]")?,
        },

        other => bail!("unknown command '{other}', type 'help' for a list"),
    };
    Ok(request)
}

fn parse_init(args: &Arguments) -> Result<Request> {
    const USAGE: &str = "init <text|xml> [with-log]";
    if args.text.is_some() {
        return usage(USAGE);
    }
    let (kind, with_log) = match args.rest() {
        [kind] => (kind, false),
        [kind, flag] if flag == "with-log" => (kind, true),
        _ => return usage(USAGE),
    };
    let kind = match kind.as_str() {
        "text" => DocumentKind::Flat,
        "xml" => DocumentKind::Structural,
        _ => return usage(USAGE),
    };
    Ok(Request::Init { kind, with_log })
}

fn parse_delete(args: &Arguments, active: Option<DocumentKind>) -> Result<Request> {
    match (active, args.rest(), &args.text) {
        (Some(DocumentKind::Structural), [id], None) => {
            Ok(tree_command(TreeMutation::DeleteSubtree { id: id.clone() }))
        }
        (Some(DocumentKind::Structural), _, _) => usage("delete <id>"),
        (_, [at, len], None) => Ok(text_command(TextMutation::Delete {
            at: at.parse()?,
            len: length(len)?,
        })),
        _ => usage("delete <line:col> <len>"),
    }
}

fn text_command(mutation: TextMutation) -> Request {
    Request::Execute(Command::Text(mutation))
}

fn tree_command(mutation: TreeMutation) -> Request {
    Request::Execute(Command::Tree(mutation))
}

fn length(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| anyhow!("expected a length, got '{s}'"))
}

fn usage<T>(form: &str) -> Result<T> {
    Err(anyhow!("usage: {form}"))
}

fn bare(args: &Arguments, request: Request, form: &str) -> Result<Request> {
    if args.rest().is_empty() && args.text.is_none() {
        Ok(request)
    } else {
        usage(form)
    }
}

fn one(args: &Arguments, form: &str) -> Result<String> {
    match (args.rest(), &args.text) {
        ([arg], None) => Ok(arg.clone()),
        _ => usage(form),
    }
}

fn optional(args: &Arguments, form: &str) -> Result<Option<String>> {
    match (args.rest(), &args.text) {
        ([], None) => Ok(None),
        ([arg], None) => Ok(Some(arg.clone())),
        _ => usage(form),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_editor::Position;

    fn parse(line: &str) -> Request {
        parse_request(line, None).unwrap()
    }

    #[test]
    fn test_workspace_requests() {
        assert_eq!(parse("load a.txt"), Request::Load("a.txt".to_string()));
        assert_eq!(parse("save"), Request::Save(SaveTarget::Active));
        assert_eq!(parse("save all"), Request::Save(SaveTarget::All));
        assert_eq!(
            parse("init xml with-log"),
            Request::Init {
                kind: DocumentKind::Structural,
                with_log: true
            }
        );
        assert_eq!(parse("close"), Request::Close(None));
        assert_eq!(parse("edit b.xml"), Request::Activate("b.xml".to_string()));
        assert_eq!(parse("xml-tree b.xml"), Request::TreeOf("b.xml".to_string()));
    }

    #[test]
    fn test_delete_follows_active_kind() {
        assert_eq!(
            parse_request("delete book1", Some(DocumentKind::Structural)).unwrap(),
            tree_command(TreeMutation::DeleteSubtree {
                id: "book1".to_string()
            })
        );
        assert_eq!(
            parse_request("delete 2:1 3", Some(DocumentKind::Flat)).unwrap(),
            text_command(TextMutation::Delete {
                at: Position::new(2, 1),
                len: 3
            })
        );
        assert!(parse_request("delete 2:1 3", Some(DocumentKind::Structural)).is_err());
    }

    #[test]
    fn test_tree_requests_with_optional_text() {
        assert_eq!(
            parse(r#"append-child title t1 b1 "Dune""#),
            tree_command(TreeMutation::AppendChild {
                tag: "title".to_string(),
                new_id: "t1".to_string(),
                parent_id: "b1".to_string(),
                text: Some("Dune".to_string()),
            })
        );
        assert_eq!(
            parse("edit-text t1"),
            tree_command(TreeMutation::SetText {
                id: "t1".to_string(),
                text: None
            })
        );
    }

    #[test]
    fn test_text_requests() {
        assert_eq!(
            parse(r#"replace 1:4 2 "xy""#),
            text_command(TextMutation::Replace {
                at: Position::new(1, 4),
                len: 2,
                text: "xy".to_string()
            })
        );
        assert_eq!(
            parse("show 1:2"),
            Request::Execute(Command::Query(Query::Show {
                range: Some("1:2".parse().unwrap())
            }))
        );
    }

    #[test]
    fn test_usage_errors() {
        let err = parse_request("append", None).unwrap_err();
        assert_eq!(err.to_string(), "usage: append \"text\"");
        assert!(parse_request("init json", None).is_err());
        assert!(parse_request("insert 0:1 \"x\"", None).is_err());
        assert!(parse_request("undo now", None).is_err());
        assert_eq!(
            parse_request("frobnicate", None).unwrap_err().to_string(),
            "unknown command 'frobnicate', type 'help' for a list"
        );
    }
}
