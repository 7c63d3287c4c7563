//! # Tree Mutations
//!
//! Structural operations on an element tree, addressed by element id.
//!
//! ## Design
//!
//! A [`TreeMutation`] is pure intent: what the user asked for, serializable,
//! with no reference to tree internals. Applying it validates everything up
//! front, performs the change and hands back a [`TreeEdit`]: the same intent
//! plus the node handles and captured state needed to invert it.
//!
//! ### Inverses
//! - InsertBefore / AppendChild: detach the created node (kept for redo)
//! - SetId: re-key back to the old id
//! - SetText: restore the previous text
//! - DeleteSubtree: put the captured subtree back at its parent and
//!   position, re-indexing every descendant
//!
//! Redo never re-validates. It replays against exactly the state the undo
//! left behind.

use crate::mutation_trait::Reversible;
use quire_parser::{Element, ElementTree, NodeId, Subtree, TreeError};
use serde::{Deserialize, Serialize};

/// Structural edit intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TreeMutation {
    /// New element spliced in before an existing non-root sibling
    InsertBefore {
        tag: String,
        new_id: String,
        target_id: String,
        text: Option<String>,
    },

    /// New element added as the last child of a parent
    AppendChild {
        tag: String,
        new_id: String,
        parent_id: String,
        text: Option<String>,
    },

    /// Change an element's id
    SetId { old_id: String, new_id: String },

    /// Replace an element's text (`None` clears it)
    SetText { id: String, text: Option<String> },

    /// Remove an element and everything below it
    DeleteSubtree { id: String },
}

impl TreeMutation {
    /// Validate and apply, returning the recorded edit.
    ///
    /// On error the tree is unchanged.
    pub fn apply(&self, tree: &mut ElementTree) -> Result<TreeEdit, TreeError> {
        let change = match self {
            TreeMutation::InsertBefore {
                tag,
                new_id,
                target_id,
                text,
            } => {
                let element = new_element(tag, new_id, text)?;
                let node = tree.insert_before(element, target_id)?;
                TreeChange::Inserted {
                    node,
                    detached: None,
                }
            }

            TreeMutation::AppendChild {
                tag,
                new_id,
                parent_id,
                text,
            } => {
                let element = new_element(tag, new_id, text)?;
                let node = tree.append_child(element, parent_id)?;
                TreeChange::Inserted {
                    node,
                    detached: None,
                }
            }

            TreeMutation::SetId { old_id, new_id } => {
                let node = tree.set_id(old_id, new_id)?;
                if node == tree.root() {
                    tracing::warn!(old_id = %old_id, new_id = %new_id, "changing the root element id");
                }
                TreeChange::Rekeyed {
                    node,
                    old_id: old_id.clone(),
                    new_id: new_id.clone(),
                }
            }

            TreeMutation::SetText { id, text } => {
                let (node, before) = tree.set_text(id, text.clone())?;
                TreeChange::Retexted {
                    node,
                    before,
                    after: text.clone().filter(|t| !t.is_empty()),
                }
            }

            TreeMutation::DeleteSubtree { id } => {
                let subtree = tree.delete_subtree(id)?;
                TreeChange::Deleted {
                    node: subtree.root(),
                    removed: Some(subtree),
                }
            }
        };

        Ok(TreeEdit {
            mutation: self.clone(),
            change,
        })
    }

    /// Verb used on the command line and in command logs.
    pub fn verb(&self) -> &'static str {
        match self {
            TreeMutation::InsertBefore { .. } => "insert-before",
            TreeMutation::AppendChild { .. } => "append-child",
            TreeMutation::SetId { .. } => "edit-id",
            TreeMutation::SetText { .. } => "edit-text",
            TreeMutation::DeleteSubtree { .. } => "delete",
        }
    }

    /// Command line that reproduces this mutation.
    pub fn describe(&self) -> String {
        match self {
            TreeMutation::InsertBefore {
                tag,
                new_id,
                target_id,
                text,
            } => with_text(format!("insert-before {tag} {new_id} {target_id}"), text),
            TreeMutation::AppendChild {
                tag,
                new_id,
                parent_id,
                text,
            } => with_text(format!("append-child {tag} {new_id} {parent_id}"), text),
            TreeMutation::SetId { old_id, new_id } => format!("edit-id {old_id} {new_id}"),
            TreeMutation::SetText { id, text } => with_text(format!("edit-text {id}"), text),
            TreeMutation::DeleteSubtree { id } => format!("delete {id}"),
        }
    }
}

fn new_element(tag: &str, id: &str, text: &Option<String>) -> Result<Element, TreeError> {
    if tag.is_empty() {
        return Err(TreeError::EmptyTag);
    }
    if id.is_empty() {
        return Err(TreeError::EmptyId);
    }
    let element = Element::new(tag).with_id(id);
    Ok(match text {
        Some(text) => element.with_text(text.clone()),
        None => element,
    })
}

fn with_text(line: String, text: &Option<String>) -> String {
    match text {
        Some(text) => format!("{line} \"{text}\""),
        None => line,
    }
}

/// An applied tree mutation with its inverse data.
#[derive(Debug)]
pub struct TreeEdit {
    mutation: TreeMutation,
    change: TreeChange,
}

/// What actually happened to the tree.
///
/// `Option<Subtree>` fields hold the nodes that are currently outside the
/// tree: `None` while the edit is applied for inserts, `Some` while it is
/// applied for deletes.
#[derive(Debug)]
enum TreeChange {
    Inserted {
        node: NodeId,
        detached: Option<Subtree>,
    },
    Rekeyed {
        node: NodeId,
        old_id: String,
        new_id: String,
    },
    Retexted {
        node: NodeId,
        before: Option<String>,
        after: Option<String>,
    },
    Deleted {
        node: NodeId,
        removed: Option<Subtree>,
    },
}

impl TreeEdit {
    pub fn mutation(&self) -> &TreeMutation {
        &self.mutation
    }
}

impl Reversible for TreeEdit {
    type Target = ElementTree;

    fn undo(&mut self, tree: &mut ElementTree) {
        match &mut self.change {
            TreeChange::Inserted { node, detached } => {
                *detached = Some(tree.detach(*node));
            }
            TreeChange::Rekeyed { node, old_id, .. } => tree.rekey(*node, old_id),
            TreeChange::Retexted { node, before, .. } => {
                tree.replace_text(*node, before.clone());
            }
            TreeChange::Deleted { removed, .. } => {
                let subtree = removed
                    .take()
                    .unwrap_or_else(|| panic!("history invariant: deleted subtree already restored"));
                tree.reattach(subtree);
            }
        }
    }

    fn redo(&mut self, tree: &mut ElementTree) {
        match &mut self.change {
            TreeChange::Inserted { detached, .. } => {
                let subtree = detached
                    .take()
                    .unwrap_or_else(|| panic!("history invariant: inserted node already attached"));
                tree.reattach(subtree);
            }
            TreeChange::Rekeyed { node, new_id, .. } => tree.rekey(*node, new_id),
            TreeChange::Retexted { node, after, .. } => {
                tree.replace_text(*node, after.clone());
            }
            TreeChange::Deleted { node, removed } => {
                *removed = Some(tree.detach(*node));
            }
        }
    }

    fn description(&self) -> String {
        self.mutation.describe()
    }

    fn is_noop(&self) -> bool {
        match &self.change {
            TreeChange::Rekeyed { old_id, new_id, .. } => old_id == new_id,
            TreeChange::Retexted { before, after, .. } => before == after,
            TreeChange::Inserted { .. } | TreeChange::Deleted { .. } => false,
        }
    }
}
