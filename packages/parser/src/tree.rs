//! # Element Tree
//!
//! Arena-backed element tree with an id index.
//!
//! ## Layout
//!
//! ```text
//! ElementTree
//! ├── nodes: Vec<Option<Node>>    # slot per node, NodeId = slot number
//! ├── root: NodeId                # never detached
//! └── index: id → NodeId          # every reachable element with an id
//! ```
//!
//! Parents own their children through `children: Vec<NodeId>`. The `parent`
//! field is a navigation back-reference only.
//!
//! Slots are never reused. Detaching a subtree moves its nodes out of the
//! arena into an owned [`Subtree`] and leaves the slots vacant, so the same
//! subtree can later be put back under the very same `NodeId`s. This is what
//! lets undo/redo hold `NodeId`s across any number of round trips.
//!
//! Every public mutation either fails before writing anything or leaves the
//! index and the child lists in agreement.

use crate::ast::{Attributes, Element, ID_ATTRIBUTE};
use crate::error::TreeError;
use std::collections::{HashMap, HashSet};

/// Stable handle to a node slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: Attributes,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Structural document: one root element plus an id index.
#[derive(Debug, Clone)]
pub struct ElementTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    index: HashMap<String, NodeId>,
}

/// A detached subtree, owned outside the arena.
///
/// Remembers where it was cut from so [`ElementTree::reattach`] can put it
/// back exactly.
#[derive(Debug, Clone)]
pub struct Subtree {
    root: NodeId,
    parent: NodeId,
    position: usize,
    nodes: Vec<(NodeId, Node)>,
}

impl Default for ElementTree {
    /// `<root id="root"></root>`
    fn default() -> Self {
        Self::from_root(Element::new("root").with_id("root"))
    }
}

impl PartialEq for ElementTree {
    /// Structural equality: same tags, attributes, text and child order.
    fn eq(&self, other: &Self) -> bool {
        self.to_element() == other.to_element()
    }
}

impl ElementTree {
    /// Build a tree from an owned element, indexing every id.
    pub fn new(root: Element) -> Result<Self, TreeError> {
        check_new_element(&root, |_| false)?;
        Ok(Self::from_root(root))
    }

    fn from_root(root: Element) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            index: HashMap::new(),
        };
        tree.root = tree.alloc(root, None);
        tree.index_subtree(tree.root);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_element(&self) -> ElementRef<'_> {
        ElementRef {
            tree: self,
            node: self.root,
        }
    }

    /// Resolve an element id to its node.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<ElementRef<'_>> {
        self.lookup(id).map(|node| ElementRef { tree: self, node })
    }

    /// View a live node. Returns `None` for detached slots.
    pub fn get(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.is_live(node).then_some(ElementRef { tree: self, node })
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node.0), Some(Some(_)))
    }

    /// Number of indexed ids.
    pub fn id_count(&self) -> usize {
        self.index.len()
    }

    /// Number of elements reachable from the root.
    pub fn len(&self) -> usize {
        self.walk().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// All indexed ids, unordered.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Depth-first pre-order walk from the root.
    pub fn walk(&self) -> Vec<ElementRef<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            out.push(ElementRef { tree: self, node });
            stack.extend(self.node(node).children.iter().rev().copied());
        }
        out
    }

    /// Owned copy of the whole tree.
    pub fn to_element(&self) -> Element {
        self.root_element().to_element()
    }

    // ---------------------------------------------------------------------
    // Structural mutations (validated, addressed by element id)
    // ---------------------------------------------------------------------

    /// Splice `element` into the target's parent, immediately before the
    /// target.
    pub fn insert_before(&mut self, element: Element, target_id: &str) -> Result<NodeId, TreeError> {
        check_new_element(&element, |id| self.contains_id(id))?;

        let target = self
            .lookup(target_id)
            .ok_or_else(|| TreeError::NotFound(target_id.to_string()))?;
        let parent = self
            .node(target)
            .parent
            .ok_or(TreeError::CannotInsertBeforeRoot)?;
        let position = self.position_in_parent(target, parent);

        Ok(self.graft(element, parent, position))
    }

    /// Append `element` as the last child of `parent_id`.
    pub fn append_child(&mut self, element: Element, parent_id: &str) -> Result<NodeId, TreeError> {
        check_new_element(&element, |id| self.contains_id(id))?;

        let parent = self
            .lookup(parent_id)
            .ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
        let position = self.node(parent).children.len();

        Ok(self.graft(element, parent, position))
    }

    /// Change an element's id and re-key the index.
    pub fn set_id(&mut self, old_id: &str, new_id: &str) -> Result<NodeId, TreeError> {
        let node = self
            .lookup(old_id)
            .ok_or_else(|| TreeError::NotFound(old_id.to_string()))?;
        if new_id.is_empty() {
            return Err(TreeError::EmptyId);
        }
        if old_id == new_id {
            return Ok(node);
        }
        if self.contains_id(new_id) {
            return Err(TreeError::DuplicateId(new_id.to_string()));
        }

        self.rekey(node, new_id);
        Ok(node)
    }

    /// Replace an element's text. Children are left alone.
    ///
    /// Returns the node and its previous text.
    pub fn set_text(
        &mut self,
        id: &str,
        text: Option<String>,
    ) -> Result<(NodeId, Option<String>), TreeError> {
        let node = self
            .lookup(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let previous = self.replace_text(node, text);
        Ok((node, previous))
    }

    /// Cut an element and all its descendants out of the tree.
    pub fn delete_subtree(&mut self, id: &str) -> Result<Subtree, TreeError> {
        let node = self
            .lookup(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        if node == self.root {
            return Err(TreeError::CannotDeleteRoot);
        }
        Ok(self.detach(node))
    }

    // ---------------------------------------------------------------------
    // Node-level primitives used to invert and replay mutations.
    // Misuse (vacant slots, detaching the root, id collisions) is a bug in
    // the caller and panics.
    // ---------------------------------------------------------------------

    /// Detach a live non-root node and everything below it.
    pub fn detach(&mut self, node: NodeId) -> Subtree {
        let parent = self
            .node(node)
            .parent
            .unwrap_or_else(|| panic!("element tree invariant: cannot detach the root"));
        let position = self.position_in_parent(node, parent);
        self.node_mut(parent).children.remove(position);

        let mut nodes = Vec::new();
        self.vacate(node, &mut nodes);
        if let Some((_, root)) = nodes.first_mut() {
            root.parent = None;
        }

        Subtree {
            root: node,
            parent,
            position,
            nodes,
        }
    }

    /// Put a detached subtree back where it was cut from, under the same
    /// `NodeId`s, and re-index every id inside it.
    pub fn reattach(&mut self, subtree: Subtree) {
        let Subtree {
            root,
            parent,
            position,
            nodes,
        } = subtree;
        assert!(
            self.is_live(parent),
            "element tree invariant: reattach parent {parent:?} is not live"
        );

        for (id, mut node) in nodes {
            assert!(
                self.nodes[id.0].is_none(),
                "element tree invariant: slot {id:?} is occupied"
            );
            if id == root {
                node.parent = Some(parent);
            }
            if let Some(key) = node.attributes.id() {
                let previous = self.index.insert(key.to_string(), id);
                assert!(
                    previous.is_none(),
                    "element tree invariant: id '{key}' restored twice"
                );
            }
            self.nodes[id.0] = Some(node);
        }

        let children = &mut self.node_mut(parent).children;
        assert!(
            position <= children.len(),
            "element tree invariant: reattach position {position} out of bounds"
        );
        children.insert(position, root);
    }

    /// Swap a node's text, returning the previous value.
    pub fn replace_text(&mut self, node: NodeId, text: Option<String>) -> Option<String> {
        let text = text.filter(|t| !t.is_empty());
        std::mem::replace(&mut self.node_mut(node).text, text)
    }

    /// Give a node a new id. The new id must be free.
    pub fn rekey(&mut self, node: NodeId, new_id: &str) {
        if let Some(old) = self.node(node).attributes.id() {
            let old = old.to_string();
            self.index.remove(&old);
        }
        self.node_mut(node).attributes.set(ID_ATTRIBUTE, new_id);
        let previous = self.index.insert(new_id.to_string(), node);
        assert!(
            previous.is_none(),
            "element tree invariant: id '{new_id}' already indexed"
        );
    }

    /// Verify that the index and the tree agree.
    ///
    /// Checks parent back-references, that every reachable id maps to its
    /// element, that no id appears twice and that the index holds nothing
    /// unreachable.
    pub fn check_invariants(&self) -> Result<(), String> {
        let root = self
            .nodes
            .get(self.root.0)
            .and_then(Option::as_ref)
            .ok_or("root slot is vacant")?;
        if root.parent.is_some() {
            return Err("root has a parent".to_string());
        }

        let mut seen_ids = HashSet::new();
        let mut reachable = 0usize;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self
                .nodes
                .get(id.0)
                .and_then(Option::as_ref)
                .ok_or_else(|| format!("child {id:?} is vacant"))?;
            reachable += 1;

            if let Some(key) = node.attributes.id() {
                if !seen_ids.insert(key) {
                    return Err(format!("id '{key}' appears twice"));
                }
                match self.index.get(key) {
                    Some(indexed) if *indexed == id => {}
                    Some(indexed) => {
                        return Err(format!("index maps '{key}' to {indexed:?}, found at {id:?}"))
                    }
                    None => return Err(format!("id '{key}' is missing from the index")),
                }
            }

            for child in &node.children {
                let child_node = self
                    .nodes
                    .get(child.0)
                    .and_then(Option::as_ref)
                    .ok_or_else(|| format!("child {child:?} is vacant"))?;
                if child_node.parent != Some(id) {
                    return Err(format!("child {child:?} does not point back to {id:?}"));
                }
                stack.push(*child);
            }
        }

        if seen_ids.len() != self.index.len() {
            return Err(format!(
                "index holds {} ids but {} are reachable",
                self.index.len(),
                seen_ids.len()
            ));
        }
        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        if live != reachable {
            return Err(format!("{live} live nodes but {reachable} reachable"));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------

    fn node(&self, node: NodeId) -> &Node {
        self.nodes
            .get(node.0)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("element tree invariant: {node:?} is not live"))
    }

    fn node_mut(&mut self, node: NodeId) -> &mut Node {
        self.nodes
            .get_mut(node.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("element tree invariant: {node:?} is not live"))
    }

    fn position_in_parent(&self, node: NodeId, parent: NodeId) -> usize {
        self.node(parent)
            .children
            .iter()
            .position(|child| *child == node)
            .unwrap_or_else(|| panic!("element tree invariant: {node:?} missing from its parent"))
    }

    fn alloc(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(None);

        let Element {
            tag,
            attributes,
            text,
            children,
        } = element;
        let children = children
            .into_iter()
            .map(|child| self.alloc(child, Some(id)))
            .collect();

        self.nodes[id.0] = Some(Node {
            tag,
            attributes,
            text: text.filter(|t| !t.is_empty()),
            children,
            parent,
        });
        id
    }

    fn graft(&mut self, element: Element, parent: NodeId, position: usize) -> NodeId {
        let node = self.alloc(element, Some(parent));
        self.node_mut(parent).children.insert(position, node);
        self.index_subtree(node);
        node
    }

    fn index_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let entry = self.node(current);
            let key = entry.attributes.id().map(str::to_string);
            stack.extend(entry.children.iter().copied());
            if let Some(key) = key {
                self.index.insert(key, current);
            }
        }
    }

    fn vacate(&mut self, node: NodeId, out: &mut Vec<(NodeId, Node)>) {
        let taken = self.nodes[node.0]
            .take()
            .unwrap_or_else(|| panic!("element tree invariant: {node:?} vacated twice"));
        if let Some(key) = taken.attributes.id() {
            self.index.remove(key);
        }
        let children = taken.children.clone();
        out.push((node, taken));
        for child in children {
            self.vacate(child, out);
        }
    }
}

/// Reject empty tags and ids that collide with each other or with `taken`.
fn check_new_element(element: &Element, taken: impl Fn(&str) -> bool) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    for e in element.walk() {
        if e.tag.is_empty() {
            return Err(TreeError::EmptyTag);
        }
        if let Some(id) = e.id() {
            if taken(id) || !seen.insert(id) {
                return Err(TreeError::DuplicateId(id.to_string()));
            }
        }
    }
    Ok(())
}

impl Subtree {
    /// The detached element's node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node it was detached from.
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Its former index among the parent's children.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of elements in the subtree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the detached element itself.
    pub fn element_id(&self) -> Option<&str> {
        self.nodes.first().and_then(|(_, node)| node.attributes.id())
    }

    /// Every id inside the subtree, pre-order.
    pub fn ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|(_, node)| node.attributes.id())
            .collect()
    }

    pub fn to_element(&self) -> Element {
        let by_id: HashMap<NodeId, &Node> = self.nodes.iter().map(|(id, n)| (*id, n)).collect();
        build_element(self.root, &|id| by_id[&id])
    }
}

fn build_element<'a>(node: NodeId, resolve: &dyn Fn(NodeId) -> &'a Node) -> Element {
    let n = resolve(node);
    Element {
        tag: n.tag.clone(),
        attributes: n.attributes.clone(),
        text: n.text.clone(),
        children: n
            .children
            .iter()
            .map(|child| build_element(*child, resolve))
            .collect(),
    }
}

/// Borrowed view of a live element.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    tree: &'a ElementTree,
    node: NodeId,
}

impl<'a> ElementRef<'a> {
    fn data(&self) -> &'a Node {
        self.tree.node(self.node)
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &'a str {
        &self.data().tag
    }

    pub fn id(&self) -> Option<&'a str> {
        self.data().attributes.id()
    }

    pub fn attributes(&self) -> &'a Attributes {
        &self.data().attributes
    }

    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.node == self.tree.root
    }

    pub fn has_children(&self) -> bool {
        !self.data().children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |child| ElementRef { tree, node: *child })
    }

    pub fn parent(&self) -> Option<ElementRef<'a>> {
        let tree = self.tree;
        self.data().parent.map(|node| ElementRef { tree, node })
    }

    /// Index among the parent's children; `None` for the root.
    pub fn position(&self) -> Option<usize> {
        self.data()
            .parent
            .map(|parent| self.tree.position_in_parent(self.node, parent))
    }

    pub fn to_element(&self) -> Element {
        let tree = self.tree;
        build_element(self.node, &|id| tree.node(id))
    }
}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("node", &self.node)
            .field("tag", &self.tag())
            .field("id", &self.id())
            .finish()
    }
}
