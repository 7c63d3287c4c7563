use crate::parser::Markup;
use crate::tree::{ElementRef, ElementTree};
use std::fmt::Write;

/// Serializer turns an element tree back into source lines.
///
/// Output is one element per line, indented by nesting depth. Round trips are
/// structural: parsing the output yields the same tree, not the same bytes.
pub struct Serializer {
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_string: "    ".to_string(), // 4 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_string: indent.to_string(),
        }
    }

    /// Header lines (log directive, declaration) followed by the tree.
    pub fn serialize(&self, markup: &Markup) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(directive) = &markup.log_directive {
            lines.push(directive.clone());
        }
        lines.push(markup.declaration.clone());
        lines.extend(self.serialize_tree(&markup.tree));
        lines
    }

    pub fn serialize_tree(&self, tree: &ElementTree) -> Vec<String> {
        let mut lines = Vec::new();
        self.serialize_element(tree.root_element(), 0, &mut lines);
        lines
    }

    fn serialize_element(&self, element: ElementRef<'_>, depth: usize, lines: &mut Vec<String>) {
        let indent = self.indent_string.repeat(depth);
        let open = open_tag(&element);
        let tag = element.tag();

        if element.has_children() {
            lines.push(format!("{indent}{open}"));
            if let Some(text) = element.text().filter(|t| !t.trim().is_empty()) {
                lines.push(format!("{indent}{}{}", self.indent_string, escape_text(text)));
            }
            for child in element.children() {
                self.serialize_element(child, depth + 1, lines);
            }
            lines.push(format!("{indent}</{tag}>"));
        } else {
            let text = escape_text(element.text().unwrap_or_default());
            lines.push(format!("{indent}{open}{text}</{tag}>"));
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn open_tag(element: &ElementRef<'_>) -> String {
    let mut out = format!("<{}", element.tag());
    for (key, value) in element.attributes().iter() {
        let _ = write!(out, r#" {key}="{}""#, escape_text(value).replace('"', "&quot;"));
    }
    out.push('>');
    out
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialize with the default 4-space indent.
pub fn serialize(markup: &Markup) -> Vec<String> {
    Serializer::new().serialize(markup)
}
