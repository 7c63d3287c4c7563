//! Box-drawing outline of an element tree.
//!
//! ```text
//! bookstore [id="root"]
//!     ├── book [id="book1"]
//!     │   └── "Everyday Italian"
//!     └── book [id="book2"]
//! ```

use crate::tree::{ElementRef, ElementTree};

const BRANCH: &str = "├── ";
const LAST: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render the whole tree, one line per element or text leaf.
pub fn render_tree(tree: &ElementTree) -> Vec<String> {
    let root = tree.root_element();
    let mut lines = vec![label(&root)];
    render_body(&root, SPACE, &mut lines);
    lines
}

fn render_element(element: &ElementRef<'_>, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
    let connector = if is_last { LAST } else { BRANCH };
    lines.push(format!("{prefix}{connector}{}", label(element)));

    let extension = if is_last { SPACE } else { PIPE };
    render_body(element, &format!("{prefix}{extension}"), lines);
}

fn render_body(element: &ElementRef<'_>, prefix: &str, lines: &mut Vec<String>) {
    let children: Vec<_> = element.children().collect();

    if let Some(text) = element.text().filter(|t| !t.trim().is_empty()) {
        let connector = if children.is_empty() { LAST } else { BRANCH };
        lines.push(format!("{prefix}{connector}\"{text}\""));
    }

    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        render_element(child, prefix, i + 1 == count, lines);
    }
}

fn label(element: &ElementRef<'_>) -> String {
    let attrs: Vec<String> = element
        .attributes()
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect();
    format!("{} [{}]", element.tag(), attrs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_render_tree() {
        let markup = parse(
            r#"<bookstore id="root">
                <book id="book1" category="cooking">
                    <title id="title1" lang="en">Everyday Italian</title>
                </book>
                <book id="book2"></book>
            </bookstore>"#,
        )
        .unwrap();

        assert_eq!(
            render_tree(&markup.tree),
            vec![
                r#"bookstore [id="root"]"#,
                r#"    ├── book [id="book1", category="cooking"]"#,
                r#"    │   └── title [id="title1", lang="en"]"#,
                r#"    │       └── "Everyday Italian""#,
                r#"    └── book [id="book2"]"#,
            ]
        );
    }

    #[test]
    fn test_root_text_leaf() {
        let markup = parse(r#"<note id="n">Remember</note>"#).unwrap();
        assert_eq!(
            render_tree(&markup.tree),
            vec![r#"note [id="n"]"#, r#"    └── "Remember""#]
        );
    }
}
