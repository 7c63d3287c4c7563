use crate::ast::{Attributes, Element};
use crate::error::{ParseError, ParseResult, TreeError};
use crate::tokenizer::{open_tag, open_tag_name, tokenize, unescape, Token};
use crate::tree::ElementTree;
use std::collections::HashMap;
use std::ops::Range;

/// Declaration written when the source had none.
pub const DEFAULT_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Prefix of the command-log marker line.
pub const LOG_DIRECTIVE_PREFIX: &str = "# log";

/// A parsed structural document.
///
/// The declaration and the log directive are header lines, not nodes. They
/// are kept so the serializer can write them back.
#[derive(Debug, Clone, PartialEq)]
pub struct Markup {
    pub declaration: String,
    pub log_directive: Option<String>,
    pub tree: ElementTree,
}

impl Markup {
    pub fn new(tree: ElementTree) -> Self {
        Self {
            declaration: DEFAULT_DECLARATION.to_string(),
            log_directive: None,
            tree,
        }
    }

    pub fn with_log_directive(mut self, directive: impl Into<String>) -> Self {
        self.log_directive = Some(directive.into());
        self
    }
}

impl Default for Markup {
    fn default() -> Self {
        Self::new(ElementTree::default())
    }
}

/// Parse a structural document.
pub fn parse(source: &str) -> ParseResult<Markup> {
    let mut declaration = None;
    let mut log_directive = None;
    let mut body = Vec::new();

    for line in source.lines().map(str::trim) {
        if line.starts_with(LOG_DIRECTIVE_PREFIX) {
            log_directive.get_or_insert_with(|| line.to_string());
        } else if line.starts_with("<?xml") {
            declaration = Some(line.to_string());
        } else if !line.is_empty() {
            body.push(line);
        }
    }

    let content = body.join(" ");
    let root = Parser::new(&content).parse_root()?;
    let tree = ElementTree::new(root).map_err(|err| match err {
        TreeError::DuplicateId(id) => ParseError::duplicate_id(id),
        _ => ParseError::MissingRoot,
    })?;

    Ok(Markup {
        declaration: declaration.unwrap_or_else(|| DEFAULT_DECLARATION.to_string()),
        log_directive,
        tree,
    })
}

/// Depth-counting element parser over the token stream.
///
/// An element whose body holds no child tags takes the raw body as its
/// text. Otherwise the element is opened on a stack and its children are
/// parsed in place; text found between children becomes the element's text
/// if it has none yet.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    /// For each open-tag token, the index of its matching close tag
    closes: Vec<Option<usize>>,
    pos: usize,
    stack: Vec<(Element, usize)>,
    root: Option<Element>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let tokens = tokenize(source);
        let closes = match_closes(&tokens);
        Self {
            source,
            tokens,
            closes,
            pos: 0,
            stack: Vec::new(),
            root: None,
        }
    }

    /// Parse the first top-level element.
    pub fn parse_root(mut self) -> ParseResult<Element> {
        while self.pos < self.tokens.len() {
            let (token, span) = self.tokens[self.pos].clone();
            self.pos += 1;

            match token {
                Token::Open(slice) => self.open(slice, span),
                Token::Close(name) => self.close(name),
                Token::Text(text) => self.text(text),
                Token::Declaration(_) | Token::Comment(_) => {}
            }

            if self.root.is_some() {
                break;
            }
        }

        if let Some((element, pos)) = self.stack.into_iter().next() {
            return Err(ParseError::unclosed(element.tag, pos));
        }
        self.root.ok_or(ParseError::MissingRoot)
    }

    fn open(&mut self, slice: &'src str, span: Range<usize>) {
        let tag = open_tag(slice);
        let mut element = Element::new(tag.name);
        element.attributes = tag
            .attributes
            .into_iter()
            .map(|(key, value)| (key, unescape(value)))
            .collect::<Attributes>();

        if tag.self_closing {
            self.attach(element);
            return;
        }

        // `pos` already points past this open tag
        match self.closes[self.pos - 1] {
            Some(close) if self.is_leaf_body(close) => {
                let body_start = span.end;
                let body_end = self.tokens[close].1.start;
                let text = self.source[body_start..body_end].trim();
                if !text.is_empty() {
                    element.text = Some(unescape(text));
                }
                self.pos = close + 1;
                self.attach(element);
            }
            _ => self.stack.push((element, span.start)),
        }
    }

    fn close(&mut self, name: &str) {
        let Some(depth) = self.stack.iter().rposition(|(e, _)| e.tag == name) else {
            tracing::warn!(tag = name, "ignoring close tag with no open element");
            return;
        };

        while self.stack.len() > depth + 1 {
            if let Some((element, _)) = self.stack.pop() {
                tracing::warn!(tag = %element.tag, closed_by = name, "auto-closing element");
                self.attach(element);
            }
        }
        if let Some((element, _)) = self.stack.pop() {
            self.attach(element);
        }
    }

    fn text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match self.stack.last_mut() {
            Some((parent, _)) if parent.text.is_none() => parent.text = Some(unescape(text)),
            Some((parent, _)) => {
                tracing::warn!(tag = %parent.tag, text, "dropping extra text between children");
            }
            None => tracing::warn!(text, "ignoring text outside the root element"),
        }
    }

    fn attach(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some((parent, _)) => parent.children.push(element),
            None => self.root = Some(element),
        }
    }

    fn is_leaf_body(&self, close: usize) -> bool {
        self.tokens[self.pos..close]
            .iter()
            .all(|(token, _)| !matches!(token, Token::Open(_) | Token::Close(_)))
    }
}

/// Pair every open tag with its close tag in one pass. Nesting is counted
/// per tag name, so `<a><b></a>` still pairs the `a` tags.
fn match_closes(tokens: &[(Token<'_>, Range<usize>)]) -> Vec<Option<usize>> {
    let mut closes = vec![None; tokens.len()];
    let mut open: HashMap<&str, Vec<usize>> = HashMap::new();

    for (index, (token, _)) in tokens.iter().enumerate() {
        match token {
            Token::Open(slice) => {
                let (name, self_closing) = open_tag_name(slice);
                if !self_closing {
                    open.entry(name).or_default().push(index);
                }
            }
            Token::Close(name) => {
                if let Some(start) = open.get_mut(name).and_then(Vec::pop) {
                    closes[start] = Some(index);
                }
            }
            _ => {}
        }
    }
    closes
}
