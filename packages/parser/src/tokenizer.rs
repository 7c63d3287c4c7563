use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Markup tokens.
///
/// Tags are lexed whole; attributes are pulled out of an `Open` slice
/// afterwards by [`open_tag`]. Anything that is not a tag is `Text`.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // <?xml version="1.0"?>
    #[regex(r"<\?[^>]*>", |lex| lex.slice())]
    Declaration(&'src str),

    // <!-- ... --> and <!DOCTYPE ...>
    #[regex(r"<![^>]*>", |lex| lex.slice())]
    Comment(&'src str),

    #[regex(r"</[A-Za-z_][A-Za-z0-9_.:-]*[ \t]*>", |lex| close_name(lex.slice()))]
    Close(&'src str),

    #[regex(r#"<[A-Za-z_][A-Za-z0-9_.:-]*([^<>"]|"[^"]*")*>"#, |lex| lex.slice())]
    Open(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Declaration(s) => write!(f, "declaration {}", s),
            Token::Comment(s) => write!(f, "comment {}", s),
            Token::Close(name) => write!(f, "</{}>", name),
            Token::Open(s) => write!(f, "{}", s),
            Token::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// Tokenize markup into `(token, byte span)` pairs.
///
/// Never fails: a stray `<` that starts no valid tag is kept as text.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => (token, span),
            Err(()) => (Token::Text(&source[span.clone()]), span),
        })
        .collect()
}

fn close_name(slice: &str) -> &str {
    slice
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim_end()
}

/// An opening tag split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTag<'src> {
    pub name: &'src str,
    pub attributes: Vec<(&'src str, &'src str)>,
    pub self_closing: bool,
}

/// Split an `Open` token slice (`<tag a="1" b="2">`) into name and
/// attributes. Malformed attribute text is skipped.
pub fn open_tag(slice: &str) -> OpenTag<'_> {
    let (name, rest, self_closing) = split_open(slice);

    let mut attributes = Vec::new();
    for (result, span) in AttrToken::lexer(rest).spanned() {
        match result {
            Ok(AttrToken::Pair(pair)) => {
                if let Some((key, value)) = split_pair(pair) {
                    attributes.push((key, value));
                }
            }
            Ok(AttrToken::Bare(word)) => {
                tracing::warn!(tag = name, attribute = word, "skipping attribute without value");
            }
            Err(()) => {
                tracing::warn!(tag = name, text = &rest[span], "skipping malformed attribute text");
            }
        }
    }

    OpenTag {
        name,
        attributes,
        self_closing,
    }
}

/// Name and self-closing flag of an `Open` slice, without looking at the
/// attributes.
pub fn open_tag_name(slice: &str) -> (&str, bool) {
    let (name, _, self_closing) = split_open(slice);
    (name, self_closing)
}

fn split_open(slice: &str) -> (&str, &str, bool) {
    let inner = slice.trim_start_matches('<').trim_end_matches('>');
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let (name, rest) = inner.split_at(name_end);
    (name, rest, self_closing)
}

/// Decode the character references the serializer writes.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum AttrToken<'src> {
    #[regex(r#"[A-Za-z_][A-Za-z0-9_.:-]*[ \t]*=[ \t]*"[^"]*""#, |lex| lex.slice())]
    Pair(&'src str),

    #[regex(r"[A-Za-z_][A-Za-z0-9_.:-]*", |lex| lex.slice())]
    Bare(&'src str),
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (key, value) = pair.split_once('=')?;
    let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((key.trim(), value))
}
