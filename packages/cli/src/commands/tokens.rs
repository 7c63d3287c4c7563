use anyhow::{bail, Result};

/// A split command line: whitespace-separated words plus at most one
/// double-quoted text argument, which must come last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arguments {
    pub words: Vec<String>,
    pub text: Option<String>,
}

impl Arguments {
    pub fn verb(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// Words after the verb
    pub fn rest(&self) -> &[String] {
        self.words.get(1..).unwrap_or_default()
    }
}

/// Split a line. The text runs from the first `"` to the last one, so it
/// may itself contain quotes.
pub fn split_arguments(line: &str) -> Result<Arguments> {
    let Some(open) = line.find('"') else {
        return Ok(Arguments {
            words: words(line),
            text: None,
        });
    };

    let close = line.rfind('"').filter(|&close| close > open);
    let Some(close) = close else {
        bail!("unterminated text argument");
    };
    if !line[close + 1..].trim().is_empty() {
        bail!("text argument must come last");
    }

    Ok(Arguments {
        words: words(&line[..open]),
        text: Some(line[open + 1..close].to_string()),
    })
}

fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}
