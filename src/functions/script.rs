// src/functions/script.rs
//! Line-oriented scripts: one call per line, `name arg arg ...`.
//!
//! - `"text"` is always a string (JSON escapes apply)
//! - bare words and `'single quoted'` text are read as JSON literals when
//!   they parse (`3`, `2.5`, `true`, `[1, 2]`, `{"k": "v"}`) and as strings
//!   otherwise, so `archive:/docs` needs no quotes
//! - `#` starts a comment

use super::registry::FunctionRegistry;
use super::types::{FunctionError, FunctionResult};
use crate::fs::VolumeError;
use crate::serialization::Value;
use crate::session::{PathLike, Session};

/// What one script line did.
#[derive(Debug)]
pub struct LineOutcome {
    /// 1-based line number
    pub line: usize,
    pub function: String,
    pub result: FunctionResult,
}

impl LineOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `text` line by line, stopping after the first failing line.
pub fn run_script(session: &mut Session, registry: &FunctionRegistry, text: &str) -> Vec<LineOutcome> {
    let mut outcomes = Vec::new();
    for (index, source) in text.lines().enumerate() {
        let line = index + 1;
        let (function, result) = match parse_line(source, line) {
            Ok(None) => continue,
            Ok(Some((name, args))) => {
                let result = registry.call(session, &name, &args);
                (name, result)
            }
            Err(e) => (String::new(), Err(e)),
        };

        let failed = result.is_err();
        if let Err(e) = &result {
            tracing::warn!(line, function = %function, error = %e, "script line failed");
        }
        outcomes.push(LineOutcome { line, function, result });
        if failed {
            break;
        }
    }
    outcomes
}

/// Run a script stored on a volume. `scriptpath` reports it while it runs.
pub fn run_volume_script<P: PathLike + ?Sized>(
    session: &mut Session,
    registry: &FunctionRegistry,
    path: &P,
) -> Result<Vec<LineOutcome>, VolumeError> {
    let path = session.locate(path)?;
    let text = session
        .registry()
        .volume_for(&path)?
        .read_all(&path)?
        .text()
        .into_owned();
    tracing::info!(%path, "running script");
    let outer = session.set_script_path(Some(path));
    let outcomes = run_script(session, registry, &text);
    session.set_script_path(outer);
    Ok(outcomes)
}

/// Split one line into a function name and its arguments; `None` for blank lines.
pub fn parse_line(source: &str, line: usize) -> Result<Option<(String, Vec<Value>)>, FunctionError> {
    let mut tokens = tokenize(source, line)?.into_iter();
    let name = match tokens.next() {
        None => return Ok(None),
        Some(Token::Bare(name)) => name,
        Some(Token::Quoted(_)) => {
            return Err(syntax(line, "expected a function name"));
        }
    };
    Ok(Some((name, tokens.map(Token::into_value).collect())))
}

#[derive(Debug, PartialEq)]
enum Token {
    Quoted(String),
    Bare(String),
}

impl Token {
    fn into_value(self) -> Value {
        match self {
            Token::Quoted(text) => Value::String(text),
            Token::Bare(text) => serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|json| Value::from_plain_json(&json))
                .unwrap_or(Value::String(text)),
        }
    }
}

fn syntax(line: usize, reason: &str) -> FunctionError {
    FunctionError::Syntax { line, reason: reason.to_string() }
}

fn tokenize(source: &str, line: usize) -> Result<Vec<Token>, FunctionError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }

        match c {
            '"' => {
                let end = closing_quote(&chars, i).ok_or_else(|| syntax(line, "unterminated string"))?;
                let raw: String = chars[i..=end].iter().collect();
                let text = serde_json::from_str::<String>(&raw)
                    .map_err(|e| syntax(line, &format!("bad string literal: {}", e)))?;
                tokens.push(Token::Quoted(text));
                i = end + 1;
            }
            '\'' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '\'')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| syntax(line, "unterminated quote"))?;
                tokens.push(Token::Bare(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            _ => {
                let start = i;
                let mut depth = 0usize;
                while i < chars.len() {
                    match chars[i] {
                        '[' | '{' => depth += 1,
                        ']' | '}' => depth = depth.saturating_sub(1),
                        '"' if depth > 0 => {
                            i = closing_quote(&chars, i).ok_or_else(|| syntax(line, "unterminated string"))?;
                        }
                        ch if ch.is_whitespace() && depth == 0 => break,
                        _ => {}
                    }
                    i += 1;
                }
                tokens.push(Token::Bare(chars[start..i].iter().collect()));
            }
        }
    }
    Ok(tokens)
}

/// Index of the `"` closing the string opened at `open`.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
