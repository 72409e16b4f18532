//! Path Resolver
//!
//! Grammar:
//! - `name:rest` or `N:rest` - colon qualifier, anchored at that volume's root
//! - `[name]rest` - bracket qualifier, same meaning
//! - `/rest` - absolute on the current volume
//! - `rest` - relative to the current directory
//!
//! `.` and `..` are folded while parsing; `..` may never climb above the root.

use crate::fs::VolumeError;

use super::types::{ResolutionContext, VolumeId, VolumePath};

const SEPARATOR: char = '/';
const OPERATION: &str = "resolve";

/// A parsed but not yet anchored path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathText {
    volume: Option<VolumeId>,
    absolute: bool,
    segments: Vec<String>,
    source: String,
}

impl PathText {
    /// Explicit volume qualifier, if the text carried one.
    pub fn volume(&self) -> Option<&VolumeId> {
        self.volume.as_ref()
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Raw segments, `.` and `..` included.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Anchor the expression against a context.
    pub fn resolve(&self, context: &ResolutionContext) -> Result<VolumePath, VolumeError> {
        let volume = self
            .volume
            .clone()
            .unwrap_or_else(|| context.current_volume().clone());

        let mut stack: Vec<String> = if self.absolute {
            Vec::new()
        } else {
            context.current_directory_segments().to_vec()
        };

        for segment in &self.segments {
            match segment.as_str() {
                "." => {}
                ".." => {
                    if stack.pop().is_none() {
                        return Err(malformed(&self.source, "path escapes root"));
                    }
                }
                _ => stack.push(segment.clone()),
            }
        }

        Ok(VolumePath::from_segments(volume, stack))
    }
}

/// Parse path text without consulting any context.
pub fn parse(text: &str) -> Result<PathText, VolumeError> {
    let source = text.to_string();
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(PathText { volume: None, absolute: false, segments: Vec::new(), source });
    }

    let (volume, rest) = split_qualifier(trimmed)?;

    let (absolute, body) = match rest.strip_prefix(SEPARATOR) {
        Some(stripped) => (true, stripped),
        None => (volume.is_some(), rest),
    };

    if body.starts_with(SEPARATOR) {
        return Err(malformed(text, "empty path segment"));
    }

    let body = body.strip_suffix(SEPARATOR).unwrap_or(body);
    let mut segments = Vec::new();
    if !body.is_empty() {
        for segment in body.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(malformed(text, "empty path segment"));
            }
            if segment.contains([':', '[', ']']) {
                return Err(malformed(text, &format!("invalid character in segment '{}'", segment)));
            }
            segments.push(segment.to_string());
        }
    }

    Ok(PathText { volume, absolute, segments, source })
}

/// Parse and anchor in one step.
pub fn resolve(text: &str, context: &ResolutionContext) -> Result<VolumePath, VolumeError> {
    let resolved = parse(text)?.resolve(context)?;
    tracing::debug!(input = text, path = %resolved, "resolved path");
    Ok(resolved)
}

fn split_qualifier(text: &str) -> Result<(Option<VolumeId>, &str), VolumeError> {
    if let Some(after_bracket) = text.strip_prefix('[') {
        let close = after_bracket
            .find(']')
            .ok_or_else(|| malformed(text, "unterminated volume qualifier"))?;
        let name = &after_bracket[..close];
        check_qualifier(text, name)?;
        return Ok((Some(VolumeId::parse(name)), &after_bracket[close + 1..]));
    }

    let first_separator = text.find(SEPARATOR).unwrap_or(text.len());
    match text.find(':') {
        Some(colon) if colon < first_separator => {
            let name = &text[..colon];
            check_qualifier(text, name)?;
            Ok((Some(VolumeId::parse(name)), &text[colon + 1..]))
        }
        _ => Ok((None, text)),
    }
}

fn check_qualifier(text: &str, name: &str) -> Result<(), VolumeError> {
    if name.trim().is_empty() {
        return Err(malformed(text, "empty volume qualifier"));
    }
    if name.contains([SEPARATOR, ':', '[', ']']) {
        return Err(malformed(text, "invalid volume qualifier"));
    }
    Ok(())
}

fn malformed(text: &str, reason: &str) -> VolumeError {
    VolumeError::MalformedPath {
        path: text.to_string(),
        operation: OPERATION.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(volume: usize, dir: &[&str]) -> ResolutionContext {
        ResolutionContext::new(
            VolumeId::Index(volume),
            dir.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn segments(path: &VolumePath) -> Vec<&str> {
        path.segments().iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_relative_path() {
        let ctx = context(1, &["home", "user"]);
        let p = resolve("docs/a.txt", &ctx).unwrap();
        assert_eq!(p.volume(), &VolumeId::Index(1));
        assert_eq!(segments(&p), vec!["home", "user", "docs", "a.txt"]);
    }

    #[test]
    fn test_absolute_path_uses_current_volume() {
        let ctx = context(1, &["home"]);
        let p = resolve("/etc/x", &ctx).unwrap();
        assert_eq!(p.to_string(), "1:/etc/x");
    }

    #[test]
    fn test_colon_qualifier() {
        let ctx = context(1, &["home"]);
        assert_eq!(resolve("0:/a/b", &ctx).unwrap().to_string(), "0:/a/b");
        assert_eq!(resolve("0:a/b", &ctx).unwrap().to_string(), "0:/a/b");
        assert_eq!(resolve("archive:/a", &ctx).unwrap().to_string(), "archive:/a");
        assert_eq!(resolve("0:", &ctx).unwrap().to_string(), "0:/");
    }

    #[test]
    fn test_bracket_qualifier() {
        let ctx = context(1, &[]);
        let p = resolve("[archive]/logs/today", &ctx).unwrap();
        assert_eq!(p.volume(), &VolumeId::Name("archive".to_string()));
        assert_eq!(segments(&p), vec!["logs", "today"]);
        assert_eq!(resolve("[0]x", &ctx).unwrap().to_string(), "0:/x");
    }

    #[test]
    fn test_empty_input_is_current_directory() {
        let ctx = context(2, &["a", "b"]);
        assert_eq!(resolve("", &ctx).unwrap(), ctx.current_directory());
        assert_eq!(resolve("   ", &ctx).unwrap(), ctx.current_directory());
    }

    #[test]
    fn test_dot_segments() {
        let ctx = context(0, &["a", "b"]);
        assert_eq!(resolve("./c", &ctx).unwrap().to_string(), "0:/a/b/c");
        assert_eq!(resolve("../c", &ctx).unwrap().to_string(), "0:/a/c");
        assert_eq!(resolve("..", &ctx).unwrap().to_string(), "0:/a");
        assert_eq!(resolve("/x/../y/./z", &ctx).unwrap().to_string(), "0:/y/z");
    }

    #[test]
    fn test_root_escape_rejected() {
        let ctx = context(0, &[]);
        let err = resolve("../", &ctx).unwrap_err();
        assert!(matches!(err, VolumeError::MalformedPath { .. }));
        assert!(matches!(resolve("0:/a/../..", &ctx), Err(VolumeError::MalformedPath { .. })));
    }

    #[test]
    fn test_trailing_separator_accepted() {
        let ctx = context(0, &[]);
        assert_eq!(resolve("/a/b/", &ctx).unwrap().to_string(), "0:/a/b");
        assert_eq!(resolve("/", &ctx).unwrap().to_string(), "0:/");
    }

    #[test]
    fn test_malformed_paths() {
        let ctx = context(0, &[]);
        for text in ["a//b", "//a", "/a//", ":/x", "[]/x", "[archive/x", "a/b:c", "a/[b]"] {
            let result = resolve(text, &ctx);
            assert!(
                matches!(result, Err(VolumeError::MalformedPath { .. })),
                "expected malformed for {:?}, got {:?}",
                text,
                result
            );
        }
    }

    #[test]
    fn test_parse_keeps_raw_form() {
        let parsed = parse("1:/a/../b").unwrap();
        assert_eq!(parsed.volume(), Some(&VolumeId::Index(1)));
        assert!(parsed.is_absolute());
        assert_eq!(parsed.segments(), &["a".to_string(), "..".to_string(), "b".to_string()]);

        let relative = parse("x/y").unwrap();
        assert!(!relative.is_absolute());
        assert_eq!(relative.volume(), None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let ctx = context(3, &["w"]);
        for text in ["a", "../q", "7:/z", "", "[n]k/l/"] {
            assert_eq!(resolve(text, &ctx).unwrap(), resolve(text, &ctx).unwrap());
        }
    }

    #[test]
    fn test_error_carries_path_and_operation() {
        let err = resolve("a//b", &context(0, &[])).unwrap_err();
        assert_eq!(err.path(), "a//b");
        assert_eq!(err.operation(), "resolve");
    }
}
