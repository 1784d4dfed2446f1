//! Variable substitution engine for templates
//!
//! Placeholders have the form `{{name}}` where `name` matches
//! `[A-Za-z_][A-Za-z0-9_]*`. Whitespace directly inside the delimiters is
//! ignored. Both fields are parsed completely before anything is
//! substituted, so a malformed placeholder never yields partial output.

use super::types::{TemplateError, TemplateResult, Variables};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Field names used in syntax errors
pub const TITLE_FIELD: &str = "externalTitle";
pub const BODY_FIELD: &str = "body";

/// Rendered title and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub title: String,
    pub body: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Substitute variables into a title and body.
///
/// Unbound placeholders render as an empty string.
pub fn render(title: &str, body: &str, variables: &Variables) -> TemplateResult<RenderedText> {
    let title_segments = parse(TITLE_FIELD, title)?;
    let body_segments = parse(BODY_FIELD, body)?;

    Ok(RenderedText {
        title: substitute(&title_segments, variables),
        body: substitute(&body_segments, variables),
    })
}

fn substitute(segments: &[Segment<'_>], variables: &Variables) -> String {
    let mut result = String::new();

    for segment in segments {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::Placeholder(name) => {
                if let Some(value) = variables.get(*name) {
                    result.push_str(value);
                }
            }
        }
    }

    result
}

fn parse<'a>(field: &'static str, source: &'a str) -> TemplateResult<Vec<Segment<'a>>> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut consumed = 0;

    loop {
        let open = rest.find(OPEN);
        let close = rest.find(CLOSE);

        let open = match (open, close) {
            (None, None) => break,
            (None, Some(c)) => {
                return Err(syntax_error(field, source, consumed + c, "closing `}}` without opening `{{`"))
            }
            (Some(o), Some(c)) if c < o => {
                return Err(syntax_error(field, source, consumed + c, "closing `}}` without opening `{{`"))
            }
            (Some(o), _) => o,
        };

        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }

        let inner_start = open + OPEN.len();
        let after_open = &rest[inner_start..];
        let Some(end) = after_open.find(CLOSE) else {
            return Err(syntax_error(field, source, consumed + open, "unclosed `{{`"));
        };

        let inner = &after_open[..end];
        if let Some(nested) = inner.find(OPEN) {
            return Err(syntax_error(
                field,
                source,
                consumed + inner_start + nested,
                "nested `{{` inside placeholder",
            ));
        }

        let name = inner.trim();
        if !is_valid_name(name) {
            return Err(syntax_error(
                field,
                source,
                consumed + open,
                &format!("invalid placeholder name `{}`", name),
            ));
        }
        segments.push(Segment::Placeholder(name));

        let advance = inner_start + end + CLOSE.len();
        rest = &rest[advance..];
        consumed += advance;
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }

    Ok(segments)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn syntax_error(field: &'static str, source: &str, byte_offset: usize, reason: &str) -> TemplateError {
    TemplateError::Syntax {
        field,
        offset: source[..byte_offset].chars().count(),
        reason: reason.to_string(),
    }
}
