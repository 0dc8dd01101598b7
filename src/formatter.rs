use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::markup::sanitize_inline;

static MARKDOWN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*`_]").expect("valid regex"));
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").expect("valid regex"));

/// Errors raised at the wire boundary of the formatter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The generated payload was not a text value. Caller misuse; the
    /// string pipeline itself is total.
    #[error("generated payload was not a text value")]
    InvalidInput,
}

/// How a raw generated reply is converted into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Strip markdown control characters and collapse blank lines; the
    /// result stays plain text. Used for essay feedback.
    Plain,
    /// As [`Plain`], then convert the line structure into the constrained
    /// markup subset: bullet runs become one list, consecutive plain lines
    /// join into one paragraph flow. Used for counselor chat replies.
    ///
    /// [`Plain`]: FormatMode::Plain
    Chat,
}

/// One structural block of a chat-formatted reply.
enum Block {
    /// Consecutive plain lines, rendered as one `<p>` joined by `<br/>`.
    Flow(Vec<String>),
    /// A run of bullet lines, rendered as one `<ul>`.
    List(Vec<String>),
}

/// Convert one raw generated reply into its render-ready form.
///
/// The pipeline strips markdown control characters (`#`, `*`, backtick,
/// `_`) everywhere, collapses newline runs and trims. In
/// [`FormatMode::Chat`] it then classifies each line as a bullet (`"- "`
/// prefix) or plain line before emitting markup. It is deterministic,
/// total over all string inputs, and idempotent: reformatting its own
/// output changes nothing, because previously emitted markup is parsed
/// back into the line model instead of being wrapped again.
///
/// # Examples
///
/// ```
/// use lomo::{FormatMode, format_response};
///
/// let out = format_response("Line one\n- Item A\n- Item B\nLine two", FormatMode::Chat);
/// assert_eq!(
///     out,
///     "<p>Line one</p><ul><li>Item A</li><li>Item B</li></ul><p>Line two</p>"
/// );
/// assert_eq!(format_response(&out, FormatMode::Chat), out);
/// ```
pub fn format_response(raw: &str, mode: FormatMode) -> String {
    let stripped = MARKDOWN_CHARS.replace_all(raw, "");
    let collapsed = NEWLINE_RUNS.replace_all(&stripped, "\n");
    let text = collapsed.trim();
    match mode {
        FormatMode::Plain => text.to_string(),
        FormatMode::Chat => render(&chat_blocks(text)),
    }
}

/// [`format_response`] for callers sitting directly on a JSON wire.
///
/// # Errors
///
/// [`FormatError::InvalidInput`] when the value is not a string; the
/// formatter never partially emits.
pub fn format_value(value: &Value, mode: FormatMode) -> Result<String, FormatError> {
    match value {
        Value::String(raw) => Ok(format_response(raw, mode)),
        _ => Err(FormatError::InvalidInput),
    }
}

fn chat_blocks(text: &str) -> Vec<Block> {
    if text.is_empty() {
        return Vec::new();
    }
    if let Some(blocks) = parse_rendered(text) {
        return blocks;
    }
    let mut blocks: Vec<Block> = Vec::new();
    for line in text.split('\n') {
        if let Some(item) = line.strip_prefix("- ") {
            let item = sanitize_inline(item);
            match blocks.last_mut() {
                Some(Block::List(items)) => items.push(item),
                _ => blocks.push(Block::List(vec![item])),
            }
        } else {
            let line = sanitize_inline(line);
            match blocks.last_mut() {
                Some(Block::Flow(lines)) => lines.push(line),
                _ => blocks.push(Block::Flow(vec![line])),
            }
        }
    }
    blocks
}

/// Parse text that is already in the canonical rendered form back into
/// blocks. Returns `None` for anything else, which sends the input down
/// the raw-line path instead.
fn parse_rendered(text: &str) -> Option<Vec<Block>> {
    let mut rest = text;
    let mut blocks = Vec::new();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<p>") {
            let end = after.find("</p>")?;
            let lines = after[..end].split("<br/>").map(str::to_string).collect();
            blocks.push(Block::Flow(lines));
            rest = &after[end + "</p>".len()..];
        } else if let Some(after) = rest.strip_prefix("<ul>") {
            let end = after.find("</ul>")?;
            let mut inner = &after[..end];
            let mut items = Vec::new();
            while !inner.is_empty() {
                let item = inner.strip_prefix("<li>")?;
                let item_end = item.find("</li>")?;
                items.push(item[..item_end].to_string());
                inner = &item[item_end + "</li>".len()..];
            }
            blocks.push(Block::List(items));
            rest = &after[end + "</ul>".len()..];
        } else {
            return None;
        }
    }
    Some(blocks)
}

fn render(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Flow(lines) => {
                out.push_str("<p>");
                out.push_str(&lines.join("<br/>"));
                out.push_str("</p>");
            }
            Block::List(items) => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    out.push_str(item);
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_markdown_control_characters() {
        assert_eq!(
            format_response("**bold** and `code` and _emphasis_ and # heading", FormatMode::Plain),
            "bold and code and emphasis and  heading"
        );
    }

    #[test]
    fn collapses_newline_runs_and_trims() {
        assert_eq!(
            format_response("\n\na\n\n\nb\r\n\r\nc\n", FormatMode::Plain),
            "a\nb\nc"
        );
    }

    #[test]
    fn empty_input_formats_to_empty() {
        assert_eq!(format_response("", FormatMode::Plain), "");
        assert_eq!(format_response("", FormatMode::Chat), "");
        assert_eq!(format_response("  \n ", FormatMode::Chat), "");
    }

    #[test]
    fn bullets_group_into_one_list() {
        let out = format_response("Line one\n- Item A\n- Item B\nLine two", FormatMode::Chat);
        assert_eq!(
            out,
            "<p>Line one</p><ul><li>Item A</li><li>Item B</li></ul><p>Line two</p>"
        );
    }

    #[test]
    fn consecutive_plain_lines_join_as_one_flow() {
        assert_eq!(
            format_response("first\nsecond\nthird", FormatMode::Chat),
            "<p>first<br/>second<br/>third</p>"
        );
    }

    #[test]
    fn lone_bullet_marker_emits_balanced_wrapper() {
        assert_eq!(format_response("- ", FormatMode::Chat), "<ul><li></li></ul>");
        assert_eq!(
            format_response("- only", FormatMode::Chat),
            "<ul><li>only</li></ul>"
        );
    }

    #[test]
    fn chat_format_is_idempotent() {
        for input in [
            "Line one\n- Item A\n- Item B\nLine two",
            "just a sentence",
            "first\nsecond",
            "- a\n- b",
            "- ",
            "",
            "mixed <strong>emphasis</strong>\n- with <em>tags</em>",
            "quoted <p>block</p> in prose",
        ] {
            let once = format_response(input, FormatMode::Chat);
            let twice = format_response(&once, FormatMode::Chat);
            assert_eq!(twice, once, "input: {input:?}");
        }
    }

    #[test]
    fn plain_format_is_idempotent() {
        for input in ["a\n\nb", "**x**", "", "trailing \n"] {
            let once = format_response(input, FormatMode::Plain);
            assert_eq!(format_response(&once, FormatMode::Plain), once);
        }
    }

    #[test]
    fn inline_emphasis_survives_block_tags_do_not() {
        let out = format_response("use <strong>verbs</strong>\n- avoid <p>nesting</p>", FormatMode::Chat);
        assert_eq!(
            out,
            "<p>use <strong>verbs</strong></p><ul><li>avoid &lt;p&gt;nesting&lt;/p&gt;</li></ul>"
        );
    }

    #[test]
    fn non_string_payload_is_invalid_input() {
        assert_eq!(
            format_value(&Value::Null, FormatMode::Chat),
            Err(FormatError::InvalidInput)
        );
        assert_eq!(
            format_value(&json!({"text": "hi"}), FormatMode::Chat),
            Err(FormatError::InvalidInput)
        );
        assert_eq!(
            format_value(&json!("hi"), FormatMode::Chat),
            Ok("<p>hi</p>".to_string())
        );
    }
}
