use once_cell::sync::Lazy;
use regex::Regex;

/// Structural tags the rendering boundary may inject as live markup.
/// Everything else is escaped as text.
pub const ALLOWED_TAGS: [&str; 6] = ["p", "ul", "li", "strong", "em", "br"];

const INLINE_TAGS: [&str; 3] = ["strong", "em", "br"];

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:\s[^<>]*)?)(/?)>").expect("valid regex"));

/// Reduce `input` to the allow-listed markup subset.
///
/// Allowed tags are re-emitted in canonical form with attributes dropped;
/// every other tag, along with stray angle brackets, is escaped so it renders
/// as visible text instead of live markup. Generated text can quote user
/// essays verbatim, so adversarial or accidental markup must never reach the
/// page unescaped.
///
/// # Examples
///
/// ```
/// use lomo::sanitize;
///
/// let out = sanitize("<p>ok</p><script>alert(1)</script>");
/// assert_eq!(out, "<p>ok</p>&lt;script&gt;alert(1)&lt;/script&gt;");
/// ```
pub fn sanitize(input: &str) -> String {
    sanitize_with(input, &ALLOWED_TAGS)
}

/// Like [`sanitize`] but admitting only inline tags (`strong`, `em`, `br`).
///
/// The formatter runs this over raw line text before wrapping it in block
/// markup, so block tags quoted inside generated prose cannot collide with
/// the structure the formatter emits.
pub(crate) fn sanitize_inline(input: &str) -> String {
    sanitize_with(input, &INLINE_TAGS)
}

fn sanitize_with(input: &str, allowed: &[&str]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in TAG_RE.captures_iter(input) {
        let m = caps.get(0).expect("whole match");
        out.push_str(&escape_text(&input[last..m.start()]));
        last = m.end();

        let closing = &caps[1] == "/";
        let name = caps[2].to_ascii_lowercase();
        let self_closing = &caps[4] == "/";

        if name == "br" && allowed.contains(&"br") && !closing {
            out.push_str("<br/>");
        } else if allowed.contains(&name.as_str()) && name != "br" && !self_closing {
            if closing {
                out.push_str("</");
            } else {
                out.push('<');
            }
            out.push_str(&name);
            out.push('>');
        } else {
            out.push_str(&escape_text(m.as_str()));
        }
    }
    out.push_str(&escape_text(&input[last..]));
    out
}

/// Escape `input` so it renders as plain text.
///
/// Used by view layers that have no sanitizer available, and internally for
/// everything [`sanitize`] rejects. Existing character entities are left
/// alone, so escaping already-escaped text changes nothing.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    for (i, ch) in input.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !entity_follows(&bytes[i + 1..]) => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// True when `rest` starts with the tail of a character entity (`lt;`,
/// `#39;`, `#x2014;`).
fn entity_follows(rest: &[u8]) -> bool {
    let mut i = 0;
    if rest.first() == Some(&b'#') {
        i = 1;
        if rest.get(i) == Some(&b'x') || rest.get(i) == Some(&b'X') {
            i = 2;
        }
        let digits_start = i;
        while i < rest.len() && rest[i].is_ascii_hexdigit() {
            i += 1;
        }
        return i > digits_start && rest.get(i) == Some(&b';');
    }
    while i < rest.len() && rest[i].is_ascii_alphanumeric() {
        i += 1;
    }
    i > 0 && rest.get(i) == Some(&b';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_tags_pass_through_canonically() {
        assert_eq!(sanitize("<p>hi</p>"), "<p>hi</p>");
        assert_eq!(sanitize("<UL><LI>a</LI></UL>"), "<ul><li>a</li></ul>");
        assert_eq!(sanitize("a<br>b<br/>c"), "a<br/>b<br/>c");
    }

    #[test]
    fn attributes_are_dropped() {
        assert_eq!(
            sanitize(r#"<p class="x" onclick="evil()">hi</p>"#),
            "<p>hi</p>"
        );
    }

    #[test]
    fn script_tags_are_escaped() {
        let out = sanitize("<script>alert(1)</script>");
        assert!(!out.contains("<script"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn stray_angle_brackets_are_escaped() {
        assert_eq!(sanitize("3 < 4 and 5 > 4"), "3 &lt; 4 and 5 &gt; 4");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in [
            "<p>a & b</p>",
            "<script>x</script>",
            "plain < text",
            "<p>list:</p><ul><li>one</li></ul>",
        ] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn inline_mode_escapes_block_tags() {
        let out = sanitize_inline("keep <strong>this</strong>, not <p>that</p>");
        assert_eq!(
            out,
            "keep <strong>this</strong>, not &lt;p&gt;that&lt;/p&gt;"
        );
    }

    #[test]
    fn entities_survive_escaping() {
        assert_eq!(escape_text("&lt; &amp; &#39; &#x2014;"), "&lt; &amp; &#39; &#x2014;");
        assert_eq!(escape_text("fish & chips"), "fish &amp; chips");
    }
}
