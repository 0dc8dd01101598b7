use lomo::{FormatError, FormatMode, format_response, format_value, sanitize};
use serde_json::Value;

#[test]
fn bullet_runs_become_one_list_between_paragraphs() {
    let out = format_response("Line one\n- Item A\n- Item B\nLine two", FormatMode::Chat);
    assert_eq!(
        out,
        "<p>Line one</p><ul><li>Item A</li><li>Item B</li></ul><p>Line two</p>"
    );
    assert_eq!(out.matches("<ul>").count(), 1);
    assert_eq!(out.matches("<li>").count(), 2);
}

#[test]
fn wrappers_stay_balanced_for_any_bullet_count() {
    for input in ["no bullets at all", "- one", "- one\n- two\n- three", "- "] {
        let out = format_response(input, FormatMode::Chat);
        assert_eq!(out.matches("<ul>").count(), out.matches("</ul>").count());
        assert_eq!(out.matches("<li>").count(), out.matches("</li>").count());
        assert_eq!(out.matches("<p>").count(), out.matches("</p>").count());
    }
}

#[test]
fn formatting_is_idempotent_in_both_modes() {
    let inputs = [
        "Line one\n- Item A\n- Item B\nLine two",
        "## Heading\n\n**bold** advice",
        "plain sentence",
        "- lone bullet",
        "with <strong>inline</strong> markup\n- and <em>more</em>",
        "hostile <p>block</p> quoting",
        "",
        "   \n\n   ",
    ];
    for mode in [FormatMode::Plain, FormatMode::Chat] {
        for input in inputs {
            let once = format_response(input, mode);
            let twice = format_response(&once, mode);
            assert_eq!(twice, once, "mode {mode:?}, input {input:?}");
        }
    }
}

#[test]
fn empty_string_formats_to_empty() {
    assert_eq!(format_response("", FormatMode::Plain), "");
    assert_eq!(format_response("", FormatMode::Chat), "");
}

#[test]
fn non_string_payloads_are_rejected() {
    for value in [Value::Null, Value::Bool(true), serde_json::json!(["a"])] {
        assert_eq!(
            format_value(&value, FormatMode::Chat),
            Err(FormatError::InvalidInput)
        );
    }
}

#[test]
fn sanitized_render_drops_markdown_and_script() {
    let raw = "**bold** claim\n<script>alert('x')</script>\n- safe item";
    let rendered = sanitize(&format_response(raw, FormatMode::Chat));
    assert!(!rendered.contains('*'));
    assert!(!rendered.contains("<script"));
    assert!(rendered.contains("<ul><li>safe item</li></ul>"));
}

#[test]
fn emphasis_tags_survive_the_full_pipeline() {
    let raw = "You should <strong>definitely</strong> visit.";
    let rendered = sanitize(&format_response(raw, FormatMode::Chat));
    assert_eq!(rendered, "<p>You should <strong>definitely</strong> visit.</p>");
}

#[test]
fn plain_mode_keeps_text_unwrapped() {
    let out = format_response("Overview.\n\nStrengths:\n- clear voice", FormatMode::Plain);
    assert_eq!(out, "Overview.\nStrengths:\n- clear voice");
    assert!(!out.contains('<'));
}
