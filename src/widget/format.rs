//! Message formatting for the chat panel.
//!
//! A fixed, ordered pipeline of regex substitutions. Each step only
//! consumes markers that no earlier step emits, and each one leaves its
//! own output alone on a second pass:
//!
//! 1. `**x**` becomes `<strong>x</strong>`
//! 2. `*x*` becomes `<em>x</em>` (bold markers are already gone)
//! 3. `\n` becomes `<br>`
//! 4. phone numbers become `tel:` links, skipping anything already inside
//!    an anchor

use lazy_static::lazy_static;
use regex::{ Captures, Regex };

lazy_static! {
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref PHONE_OR_ANCHOR: Regex = Regex::new(
        r"(<a\b[^>]*>.*?</a>)|([0-9]{3}[-.\s]?[0-9]{3}[-.\s]?[0-9]{4})"
    ).unwrap();
}

pub struct Transform {
    pub name: &'static str,
    apply: fn(&str) -> String,
}

impl Transform {
    pub fn apply(&self, text: &str) -> String {
        (self.apply)(text)
    }
}

fn bold(text: &str) -> String {
    BOLD.replace_all(text, "<strong>$1</strong>").into_owned()
}

fn italic(text: &str) -> String {
    ITALIC.replace_all(text, "<em>$1</em>").into_owned()
}

fn line_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}

fn phone_links(text: &str) -> String {
    PHONE_OR_ANCHOR.replace_all(text, |caps: &Captures| {
        match caps.get(1) {
            Some(anchor) => anchor.as_str().to_string(),
            None => format!("<a href=\"tel:{0}\">{0}</a>", &caps[2]),
        }
    }).into_owned()
}

/// Order matters: see the module docs.
pub const PIPELINE: [Transform; 4] = [
    Transform { name: "bold", apply: bold },
    Transform { name: "italic", apply: italic },
    Transform { name: "line_breaks", apply: line_breaks },
    Transform { name: "phone_links", apply: phone_links },
];

pub fn format_message(content: &str) -> String {
    PIPELINE.iter().fold(content.to_string(), |text, step| step.apply(&text))
}

/// Escapes text typed by the customer before it is formatted. Also used
/// for configured text placed inside single-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "**hi** *there*\nCall 604-555-0123";
    const SAMPLE_HTML: &str =
        "<strong>hi</strong> <em>there</em><br>Call <a href=\"tel:604-555-0123\">604-555-0123</a>";

    #[test]
    fn formats_in_fixed_order() {
        assert_eq!(format_message(SAMPLE), SAMPLE_HTML);
    }

    #[test]
    fn pipeline_order_is_bold_italic_breaks_phone() {
        let names: Vec<&str> = PIPELINE.iter().map(|t| t.name).collect();
        assert_eq!(names, ["bold", "italic", "line_breaks", "phone_links"]);
    }

    #[test]
    fn formatting_twice_changes_nothing() {
        assert_eq!(format_message(SAMPLE_HTML), SAMPLE_HTML);
        assert_eq!(format_message(&format_message(SAMPLE)), SAMPLE_HTML);
    }

    #[test]
    fn bold_is_not_read_as_two_italics() {
        assert_eq!(format_message("**rates**"), "<strong>rates</strong>");
    }

    #[test]
    fn phone_separators_are_optional() {
        assert_eq!(
            format_message("6045550123 or 604.555.0123"),
            "<a href=\"tel:6045550123\">6045550123</a> or <a href=\"tel:604.555.0123\">604.555.0123</a>"
        );
    }

    #[test]
    fn numbers_inside_existing_links_are_left_alone() {
        let html = "<a href='https://example.com/6045550123'>6045550123</a>";
        assert_eq!(format_message(html), html);
    }

    #[test]
    fn markers_do_not_span_lines() {
        assert_eq!(format_message("*a\nb*"), "*a<br>b*");
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape_html("<b>\"x\" & y</b>"), "&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;");
    }

    #[test]
    fn escape_covers_single_quotes() {
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn only_ascii_digits_become_phone_links() {
        let fullwidth = "\u{FF16}\u{FF10}\u{FF14}-\u{FF15}\u{FF15}\u{FF15}-\u{FF10}\u{FF11}\u{FF12}\u{FF13}";
        assert_eq!(format_message(fullwidth), fullwidth);

        let arabic_indic = "\u{0666}\u{0660}\u{0664}\u{0665}\u{0665}\u{0665}\u{0660}\u{0661}\u{0662}\u{0663}";
        assert_eq!(format_message(arabic_indic), arabic_indic);

        assert_eq!(
            format_message("604-555-0123"),
            "<a href=\"tel:604-555-0123\">604-555-0123</a>"
        );
    }
}
