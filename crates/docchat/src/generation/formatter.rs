//! Cleanup of raw model output

use once_cell::sync::Lazy;
use regex::Regex;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1B[@-_][0-?]*[ -/]*[@-~]").expect("valid ANSI regex"));

static HEADER_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"###\s*").expect("valid header regex"));

// Matches every hyphen, not just list items: "well-known" becomes
// "well\n• known". Kept for output compatibility with existing clients.
static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\s*").expect("valid bullet regex"));

const PYTHON_FENCE: &str = "```python";
const FENCE: &str = "```";

/// Strip terminal escapes and flatten markdown-ish structure into plain text
pub fn format_response(raw: &str) -> String {
    let text = ANSI_ESCAPE.replace_all(raw, "");
    let text = HEADER_MARKER.replace_all(&text, "\n\n");
    let text = BULLET_MARKER.replace_all(&text, "\n• ");
    let text = text
        .replace(PYTHON_FENCE, "\n\n[Python Code]\n")
        .replace(FENCE, "\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_unchanged() {
        let clean = "The sky is blue.\n\nIt scatters short wavelengths.";
        assert_eq!(format_response(clean), clean);
        assert_eq!(format_response(&format_response(clean)), clean);
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(format_response("  \n answer \n\n"), "answer");
    }

    #[test]
    fn test_strips_ansi_sequences() {
        let raw = "\x1b[?25l\x1b[2KThe sky\x1b[0m is \x1b[1;32mblue\x1b[0m.";
        assert_eq!(format_response(raw), "The sky is blue.");
    }

    #[test]
    fn test_headers_become_paragraph_breaks() {
        assert_eq!(format_response("Intro### Details\ntext"), "Intro\n\nDetails\ntext");
        assert_eq!(format_response("### Title"), "Title");
    }

    #[test]
    fn test_bullets_become_glyphs() {
        assert_eq!(format_response("Colors:\n- red\n- blue"), "Colors:\n\n• red\n\n• blue");
    }

    // Known over-eager rule: hyphens inside words are treated as bullets too.
    #[test]
    fn test_bullet_rule_also_matches_inline_hyphens() {
        assert_eq!(format_response("a well-known fact"), "a well\n• known fact");
    }

    #[test]
    fn test_python_fence_gets_label() {
        let raw = "Example:\n```python\nprint(1)\n```";
        assert_eq!(format_response(raw), "Example:\n\n\n[Python Code]\n\nprint(1)");
    }

    #[test]
    fn test_plain_fences_become_line_breaks() {
        assert_eq!(format_response("```\nls\n```"), "ls");
        assert_eq!(format_response("see ```code``` here"), "see \ncode\n here");
    }
}
