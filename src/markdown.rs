//! Markdown stripping for model output.
//!
//! Completion models answer in markdown even when asked not to; the web
//! client renders plain prose. `clean_markdown` unwraps the markup (content
//! is kept, syntax is removed) and normalizes whitespace. The function is
//! idempotent: cleaning already-clean text returns it unchanged.

use regex::Regex;
use std::sync::LazyLock;

static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z0-9_+-]*\s*$").expect("valid regex"));

static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+").expect("valid regex"));

static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+").expect("valid regex"));

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]*)`").expect("valid regex"));

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.\s+").expect("valid regex"));

/// Strip markdown syntax from `text`, preserving the wrapped content.
///
/// Handles heading markers, bold/italic markers, bullet markers, fenced and
/// inline code delimiters. Runs of spaces collapse to one space, runs of
/// blank lines collapse to one blank line, and every line is trimmed.
pub fn clean_markdown(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        // Fence delimiters carry no content; the code between them stays.
        if FENCE_LINE.is_match(raw_line) {
            continue;
        }

        let line = strip_line_markers(raw_line.trim());
        let line = INLINE_CODE.replace_all(&line, "$1").into_owned();
        let line = line.replace("**", "").replace("__", "").replace(['*', '`'], "");
        let line = NUMBERED_ITEM.replace_all(&line, "$1. ").into_owned();
        // Collapse interior whitespace runs and re-trim after marker removal
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");

        if line.is_empty() {
            if matches!(out.last(), Some(prev) if prev.is_empty()) {
                continue;
            }
            out.push(String::new());
        } else {
            out.push(line);
        }
    }

    out.join("\n").trim().to_string()
}

/// Strip leading heading/bullet markers until none remain, so stacked
/// markers (`## # title`) cannot survive a single pass.
fn strip_line_markers(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        let next = HEADING_MARKER.replace(&current, "").into_owned();
        let next = BULLET_MARKER.replace(&next, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
