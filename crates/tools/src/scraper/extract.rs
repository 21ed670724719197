//! Structural HTML → text extraction.
//!
//! Boilerplate elements are dropped, then block elements are walked in
//! document order and rendered as light markdown (headings, bullets,
//! paragraphs). Output is whitespace-normalized and bounded.

use regex::Regex;
use ::scraper::{Html, Selector};
use sift_core::text::truncate_chars;
use std::sync::LazyLock;

/// Appended when extracted text exceeds the configured maximum.
pub const TRUNCATION_MARKER: &str = "\n\n... (content truncated)";

const STRIPPED_TAGS: &str = "script, style, meta, noscript, iframe, nav, footer, aside";
const BLOCK_TAGS: &str = "h1, h2, h3, h4, h5, h6, p, li, div, article, section";
const HTML_INDICATORS: [&str; 6] = ["<!doctype", "<html", "<head", "<body", "<div", "<p>"];

/// Below this many block lines the document is flattened instead.
const MIN_BLOCK_LINES: usize = 3;

static STRIPPED: LazyLock<Selector> = LazyLock::new(|| Selector::parse(STRIPPED_TAGS).unwrap());
static BLOCKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(BLOCK_TAGS).unwrap());

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static SPACE_BEFORE_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +\n").unwrap());
static SPACE_AFTER_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n +").unwrap());
static NEWLINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Whether the first 200 characters carry a recognizable HTML tag.
pub fn looks_like_html(content: &str) -> bool {
    let head = sift_core::text::prefix_chars(content.trim_start(), 200).to_lowercase();
    HTML_INDICATORS.iter().any(|tag| head.contains(tag))
}

/// Extract readable text from an HTML document, bounded to `max_length`
/// characters plus [`TRUNCATION_MARKER`].
pub fn html_to_text(html: &str, max_length: usize) -> String {
    let mut document = Html::parse_document(html);

    let stripped: Vec<_> = document.select(&STRIPPED).map(|el| el.id()).collect();
    for id in stripped {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let mut lines = Vec::new();
    for element in document.select(&BLOCKS) {
        let text = joined_text(element.text());
        if text.is_empty() {
            continue;
        }
        let name = element.value().name();
        match heading_level(name) {
            Some(level) => lines.push(format!("\n{} {text}", "#".repeat(level))),
            None if name == "li" => lines.push(format!("• {text}")),
            None if name == "p" => lines.push(format!("\n{text}")),
            None => lines.push(text),
        }
    }

    let text = if lines.len() < MIN_BLOCK_LINES {
        document
            .root_element()
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        lines.join("\n")
    };

    truncate(&clean_whitespace(&text), max_length)
}

/// Collapse space runs, trim spaces around newlines, cap blank lines at one.
pub fn clean_whitespace(text: &str) -> String {
    let text = SPACE_RUNS.replace_all(text, " ");
    let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
    let text = SPACE_AFTER_NEWLINE.replace_all(&text, "\n");
    let text = NEWLINE_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

pub fn truncate(text: &str, max_length: usize) -> String {
    truncate_chars(text, max_length, TRUNCATION_MARKER)
}

fn joined_text<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading_level(tag: &str) -> Option<usize> {
    let level = tag.strip_prefix('h')?.parse::<usize>().ok()?;
    (1..=6).contains(&level).then_some(level)
}
