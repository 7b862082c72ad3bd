//! Reduce model output to an HTML fragment that can go straight into a post body.
//!
//! Models sometimes wrap the article in a fenced code block, or return a full
//! HTML document despite being asked for a fragment. Documents are parsed with
//! `scraper` and only the children of `<body>` are kept. When the body turns
//! out empty, a text-level fallback drops everything before the first content
//! element and strips the document wrappers.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

static DOC_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!doctype|<html[\s>]|<head[\s>]|<body[\s>]").expect("valid regex")
});

/// Normalize raw generator output into a content fragment.
///
/// Fragments pass through untouched apart from fence removal and outer
/// whitespace trimming, so `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let unfenced = strip_code_fences(raw);

    if !is_full_document(&unfenced) {
        return unfenced.trim().to_string();
    }

    let document = document_region(&unfenced);
    let fragment = match extract_body(document) {
        Some(body) => {
            debug!(len = body.len(), "extracted <body> from full document");
            body
        }
        None => {
            debug!("document has no usable <body>, falling back to content scan");
            strip_document_wrappers(&from_first_content_element(document))
        }
    };

    strip_title_and_meta(&fragment).trim().to_string()
}

/// Whether the text carries document-level markup (doctype, html/head/body).
pub fn is_full_document(text: &str) -> bool {
    DOC_MARKER_RE.is_match(text)
}

/// Slice from the first document marker to the last `</html>` (or `</body>`).
///
/// The HTML parser relocates stray text around the document into `<body>`,
/// so chatter like "Here is the article:" must be cut off before parsing.
fn document_region(text: &str) -> &str {
    static HTML_END_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</html\s*>").expect("valid regex"));
    static BODY_END_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("valid regex"));

    let start = DOC_MARKER_RE.find(text).map_or(0, |m| m.start());
    let end = HTML_END_RE
        .find_iter(text)
        .last()
        .or_else(|| BODY_END_RE.find_iter(text).last())
        .map_or(text.len(), |m| m.end());

    if end > start { &text[start..end] } else { &text[start..] }
}

// ---------------------------------------------------------------------------
// Code fences
// ---------------------------------------------------------------------------

/// Remove fence delimiter lines such as ```` ```html ```` and ```` ``` ````.
fn strip_code_fences(text: &str) -> String {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?im)^[ \t]*```[a-z0-9_-]*[ \t]*(?:\r?\n|$)").expect("valid regex")
    });

    FENCE_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Structured extraction
// ---------------------------------------------------------------------------

/// Serialize the children of `<body>`, or `None` when the body is empty.
fn extract_body(text: &str) -> Option<String> {
    static BODY_SEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("body").expect("valid selector"));

    let doc = Html::parse_document(text);
    let body = doc.select(&BODY_SEL).next()?;
    let inner = body.inner_html();

    if inner.trim().is_empty() {
        None
    } else {
        Some(inner)
    }
}

// ---------------------------------------------------------------------------
// Text-level fallback
// ---------------------------------------------------------------------------

/// Drop everything before the first heading, paragraph, or div.
fn from_first_content_element(text: &str) -> String {
    static CONTENT_START_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)<(?:h[1-6]|p|div)[\s>/]").expect("valid regex")
    });

    match CONTENT_START_RE.find(text) {
        Some(m) => text[m.start()..].to_string(),
        None => text.to_string(),
    }
}

/// Remove doctype, html/head/body tags, and any whole `<head>` section.
fn strip_document_wrappers(text: &str) -> String {
    static DOCTYPE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<!doctype[^>]*>").expect("valid regex"));
    static HEAD_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<head(?:\s[^>]*)?>.*?</head\s*>").expect("valid regex")
    });
    static WRAPPER_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?(?:html|head|body)(?:\s[^>]*)?>").expect("valid regex")
    });

    let result = DOCTYPE_RE.replace_all(text, "");
    let result = HEAD_BLOCK_RE.replace_all(&result, "");
    WRAPPER_TAG_RE.replace_all(&result, "").to_string()
}

/// Remove `<title>` elements and `<meta>` tags wherever they ended up.
fn strip_title_and_meta(text: &str) -> String {
    static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<title(?:\s[^>]*)?>.*?</title\s*>").expect("valid regex")
    });
    static META_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)<meta(?:\s[^>]*)?/?>").expect("valid regex"));

    let result = TITLE_RE.replace_all(text, "");
    META_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
