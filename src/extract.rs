//! Detects multi-file code bundles embedded in model replies.
//!
//! A bundle is a JSON object `{"type": "collapsible", "files": [...]}`. It is
//! looked for first inside fenced code blocks, then as a balanced `{...}`
//! span anywhere in the text. Replies without a valid bundle come back
//! unchanged as plain text; parse failures are never reported as errors.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fences::fence_tag;

fn default_language() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFile {
    pub name: String,
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Payload {
    Collapsible { files: Vec<StructuredFile> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBundle {
    pub files: Vec<StructuredFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleParse {
    Bundle(FileBundle),
    NotABundle,
}

/// Validate one candidate object against the bundle schema.
pub fn parse_bundle(candidate: &str) -> BundleParse {
    match serde_json::from_str::<Payload>(candidate.trim()) {
        Ok(Payload::Collapsible { files }) if !files.is_empty() => {
            BundleParse::Bundle(FileBundle { files })
        }
        Ok(Payload::Collapsible { .. }) => BundleParse::NotABundle,
        Err(e) => {
            debug!(error = %e, "Candidate object is not a file bundle");
            BundleParse::NotABundle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Extraction {
    Plain {
        text: String,
    },
    Structured {
        #[serde(rename = "leadingText")]
        leading_text: String,
        files: Vec<StructuredFile>,
    },
}

impl Extraction {
    pub fn is_structured(&self) -> bool {
        matches!(self, Extraction::Structured { .. })
    }
}

struct FencedBlock {
    /// Whole block including both fence lines.
    outer: Range<usize>,
    body: Range<usize>,
}

/// Closed fenced blocks with their byte ranges. Unterminated blocks are skipped.
fn fenced_blocks(text: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut offset = 0;
    let mut open: Option<(usize, usize)> = None; // (fence start, body start)

    for raw in text.split_inclusive('\n') {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        if fence_tag(line).is_some() {
            match open.take() {
                None => open = Some((offset, offset + raw.len())),
                Some((start, body_start)) => blocks.push(FencedBlock {
                    outer: start..offset + raw.len(),
                    body: body_start..offset,
                }),
            }
        }
        offset += raw.len();
    }
    blocks
}

/// End of the balanced `{...}` span opening at `start`, skipping braces
/// inside JSON strings. `None` when the text ends with the span still open.
fn balanced_span(bytes: &[u8], start: usize) -> Option<Range<usize>> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Candidate `{...}` spans, one per opening brace, in order. A span that is
/// well-formed JSON is taken whole and the objects nested in it are skipped.
fn object_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut resume = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'{' || i < resume {
            continue;
        }
        if let Some(span) = balanced_span(bytes, i) {
            if serde_json::from_str::<serde_json::Value>(&text[span.clone()]).is_ok() {
                resume = span.end;
            }
            spans.push(span);
        }
    }
    spans
}

fn is_fence(line: &str) -> bool {
    fence_tag(line).is_some()
}

/// Text around an inline bundle. When the bundle sits right after an
/// unmatched opening fence, that fence line and its closing fence (if any)
/// are dropped too.
fn surrounding_text(text: &str, span: Range<usize>) -> String {
    let before = &text[..span.start];
    let after = &text[span.end..];

    let fences_before = before.lines().filter(|l| is_fence(l)).count();
    let trimmed = before.trim_end();
    let (head, last) = trimmed.rsplit_once('\n').unwrap_or(("", trimmed));
    if fences_before % 2 == 0 || !is_fence(last) {
        return format!("{}{}", before, after);
    }

    let mut closed = false;
    let tail: String = after
        .split_inclusive('\n')
        .filter(|line| {
            if !closed && is_fence(line) {
                closed = true;
                return false;
            }
            true
        })
        .collect();
    format!("{}\n{}", head, tail)
}

fn structured(leading: &str, bundle: FileBundle) -> Extraction {
    Extraction::Structured {
        leading_text: leading.trim().to_string(),
        files: bundle.files,
    }
}

/// Split a reply into leading prose and an embedded file bundle, or return it
/// untouched as plain text.
pub fn extract(text: &str) -> Extraction {
    for block in fenced_blocks(text) {
        if let BundleParse::Bundle(bundle) = parse_bundle(&text[block.body.clone()]) {
            debug!(files = bundle.files.len(), "Found fenced file bundle");
            let leading = format!("{}{}", &text[..block.outer.start], &text[block.outer.end..]);
            return structured(&leading, bundle);
        }
    }

    for span in object_spans(text) {
        if let BundleParse::Bundle(bundle) = parse_bundle(&text[span.clone()]) {
            debug!(files = bundle.files.len(), "Found inline file bundle");
            return structured(&surrounding_text(text, span), bundle);
        }
    }

    Extraction::Plain {
        text: text.to_string(),
    }
}
