//! Splits reply text on fenced code blocks (three backticks, optional tag).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Text { body: String },
    Code { language: Option<String>, body: String },
}

impl Segment {
    pub fn body(&self) -> &str {
        match self {
            Segment::Text { body } | Segment::Code { body, .. } => body,
        }
    }
}

/// Returns `Some(tag)` when `line` opens or closes a fence; the tag is `None`
/// for a bare fence.
pub fn fence_tag(line: &str) -> Option<Option<&str>> {
    let rest = line.trim_end().strip_prefix("```")?;
    if rest.is_empty() {
        return Some(None);
    }
    if rest.contains('`') || rest.chars().any(char::is_whitespace) {
        return None;
    }
    Some(Some(rest))
}

fn flush(segments: &mut Vec<Segment>, lines: &mut Vec<&str>, code: Option<Option<String>>) {
    // A lone blank line between two blocks is still a text segment.
    let had_lines = !lines.is_empty();
    let body = lines.join("\n");
    lines.clear();
    match code {
        Some(language) => segments.push(Segment::Code { language, body }),
        None if had_lines => segments.push(Segment::Text { body }),
        None => {}
    }
}

/// Split `text` into alternating prose and code segments. Fence lines are
/// dropped; an unterminated block at the end is still emitted as code.
pub fn split_fences(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    // Some(lang) while inside a block.
    let mut open: Option<Option<String>> = None;

    for line in text.lines() {
        match (fence_tag(line), open.take()) {
            (Some(tag), None) => {
                flush(&mut segments, &mut lines, None);
                open = Some(tag.map(str::to_string));
            }
            (Some(_), Some(language)) => {
                flush(&mut segments, &mut lines, Some(language));
            }
            (None, state) => {
                open = state;
                lines.push(line);
            }
        }
    }

    if let Some(language) = open {
        flush(&mut segments, &mut lines, Some(language));
    } else {
        flush(&mut segments, &mut lines, None);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_fence_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| fence_tag(l).is_none()).collect()
    }

    fn segment_lines(segments: &[Segment]) -> Vec<String> {
        segments
            .iter()
            .flat_map(|s| s.body().split('\n').map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        let segments = split_fences("hello\nworld");
        assert_eq!(segments, vec![Segment::Text { body: "hello\nworld".into() }]);
    }

    #[test]
    fn test_code_block_with_language() {
        let text = "Try this:\n```rust\nfn main() {}\n```\nDone.";
        let segments = split_fences(text);
        assert_eq!(
            segments,
            vec![
                Segment::Text { body: "Try this:".into() },
                Segment::Code {
                    language: Some("rust".into()),
                    body: "fn main() {}".into()
                },
                Segment::Text { body: "Done.".into() },
            ]
        );
    }

    #[test]
    fn test_unterminated_block_is_flushed() {
        let segments = split_fences("intro\n```\nlet x = 1;\nlet y = 2;");
        assert_eq!(
            segments.last(),
            Some(&Segment::Code {
                language: None,
                body: "let x = 1;\nlet y = 2;".into()
            })
        );
    }

    #[test]
    fn test_fence_with_spaces_in_tag_is_text() {
        assert_eq!(fence_tag("```rust"), Some(Some("rust")));
        assert_eq!(fence_tag("```  "), Some(None));
        assert_eq!(fence_tag("``` not a fence"), None);
        assert_eq!(fence_tag("````"), None);
        assert_eq!(fence_tag("  ```"), None);
    }

    #[test]
    fn test_blank_line_between_blocks_is_kept() {
        let segments = split_fences("```\na\n```\n\n```\nb\n```");
        assert_eq!(
            segments,
            vec![
                Segment::Code { language: None, body: "a".into() },
                Segment::Text { body: String::new() },
                Segment::Code { language: None, body: "b".into() },
            ]
        );
    }

    #[test]
    fn test_concatenated_segments_reproduce_text_without_fences() {
        let samples = [
            "a\n```js\nconst x = 1;\n```\nb\nc",
            "```\nonly code\n```",
            "prose\n```python\nprint(1)\n\nprint(2)\n```\nmore\n```\ntrailing",
            "no fences at all\n\nsecond paragraph",
            "```\na\n```\n\n```\nb\n```",
            "```sh\nls\n```\n\n\nthen\n```\npwd\n```",
        ];
        for text in samples {
            let segments = split_fences(text);
            assert_eq!(segment_lines(&segments), non_fence_lines(text), "sample: {text:?}");
        }
    }
}
