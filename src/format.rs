//! Line-level formatting of prose replies (numbered items, bullets,
//! paragraphs) and plain-terminal rendering for the chat client.

use regex::Regex;

use crate::extract::StructuredFile;
use crate::fences::{split_fences, Segment};

lazy_static::lazy_static! {
    static ref NUMBERED: Regex = Regex::new(r"^(\d+)\.\s+(.+)").expect("numbered-item pattern");
    static ref BULLET: Regex = Regex::new(r"^[-*]\s+").expect("bullet pattern");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedLine<'a> {
    Numbered { number: &'a str, text: &'a str },
    Bullet { text: &'a str },
    Paragraph { text: &'a str },
    Blank,
}

pub fn classify_line(line: &str) -> FormattedLine<'_> {
    if let Some(caps) = NUMBERED.captures(line) {
        if let (Some(number), Some(text)) = (caps.get(1), caps.get(2)) {
            return FormattedLine::Numbered {
                number: number.as_str(),
                text: text.as_str(),
            };
        }
    }
    let trimmed = line.trim();
    if let Some(marker) = BULLET.find(trimmed) {
        return FormattedLine::Bullet {
            text: &trimmed[marker.end()..],
        };
    }
    if trimmed.is_empty() {
        FormattedLine::Blank
    } else {
        FormattedLine::Paragraph { text: line }
    }
}

pub fn format_lines(text: &str) -> Vec<FormattedLine<'_>> {
    text.split('\n').map(classify_line).collect()
}

/// Plain-terminal rendering used by the interactive chat client.
pub fn render_plain(text: &str) -> String {
    format_lines(text)
        .into_iter()
        .map(|line| match line {
            FormattedLine::Numbered { number, text } => format!("  {}. {}", number, text),
            FormattedLine::Bullet { text } => format!("    • {}", text),
            FormattedLine::Paragraph { text } => text.to_string(),
            FormattedLine::Blank => String::new(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Terminal rendering of a whole reply: prose is line-formatted, fenced code
/// is framed with its language, and attached files follow as sections.
pub fn render_reply(content: &str, files: Option<&[StructuredFile]>) -> String {
    let mut out = Vec::new();
    for segment in split_fences(content) {
        match segment {
            Segment::Text { body } => out.push(render_plain(&body)),
            Segment::Code { language, body } => {
                out.push(format!("--- {} ---", language.as_deref().unwrap_or("code")));
                out.push(body);
                out.push("---".to_string());
            }
        }
    }
    for file in files.unwrap_or_default() {
        out.push(format!("=== {} ({}) ===", file.name, file.language));
        out.push(file.content.clone());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_line() {
        assert_eq!(
            classify_line("12. Use a queue"),
            FormattedLine::Numbered { number: "12", text: "Use a queue" }
        );
        // Indented numbers are not list items.
        assert_eq!(
            classify_line("  1. nested"),
            FormattedLine::Paragraph { text: "  1. nested" }
        );
    }

    #[test]
    fn test_bullets_after_trim() {
        assert_eq!(classify_line("   - cache it"), FormattedLine::Bullet { text: "cache it" });
        assert_eq!(classify_line("* shard"), FormattedLine::Bullet { text: "shard" });
        assert_eq!(
            classify_line("-no space"),
            FormattedLine::Paragraph { text: "-no space" }
        );
    }

    #[test]
    fn test_blank_and_paragraph() {
        let lines = format_lines("Intro\n\n1. one\n- two");
        assert_eq!(
            lines,
            vec![
                FormattedLine::Paragraph { text: "Intro" },
                FormattedLine::Blank,
                FormattedLine::Numbered { number: "1", text: "one" },
                FormattedLine::Bullet { text: "two" },
            ]
        );
    }

    #[test]
    fn test_render_plain() {
        let rendered = render_plain("Plan:\n1. first\n- benefit");
        assert_eq!(rendered, "Plan:\n  1. first\n    • benefit");
    }

    #[test]
    fn test_render_reply_with_code_and_files() {
        let files = vec![StructuredFile {
            name: "a.ts".into(),
            content: "export {}".into(),
            language: "typescript".into(),
        }];
        let rendered = render_reply("Steps:\n- run\n```sh\nmake\n```", Some(files.as_slice()));
        assert_eq!(
            rendered,
            "Steps:\n    • run\n--- sh ---\nmake\n---\n=== a.ts (typescript) ===\nexport {}"
        );
    }
}
