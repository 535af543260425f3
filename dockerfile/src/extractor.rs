//! Logical line extraction.
//!
//! Turns Dockerfile text into logical lines: comments and blank lines are
//! dropped, `\` continuations are joined, and every logical line remembers the
//! physical line its last segment sits on.

use dockermake_core::error::{DockermakeError, Result};
use serde::Serialize;

/// One instruction's text after continuation joining and comment stripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalLine {
    pub text: String,
    /// 1-based physical line on which the logical line ends
    pub line: usize,
}

impl LogicalLine {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }
}

/// Split Dockerfile text into logical lines.
///
/// Fails only when the input ends while a continuation is still open.
pub fn extract(content: &str) -> Result<Vec<LogicalLine>> {
    let mut lines = Vec::new();
    let mut pending: Option<(String, usize)> = None;

    for (index, physical) in content.lines().enumerate() {
        let number = index + 1;
        if is_blank_or_comment(physical) {
            continue;
        }

        let segment = scan_segment(physical);
        let mut text = pending.take().map(|(head, _)| head).unwrap_or_default();
        text.push_str(segment.text.trim_start());

        if segment.continues {
            pending = Some((text, number));
            continue;
        }

        let text = text.trim_end();
        if !text.is_empty() {
            lines.push(LogicalLine::new(text, number));
        }
    }

    if let Some((_, line)) = pending {
        return Err(DockermakeError::ParseError {
            line,
            message: "input ends inside a line continuation".to_string(),
        });
    }

    tracing::debug!(logical_lines = lines.len(), "Extracted logical lines");
    Ok(lines)
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

struct Segment {
    text: String,
    continues: bool,
}

/// Scan one physical line up to its comment or continuation marker.
fn scan_segment(line: &str) -> Segment {
    let mut text = String::with_capacity(line.len());
    let mut pos = 0;

    while let Some(c) = line[pos..].chars().next() {
        match c {
            '#' => break,
            '"' | '\'' => match closing_quote(line, pos, c) {
                Some(end) => {
                    text.push_str(&line[pos..end]);
                    pos = end;
                }
                None => {
                    text.push(c);
                    pos += 1;
                }
            },
            '\\' => {
                let rest = &line[pos + 1..];
                let escaped = rest.trim_start_matches([' ', '\t']);
                let Some(next) = escaped.chars().next() else {
                    return Segment {
                        text,
                        continues: true,
                    };
                };
                // whitespace between the backslash and the escaped character is dropped
                text.push('\\');
                text.push(next);
                pos = line.len() - escaped.len() + next.len_utf8();
            }
            other => {
                text.push(other);
                pos += other.len_utf8();
            }
        }
    }

    Segment {
        text,
        continues: false,
    }
}

/// End (exclusive) of the quoted span opening at `start`, if it closes on this line.
fn closing_quote(line: &str, start: usize, quote: char) -> Option<usize> {
    let mut chars = line[start + 1..].char_indices();
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return Some(start + 1 + offset + 1);
        }
    }
    None
}
