//! Packrat scanner shared by the instruction grammars.
//!
//! Reusable sub-grammars are memoized by `(position, node)` so ordered-choice
//! alternatives that restart at the same position never rescan the input.

use std::collections::HashMap;

/// Why a grammar stopped matching, located by byte offset in the argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub pos: usize,
    pub message: String,
}

impl Failure {
    pub fn expected(pos: usize, what: impl AsRef<str>) -> Self {
        Self {
            pos,
            message: format!("Expected {}", what.as_ref()),
        }
    }

    pub fn unwanted(pos: usize, token: &str) -> Self {
        Self {
            pos,
            message: format!("Found unwanted token, \"{}\"", token),
        }
    }

    /// Keep whichever failure got further into the input.
    pub fn furthest(self, other: Failure) -> Failure {
        if other.pos > self.pos {
            other
        } else {
            self
        }
    }
}

/// Memoizable grammar nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Node {
    Word { exclude: &'static str, unquote: bool },
    Quoted { quote: char, unquote: bool },
    Path,
    QuotedList { double_only: bool },
}

#[derive(Debug, Clone)]
struct Memo<T> {
    end: usize,
    result: Result<T, Failure>,
}

type Table<T> = HashMap<(usize, Node), Memo<T>>;

pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    texts: Table<String>,
    lists: Table<Vec<(char, String)>>,
    hits: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            texts: HashMap::new(),
            lists: HashMap::new(),
            hits: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn slice(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[cfg(test)]
    pub fn memo_hits(&self) -> usize {
        self.hits
    }

    pub fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consume `c` if it is the next character.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn eat_str(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    pub fn eat_caseless(&mut self, literal: &str) -> bool {
        match self.rest().get(..literal.len()) {
            Some(head) if head.eq_ignore_ascii_case(literal) => {
                self.pos += literal.len();
                true
            }
            _ => false,
        }
    }

    /// Skip whitespace, then require the end of the argument.
    pub fn end(&mut self) -> Result<(), Failure> {
        self.skip_ws();
        if self.at_end() {
            Ok(())
        } else {
            Err(Failure::expected(self.pos, "end of text"))
        }
    }

    /// Byte offset -> 1-based character column.
    pub fn column(&self, pos: usize) -> usize {
        self.input[..pos.min(self.input.len())].chars().count() + 1
    }

    /// A double-quoted string, or a run of non-whitespace characters that does
    /// not start with `"` and contains none of `exclude`.
    pub fn word(&mut self, exclude: &'static str, unquote: bool) -> Result<String, Failure> {
        self.memo_text(Node::Word { exclude, unquote }, |s| {
            let start = s.pos;
            if s.peek() == Some('"') {
                return s
                    .quoted('"', unquote)
                    .map_err(|_| Failure::expected(start, describe_word(exclude)));
            }
            let rest = s.rest();
            let len = rest
                .find(|c: char| c.is_whitespace() || exclude.contains(c))
                .unwrap_or(rest.len());
            if len == 0 {
                return Err(Failure::expected(start, describe_word(exclude)));
            }
            s.pos += len;
            Ok(s.slice(start).to_string())
        })
    }

    /// A string enclosed in `quote` with `\` escapes, confined to one line.
    pub fn quoted(&mut self, quote: char, unquote: bool) -> Result<String, Failure> {
        self.memo_text(Node::Quoted { quote, unquote }, |s| {
            let start = s.pos;
            let enclosed = || Failure::expected(start, format!("string enclosed in '{}'", quote));
            if !s.eat(quote) {
                return Err(enclosed());
            }
            let body_start = s.pos;
            let mut chars = s.rest().char_indices();
            let mut close = None;
            while let Some((offset, c)) = chars.next() {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '\n' => break,
                    c if c == quote => {
                        close = Some(body_start + offset);
                        break;
                    }
                    _ => {}
                }
            }
            let close = close.ok_or_else(enclosed)?;
            s.pos = close + quote.len_utf8();
            if unquote {
                Ok(unescape(&s.input[body_start..close]))
            } else {
                Ok(s.slice(start).to_string())
            }
        })
    }

    /// `/` optionally followed by a relative path, or a relative path:
    /// `/`-separated words with optional trailing slashes.
    pub fn path(&mut self) -> Result<String, Failure> {
        self.memo_text(Node::Path, |s| {
            let start = s.pos;
            if s.eat('/') {
                s.relative_path();
                return Ok(s.slice(start).to_string());
            }
            if !s.relative_path() {
                return Err(Failure::expected(start, "path"));
            }
            Ok(s.slice(start).to_string())
        })
    }

    fn relative_path(&mut self) -> bool {
        if self.word("/", false).is_err() {
            return false;
        }
        loop {
            let save = self.pos;
            if !self.eat('/') {
                break;
            }
            if self.word("/", false).is_err() {
                self.pos = save;
                break;
            }
        }
        while self.eat('/') {}
        true
    }

    /// `[ "a", 'b', ... ]`: comma-delimited quoted strings, unquoted, each
    /// paired with the quote character it was written with.
    pub fn quoted_list(&mut self, double_only: bool) -> Result<Vec<(char, String)>, Failure> {
        self.memo_list(Node::QuotedList { double_only }, |s| {
            if !s.eat('[') {
                return Err(Failure::expected(s.pos, "\"[\""));
            }
            let mut items = Vec::new();
            loop {
                s.skip_ws();
                let item_start = s.pos;
                let quote = match s.peek() {
                    Some('"') => '"',
                    Some('\'') if !double_only => '\'',
                    _ => {
                        let what = if double_only {
                            "string enclosed in '\"'"
                        } else {
                            "quoted string"
                        };
                        return Err(Failure::expected(item_start, what));
                    }
                };
                items.push((quote, s.quoted(quote, true)?));
                s.skip_ws();
                if s.eat(',') {
                    continue;
                }
                if s.eat(']') {
                    return Ok(items);
                }
                return Err(Failure::expected(s.pos, "\",\" delimiter or \"]\""));
            }
        })
    }

    fn memo_text(
        &mut self,
        node: Node,
        parse: impl FnOnce(&mut Self) -> Result<String, Failure>,
    ) -> Result<String, Failure> {
        let start = self.pos;
        if let Some(memo) = self.texts.get(&(start, node)) {
            self.hits += 1;
            self.pos = memo.end;
            return memo.result.clone();
        }
        let result = parse(self);
        if result.is_err() {
            self.pos = start;
        }
        let memo = Memo {
            end: self.pos,
            result: result.clone(),
        };
        self.texts.insert((start, node), memo);
        result
    }

    fn memo_list(
        &mut self,
        node: Node,
        parse: impl FnOnce(&mut Self) -> Result<Vec<(char, String)>, Failure>,
    ) -> Result<Vec<(char, String)>, Failure> {
        let start = self.pos;
        if let Some(memo) = self.lists.get(&(start, node)) {
            self.hits += 1;
            self.pos = memo.end;
            return memo.result.clone();
        }
        let result = parse(self);
        if result.is_err() {
            self.pos = start;
        }
        let memo = Memo {
            end: self.pos,
            result: result.clone(),
        };
        self.lists.insert((start, node), memo);
        result
    }
}

fn describe_word(exclude: &str) -> String {
    if exclude.is_empty() {
        return "word".to_string();
    }
    let chars: Vec<String> = exclude.chars().map(|c| format!("\"{}\"", c)).collect();
    format!("word without the characters {}", chars.join(", "))
}

/// Resolve `\` escapes of a quoted body. Whitespace escapes become control
/// characters, any other escaped character stands for itself, so `A`
/// becomes `u0041`.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
