//! ONBUILD: a keyword followed by that keyword's own grammar.

use super::scanner::{Failure, Scanner};
use super::{parse_args, SyntaxFailure};
use crate::args::{InstructionArgs, OnbuildArgs};
use crate::keyword::Keyword;

const FORBIDDEN: [&str; 3] = ["ONBUILD", "MAINTAINER", "FROM"];

pub(super) fn parse(argument: &str) -> Result<InstructionArgs, SyntaxFailure> {
    let mut s = Scanner::new(argument);
    let (inner, offset) = trigger(&mut s).map_err(|failure| SyntaxFailure::at(&s, failure))?;

    let keyword = inner.parse::<Keyword>().map_err(|err| SyntaxFailure {
        message: err.to_string(),
        column: None,
    })?;

    let columns_before = s.column(offset) - 1;
    let args = parse_args(keyword, &argument[offset..]).map_err(|failure| SyntaxFailure {
        column: failure.column.map(|column| column + columns_before),
        message: failure.message,
    })?;

    Ok(InstructionArgs::Onbuild(OnbuildArgs {
        onbuild: Some(inner),
        instruction: Some(Box::new(args)),
    }))
}

/// The wrapped keyword and the byte offset of its argument.
fn trigger(s: &mut Scanner<'_>) -> Result<(String, usize), Failure> {
    s.skip_ws();
    let start = s.pos();
    if let Some(token) = FORBIDDEN.into_iter().find(|token| s.rest().starts_with(token)) {
        return Err(Failure::unwanted(start, token));
    }

    let len = s
        .rest()
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(s.rest().len());
    if len == 0 {
        return Err(Failure::expected(start, "keyword"));
    }
    s.reset(start + len);
    let inner = s.slice(start).to_string();

    if !s.peek().is_some_and(char::is_whitespace) {
        return Err(Failure::expected(s.pos(), "whitespace"));
    }
    s.skip_ws();
    Ok((inner, s.pos()))
}
