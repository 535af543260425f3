//! CMD, ENTRYPOINT, RUN, SHELL and VOLUME: a JSON-like exec array or plain
//! shell text.

use serde::Serialize;

use super::scanner::{Failure, Scanner};
use crate::args::ExecArgs;

pub(super) fn parse(s: &mut Scanner<'_>) -> Result<ExecArgs, Failure> {
    s.skip_ws();
    if s.peek() == Some('[') {
        let items = s.quoted_list(false)?;
        s.end()?;
        let arguments = items.into_iter().map(|(_, item)| item).collect();
        return Ok(ExecArgs {
            arguments: Some(arguments),
        });
    }
    Ok(ExecArgs {
        arguments: Some(vec![s.rest().trim_end().to_string()]),
    })
}

/// How an exec-family argument is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecFormQuoting {
    /// Shell text, or an array that does not parse
    NotExecForm,
    /// An array whose elements are all double-quoted
    DoubleQuoted,
    /// An array with at least one single-quoted element
    SingleQuoted,
}

impl ExecFormQuoting {
    pub fn is_pure_double_quoted_exec_form(&self) -> bool {
        matches!(self, ExecFormQuoting::DoubleQuoted)
    }
}

/// Classify the quoting of an exec-family argument.
pub fn exec_form_quoting(argument: &str) -> ExecFormQuoting {
    let mut s = Scanner::new(argument);
    s.skip_ws();
    let Ok(items) = s.quoted_list(false) else {
        return ExecFormQuoting::NotExecForm;
    };
    if s.end().is_err() {
        return ExecFormQuoting::NotExecForm;
    }
    if items.iter().all(|(quote, _)| *quote == '"') {
        ExecFormQuoting::DoubleQuoted
    } else {
        ExecFormQuoting::SingleQuoted
    }
}
