//! A parsed instruction and the stage it belongs to.

use serde::Serialize;
use std::fmt;

use crate::args::InstructionArgs;
use crate::grammar::{exec_form_quoting, parse_args, ExecFormQuoting};
use crate::keyword::Keyword;

/// Identifies a build stage: the `FROM ... AS <name>` name, or the ordinal
/// of its `FROM` (`-1` before the first one).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum StageId {
    Index(i64),
    Name(String),
}

impl StageId {
    /// Stage of instructions that precede the first `FROM`.
    pub const BEFORE_FIRST_FROM: StageId = StageId::Index(-1);
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageId::Index(index) => write!(f, "{}", index),
            StageId::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    keyword: Keyword,
    argument: String,
    line: usize,
    stage: StageId,
    args: InstructionArgs,
    syntax_errors: Vec<String>,
}

impl Instruction {
    /// Parse `argument` with the keyword's grammar. A mismatch is recorded as
    /// a syntax error and leaves every attribute absent.
    pub fn parse(keyword: Keyword, argument: &str, line: usize) -> Self {
        let (args, syntax_errors) = match parse_args(keyword, argument) {
            Ok(args) => (args, Vec::new()),
            Err(failure) => {
                let mut message = format!(
                    "{} instruction with argument \"{}\" is invalid: {}",
                    keyword, argument, failure.message
                );
                if let Some(column) = failure.column {
                    message.push_str(&format!(
                        " (at line {}, position {} of the argument)",
                        line, column
                    ));
                }
                tracing::debug!(line, keyword = keyword.as_str(), "{}", message);
                (InstructionArgs::empty(keyword), vec![message])
            }
        };

        Self {
            keyword,
            argument: argument.to_string(),
            line,
            stage: StageId::BEFORE_FIRST_FROM,
            args,
            syntax_errors,
        }
    }

    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    /// Raw text after the keyword.
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Physical line the instruction ends on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn stage(&self) -> &StageId {
        &self.stage
    }

    pub(crate) fn set_stage(&mut self, stage: StageId) {
        self.stage = stage;
    }

    pub fn args(&self) -> &InstructionArgs {
        &self.args
    }

    pub fn syntax_errors(&self) -> &[String] {
        &self.syntax_errors
    }

    pub fn is_valid(&self) -> bool {
        self.syntax_errors.is_empty()
    }

    /// Whether an ENV/LABEL instruction assigns `key`.
    pub fn contains_key(&self, key: &str, ignore_case: bool) -> bool {
        self.value_of(key, ignore_case).is_some()
    }

    /// Value assigned to `key` by an ENV/LABEL instruction.
    pub fn value_of(&self, key: &str, ignore_case: bool) -> Option<&str> {
        self.args.as_assignments()?.value_of(key, ignore_case)
    }

    /// How the raw argument of an exec-family instruction is quoted.
    pub fn exec_form_quoting(&self) -> ExecFormQuoting {
        exec_form_quoting(&self.argument)
    }

    pub fn is_pure_double_quoted_exec_form(&self) -> bool {
        self.exec_form_quoting().is_pure_double_quoted_exec_form()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.argument)
    }
}
