//! Instruction grammars.
//!
//! `parse_args` is the keyword -> grammar registry. Each grammar works on the
//! raw argument text through a [`Scanner`] and either fills the keyword's
//! argument struct or reports the furthest point it could reach.

mod assignments;
mod copy;
mod exec_form;
mod from;
mod healthcheck;
mod onbuild;
mod scanner;
mod simple;

pub use exec_form::{exec_form_quoting, ExecFormQuoting};

use crate::args::InstructionArgs;
use crate::keyword::Keyword;
use scanner::{Failure, Scanner};

/// A grammar mismatch, ready to be rendered into a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxFailure {
    pub message: String,
    /// 1-based character column within the argument
    pub column: Option<usize>,
}

impl SyntaxFailure {
    fn at(scanner: &Scanner<'_>, failure: Failure) -> Self {
        Self {
            column: Some(scanner.column(failure.pos)),
            message: failure.message,
        }
    }
}

/// Parse `argument` with the grammar registered for `keyword`.
pub(crate) fn parse_args(
    keyword: Keyword,
    argument: &str,
) -> Result<InstructionArgs, SyntaxFailure> {
    let mut s = Scanner::new(argument);
    let parsed = match keyword {
        Keyword::Add => copy::parse(&mut s).map(InstructionArgs::Add),
        Keyword::Arg => simple::arg(&mut s).map(InstructionArgs::Arg),
        Keyword::Cmd => exec_form::parse(&mut s).map(InstructionArgs::Cmd),
        Keyword::Copy => copy::parse(&mut s).map(InstructionArgs::Copy),
        Keyword::Entrypoint => exec_form::parse(&mut s).map(InstructionArgs::Entrypoint),
        Keyword::Env => assignments::parse(&mut s).map(InstructionArgs::Env),
        Keyword::Expose => simple::expose(&mut s).map(InstructionArgs::Expose),
        Keyword::From => from::parse(&mut s).map(InstructionArgs::From),
        Keyword::Healthcheck => healthcheck::parse(&mut s).map(InstructionArgs::Healthcheck),
        Keyword::Label => assignments::parse(&mut s).map(InstructionArgs::Label),
        Keyword::Maintainer => simple::maintainer(&mut s).map(InstructionArgs::Maintainer),
        Keyword::Onbuild => return onbuild::parse(argument),
        Keyword::Run => exec_form::parse(&mut s).map(InstructionArgs::Run),
        Keyword::Shell => exec_form::parse(&mut s).map(InstructionArgs::Shell),
        Keyword::Stopsignal => simple::stopsignal(&mut s).map(InstructionArgs::Stopsignal),
        Keyword::User => simple::user(&mut s).map(InstructionArgs::User),
        Keyword::Volume => exec_form::parse(&mut s).map(InstructionArgs::Volume),
        Keyword::Workdir => simple::workdir(&mut s).map(InstructionArgs::Workdir),
    };
    parsed.map_err(|failure| SyntaxFailure::at(&s, failure))
}
