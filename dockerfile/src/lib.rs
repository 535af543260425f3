//! Dockermake Dockerfile - Parser and Document Model
//!
//! Parses Dockerfile text into logical lines, validates each instruction
//! against its keyword grammar and exposes the result as a [`Dockerfile`]
//! with stage-aware queries.
//!
//! ```no_run
//! use dockermake_dockerfile::{Dockerfile, Keyword};
//!
//! let dockerfile = Dockerfile::parse("FROM centos:7\nRUN yum update\n")?;
//! let from = dockerfile.first_instruction_of_type(Keyword::From, None);
//! # Ok::<(), dockermake_core::DockermakeError>(())
//! ```

pub mod args;
pub mod document;
pub mod extractor;
mod grammar;
pub mod instruction;
pub mod keyword;

pub use args::{
    ArgDefinition, AssignmentArgs, CopyArgs, ExecArgs, ExposeArgs, FieldValue, FromArgs,
    HealthcheckArgs, InstructionArgs, MaintainerArgs, OnbuildArgs, StopsignalArgs, UserArgs,
    WorkdirArgs,
};
pub use document::Dockerfile;
pub use extractor::{extract, LogicalLine};
pub use grammar::{exec_form_quoting, ExecFormQuoting};
pub use instruction::{Instruction, StageId};
pub use keyword::{Keyword, UnknownKeyword};
