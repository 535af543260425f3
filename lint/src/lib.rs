//! Dockermake Lint - Dockerfile Style Checks
//!
//! Runs the built-in rule groups (general, every stage, last stage, builder
//! stages) over a parsed [`Dockerfile`](dockermake_dockerfile::Dockerfile)
//! and collects syntax errors, rule errors and warnings.
//!
//! ```no_run
//! use dockermake_core::{LintConfig, RegistryPolicy};
//! use dockermake_dockerfile::Dockerfile;
//!
//! let dockerfile = Dockerfile::parse("FROM registry.a.com/acme/centos:7\n")?;
//! let report = dockermake_lint::lint(&dockerfile, &LintConfig::default(), &RegistryPolicy::default())?;
//! for warning in &report.warnings {
//!     println!("{}", warning);
//! }
//! # Ok::<(), dockermake_core::DockermakeError>(())
//! ```

pub mod diagnostic;
pub mod linter;
pub mod rules;

pub use diagnostic::{Diagnostic, Severity};
pub use linter::{lint, DockerfileLint, LintReport};
pub use rules::{
    BuilderStagesRules, EveryStageRules, GeneralRules, LastStageRules, Rule, RuleGroup, Scope,
};
