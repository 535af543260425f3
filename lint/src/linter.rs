//! Lint orchestration: syntax errors first, then every rule group in order.

use serde::Serialize;
use std::collections::BTreeSet;

use dockermake_core::error::{DockermakeError, Result};
use dockermake_core::{LintConfig, RegistryPolicy};
use dockermake_dockerfile::Dockerfile;

use crate::diagnostic::{Diagnostic, Severity};
use crate::rules::{
    BuilderStagesRules, EveryStageRules, GeneralRules, LastStageRules, RuleGroup,
};

/// Outcome of linting one Dockerfile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub syntax_errors: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    /// Whether any syntax or rule error was found. Warnings never fail.
    pub fn failed(&self) -> bool {
        !self.syntax_errors.is_empty() || !self.errors.is_empty()
    }

    /// Syntax errors followed by rule errors.
    pub fn all_errors(&self) -> Vec<String> {
        self.syntax_errors
            .iter()
            .chain(&self.errors)
            .cloned()
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic.to_string()),
            Severity::Warning => self.warnings.push(diagnostic.to_string()),
        }
    }
}

/// Lints a parsed Dockerfile against the built-in rule groups.
pub struct DockerfileLint<'a> {
    dockerfile: &'a Dockerfile,
    exit_on_errors: bool,
    excluded: BTreeSet<String>,
    groups: Vec<Box<dyn RuleGroup>>,
}

impl<'a> DockerfileLint<'a> {
    pub fn new(dockerfile: &'a Dockerfile, config: &LintConfig, registries: &RegistryPolicy) -> Self {
        let excluded = config.excluded_rules();
        if !excluded.is_empty() {
            tracing::info!(excluded = ?excluded, "Excluding lint rules");
        }
        Self {
            dockerfile,
            exit_on_errors: config.exit_on_errors,
            excluded,
            groups: vec![
                Box::new(GeneralRules::new(registries.clone())),
                Box::new(EveryStageRules),
                Box::new(LastStageRules),
                Box::new(BuilderStagesRules),
            ],
        }
    }

    /// Names of the groups in execution order.
    pub fn group_names(&self) -> Vec<&'static str> {
        self.groups.iter().map(|group| group.name()).collect()
    }

    /// Collect the report without failing on errors.
    pub fn report(&self) -> LintReport {
        let mut report = LintReport {
            syntax_errors: self
                .dockerfile
                .syntax_errors()
                .into_iter()
                .map(str::to_string)
                .collect(),
            ..LintReport::default()
        };

        for group in &self.groups {
            for diagnostic in group.check(self.dockerfile, &self.excluded) {
                report.push(diagnostic);
            }
        }
        report
    }

    /// Lint the Dockerfile. Fails with [`DockermakeError::LintingFailed`]
    /// when errors were found and `exit_on_errors` is set.
    pub fn lint(&self) -> Result<LintReport> {
        let target = self
            .dockerfile
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        tracing::info!(dockerfile = %target, "Linting");

        let report = self.report();
        for error in report.all_errors() {
            tracing::error!("{}", error);
        }
        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }

        if report.failed() {
            tracing::error!(
                syntax_errors = report.syntax_errors.len(),
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                "Linting FAILED"
            );
            if self.exit_on_errors {
                return Err(DockermakeError::LintingFailed {
                    errors: report.all_errors(),
                    warnings: report.warnings,
                });
            }
        } else if report.warnings.is_empty() {
            tracing::info!("Linting OK");
        } else {
            tracing::info!(warnings = report.warnings.len(), "Linting OK with warning(s)");
        }

        Ok(report)
    }
}

/// Lint `dockerfile` with the given configuration.
pub fn lint(
    dockerfile: &Dockerfile,
    config: &LintConfig,
    registries: &RegistryPolicy,
) -> Result<LintReport> {
    DockerfileLint::new(dockerfile, config, registries).lint()
}
