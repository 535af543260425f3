//! Lint rule groups.
//!
//! A group is a static table of [`Rule`]s plus the scope it checks. Rules
//! only report where and what to substitute; the message comes from the
//! table entry, so every diagnostic carries the rule's own description.

mod general;
mod last_stage;
mod stages;

pub use general::GeneralRules;
pub use last_stage::LastStageRules;
pub use stages::{BuilderStagesRules, EveryStageRules};

use std::collections::BTreeSet;

use dockermake_dockerfile::{Dockerfile, StageId};

use crate::diagnostic::{Diagnostic, Severity};

/// Signature of a rule check.
pub type Check<G> = fn(&G, &RuleContext<'_>, &mut Findings);

/// One entry of a group's rule table.
pub struct Rule<G> {
    pub name: &'static str,
    /// Message template; `{}` is replaced by the finding's substitution
    pub description: &'static str,
    pub severity: Severity,
    check: Check<G>,
}

impl<G> Rule<G> {
    pub const fn error(name: &'static str, description: &'static str, check: Check<G>) -> Self {
        Self {
            name,
            description,
            severity: Severity::Error,
            check,
        }
    }

    pub const fn warning(name: &'static str, description: &'static str, check: Check<G>) -> Self {
        Self {
            name,
            description,
            severity: Severity::Warning,
            check,
        }
    }

    fn render(&self, finding: Finding) -> Diagnostic {
        let message = match finding.substitution {
            Some(substitution) => self.description.replacen("{}", &substitution, 1),
            None => self.description.to_string(),
        };
        Diagnostic {
            rule: self.name,
            message,
            severity: self.severity,
            line: finding.line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Finding {
    line: Option<usize>,
    substitution: Option<String>,
}

/// Findings reported by a single rule invocation.
#[derive(Debug, Default)]
pub struct Findings {
    entries: Vec<Finding>,
}

impl Findings {
    pub fn report(&mut self) {
        self.entries.push(Finding::default());
    }

    pub fn report_at(&mut self, line: usize) {
        self.entries.push(Finding {
            line: Some(line),
            substitution: None,
        });
    }

    pub fn report_with(&mut self, substitution: impl Into<String>, line: Option<usize>) {
        self.entries.push(Finding {
            line,
            substitution: Some(substitution.into()),
        });
    }
}

/// What a rule is checking: the document, optionally narrowed to one stage.
pub struct RuleContext<'a> {
    pub dockerfile: &'a Dockerfile,
    pub stage: Option<StageId>,
}

impl RuleContext<'_> {
    pub fn stage(&self) -> Option<&StageId> {
        self.stage.as_ref()
    }
}

/// The part of the document a group's rules run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The whole document, once
    Document,
    /// Once per stage
    EveryStage,
    /// The final stage
    LastStage,
    /// Once per stage other than the final one
    BuilderStages,
}

impl Scope {
    pub fn contexts<'a>(&self, dockerfile: &'a Dockerfile) -> Vec<RuleContext<'a>> {
        let stages: Vec<Option<StageId>> = match self {
            Scope::Document => vec![None],
            Scope::EveryStage => dockerfile.stages().iter().cloned().map(Some).collect(),
            Scope::LastStage => vec![Some(dockerfile.last_stage())],
            Scope::BuilderStages => {
                let stages = dockerfile.stages();
                let builders = stages.len().saturating_sub(1);
                stages[..builders].iter().cloned().map(Some).collect()
            }
        };
        stages
            .into_iter()
            .map(|stage| RuleContext { dockerfile, stage })
            .collect()
    }
}

/// A named collection of rules sharing a scope.
pub trait RuleGroup {
    fn name(&self) -> &'static str;

    /// Rule names, in execution order.
    fn rule_names(&self) -> Vec<&'static str>;

    /// Run every rule not in `excluded`, in lexical order by name.
    fn check(&self, dockerfile: &Dockerfile, excluded: &BTreeSet<String>) -> Vec<Diagnostic>;
}

pub(crate) fn sorted_names<G>(rules: &[Rule<G>]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = rules.iter().map(|rule| rule.name).collect();
    names.sort_unstable();
    names
}

pub(crate) fn run_rules<G>(
    group: &G,
    group_name: &str,
    scope: Scope,
    rules: &[Rule<G>],
    dockerfile: &Dockerfile,
    excluded: &BTreeSet<String>,
) -> Vec<Diagnostic> {
    let mut selected: Vec<&Rule<G>> = rules
        .iter()
        .filter(|rule| !excluded.contains(rule.name))
        .collect();
    selected.sort_by_key(|rule| rule.name);

    let names: Vec<&str> = selected.iter().map(|rule| rule.name).collect();
    tracing::debug!(group = group_name, rules = ?names, "Loaded lint rules");

    let contexts = scope.contexts(dockerfile);
    let mut diagnostics = Vec::new();
    for rule in selected {
        for context in &contexts {
            let mut findings = Findings::default();
            (rule.check)(group, context, &mut findings);
            diagnostics.extend(findings.entries.into_iter().map(|finding| rule.render(finding)));
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    fn always(_: &Probe, _: &RuleContext<'_>, findings: &mut Findings) {
        findings.report();
    }

    fn per_stage(_: &Probe, context: &RuleContext<'_>, findings: &mut Findings) {
        if let Some(stage) = context.stage() {
            findings.report_with(stage.to_string(), Some(1));
        }
    }

    const PROBE_RULES: &[Rule<Probe>] = &[
        Rule::warning("rule2", "second", always),
        Rule::error("rule10", "stage {}", per_stage),
        Rule::error("rule1", "first", always),
    ];

    fn dockerfile(content: &str) -> Dockerfile {
        Dockerfile::parse(content).unwrap()
    }

    #[test]
    fn test_rules_run_in_lexical_order() {
        let df = dockerfile("FROM a\n");
        let diagnostics = run_rules(
            &Probe,
            "probe",
            Scope::Document,
            PROBE_RULES,
            &df,
            &BTreeSet::new(),
        );
        let rules: Vec<&str> = diagnostics.iter().map(|d| d.rule).collect();
        assert_eq!(rules, vec!["rule1", "rule2"]);
        assert_eq!(diagnostics[1].severity, Severity::Warning);
        assert_eq!(sorted_names(PROBE_RULES), vec!["rule1", "rule10", "rule2"]);
    }

    #[test]
    fn test_excluded_rules_are_skipped() {
        let df = dockerfile("FROM a\n");
        let excluded: BTreeSet<String> = ["rule1".to_string()].into_iter().collect();
        let diagnostics = run_rules(&Probe, "probe", Scope::Document, PROBE_RULES, &df, &excluded);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, "rule2");
    }

    #[test]
    fn test_substitution_and_stage_scopes() {
        let df = dockerfile("FROM a AS build\nFROM b AS test\nFROM c\n");
        let diagnostics = run_rules(
            &Probe,
            "probe",
            Scope::BuilderStages,
            PROBE_RULES,
            &df,
            &BTreeSet::new(),
        );
        let messages: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.rule == "rule10")
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            messages,
            vec!["stage build (rule10, line: 1)", "stage test (rule10, line: 1)"]
        );
    }

    #[test]
    fn test_scope_contexts() {
        let df = dockerfile("ARG A\nFROM a AS build\nFROM b\n");
        let stages = |scope: Scope| -> Vec<Option<StageId>> {
            scope.contexts(&df).into_iter().map(|c| c.stage).collect()
        };
        assert_eq!(stages(Scope::Document), vec![None]);
        assert_eq!(
            stages(Scope::EveryStage),
            vec![
                Some(StageId::Name("build".to_string())),
                Some(StageId::Index(1))
            ]
        );
        assert_eq!(stages(Scope::LastStage), vec![Some(StageId::Index(1))]);
        assert_eq!(
            stages(Scope::BuilderStages),
            vec![Some(StageId::Name("build".to_string()))]
        );
    }

    #[test]
    fn test_scope_contexts_without_from() {
        let df = dockerfile("RUN a\n");
        assert!(Scope::EveryStage.contexts(&df).is_empty());
        assert!(Scope::BuilderStages.contexts(&df).is_empty());
        assert_eq!(
            Scope::LastStage.contexts(&df)[0].stage,
            Some(StageId::BEFORE_FIRST_FROM)
        );
    }
}
