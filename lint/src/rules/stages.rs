//! Per-stage rule groups. Neither carries rules yet.

use std::collections::BTreeSet;

use dockermake_dockerfile::Dockerfile;

use super::{run_rules, sorted_names, Rule, RuleGroup, Scope};
use crate::diagnostic::Diagnostic;

const EVERY_STAGE_RULES: &[Rule<EveryStageRules>] = &[];

const BUILDER_STAGES_RULES: &[Rule<BuilderStagesRules>] = &[];

/// Rules run once per stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct EveryStageRules;

impl RuleGroup for EveryStageRules {
    fn name(&self) -> &'static str {
        "every_stage"
    }

    fn rule_names(&self) -> Vec<&'static str> {
        sorted_names(EVERY_STAGE_RULES)
    }

    fn check(&self, dockerfile: &Dockerfile, excluded: &BTreeSet<String>) -> Vec<Diagnostic> {
        run_rules(
            self,
            self.name(),
            Scope::EveryStage,
            EVERY_STAGE_RULES,
            dockerfile,
            excluded,
        )
    }
}

/// Rules run once per stage except the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuilderStagesRules;

impl RuleGroup for BuilderStagesRules {
    fn name(&self) -> &'static str {
        "builder_stages"
    }

    fn rule_names(&self) -> Vec<&'static str> {
        sorted_names(BUILDER_STAGES_RULES)
    }

    fn check(&self, dockerfile: &Dockerfile, excluded: &BTreeSet<String>) -> Vec<Diagnostic> {
        run_rules(
            self,
            self.name(),
            Scope::BuilderStages,
            BUILDER_STAGES_RULES,
            dockerfile,
            excluded,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_groups_report_nothing() {
        let dockerfile = Dockerfile::parse("FROM a AS build\nRUN sudo x\nFROM b\n").unwrap();
        assert!(EveryStageRules.check(&dockerfile, &BTreeSet::new()).is_empty());
        assert!(BuilderStagesRules.check(&dockerfile, &BTreeSet::new()).is_empty());
        assert!(EveryStageRules.rule_names().is_empty());
        assert!(BuilderStagesRules.rule_names().is_empty());
    }
}
