//! Rules for the stage that produces the final image.

use std::collections::BTreeSet;

use dockermake_dockerfile::{Dockerfile, Keyword};

use super::{run_rules, sorted_names, Findings, Rule, RuleContext, RuleGroup, Scope};
use crate::diagnostic::Diagnostic;

const RULES: &[Rule<LastStageRules>] = &[
    Rule::error(
        "rule0_1_0",
        "LABEL maintainer must occur at most once in last stage",
        single_maintainer_label,
    ),
    Rule::error(
        "rule0_1_1",
        "MAINTAINER must occur at most once in last stage",
        single_maintainer_instruction,
    ),
    Rule::error(
        "rule0_1_3",
        "Either LABEL maintainer or MAINTAINER is mandatory in last stage",
        maintainer_is_declared,
    ),
    Rule::error(
        "rule0_2",
        "EXPOSE must occur at most once in last stage",
        single_expose,
    ),
    Rule::error(
        "rule0_3",
        "ENTRYPOINT must occur at most once in last stage",
        single_entrypoint,
    ),
    Rule::error(
        "rule0_4",
        "CMD must occur at most once in last stage",
        single_cmd,
    ),
    Rule::error(
        "rule0_5",
        "VOLUME must occur at most once in last stage",
        single_volume,
    ),
    Rule::error(
        "rule7",
        "CMD must be after ENTRYPOINT if both are specified in last stage",
        cmd_after_entrypoint,
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LastStageRules;

impl RuleGroup for LastStageRules {
    fn name(&self) -> &'static str {
        "last_stage"
    }

    fn rule_names(&self) -> Vec<&'static str> {
        sorted_names(RULES)
    }

    fn check(&self, dockerfile: &Dockerfile, excluded: &BTreeSet<String>) -> Vec<Diagnostic> {
        run_rules(self, self.name(), Scope::LastStage, RULES, dockerfile, excluded)
    }
}

fn at_most_once(keyword: Keyword, cx: &RuleContext<'_>, findings: &mut Findings) {
    if cx.dockerfile.instructions_of_type(keyword, cx.stage()).len() > 1 {
        findings.report();
    }
}

fn single_maintainer_instruction(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    at_most_once(Keyword::Maintainer, cx, findings);
}

fn single_expose(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    at_most_once(Keyword::Expose, cx, findings);
}

fn single_entrypoint(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    at_most_once(Keyword::Entrypoint, cx, findings);
}

fn single_cmd(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    at_most_once(Keyword::Cmd, cx, findings);
}

fn single_volume(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    at_most_once(Keyword::Volume, cx, findings);
}

fn single_maintainer_label(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    if cx.dockerfile.maintainer_labels(true, cx.stage()).len() > 1 {
        findings.report();
    }
}

fn maintainer_is_declared(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let labels = cx.dockerfile.maintainer_labels(true, cx.stage());
    let instructions = cx
        .dockerfile
        .instructions_of_type(Keyword::Maintainer, cx.stage());
    if labels.is_empty() && instructions.is_empty() {
        findings.report();
    }
}

fn cmd_after_entrypoint(_: &LastStageRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let cmd = cx.dockerfile.last_index_of(Keyword::Cmd, cx.stage());
    let entrypoint = cx.dockerfile.last_index_of(Keyword::Entrypoint, cx.stage());
    if let (Some(cmd), Some(entrypoint)) = (cmd, entrypoint) {
        if entrypoint > cmd {
            findings.report();
        }
    }
}
