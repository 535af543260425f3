//! Rules that look at the document as a whole.

use std::collections::BTreeSet;

use dockermake_core::RegistryPolicy;
use dockermake_dockerfile::{Dockerfile, ExecFormQuoting, Instruction, Keyword};

use super::{run_rules, sorted_names, Findings, Rule, RuleContext, RuleGroup, Scope};
use crate::diagnostic::Diagnostic;

const MAX_LINE_LENGTH: usize = 100;

const RULES: &[Rule<GeneralRules>] = &[
    Rule::error("rule0_0", "FROM must occur at least once", from_is_present),
    Rule::error(
        "rule0_1_2",
        "Do not mix LABEL maintainer and MAINTAINER",
        maintainer_styles_not_mixed,
    ),
    Rule::warning(
        "rule0_1_4",
        "LABEL maintainer is recommended over MAINTAINER",
        maintainer_instruction_discouraged,
    ),
    Rule::error(
        "rule0_1_5",
        "LABEL maintainer must be lowercase",
        maintainer_label_lowercase,
    ),
    Rule::error(
        "rule0_1_6",
        "LABEL maintainer requires a mail address",
        maintainer_label_has_mail,
    ),
    Rule::error(
        "rule1",
        "FROM must be the first instruction (only ARG can precede FROM)",
        from_comes_first,
    ),
    Rule::error(
        "rule2",
        "FROM must point to an allowed registry: {}",
        from_uses_allowed_registry,
    ),
    Rule::error("rule3", "FROM must point to a username", from_has_username),
    Rule::error(
        "rule4",
        "FROM must point to a name with at least 2 characters, actual: {}",
        from_image_name_length,
    ),
    Rule::error("rule5", "FROM must point to a tag", from_has_tag),
    Rule::error("rule6", "ADD is prohibited", add_is_absent),
    Rule::error(
        "rule8",
        "CMD or ENTRYPOINT must be the last instruction if present",
        cmd_or_entrypoint_is_last,
    ),
    Rule::error("rule9", "RUN sudo is prohibited", run_without_sudo),
    Rule::warning(
        "rule10",
        "Lines longer than 100 characters",
        line_length,
    ),
    Rule::warning(
        "rule11_0",
        "AND (&&) / OR (||) control operators must be in front of each concerned line for multi-line RUN commands",
        control_operators_lead,
    ),
    Rule::warning(
        "rule11_1",
        "AND (&&) / OR (||) control operators should be indented by a single white space in front of each concerned line for multi-line RUN commands",
        control_operators_indented,
    ),
    Rule::error(
        "rule12_1",
        "CMD argument(s) must be enclosed with \" instead of '",
        cmd_double_quoted,
    ),
    Rule::error(
        "rule12_2",
        "ENTRYPOINT argument(s) must be enclosed with \" instead of '",
        entrypoint_double_quoted,
    ),
    Rule::error(
        "rule12_3",
        "VOLUME argument(s) must be enclosed with \" instead of '",
        volume_double_quoted,
    ),
    Rule::error(
        "rule13_0",
        "LABEL maintainer must be in the form name <name@mail.com>",
        maintainer_label_form,
    ),
    Rule::error(
        "rule13_1",
        "MAINTAINER must be in the form name <name@mail.com>",
        maintainer_instruction_form,
    ),
    Rule::warning("rule14", "no trailing whitespaces", no_trailing_whitespace),
    Rule::warning("rule15", "exactly one newline at the end", single_final_newline),
];

/// Document-wide rules. The registry policy drives `rule2`.
#[derive(Debug, Clone, Default)]
pub struct GeneralRules {
    registries: RegistryPolicy,
}

impl GeneralRules {
    pub fn new(registries: RegistryPolicy) -> Self {
        Self { registries }
    }
}

impl RuleGroup for GeneralRules {
    fn name(&self) -> &'static str {
        "general"
    }

    fn rule_names(&self) -> Vec<&'static str> {
        sorted_names(RULES)
    }

    fn check(&self, dockerfile: &Dockerfile, excluded: &BTreeSet<String>) -> Vec<Diagnostic> {
        run_rules(self, self.name(), Scope::Document, RULES, dockerfile, excluded)
    }
}

// --- FROM ---

fn from_is_present(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    if cx.dockerfile.first_instruction_of_type(Keyword::From, None).is_none() {
        findings.report();
    }
}

fn from_comes_first(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let first_other = cx
        .dockerfile
        .instructions(None)
        .into_iter()
        .find(|instruction| instruction.keyword() != Keyword::Arg);
    if first_other.is_some_and(|instruction| instruction.keyword() != Keyword::From) {
        findings.report();
    }
}

fn from_uses_allowed_registry(rules: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let policy = &rules.registries;
    if !policy.is_enforced() {
        return;
    }
    let allowed = format!("{:?}", policy.allowed_registries());
    for from in cx.dockerfile.instructions_of_type(Keyword::From, None) {
        let registry = from.args().as_from().and_then(|args| args.registry.as_deref());
        if !policy.allows(registry) {
            findings.report_with(allowed.clone(), Some(from.line()));
        }
    }
}

fn from_has_username(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for from in cx.dockerfile.instructions_of_type(Keyword::From, None) {
        if from.args().as_from().and_then(|args| args.username.as_ref()).is_none() {
            findings.report_at(from.line());
        }
    }
}

fn from_image_name_length(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for from in cx.dockerfile.instructions_of_type(Keyword::From, None) {
        let Some(image) = from.args().as_from().and_then(|args| args.image.as_deref()) else {
            continue;
        };
        if !image.is_empty() && image.chars().count() < 2 {
            findings.report_with(image, Some(from.line()));
        }
    }
}

fn from_has_tag(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for from in cx.dockerfile.instructions_of_type(Keyword::From, None) {
        if from.args().as_from().and_then(|args| args.tag.as_ref()).is_none() {
            findings.report_at(from.line());
        }
    }
}

// --- instructions ---

fn add_is_absent(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    if cx.dockerfile.first_instruction_of_type(Keyword::Add, None).is_some() {
        findings.report();
    }
}

fn cmd_or_entrypoint_is_last(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let cmd = cx.dockerfile.last_index_of(Keyword::Cmd, None);
    let entrypoint = cx.dockerfile.last_index_of(Keyword::Entrypoint, None);
    if cmd.is_none() && entrypoint.is_none() {
        return;
    }
    let last = cx.dockerfile.instruction_count(None).checked_sub(1);
    if cmd != last && entrypoint != last {
        findings.report();
    }
}

fn run_without_sudo(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for run in cx.dockerfile.instructions_of_type(Keyword::Run, None) {
        if run.argument().trim().starts_with("sudo") {
            findings.report_at(run.line());
        }
    }
}

fn report_single_quoted(keyword: Keyword, cx: &RuleContext<'_>, findings: &mut Findings) {
    for instruction in cx.dockerfile.instructions_of_type(keyword, None) {
        if instruction.exec_form_quoting() == ExecFormQuoting::SingleQuoted {
            findings.report_at(instruction.line());
        }
    }
}

fn cmd_double_quoted(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    report_single_quoted(Keyword::Cmd, cx, findings);
}

fn entrypoint_double_quoted(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    report_single_quoted(Keyword::Entrypoint, cx, findings);
}

fn volume_double_quoted(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    report_single_quoted(Keyword::Volume, cx, findings);
}

// --- maintainers ---

fn maintainer_styles_not_mixed(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let labels = cx.dockerfile.maintainer_labels(true, None);
    let instructions = cx.dockerfile.instructions_of_type(Keyword::Maintainer, None);
    if !labels.is_empty() && !instructions.is_empty() {
        findings.report();
    }
}

fn maintainer_instruction_discouraged(
    _: &GeneralRules,
    cx: &RuleContext<'_>,
    findings: &mut Findings,
) {
    if cx
        .dockerfile
        .first_instruction_of_type(Keyword::Maintainer, None)
        .is_some()
    {
        findings.report();
    }
}

fn maintainer_label_lowercase(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for label in cx.dockerfile.maintainer_labels(true, None) {
        if !label.contains_key("maintainer", false) {
            findings.report_at(label.line());
        }
    }
}

fn maintainer_label_has_mail(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for label in cx.dockerfile.maintainer_labels(true, None) {
        for entry in label_maintainers(label) {
            if !entry.contains('@') {
                findings.report_at(label.line());
            }
        }
    }
}

fn maintainer_label_form(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for label in cx.dockerfile.maintainer_labels(false, None) {
        for entry in label_maintainers(label) {
            report_address_form(entry, label.line(), findings);
        }
    }
}

fn maintainer_instruction_form(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for instruction in cx.dockerfile.instructions_of_type(Keyword::Maintainer, None) {
        let maintainers = instruction
            .args()
            .as_maintainer()
            .and_then(|args| args.maintainers.as_deref())
            .unwrap_or_default();
        for entry in maintainers {
            report_address_form(entry, instruction.line(), findings);
        }
    }
}

/// Comma-separated entries of a label's exact `maintainer` value.
fn label_maintainers(label: &Instruction) -> Vec<&str> {
    match label.value_of("maintainer", false) {
        Some(value) if !value.is_empty() => value.split(',').collect(),
        _ => Vec::new(),
    }
}

/// One finding for a missing display name, one for a missing address.
fn report_address_form(entry: &str, line: usize, findings: &mut Findings) {
    let (name, address) = split_address(entry);
    if name.is_empty() {
        findings.report_at(line);
    }
    if address.is_empty() {
        findings.report_at(line);
    }
}

/// Split `Name <address>` into its parts. Without angle brackets the whole
/// entry is taken as the address.
fn split_address(entry: &str) -> (&str, &str) {
    let entry = entry.trim();
    let bracketed = entry
        .find('<')
        .and_then(|open| Some((open, open + entry[open..].find('>')?)));
    match bracketed {
        Some((open, close)) => {
            let name = entry[..open].trim().trim_matches('"').trim();
            let address = entry[open + 1..close].trim();
            (name, address)
        }
        None => ("", entry),
    }
}

// --- physical lines ---

fn line_length(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for (index, line) in cx.dockerfile.physical_lines().iter().enumerate() {
        if line.chars().count() > MAX_LINE_LENGTH {
            findings.report_at(index + 1);
        }
    }
}

fn is_comment(line: &str) -> bool {
    line.trim().starts_with('#')
}

fn control_operators_lead(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for (index, line) in cx.dockerfile.physical_lines().iter().enumerate() {
        if is_comment(line) {
            continue;
        }
        let stripped = line.trim();
        let trailing = |operator: &str| stripped.find(operator).is_some_and(|at| at > 0);
        if trailing("&&") || trailing("||") {
            findings.report_at(index + 1);
        }
    }
}

fn control_operators_indented(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for (index, line) in cx.dockerfile.physical_lines().iter().enumerate() {
        if is_comment(line) {
            continue;
        }
        let stripped = line.trim_start();
        if !(stripped.starts_with("&&") || stripped.starts_with("||")) {
            continue;
        }
        let indent = line.len() - stripped.len();
        if indent != 1 {
            findings.report_at(index + 1);
        }
    }
}

fn no_trailing_whitespace(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    for (index, line) in cx.dockerfile.physical_lines().iter().enumerate() {
        let content = line.trim_start();
        if content != content.trim_end() {
            findings.report_at(index + 1);
        }
    }
}

fn single_final_newline(_: &GeneralRules, cx: &RuleContext<'_>, findings: &mut Findings) {
    let lines = cx.dockerfile.physical_lines();
    if let [.., second_last, last] = lines {
        if second_last.trim().is_empty() && last.trim().is_empty() {
            findings.report();
        }
    }
}
