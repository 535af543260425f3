//! ENV and LABEL: `key=value ...` or the legacy `key value...` form.

use std::collections::BTreeMap;

use super::scanner::{Failure, Scanner};
use crate::args::AssignmentArgs;

pub(super) fn parse(s: &mut Scanner<'_>) -> Result<AssignmentArgs, Failure> {
    s.skip_ws();
    let start = s.pos();

    // The legacy form is only an alternative while no `key=value` matched.
    let assignments = match key_value_pairs(s) {
        Some(pairs) => pairs,
        None => {
            s.reset(start);
            legacy(s).ok_or_else(|| {
                Failure::expected(start, "assignment or old style assignment")
            })?
        }
    };
    s.end()?;
    Ok(AssignmentArgs {
        assignments: Some(assignments),
    })
}

/// One or more adjacent `key=value` assignments; later keys win.
fn key_value_pairs(s: &mut Scanner<'_>) -> Option<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();
    loop {
        let save = s.pos();
        s.skip_ws();
        let Ok(key) = s.word("=", true) else {
            s.reset(save);
            break;
        };
        if !s.eat('=') {
            s.reset(save);
            break;
        }
        let value = s.word("", true).unwrap_or_default();
        pairs.insert(key, value);
    }
    (!pairs.is_empty()).then_some(pairs)
}

/// `key value...`: the value is every remaining word, joined by one space.
fn legacy(s: &mut Scanner<'_>) -> Option<BTreeMap<String, String>> {
    let key = s.word("", true).ok()?;
    let mut words = Vec::new();
    loop {
        let save = s.pos();
        s.skip_ws();
        match s.word("", false) {
            Ok(word) => words.push(word),
            Err(_) => {
                s.reset(save);
                break;
            }
        }
    }
    if words.is_empty() {
        return None;
    }
    Some(BTreeMap::from([(key, words.join(" "))]))
}
