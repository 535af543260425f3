//! FROM image references.
//!
//! `[<registry>/][<username>/...]<image>[:<tag>] [AS <stage_name>]`. The first
//! `/`-terminated segment is the registry, further ones form the username.

use super::scanner::{Failure, Scanner};
use crate::args::FromArgs;

pub(super) fn parse(s: &mut Scanner<'_>) -> Result<FromArgs, Failure> {
    s.skip_ws();
    let start = s.pos();

    let registry = segment(s);
    let mut namespace = Vec::new();
    while let Some(part) = segment(s) {
        namespace.push(part);
    }
    let username = (!namespace.is_empty()).then(|| namespace.join("/"));

    let image = s.word("/:", false)?;
    let tag = tag(s);
    let full_image_name = s.slice(start).to_string();
    let stage_name = stage_name(s);
    s.end()?;

    Ok(FromArgs {
        registry,
        username,
        image: Some(image),
        tag,
        full_image_name: Some(full_image_name),
        stage_name,
    })
}

/// A word directly followed by `/`.
fn segment(s: &mut Scanner<'_>) -> Option<String> {
    let save = s.pos();
    match s.word("/", false) {
        Ok(part) if s.eat('/') => Some(part),
        _ => {
            s.reset(save);
            None
        }
    }
}

fn tag(s: &mut Scanner<'_>) -> Option<String> {
    let save = s.pos();
    if !s.eat(':') {
        return None;
    }
    match s.word("", false) {
        Ok(tag) => Some(tag),
        Err(_) => {
            s.reset(save);
            None
        }
    }
}

fn stage_name(s: &mut Scanner<'_>) -> Option<String> {
    let save = s.pos();
    s.skip_ws();
    if s.eat_caseless("as") {
        s.skip_ws();
        if let Ok(name) = s.word("", false) {
            return Some(name);
        }
    }
    s.reset(save);
    None
}
