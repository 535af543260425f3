//! ADD and COPY.

use super::scanner::{Failure, Scanner};
use crate::args::CopyArgs;

pub(super) fn parse(s: &mut Scanner<'_>) -> Result<CopyArgs, Failure> {
    let mut args = CopyArgs::default();
    options(s, &mut args);

    s.skip_ws();
    let start = s.pos();
    let mut paths = match exec_paths(s) {
        Ok(paths) => paths,
        Err(exec_failure) => {
            s.reset(start);
            shell_paths(s).map_err(|shell_failure| exec_failure.furthest(shell_failure))?
        }
    };
    let dest = paths.pop();
    args.src = Some(paths);
    args.dest = dest;
    Ok(args)
}

/// `--chown=<user>:<group>` and `--from=<ref>`, any order, each at most once.
/// An option whose value does not parse is left for the path list.
fn options(s: &mut Scanner<'_>, args: &mut CopyArgs) {
    loop {
        let save = s.pos();
        s.skip_ws();
        if args.chown.is_none() && s.eat_str("--chown=") {
            if let Some(owner) = chown_value(s) {
                args.chown = Some(owner);
                continue;
            }
        } else if args.from.is_none() && s.eat_str("--from=") {
            if let Ok(from) = s.word("", false) {
                args.from = Some(from);
                continue;
            }
        }
        s.reset(save);
        return;
    }
}

fn chown_value(s: &mut Scanner<'_>) -> Option<String> {
    let start = s.pos();
    s.word(":", false).ok()?;
    if !s.eat(':') {
        return None;
    }
    s.word("", false).ok()?;
    Some(s.slice(start).to_string())
}

/// `[ "src", ..., "dest" ]` with double quotes only.
fn exec_paths(s: &mut Scanner<'_>) -> Result<Vec<String>, Failure> {
    let items = s.quoted_list(true)?;
    if items.len() < 2 {
        return Err(Failure::expected(s.pos(), "source and destination"));
    }
    s.end()?;
    Ok(items.into_iter().map(|(_, item)| item).collect())
}

/// Two or more whitespace-separated paths.
fn shell_paths(s: &mut Scanner<'_>) -> Result<Vec<String>, Failure> {
    let mut paths = vec![s.path()?];
    loop {
        s.skip_ws();
        if s.at_end() {
            break;
        }
        paths.push(s.path()?);
    }
    if paths.len() < 2 {
        return Err(Failure::expected(s.pos(), "path"));
    }
    Ok(paths)
}
