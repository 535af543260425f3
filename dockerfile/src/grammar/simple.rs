//! Single-shape grammars: ARG, EXPOSE, MAINTAINER, STOPSIGNAL, USER, WORKDIR.

use super::scanner::{Failure, Scanner};
use crate::args::{ArgDefinition, ExposeArgs, MaintainerArgs, StopsignalArgs, UserArgs, WorkdirArgs};

/// `<name>[=<default>]`, with no whitespace anywhere.
pub(super) fn arg(s: &mut Scanner<'_>) -> Result<ArgDefinition, Failure> {
    s.skip_ws();
    let name = s.word("=", false)?;
    let mut default = None;
    let save = s.pos();
    if s.eat('=') {
        match s.word("", false) {
            Ok(value) => default = Some(value),
            Err(_) => s.reset(save),
        }
    }
    s.end()?;
    Ok(ArgDefinition {
        name: Some(name),
        default,
    })
}

/// One or more `<port>[-<port>][/<protocol>]` tokens.
pub(super) fn expose(s: &mut Scanner<'_>) -> Result<ExposeArgs, Failure> {
    let mut ports = Vec::new();
    loop {
        s.skip_ws();
        if s.at_end() && !ports.is_empty() {
            break;
        }
        let start = s.pos();
        let token = s.word("", false)?;
        if !is_port(&token) {
            return Err(Failure::expected(start, "port"));
        }
        ports.push(token);
    }
    Ok(ExposeArgs { ports: Some(ports) })
}

fn is_port(token: &str) -> bool {
    let (range, protocol) = match token.split_once('/') {
        Some((range, protocol)) => (range, Some(protocol)),
        None => (token, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    let range_ok = match range.split_once('-') {
        Some((low, high)) => digits(low) && digits(high),
        None => digits(range),
    };
    let protocol_ok = protocol.map_or(true, |p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphabetic()));
    range_ok && protocol_ok
}

/// Comma-separated maintainers, each made of words joined by one space.
pub(super) fn maintainer(s: &mut Scanner<'_>) -> Result<MaintainerArgs, Failure> {
    let mut maintainers = Vec::new();
    loop {
        s.skip_ws();
        let mut words = vec![s.word(",", false)?];
        loop {
            let save = s.pos();
            s.skip_ws();
            match s.word(",", false) {
                Ok(word) => words.push(word),
                Err(_) => {
                    s.reset(save);
                    break;
                }
            }
        }
        maintainers.push(words.join(" "));

        let save = s.pos();
        s.skip_ws();
        if !s.eat(',') {
            s.reset(save);
            break;
        }
    }
    s.end()?;
    Ok(MaintainerArgs {
        maintainers: Some(maintainers),
    })
}

pub(super) fn stopsignal(s: &mut Scanner<'_>) -> Result<StopsignalArgs, Failure> {
    s.skip_ws();
    let signal = s.word("", false)?;
    s.end()?;
    Ok(StopsignalArgs {
        stop_signal: Some(signal),
    })
}

/// `<user>[:<group>]`; the group keeps any further colons.
pub(super) fn user(s: &mut Scanner<'_>) -> Result<UserArgs, Failure> {
    s.skip_ws();
    let user = s.word(":", false)?;
    let mut group = None;
    let save = s.pos();
    if s.eat(':') {
        match s.word("", false) {
            Ok(value) => group = Some(value),
            Err(_) => s.reset(save),
        }
    }
    s.end()?;
    Ok(UserArgs {
        user: Some(user),
        group,
    })
}

pub(super) fn workdir(s: &mut Scanner<'_>) -> Result<WorkdirArgs, Failure> {
    s.skip_ws();
    let workdir = s.path()?;
    s.end()?;
    Ok(WorkdirArgs {
        workdir: Some(workdir),
    })
}
