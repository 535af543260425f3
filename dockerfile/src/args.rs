//! Structured instruction arguments.
//!
//! One struct per keyword family. Every field is optional: it stays `None`
//! when the grammar did not match that part or the instruction is invalid.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::keyword::Keyword;

/// `ADD` / `COPY [--chown=<user>:<group>] [--from=<ref>] <src>... <dest>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyArgs {
    pub chown: Option<String>,
    pub from: Option<String>,
    pub src: Option<Vec<String>>,
    pub dest: Option<String>,
}

/// `ARG <name>[=<default>]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgDefinition {
    pub name: Option<String>,
    pub default: Option<String>,
}

/// `CMD`, `ENTRYPOINT`, `RUN`, `SHELL`, `VOLUME`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecArgs {
    pub arguments: Option<Vec<String>>,
}

/// `ENV` / `LABEL` key-value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentArgs {
    pub assignments: Option<BTreeMap<String, String>>,
}

impl AssignmentArgs {
    pub fn contains(&self, key: &str, ignore_case: bool) -> bool {
        self.value_of(key, ignore_case).is_some()
    }

    pub fn value_of(&self, key: &str, ignore_case: bool) -> Option<&str> {
        let assignments = self.assignments.as_ref()?;
        if !ignore_case {
            return assignments.get(key).map(String::as_str);
        }
        assignments
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

/// `EXPOSE <port>[/<protocol>]...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExposeArgs {
    pub ports: Option<Vec<String>>,
}

/// `FROM [<registry>/][<username>/]<image>[:<tag>] [AS <stage_name>]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FromArgs {
    pub registry: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub tag: Option<String>,
    pub full_image_name: Option<String>,
    pub stage_name: Option<String>,
}

/// `HEALTHCHECK [options] NONE|CMD <command>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthcheckArgs {
    pub interval: Option<String>,
    pub timeout: Option<String>,
    pub start_period: Option<String>,
    pub retries: Option<String>,
    pub cmd: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaintainerArgs {
    pub maintainers: Option<Vec<String>>,
}

/// `ONBUILD <instruction>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnbuildArgs {
    pub onbuild: Option<String>,
    pub instruction: Option<Box<InstructionArgs>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopsignalArgs {
    pub stop_signal: Option<String>,
}

/// `USER <user>[:<group>]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserArgs {
    pub user: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkdirArgs {
    pub workdir: Option<String>,
}

/// Parsed arguments, tagged by keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "keyword", rename_all = "UPPERCASE")]
pub enum InstructionArgs {
    Add(CopyArgs),
    Arg(ArgDefinition),
    Cmd(ExecArgs),
    Copy(CopyArgs),
    Entrypoint(ExecArgs),
    Env(AssignmentArgs),
    Expose(ExposeArgs),
    From(FromArgs),
    Healthcheck(HealthcheckArgs),
    Label(AssignmentArgs),
    Maintainer(MaintainerArgs),
    Onbuild(OnbuildArgs),
    Run(ExecArgs),
    Shell(ExecArgs),
    Stopsignal(StopsignalArgs),
    User(UserArgs),
    Volume(ExecArgs),
    Workdir(WorkdirArgs),
}

/// A borrowed attribute value, for probing attributes by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
    Map(&'a BTreeMap<String, String>),
}

fn text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::Text)
}

fn list(value: &Option<Vec<String>>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::List)
}

impl InstructionArgs {
    /// Arguments with every attribute absent.
    pub fn empty(keyword: Keyword) -> Self {
        match keyword {
            Keyword::Add => InstructionArgs::Add(CopyArgs::default()),
            Keyword::Arg => InstructionArgs::Arg(ArgDefinition::default()),
            Keyword::Cmd => InstructionArgs::Cmd(ExecArgs::default()),
            Keyword::Copy => InstructionArgs::Copy(CopyArgs::default()),
            Keyword::Entrypoint => InstructionArgs::Entrypoint(ExecArgs::default()),
            Keyword::Env => InstructionArgs::Env(AssignmentArgs::default()),
            Keyword::Expose => InstructionArgs::Expose(ExposeArgs::default()),
            Keyword::From => InstructionArgs::From(FromArgs::default()),
            Keyword::Healthcheck => InstructionArgs::Healthcheck(HealthcheckArgs::default()),
            Keyword::Label => InstructionArgs::Label(AssignmentArgs::default()),
            Keyword::Maintainer => InstructionArgs::Maintainer(MaintainerArgs::default()),
            Keyword::Onbuild => InstructionArgs::Onbuild(OnbuildArgs::default()),
            Keyword::Run => InstructionArgs::Run(ExecArgs::default()),
            Keyword::Shell => InstructionArgs::Shell(ExecArgs::default()),
            Keyword::Stopsignal => InstructionArgs::Stopsignal(StopsignalArgs::default()),
            Keyword::User => InstructionArgs::User(UserArgs::default()),
            Keyword::Volume => InstructionArgs::Volume(ExecArgs::default()),
            Keyword::Workdir => InstructionArgs::Workdir(WorkdirArgs::default()),
        }
    }

    pub fn keyword(&self) -> Keyword {
        match self {
            InstructionArgs::Add(_) => Keyword::Add,
            InstructionArgs::Arg(_) => Keyword::Arg,
            InstructionArgs::Cmd(_) => Keyword::Cmd,
            InstructionArgs::Copy(_) => Keyword::Copy,
            InstructionArgs::Entrypoint(_) => Keyword::Entrypoint,
            InstructionArgs::Env(_) => Keyword::Env,
            InstructionArgs::Expose(_) => Keyword::Expose,
            InstructionArgs::From(_) => Keyword::From,
            InstructionArgs::Healthcheck(_) => Keyword::Healthcheck,
            InstructionArgs::Label(_) => Keyword::Label,
            InstructionArgs::Maintainer(_) => Keyword::Maintainer,
            InstructionArgs::Onbuild(_) => Keyword::Onbuild,
            InstructionArgs::Run(_) => Keyword::Run,
            InstructionArgs::Shell(_) => Keyword::Shell,
            InstructionArgs::Stopsignal(_) => Keyword::Stopsignal,
            InstructionArgs::User(_) => Keyword::User,
            InstructionArgs::Volume(_) => Keyword::Volume,
            InstructionArgs::Workdir(_) => Keyword::Workdir,
        }
    }

    /// Look an attribute up by its grammar name.
    ///
    /// Returns `None` both for unknown names and for declared attributes that
    /// are absent. For ONBUILD, names other than `onbuild` are resolved
    /// against the wrapped instruction.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self {
            InstructionArgs::Add(args) | InstructionArgs::Copy(args) => match name {
                "chown" => text(&args.chown),
                "from" => text(&args.from),
                "src" => list(&args.src),
                "dest" => text(&args.dest),
                _ => None,
            },
            InstructionArgs::Arg(args) => match name {
                "name" => text(&args.name),
                "default" => text(&args.default),
                _ => None,
            },
            InstructionArgs::Cmd(args)
            | InstructionArgs::Entrypoint(args)
            | InstructionArgs::Run(args)
            | InstructionArgs::Shell(args)
            | InstructionArgs::Volume(args) => match name {
                "arguments" => list(&args.arguments),
                _ => None,
            },
            InstructionArgs::Env(args) | InstructionArgs::Label(args) => match name {
                "assignments" => args.assignments.as_ref().map(FieldValue::Map),
                _ => None,
            },
            InstructionArgs::Expose(args) => match name {
                "ports" => list(&args.ports),
                _ => None,
            },
            InstructionArgs::From(args) => match name {
                "registry" => text(&args.registry),
                "username" => text(&args.username),
                "image" => text(&args.image),
                "tag" => text(&args.tag),
                "full_image_name" => text(&args.full_image_name),
                "stage_name" => text(&args.stage_name),
                _ => None,
            },
            InstructionArgs::Healthcheck(args) => match name {
                "interval" => text(&args.interval),
                "timeout" => text(&args.timeout),
                "start_period" => text(&args.start_period),
                "retries" => text(&args.retries),
                "cmd" => text(&args.cmd),
                _ => None,
            },
            InstructionArgs::Maintainer(args) => match name {
                "maintainers" => list(&args.maintainers),
                _ => None,
            },
            InstructionArgs::Onbuild(args) => match name {
                "onbuild" => text(&args.onbuild),
                _ => args.instruction.as_deref()?.field(name),
            },
            InstructionArgs::Stopsignal(args) => match name {
                "stop_signal" => text(&args.stop_signal),
                _ => None,
            },
            InstructionArgs::User(args) => match name {
                "user" => text(&args.user),
                "group" => text(&args.group),
                _ => None,
            },
            InstructionArgs::Workdir(args) => match name {
                "workdir" => text(&args.workdir),
                _ => None,
            },
        }
    }

    pub fn as_from(&self) -> Option<&FromArgs> {
        match self {
            InstructionArgs::From(args) => Some(args),
            _ => None,
        }
    }

    pub fn as_assignments(&self) -> Option<&AssignmentArgs> {
        match self {
            InstructionArgs::Env(args) | InstructionArgs::Label(args) => Some(args),
            _ => None,
        }
    }

    pub fn as_exec(&self) -> Option<&ExecArgs> {
        match self {
            InstructionArgs::Cmd(args)
            | InstructionArgs::Entrypoint(args)
            | InstructionArgs::Run(args)
            | InstructionArgs::Shell(args)
            | InstructionArgs::Volume(args) => Some(args),
            _ => None,
        }
    }

    pub fn as_copy(&self) -> Option<&CopyArgs> {
        match self {
            InstructionArgs::Add(args) | InstructionArgs::Copy(args) => Some(args),
            _ => None,
        }
    }

    pub fn as_arg(&self) -> Option<&ArgDefinition> {
        match self {
            InstructionArgs::Arg(args) => Some(args),
            _ => None,
        }
    }

    pub fn as_maintainer(&self) -> Option<&MaintainerArgs> {
        match self {
            InstructionArgs::Maintainer(args) => Some(args),
            _ => None,
        }
    }
}
