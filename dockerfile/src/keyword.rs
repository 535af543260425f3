//! Dockerfile instruction keywords.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The closed set of instruction keywords, matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Keyword {
    Add,
    Arg,
    Cmd,
    Copy,
    Entrypoint,
    Env,
    Expose,
    From,
    Healthcheck,
    Label,
    Maintainer,
    Onbuild,
    Run,
    Shell,
    Stopsignal,
    User,
    Volume,
    Workdir,
}

impl Keyword {
    /// Every keyword, in sorted order.
    pub const ALL: [Keyword; 18] = [
        Keyword::Add,
        Keyword::Arg,
        Keyword::Cmd,
        Keyword::Copy,
        Keyword::Entrypoint,
        Keyword::Env,
        Keyword::Expose,
        Keyword::From,
        Keyword::Healthcheck,
        Keyword::Label,
        Keyword::Maintainer,
        Keyword::Onbuild,
        Keyword::Run,
        Keyword::Shell,
        Keyword::Stopsignal,
        Keyword::User,
        Keyword::Volume,
        Keyword::Workdir,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Add => "ADD",
            Keyword::Arg => "ARG",
            Keyword::Cmd => "CMD",
            Keyword::Copy => "COPY",
            Keyword::Entrypoint => "ENTRYPOINT",
            Keyword::Env => "ENV",
            Keyword::Expose => "EXPOSE",
            Keyword::From => "FROM",
            Keyword::Healthcheck => "HEALTHCHECK",
            Keyword::Label => "LABEL",
            Keyword::Maintainer => "MAINTAINER",
            Keyword::Onbuild => "ONBUILD",
            Keyword::Run => "RUN",
            Keyword::Shell => "SHELL",
            Keyword::Stopsignal => "STOPSIGNAL",
            Keyword::User => "USER",
            Keyword::Volume => "VOLUME",
            Keyword::Workdir => "WORKDIR",
        }
    }

    /// Attribute names produced by this keyword's grammar.
    ///
    /// ONBUILD only declares `onbuild`; the wrapped instruction's attributes
    /// depend on the inner keyword.
    pub fn attribute_names(&self) -> &'static [&'static str] {
        match self {
            Keyword::Add | Keyword::Copy => &["chown", "from", "src", "dest"],
            Keyword::Arg => &["name", "default"],
            Keyword::Cmd | Keyword::Entrypoint | Keyword::Run | Keyword::Shell | Keyword::Volume => {
                &["arguments"]
            }
            Keyword::Env | Keyword::Label => &["assignments"],
            Keyword::Expose => &["ports"],
            Keyword::From => &[
                "registry",
                "username",
                "image",
                "tag",
                "full_image_name",
                "stage_name",
            ],
            Keyword::Healthcheck => &["interval", "timeout", "start_period", "retries", "cmd"],
            Keyword::Maintainer => &["maintainers"],
            Keyword::Onbuild => &["onbuild"],
            Keyword::Stopsignal => &["stop_signal"],
            Keyword::User => &["user", "group"],
            Keyword::Workdir => &["workdir"],
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a word is not an instruction keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyword(pub String);

impl fmt::Display for UnknownKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction of type {} does not exist.", self.0)
    }
}

impl std::error::Error for UnknownKeyword {}

impl FromStr for Keyword {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Keyword::ALL
            .iter()
            .copied()
            .find(|keyword| keyword.as_str() == s)
            .ok_or_else(|| UnknownKeyword(s.to_string()))
    }
}
