//! Dockerfile document model.
//!
//! Holds the physical lines, the logical lines and the parsed instructions of
//! one Dockerfile, with every instruction tagged by its build stage.

use serde::Serialize;
use std::path::{Path, PathBuf};

use dockermake_core::error::{DockermakeError, Result};

use crate::extractor::{extract, LogicalLine};
use crate::instruction::{Instruction, StageId};
use crate::keyword::Keyword;

/// Parsed Dockerfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dockerfile {
    path: Option<PathBuf>,
    physical_lines: Vec<String>,
    logical_lines: Vec<LogicalLine>,
    instructions: Vec<Instruction>,
    stages: Vec<StageId>,
}

impl Dockerfile {
    /// Parse a Dockerfile from its text content.
    ///
    /// Unknown keywords and unterminated continuations are fatal; grammar
    /// mismatches are recorded on the affected instruction.
    pub fn parse(content: &str) -> Result<Self> {
        let logical_lines = extract(content)?;

        let mut instructions = Vec::with_capacity(logical_lines.len());
        for logical in &logical_lines {
            let (word, argument) = split_first_word(&logical.text);
            let keyword = word
                .parse::<Keyword>()
                .map_err(|_| DockermakeError::UnknownInstruction {
                    keyword: word.to_string(),
                    line: logical.line,
                })?;
            instructions.push(Instruction::parse(keyword, argument, logical.line));
        }

        let stages = assign_stages(&mut instructions);
        tracing::debug!(
            instructions = instructions.len(),
            stages = stages.len(),
            "Parsed Dockerfile"
        );

        Ok(Self {
            path: None,
            physical_lines: content.lines().map(str::to_string).collect(),
            logical_lines,
            instructions,
            stages,
        })
    }

    /// Parse a Dockerfile from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DockermakeError::DockerfileNotFound(path.to_path_buf()));
        }
        tracing::info!(path = %path.display(), "Reading Dockerfile");
        let content = std::fs::read_to_string(path)?;
        let mut dockerfile = Self::parse(&content)?;
        dockerfile.path = Some(path.to_path_buf());
        Ok(dockerfile)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn physical_lines(&self) -> &[String] {
        &self.physical_lines
    }

    pub fn logical_lines(&self) -> &[LogicalLine] {
        &self.logical_lines
    }

    /// Stage ids in `FROM` order.
    pub fn stages(&self) -> &[StageId] {
        &self.stages
    }

    /// Id of the final stage, or `-1` without any `FROM`.
    pub fn last_stage(&self) -> StageId {
        self.stages
            .last()
            .cloned()
            .unwrap_or(StageId::BEFORE_FIRST_FROM)
    }

    /// Instructions, optionally restricted to one stage.
    pub fn instructions(&self, stage: Option<&StageId>) -> Vec<&Instruction> {
        self.instructions
            .iter()
            .filter(|instruction| stage.map_or(true, |stage| instruction.stage() == stage))
            .collect()
    }

    pub fn instruction_count(&self, stage: Option<&StageId>) -> usize {
        self.instructions(stage).len()
    }

    pub fn instructions_of_type(
        &self,
        keyword: Keyword,
        stage: Option<&StageId>,
    ) -> Vec<&Instruction> {
        self.instructions(stage)
            .into_iter()
            .filter(|instruction| instruction.keyword() == keyword)
            .collect()
    }

    pub fn first_instruction_of_type(
        &self,
        keyword: Keyword,
        stage: Option<&StageId>,
    ) -> Option<&Instruction> {
        self.instructions_of_type(keyword, stage).into_iter().next()
    }

    /// Position, in the whole instruction list, of the last `keyword`
    /// instruction within `stage`.
    pub fn last_index_of(&self, keyword: Keyword, stage: Option<&StageId>) -> Option<usize> {
        self.instructions.iter().rposition(|instruction| {
            instruction.keyword() == keyword
                && stage.map_or(true, |stage| instruction.stage() == stage)
        })
    }

    /// LABEL instructions carrying a `maintainer` key.
    pub fn maintainer_labels(&self, ignore_case: bool, stage: Option<&StageId>) -> Vec<&Instruction> {
        self.instructions_of_type(Keyword::Label, stage)
            .into_iter()
            .filter(|label| label.contains_key("maintainer", ignore_case))
            .collect()
    }

    /// Whether an ARG instruction declares `name`.
    pub fn contains_arg_named(&self, name: &str) -> bool {
        self.instructions_of_type(Keyword::Arg, None)
            .into_iter()
            .filter_map(|arg| arg.args().as_arg()?.name.as_deref())
            .any(|declared| declared == name)
    }

    /// Names of ARG instructions without a default value.
    pub fn args_without_default(&self) -> Vec<&str> {
        self.instructions_of_type(Keyword::Arg, None)
            .into_iter()
            .filter_map(|arg| arg.args().as_arg())
            .filter(|arg| arg.default.is_none())
            .filter_map(|arg| arg.name.as_deref())
            .collect()
    }

    /// Syntax errors of all instructions, in document order.
    pub fn syntax_errors(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .flat_map(|instruction| instruction.syntax_errors())
            .map(String::as_str)
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Split a logical line into keyword and the text after the first whitespace run.
fn split_first_word(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

/// Tag every instruction with its stage and return the stage ids in `FROM` order.
fn assign_stages(instructions: &mut [Instruction]) -> Vec<StageId> {
    let mut stages = Vec::new();
    let mut ordinal: i64 = -1;
    let mut current = StageId::BEFORE_FIRST_FROM;

    for instruction in instructions.iter_mut() {
        if instruction.keyword() == Keyword::From {
            ordinal += 1;
            current = match instruction.args().as_from().and_then(|from| from.stage_name.clone()) {
                Some(name) => StageId::Name(name),
                None => StageId::Index(ordinal),
            };
            stages.push(current.clone());
        }
        instruction.set_stage(current.clone());
    }
    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MULTI_STAGE: &str = "\
ARG VERSION=7
FROM centos:${VERSION} AS builder
RUN make
FROM alpine:3.18
LABEL maintainer=\"foo <foo@bar.com>\"
COPY --from=builder /out /app
FROM scratch as final
COPY --from=1 /app /app
CMD [\"/app/run\"]
";

    #[test]
    fn test_parse_arguments() {
        let content = "
        FROM centos
        ADD asdf asdf
        CMD ['bash']
        ";
        let df = Dockerfile::parse(content).unwrap();
        let arguments: Vec<&str> = df.instructions(None).iter().map(|i| i.argument()).collect();
        assert_eq!(arguments, vec!["centos", "asdf asdf", "['bash']"]);
    }

    #[test]
    fn test_parse_copy_and_add() {
        let content = "
        FROM\tcentos:7.3
        LABEL\tmaintainer\tSomebody <with@somemail.com>

        COPY\t.\t/go/src/github.com/docker/docker
        ADD\t\t.\t/
        ADD\t\t[ \"vimrc\", \"/tmp\" ]
        COPY\t[ \"bashrc\", \"vimrc\", \"/tmp\" ]
        ADD\t\t[ \"test file\", \"/tmp/test file\" ]
        ";
        let df = Dockerfile::parse(content).unwrap();
        let instructions = df.instructions(None);
        assert_eq!(instructions.len(), 7);
        assert_eq!(
            instructions[0].args().as_from().unwrap().full_image_name.as_deref(),
            Some("centos:7.3")
        );
        assert_eq!(
            instructions[1].value_of("maintainer", false),
            Some("Somebody <with@somemail.com>")
        );
        let copy = instructions[2].args().as_copy().unwrap();
        assert_eq!(copy.src, Some(vec![".".to_string()]));
        assert_eq!(copy.dest.as_deref(), Some("/go/src/github.com/docker/docker"));
        let add = instructions[6].args().as_copy().unwrap();
        assert_eq!(add.src, Some(vec!["test file".to_string()]));
        assert_eq!(add.dest.as_deref(), Some("/tmp/test file"));
        assert!(df.syntax_errors().is_empty());
    }

    #[test]
    fn test_unknown_instruction_is_fatal() {
        let err = Dockerfile::parse("FROM centos\nUNKNOWN foo\n").unwrap_err();
        assert!(matches!(
            err,
            DockermakeError::UnknownInstruction { ref keyword, line: 2 } if keyword == "UNKNOWN"
        ));
    }

    #[test]
    fn test_lowercase_keyword_is_unknown() {
        assert!(Dockerfile::parse("from centos\n").is_err());
    }

    #[test]
    fn test_syntax_errors_are_collected() {
        let df = Dockerfile::parse("FROM centos\nARG A = 1\nCMD [\"a\" \"b\"]\n").unwrap();
        let errors = df.syntax_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("ARG instruction"));
        assert!(errors[1].starts_with("CMD instruction"));
    }

    #[test]
    fn test_stage_assignment() {
        let df = Dockerfile::parse(MULTI_STAGE).unwrap();
        let stages: Vec<StageId> = df
            .instructions(None)
            .iter()
            .map(|i| i.stage().clone())
            .collect();
        assert_eq!(
            stages,
            vec![
                StageId::Index(-1),
                StageId::Name("builder".to_string()),
                StageId::Name("builder".to_string()),
                StageId::Index(1),
                StageId::Index(1),
                StageId::Index(1),
                StageId::Name("final".to_string()),
                StageId::Name("final".to_string()),
                StageId::Name("final".to_string()),
            ]
        );
        assert_eq!(
            df.stages(),
            &[
                StageId::Name("builder".to_string()),
                StageId::Index(1),
                StageId::Name("final".to_string())
            ]
        );
        assert_eq!(df.last_stage(), StageId::Name("final".to_string()));
    }

    #[test]
    fn test_last_stage_without_from() {
        let df = Dockerfile::parse("RUN echo\n").unwrap();
        assert!(df.stages().is_empty());
        assert_eq!(df.last_stage(), StageId::BEFORE_FIRST_FROM);
    }

    #[test]
    fn test_stage_queries() {
        let df = Dockerfile::parse(MULTI_STAGE).unwrap();
        let last = df.last_stage();
        assert_eq!(df.instruction_count(None), 9);
        assert_eq!(df.instruction_count(Some(&last)), 3);
        assert_eq!(df.instructions_of_type(Keyword::Copy, None).len(), 2);
        assert_eq!(df.instructions_of_type(Keyword::Copy, Some(&last)).len(), 1);
        assert_eq!(
            df.first_instruction_of_type(Keyword::From, None)
                .map(|i| i.line()),
            Some(2)
        );
        assert_eq!(df.last_index_of(Keyword::Copy, None), Some(7));
        assert_eq!(df.last_index_of(Keyword::Copy, Some(&StageId::Index(1))), Some(5));
        assert_eq!(df.last_index_of(Keyword::Run, Some(&last)), None);
    }

    #[test]
    fn test_maintainer_labels() {
        let content = "FROM a\nLABEL maintainer=\"x <x@y.z>\"\nLABEL Maintainer=y\nLABEL other=z\n";
        let df = Dockerfile::parse(content).unwrap();
        assert_eq!(df.maintainer_labels(false, None).len(), 1);
        assert_eq!(df.maintainer_labels(true, None).len(), 2);
        assert_eq!(
            df.maintainer_labels(true, Some(&StageId::Index(5))).len(),
            0
        );
    }

    #[test]
    fn test_arg_queries() {
        let df = Dockerfile::parse("ARG A\nARG B=1\nFROM centos\nARG C\n").unwrap();
        assert!(df.contains_arg_named("B"));
        assert!(!df.contains_arg_named("D"));
        assert_eq!(df.args_without_default(), vec!["A", "C"]);
    }

    #[test]
    fn test_physical_and_logical_lines() {
        let df = Dockerfile::parse("FROM centos\n# comment\nRUN a \\\n  b\n\n").unwrap();
        assert_eq!(df.physical_lines().len(), 5);
        assert_eq!(
            df.logical_lines(),
            &[LogicalLine::new("FROM centos", 1), LogicalLine::new("RUN a b", 4)]
        );
        assert_eq!(df.instructions(None)[1].line(), 4);
    }

    #[test]
    fn test_keyword_only_line() {
        let df = Dockerfile::parse("FROM centos\nCMD\n").unwrap();
        let cmd = df.first_instruction_of_type(Keyword::Cmd, None).unwrap();
        assert_eq!(cmd.argument(), "");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "FROM centos:7\nRUN yum update\n").unwrap();
        let df = Dockerfile::from_file(file.path()).unwrap();
        assert_eq!(df.path(), Some(file.path()));
        assert_eq!(df.instruction_count(None), 2);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        let err = Dockerfile::from_file(&path).unwrap_err();
        assert!(matches!(err, DockermakeError::DockerfileNotFound(p) if p == path));
    }

    #[test]
    fn test_to_json() {
        let df = Dockerfile::parse("FROM centos AS base\n").unwrap();
        let json: serde_json::Value = serde_json::from_str(&df.to_json().unwrap()).unwrap();
        assert_eq!(json["stages"], serde_json::json!(["base"]));
        assert_eq!(json["instructions"][0]["args"]["image"], "centos");
        assert_eq!(json["instructions"][0]["keyword"], "FROM");
    }
}
