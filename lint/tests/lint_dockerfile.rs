//! Integration test: parse and lint complete Dockerfiles.
//!
//! Covers the path from Dockerfile text (or a file on disk) through the
//! document model to the lint report, including exclusions, the
//! `exit_on_errors` switch and a registry policy loaded from YAML.

use std::io::Write;

use dockermake_core::{DockermakeError, LintConfig, RegistryPolicy};
use dockermake_dockerfile::{Dockerfile, Keyword, StageId};
use dockermake_lint::{lint, DockerfileLint, LintReport};

const MULTI_STAGE: &str = r#"ARG VERSION=7
FROM registry.a.com/acme/golang:1.21 AS build
WORKDIR /src
COPY . /src
RUN go build -o /out/app ./cmd/app

FROM registry.a.com/acme/centos:7
LABEL maintainer="Jane Doe <jane@acme.com>"
ENV APP_HOME=/opt/app \
    PATH=/opt/app/bin:$PATH
COPY --from=build /out/app /opt/app/bin/app
EXPOSE 8080/tcp
USER app:app
HEALTHCHECK --interval=10s CMD curl -f http://localhost:8080/health
ENTRYPOINT ["/opt/app/bin/app"]
CMD ["--port", "8080"]
"#;

const SLOPPY: &str = r#"RUN echo before
FROM centos
MAINTAINER somebody
ADD app.tar.gz /opt/
RUN sudo yum install -y curl && \
    yum clean all
CMD ['app']
EXPOSE 80
EXPOSE 443
"#;

fn lenient() -> LintConfig {
    LintConfig {
        exit_on_errors: false,
        ..LintConfig::default()
    }
}

fn lint_text(content: &str, config: &LintConfig) -> dockermake_core::Result<LintReport> {
    let dockerfile = Dockerfile::parse(content)?;
    lint(&dockerfile, config, &RegistryPolicy::default())
}

// --- Clean Dockerfile ---

#[test]
fn test_multi_stage_dockerfile_is_clean() {
    let report = lint_text(MULTI_STAGE, &LintConfig::default()).unwrap();
    assert_eq!(report, LintReport::default());
}

#[test]
fn test_multi_stage_document_model() {
    let dockerfile = Dockerfile::parse(MULTI_STAGE).unwrap();
    assert_eq!(
        dockerfile.stages(),
        &[StageId::Name("build".to_string()), StageId::Index(1)]
    );
    assert_eq!(dockerfile.last_stage(), StageId::Index(1));

    let env = dockerfile
        .first_instruction_of_type(Keyword::Env, None)
        .unwrap();
    assert_eq!(env.line(), 10);
    assert_eq!(env.value_of("PATH", false), Some("/opt/app/bin:$PATH"));

    let copy = dockerfile
        .instructions_of_type(Keyword::Copy, Some(&StageId::Index(1)))
        .pop()
        .unwrap();
    let args = copy.args().as_copy().unwrap();
    assert_eq!(args.from.as_deref(), Some("build"));
    assert_eq!(args.dest.as_deref(), Some("/opt/app/bin/app"));

    assert_eq!(dockerfile.args_without_default(), Vec::<&str>::new());
    assert!(dockerfile.contains_arg_named("VERSION"));
}

// --- Findings ---

#[test]
fn test_sloppy_dockerfile_findings() {
    let report = lint_text(SLOPPY, &lenient()).unwrap();
    assert!(report.syntax_errors.is_empty());
    assert_eq!(
        report.errors,
        vec![
            "FROM must be the first instruction (only ARG can precede FROM) (rule1)",
            "CMD argument(s) must be enclosed with \" instead of ' (rule12_1, line: 7)",
            "MAINTAINER must be in the form name <name@mail.com> (rule13_1, line: 3)",
            "FROM must point to a username (rule3, line: 2)",
            "FROM must point to a tag (rule5, line: 2)",
            "ADD is prohibited (rule6)",
            "CMD or ENTRYPOINT must be the last instruction if present (rule8)",
            "RUN sudo is prohibited (rule9, line: 6)",
            "EXPOSE must occur at most once in last stage (rule0_2)",
        ]
    );
    assert_eq!(
        report.warnings,
        vec![
            "LABEL maintainer is recommended over MAINTAINER (rule0_1_4)",
            "AND (&&) / OR (||) control operators must be in front of each concerned line for multi-line RUN commands (rule11_0, line: 5)",
        ]
    );
}

#[test]
fn test_sloppy_dockerfile_fails_by_default() {
    let err = lint_text(SLOPPY, &LintConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Linting failed with 9 error(s)");
    let DockermakeError::LintingFailed { warnings, .. } = err else {
        panic!("expected a lint failure");
    };
    assert_eq!(warnings.len(), 2);
}

#[test]
fn test_excluding_every_error_passes() {
    let config = LintConfig {
        exit_on_errors: true,
        exclude: vec![
            "rule1,rule3,rule5".to_string(),
            "rule6, rule8, rule9".to_string(),
            "rule12_1".to_string(),
            "rule13_1".to_string(),
            "rule0_2".to_string(),
        ],
    };
    let report = lint_text(SLOPPY, &config).unwrap();
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn test_syntax_errors_fail_the_run() {
    let content = MULTI_STAGE.replace("EXPOSE 8080/tcp", "EXPOSE http");
    let err = lint_text(&content, &LintConfig::default()).unwrap_err();
    let DockermakeError::LintingFailed { errors, warnings } = err else {
        panic!("expected a lint failure");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with(r#"EXPOSE instruction with argument "http" is invalid:"#));
    assert!(warnings.is_empty());
}

#[test]
fn test_lint_without_from() {
    let report = lint_text("LABEL maintainer=\"a <a@b.com>\"\n", &lenient()).unwrap();
    assert_eq!(
        report.errors,
        vec![
            "FROM must occur at least once (rule0_0)",
            "FROM must be the first instruction (only ARG can precede FROM) (rule1)",
        ]
    );
}

#[test]
fn test_onbuild_instructions_are_linted_by_type() {
    let content = MULTI_STAGE.replace(
        "USER app:app",
        "ONBUILD RUN sudo make\nONBUILD ADD . /app",
    );
    let report = lint_text(&content, &lenient()).unwrap();
    assert!(report.errors.is_empty(), "{:?}", report.errors);
}

// --- Registry policy ---

#[test]
fn test_registry_policy_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "push_only_to_defined_registries: true\nregistries:\n  registry.a.com:\n    repositories: [acme]"
    )
    .unwrap();
    let policy = RegistryPolicy::load(file.path()).unwrap();

    let dockerfile = Dockerfile::parse(MULTI_STAGE).unwrap();
    assert!(lint(&dockerfile, &LintConfig::default(), &policy).is_ok());

    let foreign = MULTI_STAGE.replace(
        "FROM registry.a.com/acme/centos:7",
        "FROM registry.b.com/acme/centos:7",
    );
    let dockerfile = Dockerfile::parse(&foreign).unwrap();
    let report = DockerfileLint::new(&dockerfile, &lenient(), &policy)
        .lint()
        .unwrap();
    assert_eq!(
        report.errors,
        vec![r#"FROM must point to an allowed registry: ["registry.a.com"] (rule2, line: 7)"#]
    );
}

#[test]
fn test_missing_registry_file_disables_policy() {
    let dir = tempfile::tempdir().unwrap();
    let policy = RegistryPolicy::load(&dir.path().join("registries.yaml")).unwrap();
    assert!(!policy.is_enforced());
}

// --- Files ---

#[test]
fn test_lint_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Dockerfile");
    std::fs::write(&path, MULTI_STAGE).unwrap();

    let dockerfile = Dockerfile::from_file(&path).unwrap();
    assert_eq!(dockerfile.path(), Some(path.as_path()));
    let report = lint(&dockerfile, &LintConfig::default(), &RegistryPolicy::default()).unwrap();
    assert!(!report.failed());
}

#[test]
fn test_missing_dockerfile() {
    let dir = tempfile::tempdir().unwrap();
    let err = Dockerfile::from_file(&dir.path().join("Dockerfile")).unwrap_err();
    assert!(matches!(err, DockermakeError::DockerfileNotFound(_)));
}

#[test]
fn test_unknown_instruction_is_fatal() {
    let err = Dockerfile::parse("FROM centos:7\nFOO bar\n").unwrap_err();
    assert_eq!(err.to_string(), "Unknown instruction 'FOO' at line 2");
}
