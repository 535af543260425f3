//! HEALTHCHECK.

use super::scanner::{Failure, Scanner};
use crate::args::HealthcheckArgs;

const DEFAULT_INTERVAL: &str = "30s";
const DEFAULT_TIMEOUT: &str = "30s";
const DEFAULT_START_PERIOD: &str = "0s";
const DEFAULT_RETRIES: &str = "3";

pub(super) fn parse(s: &mut Scanner<'_>) -> Result<HealthcheckArgs, Failure> {
    let mut args = HealthcheckArgs::default();
    while option(s, &mut args) {}

    args.interval.get_or_insert_with(|| DEFAULT_INTERVAL.to_string());
    args.timeout.get_or_insert_with(|| DEFAULT_TIMEOUT.to_string());
    args.start_period
        .get_or_insert_with(|| DEFAULT_START_PERIOD.to_string());
    args.retries.get_or_insert_with(|| DEFAULT_RETRIES.to_string());

    s.skip_ws();
    let start = s.pos();
    if s.eat_str("NONE") {
        s.end()?;
        return Ok(args);
    }
    if s.eat_str("CMD") && s.peek().is_some_and(char::is_whitespace) {
        let command = s.rest().trim();
        if !command.is_empty() {
            args.cmd = Some(command.to_string());
            return Ok(args);
        }
    }
    Err(Failure::expected(start, "\"NONE\" or \"CMD\""))
}

/// Consume one `--<name>=<value>` option that has not been seen yet.
fn option(s: &mut Scanner<'_>, args: &mut HealthcheckArgs) -> bool {
    let save = s.pos();
    s.skip_ws();
    let slot = if s.eat_str("--interval=") {
        &mut args.interval
    } else if s.eat_str("--timeout=") {
        &mut args.timeout
    } else if s.eat_str("--start-period=") {
        &mut args.start_period
    } else if s.eat_str("--retries=") {
        &mut args.retries
    } else {
        s.reset(save);
        return false;
    };
    if slot.is_some() {
        s.reset(save);
        return false;
    }
    s.skip_ws();
    match s.word("", false) {
        Ok(value) => {
            *slot = Some(value);
            true
        }
        Err(_) => {
            s.reset(save);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthcheck(input: &str) -> Result<HealthcheckArgs, String> {
        let mut s = Scanner::new(input);
        parse(&mut s).map_err(|f| f.message)
    }

    #[test]
    fn test_defaults_with_cmd() {
        let args = healthcheck("CMD curl -f http://localhost/ || exit 1").unwrap();
        assert_eq!(args.interval.as_deref(), Some("30s"));
        assert_eq!(args.timeout.as_deref(), Some("30s"));
        assert_eq!(args.start_period.as_deref(), Some("0s"));
        assert_eq!(args.retries.as_deref(), Some("3"));
        assert_eq!(args.cmd.as_deref(), Some("curl -f http://localhost/ || exit 1"));
    }

    #[test]
    fn test_options_in_any_order() {
        let args =
            healthcheck("--retries=5 --interval=5m --start-period=10s --timeout=3s CMD true")
                .unwrap();
        assert_eq!(args.interval.as_deref(), Some("5m"));
        assert_eq!(args.timeout.as_deref(), Some("3s"));
        assert_eq!(args.start_period.as_deref(), Some("10s"));
        assert_eq!(args.retries.as_deref(), Some("5"));
        assert_eq!(args.cmd.as_deref(), Some("true"));
    }

    #[test]
    fn test_none() {
        let args = healthcheck("NONE").unwrap();
        assert_eq!(args.cmd, None);
        assert_eq!(args.retries.as_deref(), Some("3"));
    }

    #[test]
    fn test_duplicate_option_is_rejected() {
        assert_eq!(
            healthcheck("--retries=5 --retries=6 CMD true").unwrap_err(),
            r#"Expected "NONE" or "CMD""#
        );
    }

    #[test]
    fn test_invalid_forms() {
        assert!(healthcheck("").is_err());
        assert!(healthcheck("CMD").is_err());
        assert!(healthcheck("NONE CMD true").is_err());
        assert!(healthcheck("curl localhost").is_err());
    }
}
