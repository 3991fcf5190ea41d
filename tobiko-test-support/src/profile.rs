//! Property-test run profile parsing for CI and local overrides.
//!
//! Centralises environment-driven proptest tuning so every suite shares one
//! policy surface instead of reading the environment ad hoc.

use std::env;

/// Environment variable controlling proptest case counts.
pub const TOBIKO_PBT_CASES_ENV_KEY: &str = "TOBIKO_PBT_CASES";
/// Environment variable controlling proptest process forking.
pub const TOBIKO_PBT_FORK_ENV_KEY: &str = "TOBIKO_PBT_FORK";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyRunProfile {
    cases: u32,
    fork: bool,
}

impl PropertyRunProfile {
    /// Load a profile from environment variables with provided defaults.
    ///
    /// Unparseable values fall back to the defaults with a warning rather
    /// than failing the suite.
    ///
    /// # Examples
    /// ```
    /// use tobiko_test_support::profile::PropertyRunProfile;
    ///
    /// let profile = PropertyRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::load_with_lookup(default_cases, default_fork, |key| env::var(key).ok())
    }

    fn load_with_lookup<F>(default_cases: u32, default_fork: bool, lookup: F) -> Self
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let cases = read_env_or_default(
            TOBIKO_PBT_CASES_ENV_KEY,
            default_cases,
            parse_cases,
            &lookup,
        );
        let fork = read_env_or_default(TOBIKO_PBT_FORK_ENV_KEY, default_fork, parse_bool, &lookup);
        Self { cases, fork }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }
}

fn read_env_or_default<T, F, L>(key: &'static str, default: T, parser: F, lookup: &L) -> T
where
    T: Copy,
    F: Fn(&str) -> Result<T, String>,
    L: Fn(&'static str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match parser(&raw) {
            Ok(value) => value,
            Err(reason) => {
                tracing::warn!(env = key, raw = %raw, reason, "ignoring unparseable override");
                default
            }
        },
        None => default,
    }
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err("case count must be positive".to_owned()),
        Err(err) => Err(err.to_string()),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(format!("`{other}` is not a boolean")),
    }
}
