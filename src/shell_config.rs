use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use url::Url;

use crate::{
    ShellMode, APP_IDENTIFIER_FILE, AUTO_RELOAD_ON_CRASH_ENV, DEV_CONTENT_MAX_ATTEMPTS,
    DEV_CONTENT_RETRY_BACKOFF, DEV_CONTENT_SETTLE_DELAY, DEV_SERVER_URL, SHELL_MODE_DEV_VALUE,
    SHELL_MODE_ENV,
};

/// Bounded retry schedule for loading window content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_attempts: u32,
    pub(crate) initial_delay: Duration,
    pub(crate) backoff: Duration,
}

impl RetryPolicy {
    pub(crate) fn for_mode(mode: ShellMode) -> Self {
        match mode {
            ShellMode::Development => Self {
                max_attempts: DEV_CONTENT_MAX_ATTEMPTS,
                initial_delay: DEV_CONTENT_SETTLE_DELAY,
                backoff: DEV_CONTENT_RETRY_BACKOFF,
            },
            ShellMode::Production => Self {
                max_attempts: 1,
                initial_delay: Duration::ZERO,
                backoff: Duration::ZERO,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ShellConfig {
    pub(crate) mode: ShellMode,
    pub(crate) auto_reload_on_crash: bool,
    pub(crate) app_identifier_path: Option<PathBuf>,
    pub(crate) dev_server_url: Url,
    pub(crate) content_retry: RetryPolicy,
}

impl ShellConfig {
    pub(crate) fn from_env(is_dev_build: bool) -> Result<Self, String> {
        Self::from_lookup(is_dev_build, default_app_identifier_path(), |key| {
            env::var(key).ok()
        })
    }

    pub(crate) fn from_lookup<F>(
        is_dev_build: bool,
        app_identifier_path: Option<PathBuf>,
        lookup: F,
    ) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = detect_shell_mode(is_dev_build, lookup(SHELL_MODE_ENV).as_deref());
        let auto_reload_on_crash = lookup(AUTO_RELOAD_ON_CRASH_ENV)
            .as_deref()
            .map(parse_env_flag)
            .unwrap_or(false);
        let dev_server_url = Url::parse(DEV_SERVER_URL)
            .map_err(|error| format!("Invalid dev server URL {DEV_SERVER_URL}: {error}"))?;

        Ok(Self {
            mode,
            auto_reload_on_crash,
            app_identifier_path,
            dev_server_url,
            content_retry: RetryPolicy::for_mode(mode),
        })
    }
}

pub(crate) fn detect_shell_mode(is_dev_build: bool, shell_env: Option<&str>) -> ShellMode {
    let env_requests_dev = shell_env
        .map(|value| value.trim().eq_ignore_ascii_case(SHELL_MODE_DEV_VALUE))
        .unwrap_or(false);
    if is_dev_build || env_requests_dev {
        ShellMode::Development
    } else {
        ShellMode::Production
    }
}

pub(crate) fn parse_env_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn default_app_identifier_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    exe.parent().map(|dir| dir.join(APP_IDENTIFIER_FILE))
}

/// Reads the platform integration identifier. Absence is not an error.
pub(crate) fn read_app_identifier<F>(path: Option<&Path>, log: F) -> Option<String>
where
    F: Fn(&str),
{
    let Some(path) = path else {
        log("app identifier path is unavailable; platform integration disabled");
        return None;
    };

    match fs::read_to_string(path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                log(&format!("app identifier file {} is empty", path.display()));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(error) => {
            log(&format!(
                "could not read app identifier file {}: {}",
                path.display(),
                error
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, fs};

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn detect_shell_mode_prefers_dev_build_or_env_flag() {
        assert_eq!(detect_shell_mode(true, None), ShellMode::Development);
        assert_eq!(detect_shell_mode(false, Some("dev")), ShellMode::Development);
        assert_eq!(detect_shell_mode(false, Some(" DEV ")), ShellMode::Development);
        assert_eq!(detect_shell_mode(false, Some("production")), ShellMode::Production);
        assert_eq!(detect_shell_mode(false, None), ShellMode::Production);
    }

    #[test]
    fn parse_env_flag_accepts_common_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", "on"] {
            assert!(parse_env_flag(value), "{value} should be truthy");
        }
        for value in ["", "0", "false", "off", "nope"] {
            assert!(!parse_env_flag(value), "{value} should be falsy");
        }
    }

    #[test]
    fn from_lookup_builds_typed_config() {
        let config = ShellConfig::from_lookup(
            false,
            None,
            lookup_from(&[(AUTO_RELOAD_ON_CRASH_ENV, "1")]),
        )
        .expect("config should build");
        assert_eq!(config.mode, ShellMode::Production);
        assert!(config.auto_reload_on_crash);
        assert_eq!(config.content_retry.max_attempts, 1);
        assert_eq!(config.dev_server_url.port_or_known_default(), Some(3000));
    }

    #[test]
    fn development_retry_policy_retries_once_after_backoff() {
        let policy = RetryPolicy::for_mode(ShellMode::Development);
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.backoff, Duration::from_secs(5));
    }

    #[test]
    fn read_app_identifier_trims_file_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(APP_IDENTIFIER_FILE);
        fs::write(&path, " 480\n").expect("write identifier");

        let identifier = read_app_identifier(Some(&path), |_| {});
        assert_eq!(identifier.as_deref(), Some("480"));
    }

    #[test]
    fn read_app_identifier_logs_and_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(APP_IDENTIFIER_FILE);
        let lines = RefCell::new(Vec::new());

        let identifier = read_app_identifier(Some(&path), |line| {
            lines.borrow_mut().push(line.to_string())
        });
        assert!(identifier.is_none());
        assert_eq!(lines.borrow().len(), 1);
    }
}
