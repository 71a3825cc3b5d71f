use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use url::Url;

use crate::{origin_policy, shell_config::RetryPolicy, ShellConfig, ShellMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ContentSource {
    Packaged(Url),
    DevServer(Url),
}

impl ContentSource {
    pub(crate) fn for_config(config: &ShellConfig) -> Result<Self, String> {
        match config.mode {
            ShellMode::Development => Ok(Self::DevServer(config.dev_server_url.clone())),
            ShellMode::Production => origin_policy::packaged_entry_url().map(Self::Packaged),
        }
    }

    pub(crate) fn url(&self) -> &Url {
        match self {
            Self::Packaged(url) | Self::DevServer(url) => url,
        }
    }
}

pub(crate) fn is_endpoint_reachable(url: &Url, timeout: Duration) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let port = url.port_or_known_default().unwrap_or(80);
    let timeout = timeout.max(Duration::from_millis(50));

    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect::<Vec<_>>(),
        Err(_) => return false,
    };
    addrs
        .iter()
        .any(|address| TcpStream::connect_timeout(address, timeout).is_ok())
}

/// Runs `attempt` until it succeeds or the policy is exhausted. Returns the
/// attempt number that succeeded.
pub(crate) fn load_with_retry<A, S, F>(
    policy: RetryPolicy,
    mut attempt: A,
    sleep: S,
    log: F,
) -> Result<u32, String>
where
    A: FnMut(u32) -> Result<(), String>,
    S: Fn(Duration),
    F: Fn(&str),
{
    if !policy.initial_delay.is_zero() {
        sleep(policy.initial_delay);
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();
    for attempt_number in 1..=max_attempts {
        match attempt(attempt_number) {
            Ok(()) => return Ok(attempt_number),
            Err(error) => {
                log(&format!(
                    "content load attempt {attempt_number}/{max_attempts} failed: {error}"
                ));
                last_error = error;
            }
        }

        if attempt_number < max_attempts {
            log(&format!(
                "retrying content load in {}ms",
                policy.backoff.as_millis()
            ));
            sleep(policy.backoff);
        }
    }

    Err(format!(
        "content failed to load after {max_attempts} attempt(s): {last_error}"
    ))
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, net::TcpListener, time::Duration};

    use super::*;

    fn bind_ephemeral_listener() -> Option<(TcpListener, Url)> {
        let listener = TcpListener::bind("127.0.0.1:0").ok()?;
        let port = listener.local_addr().ok()?.port();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).ok()?;
        Some((listener, url))
    }

    fn dev_policy() -> RetryPolicy {
        RetryPolicy::for_mode(ShellMode::Development)
    }

    #[test]
    fn retries_once_after_backoff_then_succeeds() {
        let sleeps = RefCell::new(Vec::new());
        let mut calls = 0;
        let result = load_with_retry(
            dev_policy(),
            |_| {
                calls += 1;
                if calls == 1 {
                    Err("connection refused".to_string())
                } else {
                    Ok(())
                }
            },
            |duration| sleeps.borrow_mut().push(duration),
            |_| {},
        );

        assert_eq!(result, Ok(2));
        assert_eq!(
            *sleeps.borrow(),
            vec![Duration::from_secs(2), Duration::from_secs(5)]
        );
    }

    #[test]
    fn gives_up_after_bounded_attempts() {
        let mut calls = 0;
        let result = load_with_retry(
            dev_policy(),
            |_| {
                calls += 1;
                Err("connection refused".to_string())
            },
            |_| {},
            |_| {},
        );

        assert_eq!(calls, 2);
        let error = result.expect_err("load should fail");
        assert!(error.contains("after 2 attempt(s)"));
        assert!(error.contains("connection refused"));
    }

    #[test]
    fn production_policy_makes_a_single_attempt_without_sleeping() {
        let mut calls = 0;
        let result = load_with_retry(
            RetryPolicy::for_mode(ShellMode::Production),
            |_| {
                calls += 1;
                Err("missing index.html".to_string())
            },
            |_| panic!("production loads never sleep"),
            |_| {},
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn reachability_probe_detects_listening_endpoint() {
        let (listener, url) = bind_ephemeral_listener().expect("bind listener");
        assert!(is_endpoint_reachable(&url, Duration::from_millis(500)));
        drop(listener);
    }

    #[test]
    fn reachability_probe_rejects_url_without_host() {
        let url = Url::parse("about:blank").expect("valid url");
        assert!(!is_endpoint_reachable(&url, Duration::from_millis(50)));
    }

    #[test]
    fn content_source_follows_mode() {
        let mut config =
            ShellConfig::from_lookup(true, None, |_| None).expect("config should build");
        assert_eq!(
            ContentSource::for_config(&config).expect("source"),
            ContentSource::DevServer(config.dev_server_url.clone())
        );

        config.mode = ShellMode::Production;
        let source = ContentSource::for_config(&config).expect("source");
        assert!(matches!(source, ContentSource::Packaged(_)));
        assert!(source.url().path().ends_with("index.html"));
    }
}
