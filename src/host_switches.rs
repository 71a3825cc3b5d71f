use std::env;

use crate::{HOST_SWITCHES, WEBVIEW2_BROWSER_ARGS_ENV};

pub(crate) fn browser_arguments(switches: &[&str]) -> String {
    switches
        .iter()
        .map(|switch| format!("--{}", switch.trim_start_matches('-')))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merges the shell's switches with any arguments the operator already set.
pub(crate) fn merge_browser_arguments(existing: Option<&str>, switches: &[&str]) -> String {
    let ours = browser_arguments(switches);
    match existing.map(str::trim).filter(|value| !value.is_empty()) {
        Some(existing) => format!("{existing} {ours}"),
        None => ours,
    }
}

/// Must run before the host runtime starts; the webview reads these once.
pub(crate) fn apply_host_switches<F>(log: F)
where
    F: Fn(&str),
{
    let existing = env::var(WEBVIEW2_BROWSER_ARGS_ENV).ok();
    let merged = merge_browser_arguments(existing.as_deref(), &HOST_SWITCHES);
    env::set_var(WEBVIEW2_BROWSER_ARGS_ENV, &merged);
    log(&format!("applied host switches: {merged}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_arguments_prefixes_each_switch() {
        assert_eq!(
            browser_arguments(&["in-process-gpu", "--disable-direct-composition"]),
            "--in-process-gpu --disable-direct-composition"
        );
    }

    #[test]
    fn merge_browser_arguments_keeps_operator_arguments_first() {
        assert_eq!(
            merge_browser_arguments(Some("--lang=en"), &["in-process-gpu"]),
            "--lang=en --in-process-gpu"
        );
        assert_eq!(
            merge_browser_arguments(Some("  "), &["in-process-gpu"]),
            "--in-process-gpu"
        );
    }
}
