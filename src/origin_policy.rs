use url::Url;

use crate::{ShellMode, BLANK_PAGE_URL, PACKAGED_ENTRY_DOCUMENT};

/// Webview hardening applied per mode. Production always runs hardened.
///
/// Content isolation is not a toggle here: page scripts run in the webview
/// process with no native APIs of their own and reach the shell only through
/// IPC commands gated by the capability ACL, in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SecurityProfile {
    pub(crate) allow_remote_content: bool,
    pub(crate) allow_insecure_content: bool,
    pub(crate) devtools: bool,
}

impl SecurityProfile {
    pub(crate) fn for_mode(mode: ShellMode) -> Self {
        match mode {
            ShellMode::Production => Self {
                allow_remote_content: false,
                allow_insecure_content: false,
                devtools: false,
            },
            // The dev endpoint is plain http on localhost; nothing else relaxes.
            ShellMode::Development => Self {
                allow_remote_content: false,
                allow_insecure_content: true,
                devtools: true,
            },
        }
    }
}

#[cfg(any(windows, target_os = "android"))]
const PACKAGED_ORIGIN: &str = "http://tauri.localhost/";
#[cfg(not(any(windows, target_os = "android")))]
const PACKAGED_ORIGIN: &str = "tauri://localhost/";

pub(crate) fn packaged_origin() -> Result<Url, String> {
    Url::parse(PACKAGED_ORIGIN)
        .map_err(|error| format!("Invalid packaged origin {PACKAGED_ORIGIN}: {error}"))
}

pub(crate) fn packaged_entry_url() -> Result<Url, String> {
    packaged_origin()?
        .join(PACKAGED_ENTRY_DOCUMENT)
        .map_err(|error| format!("Invalid packaged entry document: {error}"))
}

fn same_origin(left: &Url, right: &Url) -> bool {
    left.scheme() == right.scheme()
        && left.host_str() == right.host_str()
        && left.port_or_known_default() == right.port_or_known_default()
}

/// Decides whether the webview may navigate to `target`. External links are
/// expected to go through the `link` command instead.
pub(crate) fn is_navigation_allowed(
    profile: SecurityProfile,
    mode: ShellMode,
    dev_server_url: &Url,
    target: &Url,
) -> bool {
    if target.as_str() == BLANK_PAGE_URL {
        return true;
    }

    if let Ok(origin) = packaged_origin() {
        if same_origin(&origin, target) {
            return true;
        }
    }

    if mode.is_development() && same_origin(dev_server_url, target) {
        return profile.allow_insecure_content || target.scheme() == "https";
    }

    if !profile.allow_remote_content {
        return false;
    }
    target.scheme() == "https" || (profile.allow_insecure_content && target.scheme() == "http")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[test]
    fn production_profile_is_hardened() {
        let profile = SecurityProfile::for_mode(ShellMode::Production);
        assert!(!profile.allow_remote_content);
        assert!(!profile.allow_insecure_content);
        assert!(!profile.devtools);
    }

    #[test]
    fn development_profile_only_relaxes_the_local_endpoint() {
        let profile = SecurityProfile::for_mode(ShellMode::Development);
        assert!(!profile.allow_remote_content);
        assert!(profile.allow_insecure_content);
        assert!(profile.devtools);
    }

    #[test]
    fn production_allows_only_packaged_content() {
        let mode = ShellMode::Production;
        let profile = SecurityProfile::for_mode(mode);
        let dev = url("http://localhost:3000/");

        let entry = packaged_entry_url().expect("entry url");
        assert!(is_navigation_allowed(profile, mode, &dev, &entry));
        assert!(is_navigation_allowed(profile, mode, &dev, &url(BLANK_PAGE_URL)));
        assert!(!is_navigation_allowed(profile, mode, &dev, &dev));
        assert!(!is_navigation_allowed(
            profile,
            mode,
            &dev,
            &url("https://example.com/")
        ));
    }

    #[test]
    fn development_allows_dev_endpoint_but_not_remote_sites() {
        let mode = ShellMode::Development;
        let profile = SecurityProfile::for_mode(mode);
        let dev = url("http://localhost:3000/");

        assert!(is_navigation_allowed(
            profile,
            mode,
            &dev,
            &url("http://localhost:3000/level/2")
        ));
        assert!(!is_navigation_allowed(
            profile,
            mode,
            &dev,
            &url("http://localhost:4000/")
        ));
        assert!(!is_navigation_allowed(
            profile,
            mode,
            &dev,
            &url("https://example.com/")
        ));
    }

    #[test]
    fn packaged_entry_url_points_at_index_document() {
        let entry = packaged_entry_url().expect("entry url");
        assert!(entry.path().ends_with(PACKAGED_ENTRY_DOCUMENT));
    }
}
