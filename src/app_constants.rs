use std::time::Duration;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const MAIN_WINDOW_TITLE: &str = "Arcade Shell";

pub const DEV_SERVER_URL: &str = "http://localhost:3000/";
pub const PACKAGED_ENTRY_DOCUMENT: &str = "index.html";
pub const BLANK_PAGE_URL: &str = "about:blank";

pub const SHELL_MODE_ENV: &str = "NODE_ENV";
pub const SHELL_MODE_DEV_VALUE: &str = "dev";
pub const AUTO_RELOAD_ON_CRASH_ENV: &str = "AUTO_RELOAD_ON_CRASH";

pub const APP_IDENTIFIER_FILE: &str = "steam_appid.txt";
pub const DESKTOP_STATE_FILE: &str = "desktop_state.json";
pub const DESKTOP_LOG_FILE: &str = "arcade-shell";

pub const WINDOW_BOUNDS_KEY: &str = "windowState.bounds";
pub const WINDOW_MAXIMIZED_KEY: &str = "windowState.isMaximized";

pub const PRODUCTION_WINDOW_WIDTH: f64 = 1250.0;
pub const PRODUCTION_WINDOW_HEIGHT: f64 = 700.0;
pub const PRODUCTION_MIN_WIDTH: f64 = 800.0;
pub const PRODUCTION_MIN_HEIGHT: f64 = 600.0;
pub const DEV_FALLBACK_WIDTH: f64 = 1280.0;
pub const DEV_FALLBACK_HEIGHT: f64 = 800.0;

pub const DEV_CONTENT_SETTLE_DELAY: Duration = Duration::from_secs(2);
pub const DEV_CONTENT_RETRY_BACKOFF: Duration = Duration::from_secs(5);
pub const DEV_CONTENT_MAX_ATTEMPTS: u32 = 2;
pub const DEV_SERVER_PROBE_TIMEOUT: Duration = Duration::from_millis(800);

pub const DISABLED_PRODUCTION_SHORTCUTS: [&str; 3] =
    ["CommandOrControl+R", "F5", "Control+Shift+I"];

pub const HOST_SWITCHES: [&str; 8] = [
    "in-process-gpu",
    "disable-direct-composition",
    "disable-renderer-backgrounding",
    "disable-background-timer-throttling",
    "disable-accelerated-2d-canvas",
    "disable-accelerated-mjpeg-decode",
    "disable-accelerated-video-decode",
    "disable-accelerated-video-encode",
];
pub const WEBVIEW2_BROWSER_ARGS_ENV: &str = "WEBVIEW2_ADDITIONAL_BROWSER_ARGUMENTS";
