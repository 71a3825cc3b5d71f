use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::{
    content_loader::{self, ContentSource},
    host_window::HostWindow,
    origin_policy::{self, SecurityProfile},
    shell_config::RetryPolicy,
    window_lifecycle::{LifecycleEvent, WindowLifecycle, WindowLifecycleState},
    window_state_store::{persist_window_geometry, WindowStateStore},
    PersistedWindowState, ShellConfig, ShellMode, WindowBounds, BLANK_PAGE_URL,
    DEV_FALLBACK_HEIGHT, DEV_FALLBACK_WIDTH, MAIN_WINDOW_LABEL, MAIN_WINDOW_TITLE,
    PRODUCTION_MIN_HEIGHT, PRODUCTION_MIN_WIDTH, PRODUCTION_WINDOW_HEIGHT,
    PRODUCTION_WINDOW_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MainWindowConfig {
    pub(crate) position: Option<(f64, f64)>,
    pub(crate) size: (f64, f64),
    pub(crate) min_size: Option<(f64, f64)>,
    pub(crate) center: bool,
    pub(crate) visible: bool,
    pub(crate) fullscreen: bool,
}

/// Development gets a viewport covering the monitor; production gets fixed
/// defaults seeded by the persisted rectangle.
pub(crate) fn window_config_for_mode(
    mode: ShellMode,
    saved: &PersistedWindowState,
    monitor: Option<WindowBounds>,
) -> MainWindowConfig {
    match mode {
        ShellMode::Development => {
            let viewport = monitor.filter(WindowBounds::is_usable);
            MainWindowConfig {
                position: Some(viewport.map(|m| (m.x, m.y)).unwrap_or((0.0, 0.0))),
                size: viewport
                    .map(|m| (m.width, m.height))
                    .unwrap_or((DEV_FALLBACK_WIDTH, DEV_FALLBACK_HEIGHT)),
                min_size: None,
                center: false,
                visible: true,
                fullscreen: false,
            }
        }
        ShellMode::Production => {
            let (position, size, center) = match saved.bounds {
                Some(bounds) => (
                    Some((bounds.x, bounds.y)),
                    (
                        bounds.width.max(PRODUCTION_MIN_WIDTH),
                        bounds.height.max(PRODUCTION_MIN_HEIGHT),
                    ),
                    false,
                ),
                None => (
                    None,
                    (PRODUCTION_WINDOW_WIDTH, PRODUCTION_WINDOW_HEIGHT),
                    true,
                ),
            };
            MainWindowConfig {
                position,
                size,
                min_size: Some((PRODUCTION_MIN_WIDTH, PRODUCTION_MIN_HEIGHT)),
                center,
                visible: false,
                fullscreen: true,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CrashRecoveryDecision {
    ReloadInPlace,
    LeaveInert,
}

pub(crate) fn decide_crash_recovery(auto_reload_on_crash: bool) -> CrashRecoveryDecision {
    if auto_reload_on_crash {
        CrashRecoveryDecision::ReloadInPlace
    } else {
        CrashRecoveryDecision::LeaveInert
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FullscreenCheck {
    Unchanged,
    Engaged,
    Reasserted,
}

/// Owns the single shell window: lifecycle, geometry persistence, the
/// always-fullscreen rule, and crash recovery.
pub(crate) struct WindowSupervisor<W: HostWindow> {
    window: W,
    mode: ShellMode,
    auto_reload_on_crash: bool,
    restore_maximized: bool,
    store: Arc<WindowStateStore>,
    lifecycle: Mutex<WindowLifecycle>,
    fullscreen_engaged: AtomicBool,
    first_load_done: AtomicBool,
}

impl<W: HostWindow> WindowSupervisor<W> {
    pub(crate) fn new(
        window: W,
        config: &ShellConfig,
        store: Arc<WindowStateStore>,
        saved: &PersistedWindowState,
        starts_fullscreen: bool,
    ) -> Self {
        Self {
            window,
            mode: config.mode,
            auto_reload_on_crash: config.auto_reload_on_crash,
            restore_maximized: saved.is_maximized,
            store,
            lifecycle: Mutex::new(WindowLifecycle::default()),
            fullscreen_engaged: AtomicBool::new(starts_fullscreen),
            first_load_done: AtomicBool::new(false),
        }
    }

    pub(crate) fn window(&self) -> &W {
        &self.window
    }

    pub(crate) fn lifecycle_state(&self) -> WindowLifecycleState {
        self.lifecycle
            .lock()
            .map(|guard| guard.state())
            .unwrap_or(WindowLifecycleState::Closed)
    }

    fn transition(&self, event: LifecycleEvent) -> Result<WindowLifecycleState, String> {
        let mut guard = self
            .lifecycle
            .lock()
            .map_err(|_| "window lifecycle lock is poisoned".to_string())?;
        let previous = guard.state();
        let next = guard.apply(event)?;
        if previous != next {
            log::debug!("window lifecycle {previous:?} -> {next:?}");
        }
        Ok(next)
    }

    /// Navigates to the content source, retrying per `retry`. Exhaustion is
    /// returned to the caller, which treats it as fatal.
    pub(crate) fn load<P, S>(
        &self,
        source: &ContentSource,
        retry: RetryPolicy,
        preflight: P,
        sleep: S,
    ) -> Result<(), String>
    where
        P: Fn(&ContentSource) -> Result<(), String>,
        S: Fn(Duration),
    {
        log::info!("loading content from {}", source.url());
        let attempt = content_loader::load_with_retry(
            retry,
            |_| {
                preflight(source)?;
                self.transition(LifecycleEvent::LoadStarted)?;
                self.window.navigate(source.url())
            },
            sleep,
            |line| log::warn!("{line}"),
        )?;
        log::info!("content navigation issued on attempt {attempt}");
        Ok(())
    }

    pub(crate) fn on_page_load_started(&self, url: &Url) {
        if url.as_str() == BLANK_PAGE_URL {
            return;
        }
        log::debug!("started loading content: {url}");
        if let Err(error) = self.transition(LifecycleEvent::LoadStarted) {
            log::debug!("{error}");
        }
    }

    pub(crate) fn on_page_load_finished(&self, url: &Url) {
        if url.as_str() == BLANK_PAGE_URL {
            return;
        }
        log::info!("finished loading content: {url}");
        if let Err(error) = self.transition(LifecycleEvent::LoadFinished) {
            log::debug!("{error}");
            return;
        }

        if self.first_load_done.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.mode {
            ShellMode::Development => self.window.open_devtools(),
            ShellMode::Production => {
                if let Err(error) = self.window.show() {
                    log::error!("{error}");
                }
                if self.restore_maximized {
                    if let Err(error) = self.window.maximize() {
                        log::warn!("{error}");
                    }
                }
            }
        }
    }

    /// Runs for every resize, move, and close. Bounds are skipped while
    /// maximized; the maximized flag is always written.
    pub(crate) fn on_geometry_changed(&self) {
        let is_maximized = match self.window.is_maximized() {
            Ok(is_maximized) => is_maximized,
            Err(error) => {
                log::warn!("skipping window state persistence: {error}");
                return;
            }
        };
        let bounds = if is_maximized {
            None
        } else {
            self.window
                .bounds()
                .map_err(|error| log::warn!("skipping window bounds persistence: {error}"))
                .ok()
        };
        persist_window_geometry(&self.store, bounds, is_maximized);
    }

    /// Compares the host's fullscreen flag against what the shell expects
    /// and reverses any exit synchronously.
    pub(crate) fn observe_fullscreen(&self) -> FullscreenCheck {
        let is_fullscreen = match self.window.is_fullscreen() {
            Ok(is_fullscreen) => is_fullscreen,
            Err(error) => {
                log::warn!("{error}");
                return FullscreenCheck::Unchanged;
            }
        };

        if is_fullscreen {
            if self.fullscreen_engaged.swap(true, Ordering::AcqRel) {
                FullscreenCheck::Unchanged
            } else {
                FullscreenCheck::Engaged
            }
        } else if self.fullscreen_engaged.load(Ordering::Acquire) {
            self.on_left_fullscreen();
            FullscreenCheck::Reasserted
        } else {
            FullscreenCheck::Unchanged
        }
    }

    pub(crate) fn on_left_fullscreen(&self) {
        log::info!("window left fullscreen; reasserting");
        if let Err(error) = self.window.set_fullscreen(true) {
            log::error!("{error}");
        }
    }

    pub(crate) fn toggle_fullscreen(&self) -> Result<bool, String> {
        let target = !self.window.is_fullscreen()?;
        self.window.set_fullscreen(target)?;
        if target {
            self.fullscreen_engaged.store(true, Ordering::Release);
        }
        Ok(target)
    }

    pub(crate) fn on_render_process_gone(&self, details: &str) -> CrashRecoveryDecision {
        log::error!("content process gone: {details}");
        if let Err(error) = self.transition(LifecycleEvent::ContentProcessGone) {
            log::warn!("{error}");
            return CrashRecoveryDecision::LeaveInert;
        }

        let decision = decide_crash_recovery(self.auto_reload_on_crash);
        match decision {
            CrashRecoveryDecision::ReloadInPlace => {
                match self.transition(LifecycleEvent::ReloadRequested) {
                    Ok(_) => {
                        log::info!("reloading content in place after crash");
                        if let Err(error) = self.window.reload() {
                            log::error!("{error}");
                        }
                    }
                    Err(error) => log::warn!("{error}"),
                }
            }
            CrashRecoveryDecision::LeaveInert => {
                log::warn!("crash auto-reload is disabled; window stays inert until closed");
            }
        }
        decision
    }

    /// Returns `true` only for the first close; the caller ends the process.
    pub(crate) fn on_window_closed(&self) -> bool {
        match self.transition(LifecycleEvent::WindowClosed) {
            Ok(_) => true,
            Err(error) => {
                log::debug!("{error}");
                false
            }
        }
    }
}

fn primary_monitor_bounds(app: &AppHandle) -> Option<WindowBounds> {
    let monitor = app.primary_monitor().ok().flatten()?;
    let scale = monitor.scale_factor();
    let position = monitor.position().to_logical::<f64>(scale);
    let size = monitor.size().to_logical::<f64>(scale);
    Some(WindowBounds {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
    })
}

/// Builds the shell window on a blank page in state `Created`; content is
/// loaded separately so the load can be retried against the same window.
pub(crate) fn build_main_window(
    app: &AppHandle,
    config: &ShellConfig,
    saved: &PersistedWindowState,
) -> Result<(WebviewWindow, MainWindowConfig), String> {
    let mode = config.mode;
    let profile = SecurityProfile::for_mode(mode);
    let window_config = window_config_for_mode(mode, saved, primary_monitor_bounds(app));
    let blank = Url::parse(BLANK_PAGE_URL)
        .map_err(|error| format!("Invalid blank page URL: {error}"))?;
    let dev_server_url = config.dev_server_url.clone();

    let mut builder = WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::External(blank))
        .title(MAIN_WINDOW_TITLE)
        .inner_size(window_config.size.0, window_config.size.1)
        .visible(window_config.visible)
        .fullscreen(window_config.fullscreen)
        .devtools(profile.devtools)
        .on_navigation(move |target| {
            let allowed =
                origin_policy::is_navigation_allowed(profile, mode, &dev_server_url, target);
            if !allowed {
                log::warn!("blocked navigation to {target}");
            }
            allowed
        });
    if let Some((x, y)) = window_config.position {
        builder = builder.position(x, y);
    }
    if let Some((width, height)) = window_config.min_size {
        builder = builder.min_inner_size(width, height);
    }
    if window_config.center {
        builder = builder.center();
    }

    let window = builder
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))?;
    if let Err(error) = window.remove_menu() {
        log::warn!("failed to remove window menu: {error}");
    }
    Ok((window, window_config))
}

/// Verifies the content source before navigating: the dev endpoint must be
/// reachable, the packaged entry document must be embedded.
pub(crate) fn content_preflight(
    app: &AppHandle,
    source: &ContentSource,
    probe_timeout: Duration,
) -> Result<(), String> {
    match source {
        ContentSource::DevServer(url) => {
            if content_loader::is_endpoint_reachable(url, probe_timeout) {
                Ok(())
            } else {
                Err(format!(
                    "development server {url} is not reachable; ensure it is running"
                ))
            }
        }
        ContentSource::Packaged(url) => {
            let asset = url.path().trim_start_matches('/');
            if app.asset_resolver().get(asset.to_string()).is_some() {
                Ok(())
            } else {
                Err(format!("packaged entry document {asset} is missing"))
            }
        }
    }
}

#[cfg(target_os = "linux")]
pub(crate) fn watch_content_process<F>(window: &WebviewWindow, on_gone: F) -> Result<(), String>
where
    F: Fn(String) + Send + 'static,
{
    window
        .with_webview(move |platform| {
            use webkit2gtk::WebViewExt;
            platform
                .inner()
                .connect_web_process_terminated(move |_, reason| on_gone(format!("{reason:?}")));
        })
        .map_err(|error| format!("Failed to attach content process observer: {error}"))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn watch_content_process<F>(_window: &WebviewWindow, _on_gone: F) -> Result<(), String>
where
    F: Fn(String) + Send + 'static,
{
    Err("content process crash detection is not available on this platform".to_string())
}
