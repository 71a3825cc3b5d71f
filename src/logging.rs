use log::LevelFilter;
use tauri::{plugin::TauriPlugin, Runtime};
use tauri_plugin_log::{RotationStrategy, Target, TargetKind};

use crate::{ShellMode, DESKTOP_LOG_FILE};

const MAX_LOG_FILE_BYTES: u128 = 5 * 1024 * 1024;

pub(crate) const STARTUP_LOG_TARGET: &str = "shell::startup";
pub(crate) const DESKTOP_LOG_TARGET: &str = "shell::desktop";
pub(crate) const SHUTDOWN_LOG_TARGET: &str = "shell::shutdown";

pub(crate) fn level_for_mode(mode: ShellMode) -> LevelFilter {
    if mode.is_development() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub(crate) fn build_log_plugin<R: Runtime>(mode: ShellMode) -> TauriPlugin<R> {
    tauri_plugin_log::Builder::new()
        .level(level_for_mode(mode))
        .clear_targets()
        .target(Target::new(TargetKind::Stdout))
        .target(Target::new(TargetKind::LogDir {
            file_name: Some(DESKTOP_LOG_FILE.to_string()),
        }))
        .rotation_strategy(RotationStrategy::KeepOne)
        .max_file_size(MAX_LOG_FILE_BYTES)
        .build()
}

pub(crate) fn append_startup_log(message: &str) {
    log::info!(target: STARTUP_LOG_TARGET, "{message}");
}

pub(crate) fn append_desktop_log(message: &str) {
    log::info!(target: DESKTOP_LOG_TARGET, "{message}");
}

pub(crate) fn append_shutdown_log(message: &str) {
    log::info!(target: SHUTDOWN_LOG_TARGET, "{message}");
}
