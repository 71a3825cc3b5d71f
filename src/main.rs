#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod content_loader;
mod desktop_bridge_commands;
mod fault_handlers;
mod host_switches;
mod host_window;
mod integration_gateway;
mod logging;
mod main_window;
mod origin_policy;
mod production_shortcuts;
mod shell_config;
mod shell_context;
#[cfg(feature = "steam")]
mod steam_session;
mod window_lifecycle;
mod window_state_store;

pub(crate) use app_constants::*;
pub(crate) use app_types::{
    command_from_channel, CommandReply, PersistedWindowState, ShellCommand,
    ShellMode, WindowBounds,
};
pub(crate) use logging::{append_desktop_log, append_shutdown_log, append_startup_log};
pub(crate) use shell_config::ShellConfig;

fn main() {
    app_runtime::run();
}
