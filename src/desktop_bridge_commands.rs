use std::process::{Command, Stdio};

use tauri::{AppHandle, Manager};
use url::Url;

use crate::{
    command_from_channel, host_window::HostWindow, shell_context::ShellContext, CommandReply,
    ShellCommand,
};

const OPENABLE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

pub(crate) fn parse_openable_url(raw_url: &str) -> Result<Url, String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err("Missing external URL.".to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|error| format!("Invalid URL '{trimmed}': {error}"))?;
    if OPENABLE_SCHEMES.contains(&parsed.scheme()) {
        Ok(parsed)
    } else {
        Err(format!(
            "Unsupported URL scheme '{}', only {} are allowed.",
            parsed.scheme(),
            OPENABLE_SCHEMES.join("/")
        ))
    }
}

fn spawn_detached(program: &str, args: &[&str]) -> Result<(), String> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|error| format!("Failed to run '{program}': {error}"))
}

#[cfg(target_os = "macos")]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    spawn_detached("open", &[url])
}

#[cfg(target_os = "windows")]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    spawn_detached("rundll32", &["url.dll,FileProtocolHandler", url])
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_url_with_system_browser(url: &str) -> Result<(), String> {
    spawn_detached("xdg-open", &[url])
}

#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
fn open_url_with_system_browser(_url: &str) -> Result<(), String> {
    Err("Opening external URLs is not supported on this platform.".to_string())
}

/// Routes one command from the presentation surface. Nothing is surfaced to
/// the caller except the achievement check result; failures are logged.
pub(crate) fn dispatch_command<W, O, Q>(
    context: &ShellContext<W>,
    command: ShellCommand,
    open_external: O,
    quit: Q,
) -> CommandReply
where
    W: HostWindow,
    O: FnOnce(&str) -> Result<(), String>,
    Q: FnOnce(),
{
    log::debug!("command received: {}", command.channel());
    match command {
        ShellCommand::Quit => {
            crate::append_shutdown_log("quit requested by presentation surface");
            quit();
        }
        ShellCommand::ToggleFullscreen => match context.supervisor() {
            Some(supervisor) => match supervisor.toggle_fullscreen() {
                Ok(fullscreen) => log::info!("fullscreen toggled to {fullscreen}"),
                Err(error) => log::error!("toggle_fullscreen failed: {error}"),
            },
            None => log::warn!("toggle_fullscreen ignored: main window does not exist yet"),
        },
        ShellCommand::OpenLink(raw_url) => match parse_openable_url(&raw_url) {
            Ok(url) => {
                if let Err(error) = open_external(url.as_str()) {
                    log::error!("failed to open external link {url}: {error}");
                }
            }
            Err(error) => log::error!("rejected link command: {error}"),
        },
        ShellCommand::TriggerAchievement(id) => context.gateway.trigger_achievement(&id),
        ShellCommand::CheckAchievement(id) => {
            return CommandReply::Achievement(context.gateway.check_achievement(&id));
        }
    }
    CommandReply::Done
}

fn dispatch_from_app(app_handle: &AppHandle, command: ShellCommand) -> CommandReply {
    let Some(context) = app_handle.try_state::<ShellContext>() else {
        log::warn!("{} ignored: shell is not initialized", command.channel());
        return match command {
            ShellCommand::CheckAchievement(_) => CommandReply::Achievement(false),
            _ => CommandReply::Done,
        };
    };
    let quit_handle = app_handle.clone();
    dispatch_command(
        context.inner(),
        command,
        open_url_with_system_browser,
        move || quit_handle.exit(0),
    )
}

#[tauri::command]
pub(crate) fn quit(app_handle: AppHandle) {
    dispatch_from_app(&app_handle, ShellCommand::Quit);
}

#[tauri::command]
pub(crate) fn toggle_fullscreen(app_handle: AppHandle) {
    dispatch_from_app(&app_handle, ShellCommand::ToggleFullscreen);
}

#[tauri::command]
pub(crate) fn link(app_handle: AppHandle, url: String) {
    dispatch_from_app(&app_handle, ShellCommand::OpenLink(url));
}

#[tauri::command]
pub(crate) fn trigger_achievement(app_handle: AppHandle, id: String) {
    dispatch_from_app(&app_handle, ShellCommand::TriggerAchievement(id));
}

#[tauri::command]
pub(crate) fn check_achievement(app_handle: AppHandle, id: String) -> bool {
    match dispatch_from_app(&app_handle, ShellCommand::CheckAchievement(id)) {
        CommandReply::Achievement(activated) => activated,
        CommandReply::Done => false,
    }
}

/// Generic fire-and-forget entry point mirroring the named commands.
#[tauri::command]
pub(crate) fn shell_send(app_handle: AppHandle, channel: String, argument: Option<String>) {
    match command_from_channel(&channel, argument) {
        Some(ShellCommand::CheckAchievement(_)) => {
            log::warn!("check_achievement needs a response; use the check_achievement command");
        }
        Some(command) => {
            dispatch_from_app(&app_handle, command);
        }
        None => log::warn!("rejected unknown or incomplete command on channel '{channel}'"),
    }
}
