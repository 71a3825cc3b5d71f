use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellMode {
    Development,
    Production,
}

impl ShellMode {
    pub(crate) fn is_development(self) -> bool {
        matches!(self, ShellMode::Development)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            ShellMode::Development => "development",
            ShellMode::Production => "production",
        }
    }
}

/// Logical window rectangle as persisted under `windowState.bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct WindowBounds {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl WindowBounds {
    pub(crate) fn is_usable(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct PersistedWindowState {
    pub(crate) bounds: Option<WindowBounds>,
    pub(crate) is_maximized: bool,
}

pub const CHANNEL_QUIT: &str = "quit";
pub const CHANNEL_TOGGLE_FULLSCREEN: &str = "toggle_fullscreen";
pub const CHANNEL_LINK: &str = "link";
pub const CHANNEL_TRIGGER_ACHIEVEMENT: &str = "trigger_achievement";
pub const CHANNEL_CHECK_ACHIEVEMENT: &str = "check_achievement";

/// Full vocabulary accepted from the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Quit,
    ToggleFullscreen,
    OpenLink(String),
    TriggerAchievement(String),
    CheckAchievement(String),
}

impl ShellCommand {
    pub(crate) fn channel(&self) -> &'static str {
        match self {
            ShellCommand::Quit => CHANNEL_QUIT,
            ShellCommand::ToggleFullscreen => CHANNEL_TOGGLE_FULLSCREEN,
            ShellCommand::OpenLink(_) => CHANNEL_LINK,
            ShellCommand::TriggerAchievement(_) => CHANNEL_TRIGGER_ACHIEVEMENT,
            ShellCommand::CheckAchievement(_) => CHANNEL_CHECK_ACHIEVEMENT,
        }
    }
}

pub(crate) fn command_from_channel(channel: &str, argument: Option<String>) -> Option<ShellCommand> {
    match channel {
        CHANNEL_QUIT => Some(ShellCommand::Quit),
        CHANNEL_TOGGLE_FULLSCREEN => Some(ShellCommand::ToggleFullscreen),
        CHANNEL_LINK => Some(ShellCommand::OpenLink(argument?)),
        CHANNEL_TRIGGER_ACHIEVEMENT => Some(ShellCommand::TriggerAchievement(argument?)),
        CHANNEL_CHECK_ACHIEVEMENT => Some(ShellCommand::CheckAchievement(argument?)),
        _ => None,
    }
}

/// Only `CheckAchievement` answers; every other command is fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandReply {
    Done,
    Achievement(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_from_channel_maps_all_known_channels() {
        assert_eq!(command_from_channel(CHANNEL_QUIT, None), Some(ShellCommand::Quit));
        assert_eq!(
            command_from_channel(CHANNEL_TOGGLE_FULLSCREEN, None),
            Some(ShellCommand::ToggleFullscreen)
        );
        assert_eq!(
            command_from_channel(CHANNEL_LINK, Some("https://example.com".to_string())),
            Some(ShellCommand::OpenLink("https://example.com".to_string()))
        );
        assert_eq!(
            command_from_channel(CHANNEL_TRIGGER_ACHIEVEMENT, Some("FIRST_WIN".to_string())),
            Some(ShellCommand::TriggerAchievement("FIRST_WIN".to_string()))
        );
        assert_eq!(
            command_from_channel(CHANNEL_CHECK_ACHIEVEMENT, Some("FIRST_WIN".to_string())),
            Some(ShellCommand::CheckAchievement("FIRST_WIN".to_string()))
        );
    }

    #[test]
    fn command_from_channel_rejects_unknown_channel_and_missing_argument() {
        assert_eq!(command_from_channel("reload", None), None);
        assert_eq!(command_from_channel(CHANNEL_LINK, None), None);
    }

    #[test]
    fn command_channel_round_trips_through_command_from_channel() {
        let command = ShellCommand::TriggerAchievement("FIRST_WIN".to_string());
        assert_eq!(
            command_from_channel(command.channel(), Some("FIRST_WIN".to_string())),
            Some(command)
        );
    }

    #[test]
    fn window_bounds_rejects_degenerate_rectangles() {
        let bounds = WindowBounds {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 600.0,
        };
        assert!(!bounds.is_usable());
        assert!(WindowBounds {
            width: 800.0,
            ..bounds
        }
        .is_usable());
    }
}
