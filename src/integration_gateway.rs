use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum IntegrationInitError {
    #[error("platform integration identifier is missing")]
    MissingIdentifier,
    #[error("platform integration identifier '{0}' is not a valid application id")]
    InvalidIdentifier(String),
    #[error("platform integration service is unavailable: {0}")]
    Unavailable(String),
}

/// Live connection to the platform integration service.
pub(crate) trait IntegrationSession: Send + Sync {
    fn activate_achievement(&self, id: &str) -> Result<(), String>;
    fn is_achievement_activated(&self, id: &str) -> Result<bool, String>;
}

pub(crate) fn parse_app_identifier(raw: Option<&str>) -> Result<u32, IntegrationInitError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(IntegrationInitError::MissingIdentifier)?;
    raw.parse::<u32>()
        .ok()
        .filter(|app_id| *app_id > 0)
        .ok_or_else(|| IntegrationInitError::InvalidIdentifier(raw.to_string()))
}

fn validate_achievement_id(id: &str) -> Option<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Owns the optional integration session. `None` is degraded mode: every
/// achievement operation becomes a no-op answering `false`.
pub(crate) struct IntegrationGateway {
    session: Option<Box<dyn IntegrationSession>>,
}

impl std::fmt::Debug for IntegrationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationGateway")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl IntegrationGateway {
    pub(crate) fn disabled() -> Self {
        Self { session: None }
    }

    /// Attempts the session exactly once. Failure is logged as a warning and
    /// never retried.
    pub(crate) fn init<C>(app_identifier: Option<&str>, connect: C) -> (Self, bool)
    where
        C: FnOnce(u32) -> Result<Box<dyn IntegrationSession>, IntegrationInitError>,
    {
        let session = parse_app_identifier(app_identifier).and_then(|app_id| {
            let session = connect(app_id)?;
            log::info!("platform integration initialized for app {app_id}");
            Ok(session)
        });

        match session {
            Ok(session) => (
                Self {
                    session: Some(session),
                },
                true,
            ),
            Err(error) => {
                log::warn!("{error}; starting without platform integration");
                (Self::disabled(), false)
            }
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn trigger_achievement(&self, id: &str) {
        let Some(session) = self.session.as_deref() else {
            log::debug!("achievement {id} ignored: platform integration disabled");
            return;
        };
        let Some(id) = validate_achievement_id(id) else {
            log::warn!("rejected achievement trigger with empty identifier");
            return;
        };

        match session.activate_achievement(id) {
            Ok(()) => log::info!("achievement triggered: {id}"),
            Err(error) => log::error!("achievement activation failed: {id}: {error}"),
        }
    }

    pub(crate) fn check_achievement(&self, id: &str) -> bool {
        let Some(session) = self.session.as_deref() else {
            return false;
        };
        let Some(id) = validate_achievement_id(id) else {
            log::warn!("rejected achievement check with empty identifier");
            return false;
        };

        match session.is_achievement_activated(id) {
            Ok(activated) => activated,
            Err(error) => {
                log::error!("achievement check failed: {id}: {error}");
                false
            }
        }
    }
}

#[cfg(not(feature = "steam"))]
pub(crate) fn connect_platform_session(
    _app_id: u32,
) -> Result<Box<dyn IntegrationSession>, IntegrationInitError> {
    Err(IntegrationInitError::Unavailable(
        "built without the `steam` feature".to_string(),
    ))
}

#[cfg(feature = "steam")]
pub(crate) fn connect_platform_session(
    app_id: u32,
) -> Result<Box<dyn IntegrationSession>, IntegrationInitError> {
    crate::steam_session::SteamSession::connect(app_id)
        .map(|session| Box::new(session) as Box<dyn IntegrationSession>)
}
