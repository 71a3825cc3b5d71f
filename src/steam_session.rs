use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use steamworks::{AppId, Client, ClientManager};

use crate::integration_gateway::{IntegrationInitError, IntegrationSession};

const CALLBACK_PUMP_INTERVAL: Duration = Duration::from_millis(100);

/// Runs `pump` on a named thread every `interval` until it returns `false`.
fn spawn_callback_pump<F>(interval: Duration, mut pump: F) -> Result<JoinHandle<()>, String>
where
    F: FnMut() -> bool + Send + 'static,
{
    thread::Builder::new()
        .name("steam-callbacks".to_string())
        .spawn(move || {
            while pump() {
                thread::sleep(interval);
            }
        })
        .map_err(|error| format!("failed to start steam callback thread: {error}"))
}

pub(crate) struct SteamSession {
    client: Client<ClientManager>,
}

impl SteamSession {
    pub(crate) fn connect(app_id: u32) -> Result<Self, IntegrationInitError> {
        let (client, single) = Client::init_app(AppId(app_id))
            .map_err(|error| IntegrationInitError::Unavailable(error.to_string()))?;

        // Stats requests and stores complete through callbacks, which only
        // dispatch while `run_callbacks` is pumped for the process lifetime.
        spawn_callback_pump(CALLBACK_PUMP_INTERVAL, move || {
            single.run_callbacks();
            true
        })
        .map_err(IntegrationInitError::Unavailable)?;
        client.user_stats().request_current_stats();

        Ok(Self { client })
    }
}

impl IntegrationSession for SteamSession {
    fn activate_achievement(&self, id: &str) -> Result<(), String> {
        let user_stats = self.client.user_stats();
        user_stats
            .achievement(id)
            .set()
            .map_err(|_| format!("steam rejected achievement '{id}'"))?;
        user_stats
            .store_stats()
            .map_err(|_| "steam failed to store stats".to_string())
    }

    fn is_achievement_activated(&self, id: &str) -> Result<bool, String> {
        self.client
            .user_stats()
            .achievement(id)
            .get()
            .map_err(|_| format!("steam has no achievement named '{id}'"))
    }
}
