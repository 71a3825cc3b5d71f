use std::sync::{Arc, OnceLock};

use tauri::WebviewWindow;

use crate::{
    host_window::HostWindow,
    integration_gateway::IntegrationGateway,
    main_window::WindowSupervisor,
    production_shortcuts::ProductionShortcutGuard,
    window_state_store::WindowStateStore,
    ShellConfig, DISABLED_PRODUCTION_SHORTCUTS,
};

/// All mutable shell state, owned in one place and handed to components by
/// reference. The window slot is written once after construction.
pub(crate) struct ShellContext<W: HostWindow = WebviewWindow> {
    pub(crate) config: ShellConfig,
    pub(crate) store: Arc<WindowStateStore>,
    pub(crate) gateway: IntegrationGateway,
    pub(crate) shortcuts: ProductionShortcutGuard,
    supervisor: OnceLock<Arc<WindowSupervisor<W>>>,
}

impl<W: HostWindow> ShellContext<W> {
    pub(crate) fn new(
        config: ShellConfig,
        store: Arc<WindowStateStore>,
        gateway: IntegrationGateway,
    ) -> Self {
        let shortcuts = ProductionShortcutGuard::new(
            !config.mode.is_development(),
            &DISABLED_PRODUCTION_SHORTCUTS,
        );
        Self {
            config,
            store,
            gateway,
            shortcuts,
            supervisor: OnceLock::new(),
        }
    }

    pub(crate) fn attach_window(&self, supervisor: Arc<WindowSupervisor<W>>) -> Result<(), String> {
        self.supervisor
            .set(supervisor)
            .map_err(|_| "main window is already attached".to_string())
    }

    /// `None` until the window has been constructed.
    pub(crate) fn supervisor(&self) -> Option<&Arc<WindowSupervisor<W>>> {
        self.supervisor.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host_window::fake::FakeWindow, PersistedWindowState, ShellMode};

    #[test]
    fn window_slot_is_written_once() {
        let config = ShellConfig::from_lookup(false, None, |_| None).expect("config");
        let store = Arc::new(WindowStateStore::open_in(None));
        let context: ShellContext<FakeWindow> =
            ShellContext::new(config.clone(), store.clone(), IntegrationGateway::disabled());
        assert!(context.supervisor().is_none());
        assert_eq!(context.config.mode, ShellMode::Production);

        let make = || {
            Arc::new(WindowSupervisor::new(
                FakeWindow::new(true),
                &config,
                store.clone(),
                &PersistedWindowState::default(),
                true,
            ))
        };
        assert!(context.attach_window(make()).is_ok());
        assert!(context.attach_window(make()).is_err());
        assert!(context.supervisor().is_some());
    }
}
