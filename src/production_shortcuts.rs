use std::sync::Mutex;

use tauri::{AppHandle, Runtime};
use tauri_plugin_global_shortcut::GlobalShortcutExt;

pub(crate) trait ShortcutRegistrar {
    fn register(&self, accelerator: &str) -> Result<(), String>;
    fn unregister(&self, accelerator: &str) -> Result<(), String>;
}

impl<R: Runtime> ShortcutRegistrar for AppHandle<R> {
    fn register(&self, accelerator: &str) -> Result<(), String> {
        self.global_shortcut()
            .register(accelerator)
            .map_err(|error| format!("Failed to register shortcut {accelerator}: {error}"))
    }

    fn unregister(&self, accelerator: &str) -> Result<(), String> {
        self.global_shortcut()
            .unregister(accelerator)
            .map_err(|error| format!("Failed to unregister shortcut {accelerator}: {error}"))
    }
}

/// Subscription handle for a set of swallowed shortcuts. The owner must call
/// `release` to give the shortcuts back to the system.
#[derive(Debug)]
#[must_use = "disabled shortcuts stay registered until released"]
pub(crate) struct DisabledShortcuts {
    registered: Vec<&'static str>,
}

impl DisabledShortcuts {
    pub(crate) fn install<G, F>(registrar: &G, shortcuts: &[&'static str], log: F) -> Self
    where
        G: ShortcutRegistrar + ?Sized,
        F: Fn(&str),
    {
        let registered = shortcuts
            .iter()
            .copied()
            .filter(|shortcut| match registrar.register(shortcut) {
                Ok(()) => true,
                Err(error) => {
                    log(&error);
                    false
                }
            })
            .collect();
        Self { registered }
    }

    pub(crate) fn release<G, F>(self, registrar: &G, log: F)
    where
        G: ShortcutRegistrar + ?Sized,
        F: Fn(&str),
    {
        for shortcut in self.registered {
            if let Err(error) = registrar.unregister(shortcut) {
                log(&error);
            }
        }
    }
}

/// Holds the disabled shortcuts only while the shell window has focus.
#[derive(Debug)]
pub(crate) struct ProductionShortcutGuard {
    enabled: bool,
    shortcuts: &'static [&'static str],
    active: Mutex<Option<DisabledShortcuts>>,
}

impl ProductionShortcutGuard {
    pub(crate) fn new(enabled: bool, shortcuts: &'static [&'static str]) -> Self {
        Self {
            enabled,
            shortcuts,
            active: Mutex::new(None),
        }
    }

    pub(crate) fn on_focus_changed<G, F>(&self, registrar: &G, focused: bool, log: F)
    where
        G: ShortcutRegistrar + ?Sized,
        F: Fn(&str),
    {
        if !self.enabled {
            return;
        }
        let Ok(mut active) = self.active.lock() else {
            log("production shortcut state lock is poisoned");
            return;
        };

        if focused {
            if active.is_none() {
                *active = Some(DisabledShortcuts::install(registrar, self.shortcuts, &log));
            }
        } else if let Some(handle) = active.take() {
            handle.release(registrar, &log);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}
