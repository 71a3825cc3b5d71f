use std::{
    fmt::Display,
    future::Future,
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaultAction {
    Terminate,
    Continue,
}

pub(crate) fn decide_fault_action(initializing: bool) -> FaultAction {
    if initializing {
        FaultAction::Terminate
    } else {
        FaultAction::Continue
    }
}

/// Shared marker for the initialization window. It starts active and only
/// ends when `finish` sees a successful outcome; a failed or abandoned boot
/// stays in init so any later fault still terminates.
#[derive(Debug, Clone)]
pub(crate) struct InitPhase {
    active: Arc<AtomicBool>,
}

impl InitPhase {
    pub(crate) fn begin() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn finish<E: Display>(&self, outcome: Result<(), E>) -> FaultAction {
        match outcome {
            Ok(()) => {
                self.active.store(false, Ordering::Release);
                crate::append_startup_log("shell initialized");
                FaultAction::Continue
            }
            Err(error) => {
                log::error!("initialization failed: {error}");
                decide_fault_action(self.is_active())
            }
        }
    }
}

pub(crate) fn terminate_during_init(reason: &str) -> ! {
    crate::append_shutdown_log(&format!("{reason}; terminating"));
    log::logger().flush();
    std::process::exit(1);
}

/// Applies the outcome of an initialization step, ending the process when
/// it failed while still initializing.
pub(crate) fn conclude_init<E: Display>(init_phase: &InitPhase, outcome: Result<(), E>) {
    if init_phase.finish(outcome) == FaultAction::Terminate {
        terminate_during_init("fault during initialization");
    }
}

/// Global fault handler. Panics are always logged; while `init_phase` is
/// active the process exits, afterwards the shell keeps running.
pub(crate) fn install_panic_hook(init_phase: InitPhase) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log::error!("uncaught panic: {info}");
        previous(info);
        match decide_fault_action(init_phase.is_active()) {
            FaultAction::Terminate => terminate_during_init("panic during initialization"),
            FaultAction::Continue => {
                log::warn!("continuing after uncaught panic");
            }
        }
    }));
}

/// Spawns a task whose error is logged instead of being dropped silently.
pub(crate) fn spawn_logged<F>(task_name: &'static str, task: F)
where
    F: Future<Output = Result<(), String>> + Send + 'static,
{
    tauri::async_runtime::spawn(async move {
        if let Err(error) = task.await {
            log::error!("unhandled failure in {task_name}: {error}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_terminate_only_during_initialization() {
        assert_eq!(decide_fault_action(true), FaultAction::Terminate);
        assert_eq!(decide_fault_action(false), FaultAction::Continue);
    }

    #[test]
    fn failed_setup_keeps_shell_in_init_so_later_faults_terminate() {
        let init_phase = InitPhase::begin();
        let setup_hook_view = init_phase.clone();

        assert_eq!(
            setup_hook_view.finish(Err("failed to create main window")),
            FaultAction::Terminate
        );
        // The host turns a setup error into a panic after the hook returns.
        assert!(init_phase.is_active());
        assert_eq!(
            decide_fault_action(init_phase.is_active()),
            FaultAction::Terminate
        );
    }

    #[test]
    fn init_window_spans_until_content_load_resolves() {
        let init_phase = InitPhase::begin();
        let loader_view = init_phase.clone();

        // Window built, load still pending: faults must still terminate.
        assert_eq!(
            decide_fault_action(init_phase.is_active()),
            FaultAction::Terminate
        );

        assert_eq!(loader_view.finish(Ok::<(), String>(())), FaultAction::Continue);
        assert!(!init_phase.is_active());
        assert_eq!(
            decide_fault_action(init_phase.is_active()),
            FaultAction::Continue
        );
    }

    #[test]
    fn content_load_failure_while_initializing_terminates() {
        let init_phase = InitPhase::begin();
        assert_eq!(
            init_phase.finish(Err("content failed to load after 2 attempt(s)")),
            FaultAction::Terminate
        );
        assert!(init_phase.is_active());
    }
}
