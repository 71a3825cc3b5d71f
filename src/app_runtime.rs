use std::{cell::RefCell, sync::Arc};

use tauri::{
    webview::{PageLoadEvent, PageLoadPayload},
    AppHandle, Manager, RunEvent, Webview, WebviewWindow, Window, WindowEvent,
};
use tauri_plugin_global_shortcut::ShortcutState;
use thiserror::Error;

use crate::{
    append_desktop_log, append_shutdown_log, append_startup_log,
    content_loader::ContentSource,
    fault_handlers::{self, InitPhase},
    host_switches,
    integration_gateway::{self, IntegrationGateway},
    logging,
    main_window::{self, WindowSupervisor},
    shell_config::read_app_identifier,
    shell_context::ShellContext,
    window_state_store::{load_window_state, WindowStateStore},
    ShellConfig, DEV_SERVER_PROBE_TIMEOUT, MAIN_WINDOW_LABEL,
};

#[derive(Debug, Error)]
pub(crate) enum ShellError {
    #[error("failed to create main window: {0}")]
    WindowBuild(String),
    #[error("content failed to load: {0}")]
    ContentLoad(String),
    #[error("shell initialization failed: {0}")]
    Init(String),
}

fn handle_second_instance(app_handle: &AppHandle, _argv: Vec<String>, _cwd: String) {
    append_desktop_log("second instance launch blocked; focusing existing window");
    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
        if let Err(error) = window.unminimize() {
            append_desktop_log(&format!("failed to unminimize main window: {error}"));
        }
        if let Err(error) = window.set_focus() {
            append_desktop_log(&format!("failed to focus main window: {error}"));
        }
    }
}

fn handle_window_event(window: &Window, event: &WindowEvent) {
    if window.label() != MAIN_WINDOW_LABEL {
        return;
    }
    let Some(context) = window.try_state::<ShellContext>() else {
        return;
    };
    let Some(supervisor) = context.supervisor() else {
        return;
    };

    match event {
        WindowEvent::Resized(_) => {
            supervisor.observe_fullscreen();
            supervisor.on_geometry_changed();
        }
        WindowEvent::Moved(_) | WindowEvent::CloseRequested { .. } => {
            supervisor.on_geometry_changed();
        }
        WindowEvent::Focused(focused) => {
            context
                .shortcuts
                .on_focus_changed(window.app_handle(), *focused, append_desktop_log);
        }
        WindowEvent::Destroyed => {
            log::info!(
                "main window destroyed in state {:?}",
                supervisor.lifecycle_state()
            );
            if supervisor.on_window_closed() {
                append_shutdown_log("main window closed, exiting shell");
                window.app_handle().exit(0);
            }
        }
        _ => {}
    }
}

fn handle_page_load(webview: &Webview, payload: &PageLoadPayload<'_>) {
    if webview.label() != MAIN_WINDOW_LABEL {
        return;
    }
    let Some(context) = webview.try_state::<ShellContext>() else {
        return;
    };
    let Some(supervisor) = context.supervisor() else {
        return;
    };

    match payload.event() {
        PageLoadEvent::Started => supervisor.on_page_load_started(payload.url()),
        PageLoadEvent::Finished => supervisor.on_page_load_finished(payload.url()),
    }
}

/// The initialization window stays open until this load resolves.
fn spawn_content_load(
    app_handle: AppHandle,
    supervisor: Arc<WindowSupervisor<WebviewWindow>>,
    config: ShellConfig,
    init_phase: InitPhase,
) {
    fault_handlers::spawn_logged("content load", async move {
        let outcome = tauri::async_runtime::spawn_blocking(move || {
            let source = ContentSource::for_config(&config)?;
            supervisor.load(
                &source,
                config.content_retry,
                |source| {
                    main_window::content_preflight(&app_handle, source, DEV_SERVER_PROBE_TIMEOUT)
                },
                std::thread::sleep,
            )
        })
        .await
        .map_err(|error| ShellError::ContentLoad(format!("content load task failed: {error}")))
        .and_then(|result| result.map_err(ShellError::ContentLoad));

        fault_handlers::conclude_init(&init_phase, outcome);
        Ok(())
    });
}

fn watch_for_crashes(app_handle: &AppHandle, window: &WebviewWindow) {
    let observer_handle = app_handle.clone();
    let attached = main_window::watch_content_process(window, move |details| {
        let Some(context) = observer_handle.try_state::<ShellContext>() else {
            return;
        };
        if let Some(supervisor) = context.supervisor() {
            supervisor.on_render_process_gone(&details);
        }
    });
    if let Err(error) = attached {
        log::warn!("{error}");
    }
}

/// Runs inside the host's ready hook: gateway, then window, then load.
fn initialize_shell(
    app_handle: &AppHandle,
    config: ShellConfig,
    init_phase: InitPhase,
) -> Result<(), ShellError> {
    append_startup_log(&format!("shell starting in {} mode", config.mode.label()));

    let identifier = read_app_identifier(config.app_identifier_path.as_deref(), |line| {
        log::warn!("{line}")
    });
    let (gateway, integration_ready) = IntegrationGateway::init(
        identifier.as_deref(),
        integration_gateway::connect_platform_session,
    );
    if !integration_ready {
        append_startup_log("application starting without platform integration");
    }

    let config_dir = app_handle
        .path()
        .app_config_dir()
        .map_err(|error| log::warn!("failed to resolve app config dir: {error}"))
        .ok();
    let store = Arc::new(WindowStateStore::open_in(config_dir.as_deref()));

    if !app_handle.manage(<ShellContext>::new(config, store, gateway)) {
        return Err(ShellError::Init("shell context already exists".to_string()));
    }
    let context = app_handle.state::<ShellContext>();
    let saved = load_window_state(&context.store);

    let (window, window_config) = main_window::build_main_window(app_handle, &context.config, &saved)
        .map_err(ShellError::WindowBuild)?;
    let supervisor = Arc::new(WindowSupervisor::new(
        window.clone(),
        &context.config,
        context.store.clone(),
        &saved,
        window_config.fullscreen,
    ));
    context
        .attach_window(supervisor.clone())
        .map_err(ShellError::Init)?;

    watch_for_crashes(app_handle, &window);
    spawn_content_load(
        app_handle.clone(),
        supervisor,
        context.config.clone(),
        init_phase,
    );
    Ok(())
}

pub(crate) fn run() {
    let config = match ShellConfig::from_env(tauri::is_dev()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("invalid shell configuration: {error}");
            std::process::exit(1);
        }
    };

    let early_lines = RefCell::new(Vec::new());
    host_switches::apply_host_switches(|line| early_lines.borrow_mut().push(line.to_string()));
    let early_lines = early_lines.into_inner();

    let init_phase = InitPhase::begin();
    fault_handlers::install_panic_hook(init_phase.clone());

    let setup_config = config.clone();
    let app = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(handle_second_instance))
        .plugin(logging::build_log_plugin(config.mode))
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|_app, shortcut, event| {
                    if event.state == ShortcutState::Pressed {
                        log::info!("{shortcut:?} is disabled in production");
                    }
                })
                .build(),
        )
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::quit,
            crate::desktop_bridge_commands::toggle_fullscreen,
            crate::desktop_bridge_commands::link,
            crate::desktop_bridge_commands::trigger_achievement,
            crate::desktop_bridge_commands::check_achievement,
            crate::desktop_bridge_commands::shell_send,
        ])
        .on_window_event(handle_window_event)
        .on_page_load(handle_page_load)
        .setup(move |app| {
            for line in &early_lines {
                append_startup_log(line);
            }
            // A setup error would reach the host as a panic after this hook
            // returns; end the process here instead.
            if let Err(error) = initialize_shell(app.handle(), setup_config, init_phase.clone()) {
                fault_handlers::conclude_init(&init_phase, Err(error));
            }
            Ok(())
        })
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(error) => {
            log::error!("initialization failed: {error}");
            eprintln!("initialization failed: {error}");
            std::process::exit(1);
        }
    };

    app.run(|_app_handle, event| {
        if let RunEvent::Exit = event {
            append_shutdown_log("shell exited");
            log::logger().flush();
        }
    });
}
