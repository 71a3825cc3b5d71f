const BRIDGE_COMMANDS: &[&str] = &[
    "quit",
    "toggle_fullscreen",
    "link",
    "trigger_achievement",
    "check_achievement",
    "shell_send",
];

fn main() {
    let attributes = tauri_build::Attributes::new()
        .app_manifest(tauri_build::AppManifest::new().commands(BRIDGE_COMMANDS));
    if let Err(error) = tauri_build::try_build(attributes) {
        panic!("failed to run tauri build script: {error:#}");
    }
}
