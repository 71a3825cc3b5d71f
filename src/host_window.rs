use tauri::WebviewWindow;
use url::Url;

use crate::WindowBounds;

/// The operations the shell needs from the host windowing subsystem.
pub(crate) trait HostWindow: Send + Sync + 'static {
    fn is_fullscreen(&self) -> Result<bool, String>;
    fn set_fullscreen(&self, fullscreen: bool) -> Result<(), String>;
    fn is_maximized(&self) -> Result<bool, String>;
    fn maximize(&self) -> Result<(), String>;
    fn bounds(&self) -> Result<WindowBounds, String>;
    fn show(&self) -> Result<(), String>;
    fn navigate(&self, url: &Url) -> Result<(), String>;
    fn reload(&self) -> Result<(), String>;
    fn open_devtools(&self);
}

impl HostWindow for WebviewWindow {
    fn is_fullscreen(&self) -> Result<bool, String> {
        WebviewWindow::is_fullscreen(self)
            .map_err(|error| format!("Failed to read fullscreen state: {error}"))
    }

    fn set_fullscreen(&self, fullscreen: bool) -> Result<(), String> {
        WebviewWindow::set_fullscreen(self, fullscreen)
            .map_err(|error| format!("Failed to set fullscreen={fullscreen}: {error}"))
    }

    fn is_maximized(&self) -> Result<bool, String> {
        WebviewWindow::is_maximized(self)
            .map_err(|error| format!("Failed to read maximized state: {error}"))
    }

    fn maximize(&self) -> Result<(), String> {
        WebviewWindow::maximize(self).map_err(|error| format!("Failed to maximize: {error}"))
    }

    fn bounds(&self) -> Result<WindowBounds, String> {
        let scale = self
            .scale_factor()
            .map_err(|error| format!("Failed to read scale factor: {error}"))?;
        let position = self
            .outer_position()
            .map_err(|error| format!("Failed to read window position: {error}"))?
            .to_logical::<f64>(scale);
        let size = self
            .inner_size()
            .map_err(|error| format!("Failed to read window size: {error}"))?
            .to_logical::<f64>(scale);

        Ok(WindowBounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn show(&self) -> Result<(), String> {
        WebviewWindow::show(self).map_err(|error| format!("Failed to show window: {error}"))
    }

    fn navigate(&self, url: &Url) -> Result<(), String> {
        WebviewWindow::navigate(self, url.clone())
            .map_err(|error| format!("Failed to navigate to {url}: {error}"))
    }

    fn reload(&self) -> Result<(), String> {
        WebviewWindow::reload(self).map_err(|error| format!("Failed to reload content: {error}"))
    }

    fn open_devtools(&self) {
        WebviewWindow::open_devtools(self);
    }
}
