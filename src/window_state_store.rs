use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{
    PersistedWindowState, WindowBounds, DESKTOP_STATE_FILE, WINDOW_BOUNDS_KEY,
    WINDOW_MAXIMIZED_KEY,
};

fn empty_state_object() -> Value {
    Value::Object(Map::new())
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = empty_state_object();
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just normalized into a JSON object"),
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

fn insert(root: &mut Value, key: &str, value: Value) {
    let mut segments = key.split('.').peekable();
    let mut node = root;
    while let Some(segment) = segments.next() {
        let object = ensure_object(node);
        if segments.peek().is_none() {
            object.insert(segment.to_string(), value);
            return;
        }
        node = object
            .entry(segment.to_string())
            .or_insert_with(empty_state_object);
    }
}

fn read_state_file(path: &Path) -> Result<Value, String> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(empty_state_object()),
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) if value.is_object() => Ok(value),
            Ok(_) => {
                crate::append_desktop_log(&format!(
                    "desktop state {} has non-object root; resetting state",
                    path.display()
                ));
                Ok(empty_state_object())
            }
            Err(error) => {
                crate::append_desktop_log(&format!(
                    "failed to parse desktop state {}: {}. resetting state",
                    path.display(),
                    error
                ));
                Ok(empty_state_object())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(empty_state_object()),
        Err(error) => Err(format!(
            "Failed to read desktop state {}: {}",
            path.display(),
            error
        )),
    }
}

fn write_state_file(path: &Path, state: &Value) -> Result<(), String> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create desktop state directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }
    let serialized = serde_json::to_string_pretty(state)
        .map_err(|error| format!("Failed to serialize desktop state: {error}"))?;
    fs::write(path, serialized).map_err(|error| {
        format!(
            "Failed to write desktop state {}: {}",
            path.display(),
            error
        )
    })
}

/// Durable key-value store for shell state, scoped to the current user.
///
/// Keys are dotted paths into a single JSON document. Reads are served from
/// memory; every `set` rewrites the file before returning, so nothing is left
/// pending when the process exits. Failures are logged and swallowed.
#[derive(Debug)]
pub(crate) struct WindowStateStore {
    path: Option<PathBuf>,
    state: Mutex<Value>,
    #[cfg(test)]
    flushes: std::sync::atomic::AtomicUsize,
}

impl WindowStateStore {
    pub(crate) fn open_in(config_dir: Option<&Path>) -> Self {
        let path = config_dir.map(|dir| dir.join(DESKTOP_STATE_FILE));
        let state = match path.as_deref() {
            Some(path) => read_state_file(path).unwrap_or_else(|error| {
                log::warn!("{error}; starting with empty desktop state");
                empty_state_object()
            }),
            None => {
                crate::append_desktop_log(
                    "desktop state path is unavailable; window state will not persist",
                );
                empty_state_object()
            }
        };

        Self {
            path,
            state: Mutex::new(state),
            #[cfg(test)]
            flushes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let guard = self.state.lock().ok()?;
        let raw = lookup(&guard, key)?.clone();
        drop(guard);
        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(error) => {
                log::warn!("ignoring malformed desktop state value for {key}: {error}");
                None
            }
        }
    }

    pub(crate) fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).unwrap_or_default()
    }

    pub(crate) fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.set_many(vec![(key, value)]),
            Err(error) => log::warn!("failed to serialize desktop state key {key}: {error}"),
        }
    }

    /// Applies every entry, then rewrites the file once.
    pub(crate) fn set_many(&self, entries: Vec<(&str, Value)>) {
        if let Err(error) = self.try_set_many(entries) {
            log::warn!("failed to persist desktop state: {error}");
        }
    }

    fn try_set_many(&self, entries: Vec<(&str, Value)>) -> Result<(), String> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| "desktop state lock is poisoned".to_string())?;
        for (key, value) in entries {
            insert(&mut guard, key, value);
        }

        match self.path.as_deref() {
            Some(path) => {
                write_state_file(path, &guard)?;
                #[cfg(test)]
                self.flushes
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                Ok(())
            }
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn flush_count(&self) -> usize {
        self.flushes.load(std::sync::atomic::Ordering::Relaxed)
    }
}

pub(crate) fn load_window_state(store: &WindowStateStore) -> PersistedWindowState {
    PersistedWindowState {
        bounds: store
            .get::<WindowBounds>(WINDOW_BOUNDS_KEY)
            .filter(WindowBounds::is_usable),
        is_maximized: store.get_or_default(WINDOW_MAXIMIZED_KEY),
    }
}

/// Bounds are only written while the window is not maximized, so that
/// un-maximizing restores the last normal rectangle.
pub(crate) fn persist_window_geometry(
    store: &WindowStateStore,
    bounds: Option<WindowBounds>,
    is_maximized: bool,
) {
    let bounds = bounds.filter(|_| !is_maximized).and_then(|bounds| {
        serde_json::to_value(bounds)
            .map_err(|error| log::warn!("failed to serialize window bounds: {error}"))
            .ok()
    });
    match bounds {
        Some(bounds) => store.set_many(vec![
            (WINDOW_BOUNDS_KEY, bounds),
            (WINDOW_MAXIMIZED_KEY, Value::Bool(is_maximized)),
        ]),
        None => store.set(WINDOW_MAXIMIZED_KEY, &is_maximized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: f64, y: f64, width: f64, height: f64) -> WindowBounds {
        WindowBounds {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn get_returns_default_for_missing_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = WindowStateStore::open_in(Some(dir.path()));
        assert!(!store.get_or_default::<bool>(WINDOW_MAXIMIZED_KEY));
        assert_eq!(load_window_state(&store), PersistedWindowState::default());
    }

    #[test]
    fn values_survive_reopening_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = WindowStateStore::open_in(Some(dir.path()));
            persist_window_geometry(&store, Some(bounds(10.0, 20.0, 1024.0, 768.0)), false);
        }

        let reopened = WindowStateStore::open_in(Some(dir.path()));
        let state = load_window_state(&reopened);
        assert_eq!(state.bounds, Some(bounds(10.0, 20.0, 1024.0, 768.0)));
        assert!(!state.is_maximized);

        let raw = fs::read_to_string(dir.path().join(DESKTOP_STATE_FILE)).expect("state file");
        let parsed: Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed["windowState"]["isMaximized"], Value::Bool(false));
        assert_eq!(parsed["windowState"]["bounds"]["width"], Value::from(1024.0));
    }

    #[test]
    fn last_geometry_event_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = WindowStateStore::open_in(Some(dir.path()));
        for step in 0..5 {
            let offset = f64::from(step) * 10.0;
            persist_window_geometry(&store, Some(bounds(offset, offset, 900.0, 700.0)), false);
        }
        assert_eq!(
            load_window_state(&store).bounds,
            Some(bounds(40.0, 40.0, 900.0, 700.0))
        );
    }

    #[test]
    fn maximized_geometry_keeps_previous_bounds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = WindowStateStore::open_in(Some(dir.path()));
        persist_window_geometry(&store, Some(bounds(50.0, 60.0, 900.0, 700.0)), false);
        persist_window_geometry(&store, Some(bounds(0.0, 0.0, 1920.0, 1080.0)), true);

        let state = load_window_state(&store);
        assert!(state.is_maximized);
        assert_eq!(state.bounds, Some(bounds(50.0, 60.0, 900.0, 700.0)));
    }

    #[test]
    fn corrupt_state_file_is_reset_instead_of_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(DESKTOP_STATE_FILE), "{not json").expect("write");

        let store = WindowStateStore::open_in(Some(dir.path()));
        assert_eq!(load_window_state(&store), PersistedWindowState::default());
        store.set(WINDOW_MAXIMIZED_KEY, &true);
        assert!(store.get_or_default::<bool>(WINDOW_MAXIMIZED_KEY));
    }

    #[test]
    fn unwritable_location_is_swallowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").expect("write blocker");

        let store = WindowStateStore::open_in(Some(&blocker.join("nested")));
        store.set(WINDOW_MAXIMIZED_KEY, &true);
        assert!(store.get_or_default::<bool>(WINDOW_MAXIMIZED_KEY));
    }

    #[test]
    fn degenerate_persisted_bounds_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = WindowStateStore::open_in(Some(dir.path()));
        store.set(WINDOW_BOUNDS_KEY, &bounds(0.0, 0.0, 0.0, 0.0));
        assert_eq!(load_window_state(&store).bounds, None);
    }

    #[test]
    fn store_without_path_keeps_values_in_memory() {
        let store = WindowStateStore::open_in(None);
        store.set(WINDOW_MAXIMIZED_KEY, &true);
        assert!(store.get_or_default::<bool>(WINDOW_MAXIMIZED_KEY));
    }

    #[test]
    fn each_geometry_event_rewrites_the_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = WindowStateStore::open_in(Some(dir.path()));

        persist_window_geometry(&store, Some(bounds(10.0, 10.0, 900.0, 700.0)), false);
        assert_eq!(store.flush_count(), 1);
        persist_window_geometry(&store, Some(bounds(0.0, 0.0, 1920.0, 1080.0)), true);
        assert_eq!(store.flush_count(), 2);

        let raw = fs::read_to_string(dir.path().join(DESKTOP_STATE_FILE)).expect("state file");
        let parsed: Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed["windowState"]["isMaximized"], Value::Bool(true));
        assert_eq!(parsed["windowState"]["bounds"]["x"], Value::from(10.0));
    }
}
