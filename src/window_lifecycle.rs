#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowLifecycleState {
    Created,
    Loading,
    Ready,
    Crashed,
    Reloading,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    LoadStarted,
    LoadFinished,
    ContentProcessGone,
    ReloadRequested,
    WindowClosed,
}

impl WindowLifecycleState {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, WindowLifecycleState::Closed)
    }

    /// Returns `None` when the event is not valid in the current state.
    pub(crate) fn next(self, event: LifecycleEvent) -> Option<Self> {
        use LifecycleEvent as E;
        use WindowLifecycleState as S;

        match (self, event) {
            (state, _) if state.is_terminal() => None,
            (_, E::WindowClosed) => Some(S::Closed),
            (S::Created, E::LoadStarted) => Some(S::Loading),
            // In-app navigation re-enters loading from a ready page.
            (S::Ready, E::LoadStarted) => Some(S::Loading),
            (S::Loading, E::LoadStarted) | (S::Reloading, E::LoadStarted) => Some(self),
            (S::Loading, E::LoadFinished) | (S::Reloading, E::LoadFinished) => Some(S::Ready),
            (S::Loading, E::ContentProcessGone)
            | (S::Ready, E::ContentProcessGone)
            | (S::Reloading, E::ContentProcessGone) => Some(S::Crashed),
            (S::Crashed, E::ReloadRequested) => Some(S::Reloading),
            _ => None,
        }
    }
}

/// Tracks the single window's lifecycle and rejects invalid transitions.
#[derive(Debug)]
pub(crate) struct WindowLifecycle {
    state: WindowLifecycleState,
}

impl Default for WindowLifecycle {
    fn default() -> Self {
        Self {
            state: WindowLifecycleState::Created,
        }
    }
}

impl WindowLifecycle {
    pub(crate) fn state(&self) -> WindowLifecycleState {
        self.state
    }

    pub(crate) fn apply(&mut self, event: LifecycleEvent) -> Result<WindowLifecycleState, String> {
        match self.state.next(event) {
            Some(next) => {
                self.state = next;
                Ok(next)
            }
            None => Err(format!(
                "ignored lifecycle event {:?} in state {:?}",
                event, self.state
            )),
        }
    }
}
