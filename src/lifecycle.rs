/// Page lifecycle: initial start and re-initialization on navigation

use crate::discovery::TabPage;
use crate::storage::PreferenceBackend;
use crate::sync::TabSync;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Runs a task once after a delay
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
}

/// Browser events after which page content may have been swapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    PopState,
    HashChange,
    PushState,
    ReplaceState,
    VisibilityChange { visible: bool },
}

impl NavigationEvent {
    pub fn triggers_reinit(self) -> bool {
        match self {
            NavigationEvent::VisibilityChange { visible } => visible,
            _ => true,
        }
    }
}

/// Owns the initialized flag for one page view
pub struct Lifecycle<P, B, S> {
    sync: Rc<TabSync<P, B>>,
    scheduler: S,
    delay: Duration,
    state: Cell<LifecycleState>,
}

impl<P, B, S> Lifecycle<P, B, S>
where
    P: TabPage + 'static,
    B: PreferenceBackend + 'static,
    S: Scheduler + 'static,
{
    pub fn new(sync: Rc<TabSync<P, B>>, scheduler: S, delay: Duration) -> Rc<Self> {
        Rc::new(Lifecycle {
            sync,
            scheduler,
            delay,
            state: Cell::new(LifecycleState::Uninitialized),
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn sync(&self) -> &Rc<TabSync<P, B>> {
        &self.sync
    }

    /// Run the first initialization. Returns false if already started.
    pub fn start(&self) -> bool {
        if self.state.get() == LifecycleState::Initialized {
            log::debug!("Tab sync already started");
            return false;
        }
        self.sync.initialize();
        self.state.set(LifecycleState::Initialized);
        true
    }

    /// Return to the uninitialized state; re-initializations already
    /// scheduled become no-ops
    pub fn stop(&self) {
        self.state.set(LifecycleState::Uninitialized);
    }

    pub fn reinitialize(&self) {
        if self.state.get() == LifecycleState::Uninitialized {
            return;
        }
        self.sync.initialize();
    }

    /// Schedule a delayed re-initialization if `event` calls for one
    pub fn handle_navigation(self: &Rc<Self>, event: NavigationEvent) -> bool {
        if self.state.get() == LifecycleState::Uninitialized || !event.triggers_reinit() {
            return false;
        }
        log::debug!("Re-initializing in {:?} after {:?}", self.delay, event);
        let lifecycle = Rc::clone(self);
        self.scheduler
            .schedule(self.delay, Box::new(move || lifecycle.reinitialize()));
        true
    }

    /// Re-initialize right away when new tab groups were inserted
    pub fn handle_content_added(&self, contains_tab_set: bool) -> bool {
        if !contains_tab_set {
            return false;
        }
        log::debug!("Tab group inserted, re-initializing");
        self.reinitialize();
        true
    }
}
