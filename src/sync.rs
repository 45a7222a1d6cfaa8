/// Activation and click wiring for project tabs

use crate::discovery::{TabEntry, TabInput, TabLabel, TabPage, find_project_tabs};
use crate::project::Project;
use crate::storage::{PreferenceBackend, PreferenceStore};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_OWNER: AtomicUsize = AtomicUsize::new(1);

/// Keeps every same-project tab on a page in step
pub struct TabSync<P, B> {
    page: P,
    store: PreferenceStore<B>,
    /// Marks the labels this synchronizer wired
    owner: String,
}

impl<P, B> TabSync<P, B>
where
    P: TabPage + 'static,
    B: PreferenceBackend + 'static,
{
    pub fn new(page: P, store: PreferenceStore<B>) -> Rc<Self> {
        let owner = format!("sync-{}", NEXT_OWNER.fetch_add(1, Ordering::Relaxed));
        Rc::new(TabSync { page, store, owner })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn store(&self) -> &PreferenceStore<B> {
        &self.store
    }

    pub fn find_project_tabs(&self) -> Vec<TabEntry<P::Label, P::Input>> {
        find_project_tabs(&self.page)
    }

    /// Check every unchecked input of `project`
    ///
    /// Each input that changes gets a bubbling `change` event so the theme
    /// reacts as it would to a real click. Returns how many inputs changed.
    pub fn activate_project(&self, project: Project) -> usize {
        let mut changed = 0;
        for tab in self.find_project_tabs() {
            if tab.project == project && !tab.input.is_checked() {
                tab.input.set_checked(true);
                tab.input.notify_change();
                changed += 1;
            }
        }
        log::debug!("Activated {}: {} tabs changed", project, changed);
        changed
    }

    /// Persist `project` and activate it everywhere on the page
    pub fn select_project(&self, project: Project) -> usize {
        self.store.set(project.as_str());
        self.activate_project(project)
    }

    /// Attach click handlers to project labels this synchronizer has not
    /// wired yet
    ///
    /// Handlers only hold a weak reference, so they go quiet once the
    /// synchronizer is dropped. Returns the number of labels wired by this
    /// call.
    pub fn setup_tab_listeners(self: &Rc<Self>) -> usize {
        let mut wired = 0;
        for tab in self.find_project_tabs() {
            if tab.label.is_wired(&self.owner) {
                continue;
            }
            let sync = Rc::downgrade(self);
            let project = tab.project;
            tab.label.on_click(Rc::new(move || {
                if let Some(sync) = sync.upgrade() {
                    sync.select_project(project);
                }
            }));
            tab.label.mark_wired(&self.owner);
            wired += 1;
        }
        log::debug!("Wired {} tab labels", wired);
        wired
    }

    /// Restore the stored preference and wire the current labels
    pub fn initialize(self: &Rc<Self>) {
        if let Some(project) = self.store.get_project() {
            self.activate_project(project);
        }
        self.setup_tab_listeners();
    }
}
