/// In-memory page, storage and scheduler for unit tests
///
/// `MockPage` models labels and inputs only. It does not emulate radio
/// group exclusivity: checking one input leaves its siblings alone.

use crate::discovery::{TabInput, TabLabel, TabPage};
use crate::lifecycle::Scheduler;
use crate::project::Project;
use crate::storage::{PreferenceBackend, StorageError};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct LabelState {
    text: String,
    target_id: Option<String>,
    project: RefCell<Option<String>>,
    wired_by: RefCell<Vec<String>>,
    handlers: RefCell<Vec<Rc<dyn Fn()>>>,
}

#[derive(Clone, Default)]
pub struct MockLabel(Rc<LabelState>);

impl MockLabel {
    /// Run every click handler, as a user click would
    pub fn click(&self) {
        let handlers = self.0.handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }

    pub fn handler_count(&self) -> usize {
        self.0.handlers.borrow().len()
    }

    pub fn project_attribute(&self) -> Option<String> {
        self.0.project.borrow().clone()
    }
}

impl TabLabel for MockLabel {
    fn text(&self) -> Option<String> {
        Some(self.0.text.clone())
    }

    fn target_id(&self) -> Option<String> {
        self.0.target_id.clone()
    }

    fn mark_project(&self, project: Project) {
        *self.0.project.borrow_mut() = Some(project.as_str().to_string());
    }

    fn is_wired(&self, owner: &str) -> bool {
        self.0.wired_by.borrow().iter().any(|o| o == owner)
    }

    fn mark_wired(&self, owner: &str) {
        self.0.wired_by.borrow_mut().push(owner.to_string());
    }

    fn on_click(&self, handler: Rc<dyn Fn()>) {
        self.0.handlers.borrow_mut().push(handler);
    }
}

#[derive(Default)]
struct InputState {
    checked: Cell<bool>,
    changes: Cell<usize>,
}

#[derive(Clone, Default)]
pub struct MockInput(Rc<InputState>);

impl MockInput {
    pub fn change_count(&self) -> usize {
        self.0.changes.get()
    }
}

impl TabInput for MockInput {
    fn is_checked(&self) -> bool {
        self.0.checked.get()
    }

    fn set_checked(&self, checked: bool) {
        self.0.checked.set(checked);
    }

    fn notify_change(&self) {
        self.0.changes.set(self.0.changes.get() + 1);
    }
}

#[derive(Default)]
struct MockDom {
    labels: Vec<MockLabel>,
    inputs: HashMap<String, MockInput>,
    next_id: usize,
}

/// Shared handle to an in-memory document
#[derive(Clone, Default)]
pub struct MockPage(Rc<RefCell<MockDom>>);

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tab group; each tab is `(label text, checked)`
    pub fn add_tab_set(&self, tabs: &[(&str, bool)]) -> Vec<(MockLabel, MockInput)> {
        tabs.iter()
            .map(|(text, checked)| {
                let id = {
                    let mut dom = self.0.borrow_mut();
                    dom.next_id += 1;
                    format!("__tabbed_{}", dom.next_id)
                };
                let input = self.add_input(&id, *checked);
                let label = self.add_label(text, Some(&id));
                (label, input)
            })
            .collect()
    }

    pub fn add_label(&self, text: &str, target_id: Option<&str>) -> MockLabel {
        let label = MockLabel(Rc::new(LabelState {
            text: text.to_string(),
            target_id: target_id.map(str::to_string),
            ..Default::default()
        }));
        self.0.borrow_mut().labels.push(label.clone());
        label
    }

    pub fn add_input(&self, id: &str, checked: bool) -> MockInput {
        let input = MockInput::default();
        input.set_checked(checked);
        self.0.borrow_mut().inputs.insert(id.to_string(), input.clone());
        input
    }

    /// Drop every element, as an instant navigation swap does
    pub fn replace_content(&self) {
        let mut dom = self.0.borrow_mut();
        dom.labels.clear();
        dom.inputs.clear();
    }
}

impl TabPage for MockPage {
    type Label = MockLabel;
    type Input = MockInput;

    fn tab_labels(&self) -> Vec<MockLabel> {
        self.0.borrow().labels.clone()
    }

    fn input_by_id(&self, id: &str) -> Option<MockInput> {
        self.0.borrow().inputs.get(id).cloned()
    }
}

#[derive(Default)]
struct BackendState {
    items: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

/// Storage backend that can be switched into a failing mode
#[derive(Clone, Default)]
pub struct MockBackend(Rc<BackendState>);

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.0
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.failing.set(failing);
    }

    /// Raw stored value, bypassing the failure switch
    pub fn value(&self, key: &str) -> Option<String> {
        self.0.items.borrow().get(key).cloned()
    }
}

impl PreferenceBackend for MockBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.0.failing.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self.value(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.0.failing.get() {
            return Err(StorageError::Write("QuotaExceededError".to_string()));
        }
        self.0
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

type Task = (Duration, Box<dyn FnOnce()>);

/// Scheduler that queues tasks until the test runs them
#[derive(Clone, Default)]
pub struct ManualScheduler(Rc<RefCell<Vec<Task>>>);

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_delays(&self) -> Vec<Duration> {
        self.0.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    /// Run everything queued so far; returns how many tasks ran
    pub fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.0.borrow_mut());
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.0.borrow_mut().push((delay, task));
    }
}
