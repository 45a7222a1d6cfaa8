/// Browser session: document-ready handling, observers and the history hook

use crate::config::SyncConfig;
use crate::dom::DomPage;
use crate::lifecycle::{Lifecycle, LifecycleState, NavigationEvent, Scheduler};
use crate::project::Project;
use crate::storage::{LocalStorage, PreferenceStore};
use crate::sync::TabSync;
use js_sys::{Array, Function, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, History,
    MutationObserver, MutationObserverInit, MutationRecord, Node, Window,
};

type DomLifecycle = Lifecycle<DomPage, LocalStorage, TimeoutScheduler>;

/// Scheduler backed by `window.setTimeout`
#[derive(Clone)]
pub struct TimeoutScheduler {
    window: Window,
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            log::warn!("Could not schedule re-initialization: {:?}", e);
        }
    }
}

/// An event listener removed again on drop
struct EventListener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        once: bool,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(callback);
        let options = AddEventListenerOptions::new();
        options.set_once(once);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(EventListener {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// True if `node` is a tab group container or has one inside it
pub fn contains_tab_set(node: &Node, tab_set_class: &str) -> bool {
    let Some(element) = node.dyn_ref::<Element>() else {
        return false;
    };
    element.class_list().contains(tab_set_class)
        || matches!(element.query_selector(&format!(".{}", tab_set_class)), Ok(Some(_)))
}

/// Watches the content root for inserted tab groups
struct ContentObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl ContentObserver {
    fn observe(root: &Element, tab_set_class: String, lifecycle: Rc<DomLifecycle>) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let added = records
                    .iter()
                    .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                    .any(|record| {
                        let nodes = record.added_nodes();
                        (0..nodes.length())
                            .filter_map(|i| nodes.get(i))
                            .any(|node| contains_tab_set(&node, &tab_set_class))
                    });
                lifecycle.handle_content_added(added);
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(root, &options)?;

        Ok(ContentObserver {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ContentObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

// Import JS bridge functions
#[wasm_bindgen(module = "/js/history_hook.js")]
extern "C" {
    fn wrapHistoryFunction(original: &Function, notify: &Function) -> Function;
}

/// A wrapped history method and the callback it reports through
struct HistoryWrapper {
    function: Function,
    _notify: Closure<dyn Fn()>,
}

impl HistoryWrapper {
    fn new(original: &Function, event: NavigationEvent, notify: Rc<dyn Fn(NavigationEvent)>) -> Self {
        let callback = Closure::<dyn Fn()>::new(move || notify(event));
        HistoryWrapper {
            function: wrapHistoryFunction(original, callback.as_ref().unchecked_ref()),
            _notify: callback,
        }
    }
}

/// Wraps `history.pushState` and `history.replaceState`
///
/// No event fires for programmatic navigation, so each wrapper applies the
/// saved original to the caller's own arguments and then reports the
/// navigation. A call the original rejects throws as before and reports
/// nothing. Dropping the hook puts the originals back.
pub struct HistoryHook {
    history: History,
    original_push: Function,
    original_replace: Function,
    push: HistoryWrapper,
    replace: HistoryWrapper,
}

impl HistoryHook {
    pub fn install(history: History, notify: Rc<dyn Fn(NavigationEvent)>) -> Result<Self, JsValue> {
        let original_push = history_function(&history, "pushState")?;
        let original_replace = history_function(&history, "replaceState")?;

        let hook = HistoryHook {
            push: HistoryWrapper::new(&original_push, NavigationEvent::PushState, Rc::clone(&notify)),
            replace: HistoryWrapper::new(&original_replace, NavigationEvent::ReplaceState, notify),
            history,
            original_push,
            original_replace,
        };

        // On failure the hook is dropped, restoring whatever was replaced
        Reflect::set(&hook.history, &"pushState".into(), &hook.push.function)?;
        Reflect::set(&hook.history, &"replaceState".into(), &hook.replace.function)?;
        Ok(hook)
    }
}

impl Drop for HistoryHook {
    fn drop(&mut self) {
        for (name, original) in [
            ("pushState", &self.original_push),
            ("replaceState", &self.original_replace),
        ] {
            if let Err(e) = Reflect::set(&self.history, &name.into(), original) {
                log::warn!("Could not restore history.{}: {:?}", name, e);
            }
        }
    }
}

fn history_function(history: &History, name: &str) -> Result<Function, JsValue> {
    Reflect::get(history, &name.into())?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("history.{} is not a function", name)))
}

struct Observers {
    _content: Option<ContentObserver>,
    _listeners: Vec<EventListener>,
    _history: Option<HistoryHook>,
}

struct Session {
    lifecycle: Rc<DomLifecycle>,
    config: SyncConfig,
    window: Window,
    document: Document,
    ready_listener: RefCell<Option<EventListener>>,
    observers: RefCell<Option<Observers>>,
    /// The session itself, held until `stop` so it lasts the page view
    keep_alive: RefCell<Option<Rc<Session>>>,
}

impl Session {
    fn on_ready(&self) {
        if !self.lifecycle.start() {
            return;
        }
        let observers = Observers {
            _content: self.observe_content(),
            _listeners: self.listen_for_navigation(),
            _history: self.hook_history(),
        };
        *self.observers.borrow_mut() = Some(observers);
        log::info!("Project tab sync started");
    }

    fn observe_content(&self) -> Option<ContentObserver> {
        let root = match self.document.query_selector(&self.config.content_selector) {
            Ok(Some(root)) => root,
            Ok(None) => {
                log::debug!("No {} element, instant navigation not observed", self.config.content_selector);
                return None;
            }
            Err(e) => {
                log::warn!("Invalid content selector: {:?}", e);
                return None;
            }
        };
        ContentObserver::observe(&root, self.config.tab_set_class.clone(), Rc::clone(&self.lifecycle))
            .map_err(|e| log::warn!("Could not observe content: {:?}", e))
            .ok()
    }

    fn listen_for_navigation(&self) -> Vec<EventListener> {
        let window: &EventTarget = &self.window;
        let page: &EventTarget = &self.document;

        let listeners = [
            self.navigation_listener(window, "popstate", |_| NavigationEvent::PopState),
            self.navigation_listener(window, "hashchange", |_| NavigationEvent::HashChange),
            self.navigation_listener(page, "visibilitychange", |document| {
                NavigationEvent::VisibilityChange {
                    visible: !document.hidden(),
                }
            }),
        ];
        listeners.into_iter().flatten().collect()
    }

    fn navigation_listener(
        &self,
        target: &EventTarget,
        kind: &'static str,
        to_event: fn(&Document) -> NavigationEvent,
    ) -> Option<EventListener> {
        let lifecycle = Rc::clone(&self.lifecycle);
        let document = self.document.clone();
        EventListener::new(target, kind, false, move |_| {
            lifecycle.handle_navigation(to_event(&document));
        })
        .map_err(|e| log::warn!("Could not listen for {}: {:?}", kind, e))
        .ok()
    }

    fn shut_down(&self) {
        self.ready_listener.borrow_mut().take();
        self.observers.borrow_mut().take();
        self.lifecycle.stop();
        self.keep_alive.borrow_mut().take();
    }

    fn hook_history(&self) -> Option<HistoryHook> {
        let lifecycle = Rc::clone(&self.lifecycle);
        let notify: Rc<dyn Fn(NavigationEvent)> = Rc::new(move |event: NavigationEvent| {
            lifecycle.handle_navigation(event);
        });
        self.window
            .history()
            .and_then(|history| HistoryHook::install(history, notify))
            .map_err(|e| log::warn!("Could not hook history: {:?}", e))
            .ok()
    }
}

/// Handle to a running tab synchronizer
///
/// The session runs for the rest of the page view whether or not the
/// handle is kept. `stop` is the only way to tear it down.
#[wasm_bindgen]
pub struct ProjectTabs {
    session: Rc<Session>,
}

impl ProjectTabs {
    /// Start now, or on `DOMContentLoaded` while the document is loading
    pub fn start(config: SyncConfig) -> Result<ProjectTabs, JsValue> {
        Self::launch(config, false)
    }

    /// Start on the next `DOMContentLoaded`, whatever the ready state
    pub fn start_deferred(config: SyncConfig) -> Result<ProjectTabs, JsValue> {
        Self::launch(config, true)
    }

    fn launch(config: SyncConfig, always_defer: bool) -> Result<ProjectTabs, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let page = DomPage::new(document.clone(), &config.label_selector, &config.project_attribute);
        let store = PreferenceStore::new(LocalStorage, config.storage_key.clone());
        let scheduler = TimeoutScheduler {
            window: window.clone(),
        };
        let lifecycle = Lifecycle::new(TabSync::new(page, store), scheduler, config.reinit_delay());

        let session = Rc::new(Session {
            lifecycle,
            config,
            window,
            document: document.clone(),
            ready_listener: RefCell::new(None),
            observers: RefCell::new(None),
            keep_alive: RefCell::new(None),
        });
        *session.keep_alive.borrow_mut() = Some(Rc::clone(&session));

        if always_defer || document.ready_state() == "loading" {
            let weak = Rc::downgrade(&session);
            let listener = EventListener::new(&document, "DOMContentLoaded", true, move |_| {
                if let Some(session) = weak.upgrade() {
                    session.on_ready();
                }
            })
            .inspect_err(|_| session.shut_down())?;
            *session.ready_listener.borrow_mut() = Some(listener);
            log::debug!("Waiting for DOMContentLoaded");
        } else {
            session.on_ready();
        }

        Ok(ProjectTabs { session })
    }
}

#[wasm_bindgen]
impl ProjectTabs {
    /// Persist and activate a project by name; false for unknown names
    pub fn select(&self, project: &str) -> bool {
        match Project::from_stored(project) {
            Some(project) => {
                self.session.lifecycle.sync().select_project(project);
                true
            }
            None => false,
        }
    }

    /// The raw stored preference
    pub fn preference(&self) -> Option<String> {
        self.session.lifecycle.sync().store().get()
    }

    /// Whether the session has started and not been stopped
    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.session.lifecycle.state() == LifecycleState::Initialized
    }

    /// Remove listeners and observers, restore `history` and release the
    /// session
    ///
    /// Click handlers already on the page go quiet once the session is gone.
    pub fn stop(self) {
        self.session.shut_down();
        log::info!("Project tab sync stopped");
    }
}
