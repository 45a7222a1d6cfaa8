/// web-sys implementation of the tab page traits

use crate::discovery::{TabInput, TabLabel, TabPage};
use crate::project::Project;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventInit, HtmlInputElement};

/// Space-separated owners of the click handlers a label carries
pub const WIRED_ATTRIBUTE: &str = "data-project-sync";

/// The live document
#[derive(Clone)]
pub struct DomPage {
    document: Document,
    label_selector: Rc<str>,
    project_attribute: Rc<str>,
}

impl DomPage {
    pub fn new(document: Document, label_selector: &str, project_attribute: &str) -> Self {
        DomPage {
            document,
            label_selector: label_selector.into(),
            project_attribute: project_attribute.into(),
        }
    }
}

impl TabPage for DomPage {
    type Label = DomLabel;
    type Input = DomInput;

    fn tab_labels(&self) -> Vec<DomLabel> {
        let nodes = match self.document.query_selector_all(&self.label_selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("Invalid label selector {:?}: {:?}", self.label_selector, e);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| DomLabel {
                element,
                project_attribute: Rc::clone(&self.project_attribute),
            })
            .collect()
    }

    fn input_by_id(&self, id: &str) -> Option<DomInput> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(DomInput)
    }
}

#[derive(Clone)]
pub struct DomLabel {
    element: Element,
    project_attribute: Rc<str>,
}

impl DomLabel {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl TabLabel for DomLabel {
    fn text(&self) -> Option<String> {
        self.element.text_content()
    }

    fn target_id(&self) -> Option<String> {
        self.element.get_attribute("for")
    }

    fn mark_project(&self, project: Project) {
        if let Err(e) = self
            .element
            .set_attribute(&self.project_attribute, project.as_str())
        {
            log::debug!("Could not mark label: {:?}", e);
        }
    }

    fn is_wired(&self, owner: &str) -> bool {
        self.element
            .get_attribute(WIRED_ATTRIBUTE)
            .is_some_and(|owners| owners.split_whitespace().any(|o| o == owner))
    }

    fn mark_wired(&self, owner: &str) {
        let owners = match self.element.get_attribute(WIRED_ATTRIBUTE) {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), owner),
            _ => owner.to_string(),
        };
        if let Err(e) = self.element.set_attribute(WIRED_ATTRIBUTE, &owners) {
            log::debug!("Could not mark label as wired: {:?}", e);
        }
    }

    fn on_click(&self, handler: Rc<dyn Fn()>) {
        let closure = Closure::<dyn Fn()>::new(move || handler());
        let attached = self
            .element
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        match attached {
            // The handler lives as long as the element does
            Ok(()) => closure.forget(),
            Err(e) => log::warn!("Could not attach click handler: {:?}", e),
        }
    }
}

#[derive(Clone)]
pub struct DomInput(HtmlInputElement);

impl DomInput {
    pub fn element(&self) -> &HtmlInputElement {
        &self.0
    }
}

impl TabInput for DomInput {
    fn is_checked(&self) -> bool {
        self.0.checked()
    }

    fn set_checked(&self, checked: bool) {
        self.0.set_checked(checked);
    }

    fn notify_change(&self) {
        let init = EventInit::new();
        init.set_bubbles(true);
        let dispatched = Event::new_with_event_init_dict("change", &init)
            .and_then(|event| self.0.dispatch_event(&event));
        if let Err(e) = dispatched {
            log::warn!("Could not dispatch change event: {:?}", e);
        }
    }
}
