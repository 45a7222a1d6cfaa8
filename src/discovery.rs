/// Tab discovery: finding and classifying project tabs on the page

use crate::project::{Project, classify_label};
use std::rc::Rc;

/// Access to the tab markup rendered by the theme
pub trait TabPage {
    type Label: TabLabel;
    type Input: TabInput;

    /// Every label inside a tab group container, in document order
    fn tab_labels(&self) -> Vec<Self::Label>;

    /// Resolve a label's `for` target
    fn input_by_id(&self, id: &str) -> Option<Self::Input>;
}

/// A clickable tab label
pub trait TabLabel {
    fn text(&self) -> Option<String>;

    /// Value of the label's `for` attribute
    fn target_id(&self) -> Option<String>;

    /// Record the project on the element for stylesheets
    fn mark_project(&self, project: Project);

    /// Whether the synchronizer named `owner` already handles clicks here
    fn is_wired(&self, owner: &str) -> bool;
    fn mark_wired(&self, owner: &str);
    fn on_click(&self, handler: Rc<dyn Fn()>);
}

/// The radio input behind a tab label
pub trait TabInput {
    fn is_checked(&self) -> bool;
    fn set_checked(&self, checked: bool);

    /// Dispatch a bubbling `change` event
    fn notify_change(&self);
}

/// A discovered project tab
///
/// Entries are rebuilt on every pass; the theme may replace the elements
/// at any time, so they must not be kept around.
#[derive(Debug, Clone)]
pub struct TabEntry<L, I> {
    pub label: L,
    pub input: I,
    pub project: Project,
}

/// Find all project tabs currently on the page
///
/// Matched labels get their project attribute set even when their input
/// cannot be resolved. Input state is never touched here.
pub fn find_project_tabs<P: TabPage>(page: &P) -> Vec<TabEntry<P::Label, P::Input>> {
    page.tab_labels()
        .into_iter()
        .filter_map(|label| {
            let project = classify_label(&label.text()?)?;
            label.mark_project(project);

            let input = label
                .target_id()
                .filter(|id| !id.is_empty())
                .and_then(|id| page.input_by_id(&id))?;

            Some(TabEntry {
                label,
                input,
                project,
            })
        })
        .collect()
}
