/// Project identifiers and tab label classification
use std::fmt;

/// One of the two mutually exclusive tab categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Project {
    Bedrock,
    Springfield,
}

impl Project {
    /// All projects, in matching order
    pub const ALL: [Project; 2] = [Project::Bedrock, Project::Springfield];

    pub fn as_str(self) -> &'static str {
        match self {
            Project::Bedrock => "bedrock",
            Project::Springfield => "springfield",
        }
    }

    /// Parse a stored preference. Only the exact identifier is accepted.
    pub fn from_stored(value: &str) -> Option<Project> {
        Project::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a tab label by its text
///
/// The text is trimmed and lowercased, then compared against each project
/// in declared order. A label matches when it equals the identifier or
/// starts with it, so "Bedrock (recommended)" is still a bedrock tab.
pub fn classify_label(text: &str) -> Option<Project> {
    let normalized = text.trim().to_lowercase();
    Project::ALL
        .into_iter()
        .find(|p| normalized.starts_with(p.as_str()))
}
