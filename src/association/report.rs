#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFailure {
    pub extension: String,
    pub reason: String,
}

impl ExtensionFailure {
    pub fn new(extension: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            reason: reason.into(),
        }
    }
}

// Outcome of a sub-step that may fail without failing its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort {
    Applied,
    NotApplicable,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<ExtensionFailure>,
}

impl AssociationResult {
    pub fn is_success(&self) -> bool {
        !self.succeeded.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut message = String::new();
        if !self.succeeded.is_empty() {
            message.push_str("Successfully associated:\n");
            message.push_str(&self.succeeded.join(", "));
            message.push_str("\n\n");
        }
        push_failures(&mut message, "Failed to associate:", &self.failed);
        if self.succeeded.is_empty() && self.failed.is_empty() {
            message.push_str("No file extensions are configured.\n\n");
        }
        message.push_str("Changes should take effect immediately.\n");
        message.push_str("If file icons don't update, try:\n");
        message.push_str("1. Restart File Explorer (Task Manager > Restart 'Windows Explorer')\n");
        message.push_str("2. Log out and log back in\n");
        message.push_str("3. Restart your computer");
        message
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnassociationResult {
    pub removed: Vec<String>,
    pub failed: Vec<ExtensionFailure>,
}

impl UnassociationResult {
    pub fn summary(&self) -> String {
        let mut message = String::new();
        if !self.removed.is_empty() {
            message.push_str("Removed associations for:\n");
            message.push_str(&self.removed.join(", "));
            message.push_str("\n\n");
        }
        push_failures(&mut message, "Failed to remove:", &self.failed);
        if message.is_empty() {
            message.push_str("No Slicer Launcher associations were found.\n\n");
        }
        message.push_str("Changes should take effect immediately.\n");
        message.push_str("You may need to restart File Explorer for icons to update.");
        message
    }
}

fn push_failures(message: &mut String, heading: &str, failed: &[ExtensionFailure]) {
    if failed.is_empty() {
        return;
    }
    message.push_str(heading);
    message.push('\n');
    for failure in failed {
        message.push_str(&format!("{}: {}\n", failure.extension, failure.reason));
    }
    message.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_association_is_success() {
        let result = AssociationResult {
            succeeded: vec![".stl".to_string()],
            failed: vec![ExtensionFailure::new(".3mf", "access denied")],
        };
        assert!(result.is_success());
        let summary = result.summary();
        assert!(summary.starts_with("Successfully associated:\n.stl\n\n"));
        assert!(summary.contains("Failed to associate:\n.3mf: access denied\n"));
    }

    #[test]
    fn empty_association_is_failure() {
        let result = AssociationResult {
            succeeded: Vec::new(),
            failed: vec![ExtensionFailure::new(".stl", "access denied")],
        };
        assert!(!result.is_success());
        assert!(!result.summary().contains("Successfully associated"));
    }

    #[test]
    fn unassociation_without_changes_says_nothing_found() {
        let summary = UnassociationResult::default().summary();
        assert!(summary.starts_with("No Slicer Launcher associations were found."));
    }

    #[test]
    fn unassociation_lists_removed_extensions() {
        let result = UnassociationResult {
            removed: vec![".3mf".to_string(), ".stl".to_string()],
            failed: Vec::new(),
        };
        assert!(result
            .summary()
            .starts_with("Removed associations for:\n.3mf, .stl\n\n"));
    }
}
