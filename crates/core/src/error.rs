use serde::{Deserialize, Serialize};

/// Error categories, used by the cycle driver to decide how far a failure reaches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An expected element or label pattern is missing from the document
    StructuralMismatch,
    /// The document never reached a harvestable state
    Timeout,
    /// Browser/driver errors, including failure to open a viewport
    Browser,
    /// Navigation or page load errors
    Navigation,
    /// JavaScript execution errors
    Script,
    /// Failure delivering a record to a sink
    Publish,
}

/// How far a failure propagates through the harvest cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only the current attempt is lost; the abort policy decides what happens next
    Attempt,
    /// Delivery failure; logged and otherwise unobserved
    Unobserved,
    /// The whole run halts
    Fatal,
}

/// Structured error with context for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestError {
    pub category: ErrorCategory,
    pub message: String,
    /// Optional context (selector, url, attempt, ...)
    pub context: serde_json::Value,
}

impl HarvestError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn severity(&self) -> Severity {
        match self.category {
            ErrorCategory::StructuralMismatch | ErrorCategory::Timeout => Severity::Attempt,
            ErrorCategory::Publish => Severity::Unobserved,
            ErrorCategory::Browser | ErrorCategory::Navigation | ErrorCategory::Script => {
                Severity::Fatal
            }
        }
    }

    // Convenience constructors
    pub fn missing_element(what: &str, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        Self::new(
            ErrorCategory::StructuralMismatch,
            format!("{} not found: {}", what, selector),
        )
        .with_context(serde_json::json!({ "element": what, "selector": selector }))
    }

    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::StructuralMismatch, message)
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Script, message)
    }

    pub fn publish_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Publish, message)
    }
}

impl std::fmt::Display for HarvestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.category, self.message)
    }
}

impl std::error::Error for HarvestError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_category() {
        assert_eq!(HarvestError::mismatch("x").severity(), Severity::Attempt);
        assert_eq!(HarvestError::timeout_error("x").severity(), Severity::Attempt);
        assert_eq!(HarvestError::publish_error("x").severity(), Severity::Unobserved);
        assert_eq!(HarvestError::browser_error("x").severity(), Severity::Fatal);
        assert_eq!(HarvestError::navigation_error("x").severity(), Severity::Fatal);
        assert_eq!(HarvestError::script_error("x").severity(), Severity::Fatal);
    }

    #[test]
    fn missing_element_carries_selector_context() {
        let err = HarvestError::missing_element("white player label", ".user-link[0]");
        assert_eq!(err.category, ErrorCategory::StructuralMismatch);
        assert_eq!(err.context["selector"], ".user-link[0]");
        assert_eq!(
            err.to_string(),
            "[StructuralMismatch] white player label not found: .user-link[0]"
        );
    }
}
