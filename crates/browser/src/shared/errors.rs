use cracker_core::HarvestError;

pub fn to_harvest_error(e: impl std::fmt::Display, action: &str) -> HarvestError {
    let s = e.to_string();
    if s.contains("timeout") || s.contains("Timeout") {
        HarvestError::timeout_error(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") {
        HarvestError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if is_context_lost(&s) {
        HarvestError::script_error(format!("{} lost its page context: {}", action, s))
    } else {
        HarvestError::browser_error(format!("{} failed: {}", action, s))
    }
}

/// The page is mid-navigation and its JS context is gone.
pub fn is_context_lost(message: &str) -> bool {
    message.contains("Cannot find context") || message.contains("Execution context was destroyed")
}
