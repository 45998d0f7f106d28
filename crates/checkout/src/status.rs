use serde::{Deserialize, Serialize};

/// Display status recorded in the transaction row as the flow advances.
///
/// ```text
/// INITIATED ──► SELECTED ──► INITIALIZED ──► CONFIRMED
/// ```
///
/// Each value is the per-step default; the gateway may override it with its
/// own status string, so the persisted column stays free-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FlowStatus {
    /// Flow started; transaction row created.
    #[default]
    Initiated,

    /// An offer was selected.
    Selected,

    /// Checkout details were initialized.
    Initialized,

    /// The transaction was confirmed.
    Confirmed,
}

impl FlowStatus {
    /// Returns the status as the wire string recorded in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Initiated => "INITIATED",
            FlowStatus::Selected => "SELECTED",
            FlowStatus::Initialized => "INITIALIZED",
            FlowStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_initiated() {
        assert_eq!(FlowStatus::default(), FlowStatus::Initiated);
    }

    #[test]
    fn test_display_matches_wire_strings() {
        assert_eq!(FlowStatus::Initiated.to_string(), "INITIATED");
        assert_eq!(FlowStatus::Selected.to_string(), "SELECTED");
        assert_eq!(FlowStatus::Initialized.to_string(), "INITIALIZED");
        assert_eq!(FlowStatus::Confirmed.to_string(), "CONFIRMED");
    }
}
