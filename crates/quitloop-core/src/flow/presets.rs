//! Fixed vocabularies offered by the presentation layer.

use std::ops::RangeInclusive;

/// Body sensations offered during `notice`.
pub const SENSATIONS: [&str; 6] = [
    "tight chest",
    "warmth",
    "tingle",
    "restless",
    "pressure",
    "other",
];

/// Tiny replacement actions offered during `choose`.
pub const ACTIONS: [&str; 5] = [
    "10 pushups",
    "2-min walk",
    "cold water",
    "text a friend",
    "stretch",
];

/// Buttons shown during `label`. The controller does not enforce it.
pub const INTENSITY_SCALE: RangeInclusive<i32> = 0..=10;

/// Preset action by 1-based menu number.
pub fn action_by_number(n: usize) -> Option<&'static str> {
    n.checked_sub(1).and_then(|i| ACTIONS.get(i).copied())
}

/// The implementation-intention sentence shown before the timer.
pub fn intention_statement(action: &str) -> String {
    let action = action.trim();
    let action = if action.is_empty() {
        "choose an action"
    } else {
        action
    };
    format!("If I feel a strong urge, then I will {action} for 2 minutes.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_menu_is_one_based() {
        assert_eq!(action_by_number(0), None);
        assert_eq!(action_by_number(1), Some("10 pushups"));
        assert_eq!(action_by_number(3), Some("cold water"));
        assert_eq!(action_by_number(6), None);
    }

    #[test]
    fn intention_falls_back_when_blank() {
        assert_eq!(
            intention_statement("  "),
            "If I feel a strong urge, then I will choose an action for 2 minutes."
        );
        assert_eq!(
            intention_statement("stretch"),
            "If I feel a strong urge, then I will stretch for 2 minutes."
        );
    }
}
