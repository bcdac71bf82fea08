//! Reminder lead times, in minutes before a class starts.

/// The strictly positive lead times, in input order.
/// Zero and negative values are dropped without error.
pub fn effective(minutes: &[i64]) -> Vec<i64> {
    minutes.iter().copied().filter(|&m| m > 0).collect()
}

/// Whether the export flow insists on at least one reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderPolicy {
    #[default]
    Required,
    Optional,
}
