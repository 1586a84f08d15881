//! Module completion detection.
//!
//! A module is complete when the user holds a completion record for every
//! exercise it contains. The detector is a pure set comparison; the
//! one-time bonus guard lives in the store's completion marker.

use std::collections::HashSet;

use praxis_types::ExerciseId;

/// Points credited once when a module is first completed.
pub const MODULE_BONUS_POINTS: u32 = 50;

/// XP granted alongside the module completion bonus.
pub const MODULE_BONUS_XP: u64 = 50;

/// Return whether every required exercise has a completion record.
///
/// An empty module is never considered complete -- otherwise every user
/// would earn its bonus without doing anything.
pub fn is_module_complete(required: &[ExerciseId], completed: &[ExerciseId]) -> bool {
    if required.is_empty() {
        return false;
    }
    let done: HashSet<ExerciseId> = completed.iter().copied().collect();
    required.iter().all(|id| done.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module_is_never_complete() {
        assert!(!is_module_complete(&[], &[]));
        assert!(!is_module_complete(&[], &[ExerciseId::new()]));
    }

    #[test]
    fn partial_completion_is_incomplete() {
        let required: Vec<_> = (0..4).map(|_| ExerciseId::new()).collect();
        let completed: Vec<_> = required.iter().take(3).copied().collect();
        assert!(!is_module_complete(&required, &completed));
    }

    #[test]
    fn full_completion_is_complete() {
        let required: Vec<_> = (0..4).map(|_| ExerciseId::new()).collect();
        assert!(is_module_complete(&required, &required.clone()));
    }

    #[test]
    fn extra_completions_do_not_matter() {
        let required: Vec<_> = (0..2).map(|_| ExerciseId::new()).collect();
        let mut completed = required.clone();
        completed.push(ExerciseId::new());
        assert!(is_module_complete(&required, &completed));
    }
}
