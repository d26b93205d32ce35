use crate::types::WorkoutId;

/// Ways the confirmation modal can be closed without deleting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismiss {
    CloseButton,
    Overlay,
    Cancel,
}

/// Confirmation gate in front of a single-workout deletion.
#[derive(Debug, Default, Clone)]
pub struct ConfirmModal {
    pending: Option<WorkoutId>,
}

impl ConfirmModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub const fn pending(&self) -> Option<&WorkoutId> {
        self.pending.as_ref()
    }

    /// Opening again while open retargets the modal to the newest request.
    pub fn open(&mut self, id: WorkoutId) {
        self.pending = Some(id);
    }

    /// Closes the modal and hands back the workout to delete.
    pub fn confirm(&mut self) -> Option<WorkoutId> {
        self.pending.take()
    }

    pub fn dismiss(&mut self, how: Dismiss) {
        if let Some(id) = self.pending.take() {
            tracing::debug!(id = %id, ?how, "deletion cancelled");
        }
    }
}
