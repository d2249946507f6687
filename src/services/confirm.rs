/// A destructive action waiting for the user to confirm or decline it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteCourse { id: i64, title: String },
    DeleteCompetency { id: i64, name: String },
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::DeleteCourse { title, .. } => format!("Delete {}?", title),
            PendingAction::DeleteCompetency { name, .. } => format!("Delete competency {}?", name),
        }
    }
}

/// Confirmation dialog state. Holds at most one pending action; a new
/// request replaces the previous one.
#[derive(Debug, Default)]
pub struct Confirmation {
    pending: Option<PendingAction>,
}

impl Confirmation {
    pub fn request(&mut self, action: PendingAction) {
        self.pending = Some(action);
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> Option<String> {
        self.pending.as_ref().map(PendingAction::prompt)
    }

    /// Close the dialog, handing the action to the caller to execute.
    pub fn confirm(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Close the dialog without doing anything.
    pub fn cancel(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }
}
