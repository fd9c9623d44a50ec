use super::domain::ManifestoId;

/// Tracks which ranked result, if any, has its policy breakdown open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailExpander {
    open: Option<ManifestoId>,
}

impl DetailExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses `id` if it is open, otherwise opens it in place of any other.
    pub fn toggle(&mut self, id: &ManifestoId) -> Option<&ManifestoId> {
        if self.open.as_ref() == Some(id) {
            self.open = None;
        } else {
            self.open = Some(id.clone());
        }
        self.open.as_ref()
    }

    pub fn expanded(&self) -> Option<&ManifestoId> {
        self.open.as_ref()
    }

    pub fn is_expanded(&self, id: &ManifestoId) -> bool {
        self.open.as_ref() == Some(id)
    }

    pub fn collapse(&mut self) {
        self.open = None;
    }
}
