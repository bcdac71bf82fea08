//! Which classes the user picked for export.
//!
//! The selection is an ordinary value owned by whoever drives the export.
//! Ids are unique and kept in insertion order so previews list classes
//! in the order they were picked.

use crate::catalog::Catalog;
use crate::class_event::{ClassEvent, ClassId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<ClassId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns true if `id` is selected afterwards.
    pub fn toggle(&mut self, id: ClassId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Select `id`. Returns false if it was already selected.
    pub fn add(&mut self, id: ClassId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Deselect `id`. Returns whether it was selected; absent ids are not an error.
    pub fn remove(&mut self, id: &ClassId) -> bool {
        match self.ids.iter().position(|i| i == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.ids.contains(id)
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Export is only possible with at least one class selected.
    pub fn can_export(&self) -> bool {
        !self.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ClassId> {
        self.ids.iter()
    }

    /// Look up the selected classes in `catalog`, in selection order.
    /// Ids that are not in the catalog are returned separately.
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> (Vec<&'a ClassEvent>, Vec<ClassId>) {
        let mut found = Vec::with_capacity(self.ids.len());
        let mut missing = Vec::new();

        for id in &self.ids {
            match catalog.get(id) {
                Some(class) => found.push(class),
                None => {
                    log::warn!("Selected class '{}' is not in the catalog", id);
                    missing.push(id.clone());
                }
            }
        }

        (found, missing)
    }
}

impl FromIterator<ClassId> for Selection {
    fn from_iter<I: IntoIterator<Item = ClassId>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for id in iter {
            selection.add(id);
        }
        selection
    }
}
