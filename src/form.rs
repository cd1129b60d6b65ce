// Location form - create/edit draft
//
// Seeded from the edit target (or blank for create). On submit it persists
// itself through the store; the caller then fires the workflow's
// save-completed callback. A failed submit leaves the form open.

use crate::entities::{Location, LocationCategory};
use crate::error::FormError;
use crate::store::LocationStore;

#[derive(Debug, Clone, PartialEq)]
pub struct LocationForm {
    target: Option<Location>,
    pub name: String,
    pub category: LocationCategory,
}

impl LocationForm {
    /// `None` means create mode
    pub fn new(target: Option<&Location>) -> Self {
        match target {
            Some(location) => LocationForm {
                target: Some(location.clone()),
                name: location.name.clone(),
                category: location.category,
            },
            None => LocationForm {
                target: None,
                name: String::new(),
                category: LocationCategory::default(),
            },
        }
    }

    /// Form pre-filled with submitted values (API requests)
    pub fn with_values(
        target: Option<&Location>,
        name: impl Into<String>,
        category: LocationCategory,
    ) -> Self {
        let mut form = Self::new(target);
        form.name = name.into();
        form.category = category;
        form
    }

    pub fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    pub fn push_char(&mut self, c: char) {
        self.name.push(c);
    }

    pub fn pop_char(&mut self) {
        self.name.pop();
    }

    pub fn cycle_category(&mut self) {
        self.category = self.category.next();
    }

    /// Validate and persist. Returns the saved location.
    pub fn submit<S>(&self, store: &S) -> Result<Location, FormError>
    where
        S: LocationStore + ?Sized,
    {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyName);
        }

        match &self.target {
            Some(existing) => {
                let updated = existing.edited(name, self.category);
                store.update_location(&updated)?;
                Ok(updated)
            }
            None => Ok(store.create_location(name, self.category)?),
        }
    }
}
