//! The class catalog: every class a user can pick from.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::class_event::{ClassEvent, ClassId};
use crate::date_range::DateRange;
use crate::error::{ClassCalError, ClassCalResult};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: Vec<ClassEvent>,
}

impl Catalog {
    pub fn new(classes: Vec<ClassEvent>) -> ClassCalResult<Self> {
        let mut seen = HashSet::new();
        for class in &classes {
            if !seen.insert(&class.id) {
                return Err(ClassCalError::Catalog(format!("Duplicate class id '{}'", class.id)));
            }
        }
        Ok(Catalog { classes })
    }

    /// Parse a catalog file: either a bare array of classes or
    /// `{ "classes": [...] }`.
    pub fn from_json(content: &str) -> ClassCalResult<Self> {
        let value: Value = serde_json::from_str(content).map_err(catalog_error)?;

        let list = match value {
            array @ Value::Array(_) => array,
            Value::Object(mut fields) => fields.remove("classes").ok_or_else(|| {
                ClassCalError::Catalog("expected an array or a \"classes\" field".into())
            })?,
            _ => return Err(ClassCalError::Catalog("expected an array of classes".into())),
        };

        let classes: Vec<ClassEvent> = serde_json::from_value(list).map_err(catalog_error)?;
        Self::new(classes)
    }

    pub fn load(path: &Path) -> ClassCalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassCalError::Catalog(format!("Could not read {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_json(&content).map_err(|e| match e {
            ClassCalError::Catalog(msg) => {
                ClassCalError::Catalog(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        log::debug!("Loaded {} classes from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn classes(&self) -> &[ClassEvent] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, id: &ClassId) -> Option<&ClassEvent> {
        self.classes.iter().find(|c| &c.id == id)
    }

    /// Find the id whose textual form matches user input ("12", "lab-2").
    ///
    /// A quoted input (`"12"`) only matches string ids. Unquoted input that
    /// matches both a numeric and a string id is rejected as ambiguous.
    pub fn resolve_id(&self, input: &str) -> ClassCalResult<Option<ClassId>> {
        let input = input.trim();

        if let Some(text) = input.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            let id = ClassId::from(text);
            return Ok(self.get(&id).map(|c| c.id.clone()));
        }

        let mut matches = self.classes.iter().filter(|c| c.id.to_string() == input);
        let found = matches.next().map(|c| c.id.clone());

        if matches.next().is_some() {
            return Err(ClassCalError::validation(format!(
                "Class id '{input}' is both a number and a string in the catalog; \
                 quote it (\"{input}\") to pick the string id"
            )));
        }

        Ok(found)
    }

    /// Classes matching the filter, ordered by date then start time.
    /// Classes with an unparseable date never match a date-bounded filter;
    /// unparseable dates or times sort last.
    pub fn filter(&self, filter: &ClassFilter) -> Vec<&ClassEvent> {
        let mut matches: Vec<&ClassEvent> =
            self.classes.iter().filter(|c| filter.matches(c)).collect();
        matches.sort_by_cached_key(|c| {
            let date = c.parsed_date().ok();
            let start = c.start_time();
            (date.is_none(), date, start.is_none(), start)
        });
        matches
    }
}

/// Criteria for narrowing down the catalog. Text matches are
/// case-insensitive substring matches.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub modality: Option<String>,
    pub instructor: Option<String>,
    pub search: Option<String>,
    pub dates: DateRange,
}

impl ClassFilter {
    pub fn matches(&self, class: &ClassEvent) -> bool {
        if let Some(ref modality) = self.modality {
            if !contains_ci(&class.modality, modality) {
                return false;
            }
        }

        if let Some(ref instructor) = self.instructor {
            if !contains_ci(&class.instructor, instructor) {
                return false;
            }
        }

        if let Some(ref needle) = self.search {
            let haystacks = [&class.title, &class.description, &class.location];
            if !haystacks.iter().any(|h| contains_ci(h, needle)) {
                return false;
            }
        }

        if !self.dates.is_unbounded() {
            match class.parsed_date() {
                Ok(date) => self.dates.contains(date),
                Err(_) => false,
            }
        } else {
            true
        }
    }
}

fn catalog_error(err: serde_json::Error) -> ClassCalError {
    ClassCalError::Catalog(err.to_string())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
