//! Core library for classcal.
//!
//! - `catalog` and `class_event`: the classes users can pick from
//! - `selection`: which classes are picked
//! - `ics`: iCalendar document generation
//! - `export`: delivering the document as a file

pub mod catalog;
pub mod class_event;
pub mod config;
pub mod date_range;
pub mod error;
pub mod export;
pub mod ics;
pub mod reminders;
pub mod selection;

pub use catalog::{Catalog, ClassFilter};
pub use class_event::{ClassEvent, ClassId};
pub use error::{ClassCalError, ClassCalResult};
pub use selection::Selection;
