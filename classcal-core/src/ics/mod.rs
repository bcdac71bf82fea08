//! iCalendar document generation.
//!
//! This module writes RFC 5545 documents for a set of classes: one VEVENT
//! per class, one VALARM per reminder, UTC timestamps throughout.

mod escape;
mod generate;
mod timestamp;

pub use escape::{escape_text, fold_line};
pub use generate::{
    CalendarDocument, CalendarOptions, DEFAULT_PRODUCT_ID, DataQualityPolicy, SkippedEvent,
    build_calendar, build_calendar_at,
};
pub use timestamp::{format_utc, local_to_utc};
