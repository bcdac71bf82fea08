//! Handing a finished calendar to the user as a file.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tempfile::NamedTempFile;

use crate::catalog::Catalog;
use crate::class_event::ClassId;
use crate::error::{ClassCalError, ClassCalResult};
use crate::ics::{CalendarOptions, SkippedEvent, build_calendar_at};
use crate::reminders::{self, ReminderPolicy};
use crate::selection::Selection;

pub const ICS_MIME_TYPE: &str = "text/calendar;charset=utf-8";

/// Somewhere a generated file can be delivered to.
pub trait DownloadTarget {
    /// Deliver `content` under `filename`, returning where it ended up.
    fn deliver(&self, filename: &str, content: &[u8], mime_type: &str) -> ClassCalResult<PathBuf>;
}

/// Writes downloads into a directory, like a browser's download folder.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryTarget { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadTarget for DirectoryTarget {
    fn deliver(&self, filename: &str, content: &[u8], mime_type: &str) -> ClassCalResult<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .filter(|n| n.to_string_lossy() == filename)
            .ok_or_else(|| ClassCalError::validation(format!("Invalid file name '{}'", filename)))?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);

        // Write next to the destination and rename, so a partial file never shows up.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| ClassCalError::Io(e.error))?;

        log::debug!("Wrote {} ({}, {} bytes)", path.display(), mime_type, content.len());
        Ok(path)
    }
}

/// Deliver `content` to `target` as `filename`.
///
/// The document buffer is consumed and released as soon as the target is
/// done with it.
pub fn trigger_download(
    target: &dyn DownloadTarget,
    filename: &str,
    content: String,
    mime_type: &str,
) -> ClassCalResult<PathBuf> {
    let result = target.deliver(filename, content.as_bytes(), mime_type);
    drop(content);
    result
}

/// `<purpose>_<YYYY-MM-DD>.ics`, with the purpose slugified.
pub fn export_filename(purpose: &str, date: NaiveDate) -> String {
    let slug = slug::slugify(purpose);
    let slug = if slug.is_empty() { "calendar".to_string() } else { slug };
    format!("{}_{}.ics", slug, date.format("%Y-%m-%d"))
}

/// Everything the export flow needs besides the catalog and the selection.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub reminders: Vec<i64>,
    pub reminder_policy: ReminderPolicy,
    pub options: CalendarOptions,
    pub purpose: String,
}

/// Outcome of a successful export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub event_count: usize,
    pub alarm_count: usize,
    pub skipped: Vec<SkippedEvent>,
    /// Selected ids that are not in the catalog
    pub missing: Vec<ClassId>,
    pub generated_at: DateTime<Utc>,
}

/// Build the calendar for the selected classes and deliver it.
///
/// The download is triggered exactly once when the document builds, and
/// never when the selection or the reminders are rejected.
pub fn export_selection(
    catalog: &Catalog,
    selection: &Selection,
    request: &ExportRequest,
    target: &dyn DownloadTarget,
    now: DateTime<Utc>,
) -> ClassCalResult<ExportReport> {
    if !selection.can_export() {
        return Err(ClassCalError::validation("no events selected"));
    }

    if request.reminder_policy == ReminderPolicy::Required
        && reminders::effective(&request.reminders).is_empty()
    {
        return Err(ClassCalError::validation("no reminders selected"));
    }

    let (classes, missing) = selection.resolve(catalog);
    if classes.is_empty() {
        return Err(ClassCalError::validation(
            "none of the selected classes are in the catalog",
        ));
    }

    let document = build_calendar_at(&classes, &request.reminders, &request.options, now)?;

    let export_date = now.with_timezone(&request.options.timezone).date_naive();
    let filename = export_filename(&request.purpose, export_date);
    let path = trigger_download(target, &filename, document.content, ICS_MIME_TYPE)?;

    log::info!("Exported {} classes to {}", document.event_count, path.display());

    Ok(ExportReport {
        path,
        event_count: document.event_count,
        alarm_count: document.alarm_count,
        skipped: document.skipped,
        missing,
        generated_at: document.generated_at,
    })
}
