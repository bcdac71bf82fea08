//! ICS document generation for a set of classes.

use std::borrow::Borrow;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::class_event::{ClassEvent, ClassId};
use crate::error::{ClassCalError, ClassCalResult};
use crate::ics::escape::{escape_text, fold_line};
use crate::ics::timestamp::{format_utc, local_to_utc};

pub const DEFAULT_PRODUCT_ID: &str = "-//classcal//classcal 0.1//EN";

/// What to do with a class whose date or times are unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataQualityPolicy {
    /// Leave the class out, log a warning and report it in `CalendarDocument::skipped`.
    #[default]
    Skip,
    /// Fail the whole document.
    Strict,
}

/// Calendar-level settings for a generated document.
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub name: String,
    pub description: String,
    /// Timezone the catalog's dates and times are expressed in
    pub timezone: Tz,
    pub product_id: String,
    pub policy: DataQualityPolicy,
    /// Right-hand side of generated UIDs
    pub uid_domain: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        CalendarOptions {
            name: "Classes".to_string(),
            description: "Selected classes".to_string(),
            timezone: Tz::UTC,
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            policy: DataQualityPolicy::Skip,
            uid_domain: "classcal".to_string(),
        }
    }
}

/// A class left out of the document because of bad data.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub id: ClassId,
    pub reason: String,
}

/// A finished iCalendar document.
#[derive(Debug, Clone)]
pub struct CalendarDocument {
    pub content: String,
    pub event_count: usize,
    pub alarm_count: usize,
    pub skipped: Vec<SkippedEvent>,
    pub generated_at: DateTime<Utc>,
}

/// Build a calendar for `events`, stamped with the current time.
///
/// `reminder_minutes` may be empty. Only strictly positive values produce
/// an alarm; the rest are ignored.
pub fn build_calendar<E: Borrow<ClassEvent>>(
    events: &[E],
    reminder_minutes: &[i64],
    options: &CalendarOptions,
) -> ClassCalResult<CalendarDocument> {
    build_calendar_at(events, reminder_minutes, options, Utc::now())
}

/// Same as [`build_calendar`] with an explicit generation time. Every
/// DTSTAMP, CREATED and LAST-MODIFIED in the document uses `now`.
pub fn build_calendar_at<E: Borrow<ClassEvent>>(
    events: &[E],
    reminder_minutes: &[i64],
    options: &CalendarOptions,
    now: DateTime<Utc>,
) -> ClassCalResult<CalendarDocument> {
    if events.is_empty() {
        return Err(ClassCalError::validation("no events selected"));
    }

    let reminders = crate::reminders::effective(reminder_minutes);
    let stamp = format_utc(&now);
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros());

    let mut body = String::new();
    let mut skipped = Vec::new();
    let mut event_count = 0;

    for (index, event) in events.iter().enumerate() {
        let event = event.borrow();

        let (start, end) = match utc_span(event, options.timezone) {
            Ok(span) => span,
            Err(err) => match options.policy {
                DataQualityPolicy::Strict => return Err(err),
                DataQualityPolicy::Skip => {
                    let reason = match err {
                        ClassCalError::DataQuality { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    log::warn!("Skipping class '{}' ({}): {}", event.id, event.title, reason);
                    skipped.push(SkippedEvent {
                        id: event.id.clone(),
                        reason,
                    });
                    continue;
                }
            },
        };

        let uid = format!(
            "{}-{}-{}@{}",
            escape_text(&event.id.to_string()),
            nanos,
            index,
            options.uid_domain
        );

        push_event(&mut body, event, &uid, &stamp, &start, &end, &reminders);
        event_count += 1;
    }

    if event_count == 0 {
        return Err(ClassCalError::validation("no valid events to export"));
    }

    let mut content = String::new();
    push_line(&mut content, "BEGIN:VCALENDAR");
    push_line(&mut content, &format!("PRODID:{}", options.product_id));
    push_line(&mut content, "VERSION:2.0");
    push_line(&mut content, "CALSCALE:GREGORIAN");
    push_line(&mut content, "METHOD:PUBLISH");
    let name = escape_text(&options.name);
    let description = escape_text(&options.description);
    push_line(&mut content, &format!("X-WR-CALNAME:{}", name));
    push_line(&mut content, &format!("X-WR-TIMEZONE:{}", options.timezone.name()));
    push_line(&mut content, &format!("X-WR-CALDESC:{}", description));
    content.push_str(&body);
    push_line(&mut content, "END:VCALENDAR");

    log::debug!(
        "Built calendar with {} events, {} alarms each, {} skipped",
        event_count,
        reminders.len(),
        skipped.len()
    );

    Ok(CalendarDocument {
        content,
        event_count,
        alarm_count: event_count * reminders.len(),
        skipped,
        generated_at: now,
    })
}

fn utc_span(event: &ClassEvent, tz: Tz) -> ClassCalResult<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = event.local_span()?;
    let to_utc = |local: NaiveDateTime| {
        local_to_utc(&local, tz).map_err(|reason| ClassCalError::DataQuality {
            id: event.id.clone(),
            reason,
        })
    };
    Ok((to_utc(start)?, to_utc(end)?))
}

fn push_event(
    out: &mut String,
    event: &ClassEvent,
    uid: &str,
    stamp: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    reminders: &[i64],
) {
    let title = escape_text(&event.title);
    let description = escape_text(&event_description(event));

    push_line(out, "BEGIN:VEVENT");
    push_line(out, &format!("UID:{}", uid));
    push_line(out, &format!("DTSTAMP:{}", stamp));
    push_line(out, &format!("DTSTART:{}", format_utc(start)));
    push_line(out, &format!("DTEND:{}", format_utc(end)));
    push_line(out, &format!("SUMMARY:{}", title));
    push_line(out, &format!("DESCRIPTION:{}", description));
    push_line(out, &format!("LOCATION:{}", escape_text(&event.location)));
    push_line(out, "STATUS:CONFIRMED");
    push_line(out, "SEQUENCE:0");
    push_line(out, "TRANSP:OPAQUE");
    push_line(out, &format!("CREATED:{}", stamp));
    push_line(out, &format!("LAST-MODIFIED:{}", stamp));

    for minutes in reminders {
        push_line(out, "BEGIN:VALARM");
        push_line(out, "ACTION:DISPLAY");
        push_line(out, &format!("TRIGGER:-PT{}M", minutes));
        push_line(out, &format!("DESCRIPTION:Reminder: {}", title));
        push_line(out, "END:VALARM");
    }

    push_line(out, "END:VEVENT");
}

/// Description shown in calendar apps: the class description followed by
/// its metadata, one item per line. Empty parts are left out.
fn event_description(event: &ClassEvent) -> String {
    let mut parts = Vec::new();

    if !event.description.trim().is_empty() {
        parts.push(event.description.trim().to_string());
    }
    if !event.modality.trim().is_empty() {
        parts.push(format!("Modality: {}", event.modality.trim()));
    }
    if !event.instructor.trim().is_empty() {
        parts.push(format!("Instructor: {}", event.instructor.trim()));
    }
    parts.push(format!("Time: {}", event.display_time()));

    parts.join("\n")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_event::tests::class;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 18, 30, 5).unwrap()
    }

    fn sao_paulo() -> CalendarOptions {
        CalendarOptions {
            timezone: chrono_tz::America::Sao_Paulo,
            ..Default::default()
        }
    }

    /// The value of every (unfolded) line starting with `name:`.
    fn values<'a>(ics: &'a str, name: &str) -> Vec<&'a str> {
        let prefix = format!("{}:", name);
        ics.split("\r\n")
            .filter_map(|l| l.strip_prefix(prefix.as_str()))
            .collect()
    }

    #[test]
    fn protocolos_scenario() {
        let events = vec![class(1, "Protocolos", "2026-02-05", "09:00", "12:00")];
        let doc = build_calendar_at(&events, &[30], &sao_paulo(), now()).unwrap();
        let ics = &doc.content;

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert_eq!(ics.matches("BEGIN:VALARM").count(), 1);
        assert!(ics.contains("TRIGGER:-PT30M\r\n"));
        assert!(ics.contains("DTSTART:20260205T120000Z\r\n"));
        assert!(ics.contains("DTEND:20260205T150000Z\r\n"));
        assert!(ics.contains("SUMMARY:Protocolos\r\n"));
        assert!(ics.contains("DESCRIPTION:Reminder: Protocolos\r\n"));
        assert_eq!(doc.event_count, 1);
        assert_eq!(doc.alarm_count, 1);
    }

    #[test]
    fn header_and_footer_are_in_order() {
        let events = vec![class(1, "A", "2026-02-05", "09:00", "10:00")];
        let options = CalendarOptions {
            name: "Aulas, 2026".to_string(),
            ..sao_paulo()
        };
        let ics = build_calendar_at(&events, &[], &options, now()).unwrap().content;

        let expected_head = "BEGIN:VCALENDAR\r\n\
            PRODID:-//classcal//classcal 0.1//EN\r\n\
            VERSION:2.0\r\n\
            CALSCALE:GREGORIAN\r\n\
            METHOD:PUBLISH\r\n\
            X-WR-CALNAME:Aulas\\, 2026\r\n\
            X-WR-TIMEZONE:America/Sao_Paulo\r\n\
            X-WR-CALDESC:Selected classes\r\n\
            BEGIN:VEVENT\r\n";
        assert!(ics.starts_with(expected_head), "got:\n{}", ics);
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let events = vec![class(1, "A", "2026-02-05", "09:00", "10:00")];
        let ics = build_calendar_at(&events, &[10], &sao_paulo(), now()).unwrap().content;

        assert!(!ics.replace("\r\n", "").contains('\n'));
        assert!(!ics.replace("\r\n", "").contains('\r'));
    }

    #[test]
    fn event_properties_are_in_order() {
        let events = vec![class(4, "A", "2026-02-05", "09:00", "10:00")];
        let ics = build_calendar_at(&events, &[], &sao_paulo(), now()).unwrap().content;

        let names: Vec<&str> = ics
            .split("BEGIN:VEVENT\r\n")
            .nth(1)
            .unwrap()
            .split("\r\n")
            .filter(|l| !l.starts_with(' ') && !l.is_empty())
            .map(|l| l.split(':').next().unwrap())
            .collect();

        assert_eq!(
            names,
            vec![
                "UID", "DTSTAMP", "DTSTART", "DTEND", "SUMMARY", "DESCRIPTION", "LOCATION",
                "STATUS", "SEQUENCE", "TRANSP", "CREATED", "LAST-MODIFIED", "END", "END"
            ]
        );
        assert!(ics.contains("STATUS:CONFIRMED\r\nSEQUENCE:0\r\nTRANSP:OPAQUE\r\n"));
    }

    #[test]
    fn empty_events_is_a_validation_error() {
        let events: Vec<ClassEvent> = Vec::new();
        let err = build_calendar_at(&events, &[30], &sao_paulo(), now()).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "no events selected");
    }

    #[test]
    fn only_positive_reminders_become_alarms() {
        let events = vec![
            class(1, "A", "2026-02-05", "09:00", "10:00"),
            class(2, "B", "2026-02-06", "09:00", "10:00"),
        ];
        let doc = build_calendar_at(&events, &[0, -5, 15], &sao_paulo(), now()).unwrap();

        assert_eq!(doc.content.matches("BEGIN:VALARM").count(), 2);
        assert_eq!(values(&doc.content, "TRIGGER"), vec!["-PT15M", "-PT15M"]);
        assert_eq!(doc.alarm_count, 2);
    }

    #[test]
    fn alarms_belong_to_their_event() {
        let events = vec![
            class(1, "A", "2026-02-05", "09:00", "10:00"),
            class(2, "B", "2026-02-06", "09:00", "10:00"),
        ];
        let ics = build_calendar_at(&events, &[10, 60, 1440], &sao_paulo(), now())
            .unwrap()
            .content;

        for block in ics.split("BEGIN:VEVENT").skip(1) {
            let block = block.split("END:VEVENT").next().unwrap();
            assert_eq!(block.matches("BEGIN:VALARM").count(), 3);
            assert_eq!(block.matches("END:VALARM").count(), 3);
        }
        let triggers = values(&ics, "TRIGGER");
        assert_eq!(triggers[..3], ["-PT10M", "-PT60M", "-PT1440M"]);
    }

    #[test]
    fn events_keep_input_order() {
        let events = vec![
            class(3, "Third", "2026-03-01", "09:00", "10:00"),
            class(1, "First", "2026-01-01", "09:00", "10:00"),
            class(2, "Second", "2026-02-01", "09:00", "10:00"),
        ];
        let ics = build_calendar_at(&events, &[], &sao_paulo(), now()).unwrap().content;

        assert_eq!(values(&ics, "SUMMARY"), vec!["Third", "First", "Second"]);
    }

    #[test]
    fn single_generation_stamp_is_shared() {
        let events = vec![
            class(1, "A", "2026-02-05", "09:00", "10:00"),
            class(2, "B", "2026-02-06", "09:00", "10:00"),
        ];
        let ics = build_calendar_at(&events, &[], &sao_paulo(), now()).unwrap().content;

        for name in ["DTSTAMP", "CREATED", "LAST-MODIFIED"] {
            assert_eq!(values(&ics, name), vec!["20260120T183005Z"; 2], "{}", name);
        }
    }

    #[test]
    fn uids_are_unique_and_carry_the_id() {
        let events = vec![
            class(1, "A", "2026-02-05", "09:00", "10:00"),
            class(1, "A again", "2026-02-05", "09:00", "10:00"),
        ];
        let ics = build_calendar_at(&events, &[], &sao_paulo(), now()).unwrap().content;
        let uids = values(&ics, "UID");

        assert_eq!(uids.len(), 2);
        assert_ne!(uids[0], uids[1]);
        assert!(uids.iter().all(|u| u.starts_with("1-") && u.ends_with("@classcal")));
    }

    #[test]
    fn repeated_exports_differ_only_in_stamps_and_uids() {
        let events = vec![class(1, "Protocolos", "2026-02-05", "09:00", "12:00")];
        let first = build_calendar_at(&events, &[30], &sao_paulo(), now()).unwrap().content;
        let second = build_calendar_at(&events, &[30], &sao_paulo(), now() + Duration::seconds(1))
            .unwrap()
            .content;

        assert_ne!(values(&first, "DTSTAMP"), values(&second, "DTSTAMP"));
        assert_ne!(values(&first, "UID"), values(&second, "UID"));
        for name in ["SUMMARY", "LOCATION", "DTSTART", "DTEND"] {
            assert_eq!(values(&first, name), values(&second, name), "{}", name);
        }
    }

    #[test]
    fn free_text_is_escaped() {
        let title = "Redes; TCP, UDP\\IP\nParte 2";
        let mut event = class(1, title, "2026-02-05", "09:00", "10:00");
        event.location = "Bloco A, Sala 3".to_string();
        let ics = build_calendar_at(&[event], &[5], &sao_paulo(), now()).unwrap().content;

        assert!(ics.contains("SUMMARY:Redes\\; TCP\\, UDP\\\\IP\\nParte 2\r\n"));
        assert!(ics.contains("LOCATION:Bloco A\\, Sala 3\r\n"));
        assert!(ics.contains("DESCRIPTION:Reminder: Redes\\; TCP"));
    }

    #[test]
    fn description_lists_metadata() {
        let event = class(1, "A", "2026-02-05", "09:00", "12:00");
        assert_eq!(
            event_description(&event),
            "Aula introdutória\nModality: Presencial\nInstructor: Ana Souza\nTime: 09:00 - 12:00"
        );

        let mut bare = event.clone();
        bare.description.clear();
        bare.modality.clear();
        bare.instructor.clear();
        assert_eq!(event_description(&bare), "Time: 09:00 - 12:00");
    }

    #[test]
    fn skip_policy_drops_bad_events() {
        let events = vec![
            class(1, "Good", "2026-02-05", "09:00", "10:00"),
            class(2, "Inverted", "2026-02-05", "12:00", "09:00"),
            class(3, "Garbage", "tomorrow", "09:00", "10:00"),
        ];
        let doc = build_calendar_at(&events, &[15], &sao_paulo(), now()).unwrap();

        assert_eq!(doc.event_count, 1);
        assert_eq!(doc.content.matches("BEGIN:VEVENT").count(), 1);
        let skipped: Vec<_> = doc.skipped.iter().map(|s| s.id.clone()).collect();
        assert_eq!(skipped, vec![ClassId::from(2), ClassId::from(3)]);
        assert!(doc.skipped[0].reason.contains("not before"));
    }

    #[test]
    fn skip_policy_with_nothing_left_fails() {
        let events = vec![class(2, "Inverted", "2026-02-05", "12:00", "09:00")];
        let err = build_calendar_at(&events, &[15], &sao_paulo(), now()).unwrap_err();

        assert!(err.is_validation());
    }

    #[test]
    fn strict_policy_fails_on_first_bad_event() {
        let events = vec![
            class(1, "Good", "2026-02-05", "09:00", "10:00"),
            class(2, "Inverted", "2026-02-05", "12:00", "09:00"),
        ];
        let options = CalendarOptions {
            policy: DataQualityPolicy::Strict,
            ..sao_paulo()
        };
        let err = build_calendar_at(&events, &[15], &options, now()).unwrap_err();

        match err {
            ClassCalError::DataQuality { id, .. } => assert_eq!(id, ClassId::from(2)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nonexistent_local_time_is_data_quality() {
        let events = vec![class(1, "Gap", "2026-03-08", "02:30", "03:30")];
        let options = CalendarOptions {
            timezone: chrono_tz::America::New_York,
            policy: DataQualityPolicy::Strict,
            ..Default::default()
        };
        let err = build_calendar_at(&events, &[], &options, now()).unwrap_err();

        assert!(matches!(err, ClassCalError::DataQuality { .. }));
    }

    #[test]
    fn accepts_borrowed_events() {
        let a = class(1, "A", "2026-02-05", "09:00", "10:00");
        let refs = vec![&a];
        let doc = build_calendar_at(&refs, &[], &sao_paulo(), now()).unwrap();

        assert_eq!(doc.event_count, 1);
        assert_eq!(doc.alarm_count, 0);
        assert!(!doc.content.contains("VALARM"));
    }
}
