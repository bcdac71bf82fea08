//! Terminal rendering for classcal types.
//!
//! Extension traits that add colored output to classcal-core types using
//! owo_colors.

use classcal_core::ClassEvent;
use classcal_core::export::ExportReport;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ClassEvent {
    /// One table row: id, date, time range, title and modality.
    fn render(&self) -> String {
        let id = format!("{:>6}", self.id.to_string());
        let when = format!("{} {}", self.date, self.display_time());
        let modality = if self.modality.is_empty() {
            String::new()
        } else {
            format!("({})", self.modality)
        };

        format!(
            "{}  {}  {} {}",
            id.dimmed(),
            when.cyan(),
            self.title.bold(),
            modality.dimmed()
        )
    }
}

/// Full details of a single class.
pub fn render_details(class: &ClassEvent) -> String {
    let mut lines = vec![
        format!("{}", class.title.bold()),
        format!("  {} {}", "id:".dimmed(), class.id),
        format!("  {} {} {}", "when:".dimmed(), class.date, class.display_time()),
    ];

    let fields = [
        ("modality:", &class.modality),
        ("instructor:", &class.instructor),
        ("location:", &class.location),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            lines.push(format!("  {} {}", label.dimmed(), value));
        }
    }

    if !class.description.is_empty() {
        lines.push(String::new());
        lines.extend(class.description.lines().map(|l| format!("  {}", l)));
    }

    lines.join("\n")
}

/// Numbered preview of the selected classes, in the order they were picked.
pub fn render_selection(classes: &[&ClassEvent]) -> String {
    if classes.is_empty() {
        return "   No classes selected".dimmed().to_string();
    }

    let mut lines = vec![format!(
        "{} {}",
        "Selected".bold(),
        format!("({} {})", classes.len(), pluralize("class", classes.len())).dimmed()
    )];

    for (i, class) in classes.iter().enumerate() {
        lines.push(format!(
            "  {}. {} {}",
            i + 1,
            class.title,
            format!("{} {}", class.date, class.display_time()).dimmed()
        ));
    }

    lines.join("\n")
}

impl Render for ExportReport {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{}",
            format!(
                "  Exported {} {} with {} {}",
                self.event_count,
                pluralize("class", self.event_count),
                self.alarm_count,
                pluralize("reminder", self.alarm_count)
            )
            .green()
        )];

        lines.push(format!("  {}", self.path.display()));

        for skipped in &self.skipped {
            lines.push(format!(
                "  {} {}",
                "skipped".yellow(),
                format!("{}: {}", skipped.id, skipped.reason).yellow()
            ));
        }

        for id in &self.missing {
            lines.push(format!(
                "  {} {}",
                "missing".red(),
                format!("class '{}' is not in the catalog", id).red()
            ));
        }

        lines.join("\n")
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else if word.ends_with('s') {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classcal_core::Catalog;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"id": 1, "title": "Protocolos", "date": "2026-02-05",
                 "time": "09:00", "endTime": "12:00"},
                {"id": 2, "title": "Redes", "date": "2026-02-03",
                 "time": "14:00", "endTime": "16:00"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn selection_keeps_pick_order() {
        let catalog = catalog();
        let picked = vec![&catalog.classes()[1], &catalog.classes()[0]];
        let out = render_selection(&picked);

        let redes = out.find("1. Redes").unwrap();
        let protocolos = out.find("2. Protocolos").unwrap();
        assert!(redes < protocolos);
        assert!(out.contains("2 classes"));
    }

    #[test]
    fn empty_selection_says_so() {
        assert!(render_selection(&[]).contains("No classes selected"));
    }

    #[test]
    fn pluralizes_words() {
        assert_eq!(pluralize("class", 1), "class");
        assert_eq!(pluralize("class", 2), "classes");
        assert_eq!(pluralize("reminder", 0), "reminders");
    }
}
