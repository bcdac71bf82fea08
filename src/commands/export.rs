use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use classcal_core::config::{ClassCalConfig, parse_timezone};
use classcal_core::export::{DirectoryTarget, ExportRequest, export_selection};
use classcal_core::ics::DataQualityPolicy;
use classcal_core::reminders::ReminderPolicy;
use classcal_core::{Catalog, ClassEvent, ClassFilter, Selection};
use dialoguer::MultiSelect;
use owo_colors::OwoColorize;

use crate::render::{Render, render_selection};

/// Lead times offered when reminders are picked interactively.
const REMINDER_CHOICES: [(i64, &str); 5] = [
    (10, "10 minutes before"),
    (30, "30 minutes before"),
    (60, "1 hour before"),
    (120, "2 hours before"),
    (1440, "1 day before"),
];

pub struct ExportArgs {
    pub select: Vec<String>,
    pub reminders: Vec<String>,
    pub no_reminders: bool,
    pub timezone: Option<String>,
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub out: Option<PathBuf>,
    pub strict: bool,
    pub open: bool,
}

pub fn run(config: &ClassCalConfig, catalog: &Catalog, args: ExportArgs) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();

    // --- Selection ---
    let selection = if args.select.is_empty() && interactive {
        prompt_selection(catalog)?
    } else {
        selection_from_args(catalog, &args.select)?
    };

    let preview: Vec<&ClassEvent> = selection.ids().filter_map(|id| catalog.get(id)).collect();
    println!("{}", render_selection(&preview));

    // --- Reminders ---
    let reminder_policy = if args.no_reminders {
        ReminderPolicy::Optional
    } else {
        config.reminder_policy()
    };

    let mut reminders = if args.no_reminders {
        Vec::new()
    } else {
        parse_reminders(&args.reminders)?
    };
    if reminders.is_empty() && !args.no_reminders {
        reminders = config.default_reminders.clone();
    }
    if reminders.is_empty()
        && interactive
        && reminder_policy == ReminderPolicy::Required
        && selection.can_export()
    {
        reminders = prompt_reminders()?;
    }

    // --- Calendar ---
    let timezone = resolve_timezone(args.timezone.as_deref(), config)?;
    let mut options = config.calendar_options(timezone);
    if let Some(name) = args.name {
        options.name = name;
    }
    if args.strict {
        options.policy = DataQualityPolicy::Strict;
    }

    let request = ExportRequest {
        reminders,
        reminder_policy,
        options,
        purpose: args.purpose.unwrap_or_else(|| config.purpose.clone()),
    };
    let target = DirectoryTarget::new(args.out.unwrap_or_else(|| config.download_dir()));

    let report = export_selection(catalog, &selection, &request, &target, Utc::now())?;

    println!();
    println!("{}", report.render());

    if args.open {
        open::that(&report.path)
            .with_context(|| format!("Could not open {}", report.path.display()))?;
    }

    Ok(())
}

/// Apply `--select` values in order. Each value toggles, so an id given
/// twice ends up deselected.
fn selection_from_args(catalog: &Catalog, inputs: &[String]) -> Result<Selection> {
    let mut selection = Selection::new();

    for input in inputs {
        let id = catalog
            .resolve_id(input)?
            .ok_or_else(|| anyhow::anyhow!("Class '{}' not found in the catalog", input))?;

        if !selection.toggle(id) {
            log::debug!("Class '{}' selected twice, deselecting it", input);
        }
    }

    Ok(selection)
}

fn prompt_selection(catalog: &Catalog) -> Result<Selection> {
    let classes = catalog.filter(&ClassFilter::default());
    let items: Vec<String> = classes
        .iter()
        .map(|c| format!("{} {}  {}", c.date, c.display_time(), c.title))
        .collect();

    let chosen = MultiSelect::new()
        .with_prompt("  Classes (space to select, enter to confirm)")
        .items(&items)
        .interact()?;

    let mut selection = Selection::new();
    for index in chosen {
        selection.toggle(classes[index].id.clone());
    }
    Ok(selection)
}

fn prompt_reminders() -> Result<Vec<i64>> {
    let labels: Vec<&str> = REMINDER_CHOICES.iter().map(|(_, label)| *label).collect();

    let chosen = MultiSelect::new()
        .with_prompt("  Reminders")
        .items(&labels)
        .interact()?;

    if chosen.is_empty() {
        eprintln!("  {}", "No reminders picked".yellow());
    }

    Ok(chosen.into_iter().map(|i| REMINDER_CHOICES[i].0).collect())
}

/// Parse reminder flags, dropping repeated values.
fn parse_reminders(inputs: &[String]) -> Result<Vec<i64>> {
    let mut reminders = Vec::new();
    for input in inputs {
        let minutes = parse_reminder(input)?;
        if !reminders.contains(&minutes) {
            reminders.push(minutes);
        }
    }
    Ok(reminders)
}

/// A reminder is either a plain number of minutes ("30") or a duration
/// humantime understands ("1h", "1h30m", "2days").
fn parse_reminder(input: &str) -> Result<i64> {
    let input = input.trim();

    if let Ok(minutes) = input.parse::<i64>() {
        return Ok(minutes);
    }

    let duration = humantime::parse_duration(input)
        .map_err(|e| anyhow::anyhow!("Could not parse reminder \"{}\": {}", input, e))?;

    if duration.as_secs() % 60 != 0 || duration.subsec_nanos() != 0 {
        anyhow::bail!("Reminder \"{}\" is not a whole number of minutes", input);
    }

    i64::try_from(duration.as_secs() / 60).context("Reminder too large")
}

/// Timezone from the flag, then the config, then the system.
fn resolve_timezone(arg: Option<&str>, config: &ClassCalConfig) -> Result<Tz> {
    if let Some(name) = arg {
        return Ok(parse_timezone(name)?);
    }

    if let Some(tz) = config.timezone()? {
        return Ok(tz);
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => match parse_timezone(&name) {
            Ok(tz) => Ok(tz),
            Err(_) => {
                log::warn!("System timezone '{}' is not known, using UTC", name);
                Ok(Tz::UTC)
            }
        },
        Err(e) => {
            log::warn!("Could not determine system timezone ({}), using UTC", e);
            Ok(Tz::UTC)
        }
    }
}
