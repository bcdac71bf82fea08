use anyhow::Result;
use chrono::Local;
use classcal_core::date_range::DateRange;
use classcal_core::{Catalog, ClassFilter};
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize};

pub fn build_filter(
    modality: Option<String>,
    instructor: Option<String>,
    search: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<ClassFilter> {
    let dates = DateRange::from_args(from.as_deref(), to.as_deref(), Local::now().date_naive())
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(ClassFilter {
        modality,
        instructor,
        search,
        dates,
    })
}

pub fn run(catalog: &Catalog, filter: &ClassFilter) -> Result<()> {
    let classes = catalog.filter(filter);

    if classes.is_empty() {
        println!("{}", "No classes match".dimmed());
        return Ok(());
    }

    for class in &classes {
        println!("{}", class.render());
    }

    println!();
    println!(
        "{}",
        format!(
            "{} of {} {}",
            classes.len(),
            catalog.len(),
            pluralize("class", catalog.len())
        )
        .dimmed()
    );

    Ok(())
}
