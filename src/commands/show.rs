use anyhow::Result;
use classcal_core::{Catalog, ClassEvent};

use crate::render::render_details;

pub fn run(catalog: &Catalog, id: &str) -> Result<()> {
    let class = find_class(catalog, id)?;

    println!("{}", render_details(class));

    Ok(())
}

fn find_class<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a ClassEvent> {
    catalog
        .resolve_id(id)?
        .and_then(|id| catalog.get(&id))
        .ok_or_else(|| anyhow::anyhow!("Class '{}' not found", id))
}
