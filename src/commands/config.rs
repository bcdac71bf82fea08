use anyhow::Result;
use classcal_core::config::ClassCalConfig;
use owo_colors::OwoColorize;

pub fn run(config: &ClassCalConfig) -> Result<()> {
    let config_path = ClassCalConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Catalog:    {}", config.catalog_path().display());
    println!("  Downloads:  {}", config.download_dir().display());

    println!();
    println!("{}", "Effective configuration".bold());
    for line in config.to_toml()?.lines() {
        println!("  {}", line.dimmed());
    }

    Ok(())
}
