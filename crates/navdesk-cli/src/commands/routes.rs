use anyhow::{Context, Result};
use colored::Colorize;
use navdesk_router::Config;

use crate::loader::provider_for;

pub fn execute(config: &Config) -> Result<()> {
    let table = config
        .build_table(|entry| provider_for(entry, &[]))
        .context("Invalid route configuration")?;

    println!("{}", "Routes".green().bold());
    if let Some(ref base) = config.router.base_path {
        println!("Base path: {}", base.cyan());
    }
    println!();

    for route in table.iter() {
        let kind = if route.provider().is_lazy() {
            "lazy".yellow()
        } else {
            "eager".green()
        };
        println!(
            "  {:<24} {:<16} {:<20} {:<6} {}",
            route.path().cyan(),
            route.name().bold(),
            route.get_meta("view").unwrap_or("-"),
            kind,
            route.get_meta("title").unwrap_or("").dimmed(),
        );
    }

    println!();
    println!("{} route(s)", table.len());
    Ok(())
}
