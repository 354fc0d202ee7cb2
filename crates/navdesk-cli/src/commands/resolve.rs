use anyhow::{Context, Result};
use colored::Colorize;
use navdesk_router::path::{normalize_path, split_location, strip_base};
use navdesk_router::Config;

use crate::loader::provider_for;

pub fn execute(config: &Config, location: &str) -> Result<()> {
    let table = config
        .build_table(|entry| provider_for(entry, &[]))
        .context("Invalid route configuration")?;

    let parts = split_location(location);
    let normalized = normalize_path(parts.path);
    let path = match config.router.base_path.as_deref() {
        Some(base) => strip_base(&normalized, base)
            .with_context(|| format!("{} is outside base path {}", location, base))?,
        None => &*normalized,
    };

    match table.match_path(path) {
        Ok(matched) => {
            println!("{} {}", "✓".green(), matched.route.name().bold());
            println!("  Pattern: {}", matched.route.path().cyan());
            println!("  Path:    {}", path);
            if let Some(view) = matched.route.get_meta("view") {
                println!("  View:    {}", view);
            }
            if let Some(query) = parts.query {
                println!("  Query:   {}", query);
            }

            let mut params: Vec<_> = matched.params.iter().collect();
            params.sort();
            for (key, value) in params {
                println!("  :{} = {}", key, value.yellow());
            }
            Ok(())
        }
        Err(err) => {
            println!("{} {}", "✗".red(), err);
            anyhow::bail!("no unique route for {}", location)
        }
    }
}
