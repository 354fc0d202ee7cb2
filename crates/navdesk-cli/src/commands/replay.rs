use anyhow::{Context, Result};
use colored::Colorize;
use navdesk_router::{
    ActiveView, Config, NavigationError, NavigationIntent, Router, RouterEvent, StateTransition,
};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::loader::provider_for;

pub struct ReplayOptions {
    pub failing: Vec<String>,
    pub resume: bool,
    pub transitions: bool,
}

pub async fn execute(config: &Config, lines: &[String], options: &ReplayOptions) -> Result<()> {
    let intents = lines
        .iter()
        .map(|line| {
            NavigationIntent::parse(line).with_context(|| format!("Invalid intent: {:?}", line))
        })
        .collect::<Result<Vec<_>>>()?;

    let table = config
        .build_table(|entry| provider_for(entry, &options.failing))
        .context("Invalid route configuration")?;

    let router = Router::new(table)
        .with_settings(config.router.clone())
        .with_store(config.create_store());

    let mut events = router.subscribe();
    let mut transitions = router.subscribe_transitions();

    println!("{}", "Replaying navigation...".green().bold());
    println!();

    if options.resume {
        match router.resume().await? {
            Some(view) => println!("{} resumed at {}", "↺".cyan(), view.path.cyan()),
            None => println!("{} no saved history", "↺".cyan()),
        }
        drain(&mut events, &mut transitions, options.transitions);
    }

    for (line, intent) in lines.iter().zip(intents) {
        println!("{} {}", "→".bold(), line);
        let outcome = router.dispatch(intent).await;
        drain(&mut events, &mut transitions, options.transitions);
        report(&outcome);
    }

    println!();
    print_history(&router);
    Ok(())
}

fn drain(
    events: &mut broadcast::Receiver<RouterEvent>,
    transitions: &mut broadcast::Receiver<StateTransition>,
    show_transitions: bool,
) {
    while let Ok(transition) = transitions.try_recv() {
        if show_transitions {
            println!(
                "    {} #{} {} → {}",
                "·".dimmed(),
                transition.generation,
                transition.from,
                transition.to
            );
        }
    }

    while let Ok(event) = events.try_recv() {
        let detail = match &event {
            RouterEvent::Activated { view, .. } => format!("{} ({})", view.route_name, view.view_handle),
            RouterEvent::NotFound { path, .. } => path.clone(),
            RouterEvent::RouteError { error, .. } => error.to_string(),
            RouterEvent::LoadError { route, error, .. } => format!("{}: {}", route, error),
            RouterEvent::AtBoundary { direction } => direction.to_string(),
        };
        println!("    {} {}", format!("[{}]", event.kind()).magenta(), detail);
    }
}

fn report(outcome: &Result<Arc<ActiveView>, NavigationError>) {
    match outcome {
        Ok(view) => {
            let query = view
                .query
                .as_deref()
                .map(|q| format!("?{}", q))
                .unwrap_or_default();
            println!(
                "  {} {}{} → {}",
                "✓".green(),
                view.path.cyan(),
                query,
                view.view_handle.to_string().bold()
            );
        }
        Err(err) if err.is_informational() => println!("  {} {}", "•".yellow(), err),
        Err(err) => println!("  {} {}", "✗".red(), err),
    }
}

fn print_history(router: &Router) {
    let history = router.history();
    println!("{}", "History".green().bold());

    if history.entries.is_empty() {
        println!("  (empty)");
        return;
    }

    for (index, entry) in history.entries.iter().enumerate() {
        let marker = if history.cursor == Some(index) { "▶" } else { " " };
        let state = entry
            .state
            .as_ref()
            .map(|s| format!(" {}", serde_json::to_string(s).unwrap_or_default()))
            .unwrap_or_default();
        println!(
            "  {} {:>3}  {:<20} {}{}",
            marker.cyan(),
            entry.timestamp,
            entry.path,
            entry.name.dimmed(),
            state
        );
    }
}
