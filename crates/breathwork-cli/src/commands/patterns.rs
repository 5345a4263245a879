use breathwork_core::{Config, Pattern};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum PatternsAction {
    /// List available patterns
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one pattern's phases
    Show {
        /// Pattern id (e.g. "box", "4-7-8")
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn secs(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

fn rhythm(pattern: &Pattern) -> String {
    pattern
        .phases
        .iter()
        .map(|p| secs(p.duration_ms))
        .collect::<Vec<_>>()
        .join("/")
}

pub fn run(action: PatternsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = config.catalog()?;

    match action {
        PatternsAction::List { json } => {
            if json {
                let patterns: Vec<&Pattern> = catalog.patterns().collect();
                println!("{}", serde_json::to_string_pretty(&patterns)?);
            } else {
                for p in catalog.patterns() {
                    println!(
                        "{:<12} {:<22} {:<14} {:>4.1} bpm",
                        p.id,
                        p.name,
                        rhythm(p),
                        p.breaths_per_minute()
                    );
                }
            }
        }
        PatternsAction::Show { id, json } => {
            let pattern = catalog.lookup(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(pattern.as_ref())?);
            } else {
                println!("{} ({})", pattern.name, pattern.id);
                if !pattern.description.is_empty() {
                    println!("{}", pattern.description);
                }
                for (i, phase) in pattern.phases.iter().enumerate() {
                    println!(
                        "  {}. {:<10} {:>6}",
                        i + 1,
                        phase.label,
                        secs(phase.duration_ms)
                    );
                }
                println!(
                    "cycle {} ({:.1} breaths/min)",
                    secs(pattern.cycle_duration_ms()),
                    pattern.breaths_per_minute()
                );
            }
        }
    }
    Ok(())
}
