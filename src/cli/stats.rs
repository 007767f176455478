//! Stats command - Show knowledge base statistics

use clap::Args;
use serde::Serialize;

use super::GlobalArgs;
use crate::core::store::{KnowledgeStore, StoreStats};

/// Stats command arguments
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Show knowledge base statistics
    #[arg(long)]
    pub stats: bool,

    /// Output as JSON
    #[arg(long, requires = "stats")]
    pub json: bool,
}

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: StoreStats,
    locations: Vec<Location>,
}

#[derive(Serialize)]
struct Location {
    section: &'static str,
    name: String,
    path: String,
}

/// Execute stats command
pub fn execute(args: StatsArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.load_config()?;
    let store = KnowledgeStore::load(&config)?;
    let stats = store.stats();

    if args.json {
        let report = StatsReport {
            stats,
            locations: config
                .entries()
                .map(|(section, name, path)| Location {
                    section,
                    name: name.to_string(),
                    path: path.display().to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("📊 Knowledge Statistics\n");
        println!("  Total entries:    {}", stats.entries);
        println!("  ├── Scalars:      {}", stats.scalars);
        println!(
            "  ├── Keyed maps:   {} ({} pairs)",
            stats.keyed_maps, stats.pairs
        );
        println!("  └── Tools:        {}", stats.tools);

        println!("\n📂 Locations:");
        for (section, name, path) in config.entries() {
            println!("  {}.{}: {}", section, name, path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flattens_store_stats() -> anyhow::Result<()> {
        let report = StatsReport {
            stats: StoreStats {
                entries: 2,
                scalars: 1,
                keyed_maps: 1,
                pairs: 3,
                tools: 0,
            },
            locations: vec![Location {
                section: "knowledge.sources",
                name: "global".to_string(),
                path: "/data/information.json".to_string(),
            }],
        };

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["pairs"], 3);
        assert_eq!(json["keyed_maps"], 1);
        assert_eq!(json["locations"][0]["section"], "knowledge.sources");

        let keys: Vec<&str> = json
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(
            keys,
            ["entries", "scalars", "keyed_maps", "pairs", "tools", "locations"]
        );
        Ok(())
    }
}
