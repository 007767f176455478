//! Asking the knowledge base
//!
//! Votes across the knowledge base and prints the winner, or runs it when
//! the winner is a tool.
//!
//! # Usage
//! ```bash
//! knowledge cat                            # Best matching fact
//! knowledge hello world -v                 # Also show every vote
//! knowledge --tool weather berlin          # Run a tool directly
//! knowledge --tool weather -- --metric x   # Words after `--` are kept verbatim
//! ```

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::GlobalArgs;
use crate::config::Config;
use crate::core::ranking::{Ballot, Engine, Outcome, Pool};
use crate::core::store::KnowledgeStore;
use crate::core::tool::Tool;

/// Query that prints the tutorial instead of voting
pub const MAGIC_DEMO: &str = "Show me a magic demo!";

/// Printed when no literal received a vote
pub const NO_MATCH: &str = "No knowledge matched your query.";

#[derive(Args, Debug, Default)]
pub struct AskArgs {
    /// Show votes for the query
    #[arg(short, long)]
    pub vote_query: bool,

    /// Run this tool directly instead of voting
    #[arg(short, long, value_name = "NAME")]
    pub tool: Option<String>,

    /// Query words; a winning tool receives them as arguments
    #[arg(value_name = "WORDS")]
    pub query: Vec<String>,
}

pub fn run(args: AskArgs, global: &GlobalArgs) -> Result<()> {
    let config = global.load_config()?;
    tracing::info!("Initialize KnowledgeStore");
    let store = KnowledgeStore::load(&config)?;
    tracing::info!("KnowledgeStore ready");

    if let Some(name) = &args.tool {
        return run_tool(store.tool_named(name)?, &args.query);
    }

    if args.query.join(" ") == MAGIC_DEMO {
        print_demo(&store, &config);
        return Ok(());
    }

    let engine = Engine::new(&store);
    let (ballot, outcome) = engine.vote(&args.query)?;

    if args.vote_query {
        print_votes(&ballot, &store, &outcome);
    }

    match outcome {
        Outcome::Literal { value, .. } => println!("{}", value),
        Outcome::Tool { tool, .. } => run_tool(tool, &args.query)?,
        Outcome::NoResult => println!("{}", NO_MATCH),
    }

    Ok(())
}

fn run_tool(tool: &Tool, args: &[String]) -> Result<()> {
    let status = tool.invoke(args)?;
    if !status.success() {
        bail!("Tool {} exited with {}", tool.name, status);
    }
    Ok(())
}

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Raw")]
    raw: String,
    #[tabled(rename = "Score")]
    score: String,
}

#[derive(Tabled)]
struct VoteRow {
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Candidate")]
    candidate: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Won")]
    won: &'static str,
}

fn print_votes(ballot: &Ballot, store: &KnowledgeStore, outcome: &Outcome<'_>) {
    if !ballot.keys.is_empty() {
        let rows = ballot.keys.iter().map(|k| KeyRow {
            key: k.key.clone(),
            raw: format!("{}/{}", k.raw, ballot.query.max_score),
            score: format!("{:.3}", k.normalized),
        });
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    let mut rows = Vec::new();
    for (value, score) in ballot.literal.iter() {
        let won = matches!(outcome, Outcome::Literal { value: v, .. } if v == value);
        rows.push(VoteRow {
            pool: Pool::Literal.to_string(),
            candidate: value.to_string(),
            score: format!("{:.3}", score),
            won: if won { "*" } else { "" },
        });
    }
    for (id, score) in ballot.reference.iter() {
        let tool = store.tool(*id).ok();
        let won = matches!((outcome, tool), (Outcome::Tool { tool: t, .. }, Some(r)) if std::ptr::eq(*t, r));
        rows.push(VoteRow {
            pool: Pool::Reference.to_string(),
            candidate: tool.map_or_else(|| id.to_string(), |t| t.name.clone()),
            score: format!("{:.3}", score),
            won: if won { "*" } else { "" },
        });
    }

    if rows.is_empty() {
        println!("{}", "No votes cast.".yellow());
    } else {
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
}

fn print_demo(store: &KnowledgeStore, config: &Config) {
    let source = config
        .knowledge
        .sources
        .get("global")
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no global source configured)".to_string());
    let tools = config
        .knowledge
        .tools
        .get("global")
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no global tools configured)".to_string());

    println!("{}", "Thank you for using knowledge!".green().bold());
    if store.is_empty() {
        println!(
            "It looks like your database doesn't have any knowledge set up yet, \
             but you can start adding entries at {} or drop executable tools into {}",
            source, tools
        );
    } else {
        println!("Your database has {} items!", store.len());
        println!(
            "You can add more knowledge at {} or drop executable tools into {}",
            source, tools
        );
    }
}
