//! # Decretum Search CLI
//!
//! ## Purpose
//! Command line driver for the decision search library: searches a corpus
//! of court decisions, records relevance judgments against a persistent
//! feedback store, and exports the collected data for evaluation.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging
//! 3. Load the decision corpus (search and feedback commands)
//! 4. Execute the subcommand
//!
//! ## Subcommands
//! - `search`: rank decisions against a query and print highlighted results
//! - `feedback`: record a relevant/not-relevant judgment for a decision
//! - `export`: write collected feedback or the research export to a file

use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use decretum_search::{
    export, storage::SledFeedbackStore, Config, FeedbackEntry, FeedbackStore, FeedbackValue,
    Result, SearchEngine, SearchError, SearchFilters, TextSegment,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("decretum")
        .version("0.1.0")
        .author("Legal Search Team")
        .about("Relevance-ranked search over Turkish court decisions")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml")
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("search")
                .about("Search the decision corpus")
                .arg(Arg::new("query").required(true).help("Free-text query"))
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_name("DIR")
                        .help("Directory of decision JSON files")
                        .default_value("./data/decisions"),
                )
                .arg(
                    Arg::new("court")
                        .long("court")
                        .value_name("COURT")
                        .help("Only show decisions from this court"),
                )
                .arg(
                    Arg::new("min-score")
                        .long("min-score")
                        .value_name("SCORE")
                        .value_parser(clap::value_parser!(u32))
                        .help("Only show results with at least this score"),
                )
                .arg(
                    Arg::new("full-text")
                        .long("full-text")
                        .action(ArgAction::SetTrue)
                        .help("Print sentence-highlighted full text for each result"),
                ),
        )
        .subcommand(
            Command::new("feedback")
                .about("Record a relevance judgment for a decision")
                .arg(Arg::new("query").required(true).help("The query being judged"))
                .arg(
                    Arg::new("decision")
                        .long("decision")
                        .value_name("ID")
                        .required(true)
                        .help("Decision identifier"),
                )
                .arg(
                    Arg::new("value")
                        .long("value")
                        .value_name("VALUE")
                        .required(true)
                        .help("Judgment: relevant or not_relevant"),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_name("DIR")
                        .default_value("./data/decisions"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export collected feedback")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .required(true)
                        .help("Output file path"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .default_value("csv")
                        .help("Output format: csv or json"),
                )
                .arg(
                    Arg::new("research")
                        .long("research")
                        .action(ArgAction::SetTrue)
                        .help("Join feedback with the click log for evaluation"),
                ),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = Config::from_file(config_path)?;
    init_logging(&config);

    match matches.subcommand() {
        Some(("search", sub)) => run_search(&config, sub),
        Some(("feedback", sub)) => run_feedback(&config, sub).await,
        Some(("export", sub)) => run_export(&config, sub).await,
        _ => unreachable!("subcommand required"),
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn load_engine(config: &Config, sub: &clap::ArgMatches) -> Result<SearchEngine> {
    let data_dir = sub.get_one::<String>("data").unwrap();
    let mut engine = SearchEngine::new(config.clone());
    engine.load_corpus(Path::new(data_dir))?;
    Ok(engine)
}

fn run_search(config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let query = sub.get_one::<String>("query").unwrap();
    let mut engine = load_engine(config, sub)?;

    let filters = SearchFilters {
        court: sub.get_one::<String>("court").cloned(),
        min_score: sub.get_one::<u32>("min-score").copied(),
        ..Default::default()
    };

    let outcome = engine.search_filtered(query, &filters)?;
    println!("query id: {}", outcome.query_id);
    println!("{} result(s)\n", outcome.results.len());

    for (rank, result) in outcome.results.iter().enumerate() {
        let b = &result.breakdown;
        println!(
            "{}. [{}%] {} — {} ({})",
            rank + 1,
            b.total_score,
            result.decision.title,
            result.decision.court,
            result.decision.date
        );
        println!(
            "   id: {}  title {} / keywords {} / summary {} / full text {}",
            result.decision.id,
            b.title_score,
            b.keyword_score,
            b.summary_score,
            b.full_text_score
        );
        if !b.top_terms.is_empty() {
            println!("   top terms: {}", b.top_terms.join(", "));
        }
        if !result.decision.summary.is_empty() {
            let segments = engine.highlight_summary(&result.decision.summary, query);
            println!("   {}", render_segments(&segments));
        }
        if sub.get_flag("full-text") && !result.decision.full_text.is_empty() {
            let segments = engine.highlight_full_text(&result.decision.full_text, query);
            println!("\n{}\n", render_segments(&segments));
        }
    }
    Ok(())
}

async fn run_feedback(config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let query = sub.get_one::<String>("query").unwrap();
    let decision_id = sub.get_one::<String>("decision").unwrap();
    let value: FeedbackValue = sub.get_one::<String>("value").unwrap().parse()?;

    let mut engine = load_engine(config, sub)?;
    let outcome = engine.search(query)?;
    let decision = engine
        .decision(decision_id)
        .ok_or_else(|| SearchError::DecisionNotFound {
            decision_id: decision_id.clone(),
        })?;
    let breakdown = engine.scorer().score(query, decision);

    let entry =
        FeedbackEntry::from_judgment(outcome.query_id, query, decision, &breakdown, value);
    let store = SledFeedbackStore::open(&config.storage.db_path)?;
    store.save_feedback(entry).await?;

    println!(
        "Recorded {} for decision {} (score {}%)",
        value, decision_id, breakdown.total_score
    );
    Ok(())
}

async fn run_export(config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let output = PathBuf::from(sub.get_one::<String>("output").unwrap());
    let format = sub.get_one::<String>("format").unwrap();

    let store = SledFeedbackStore::open(&config.storage.db_path)?;
    let feedback = store.all_feedback().await?;

    let content = if sub.get_flag("research") {
        let clicks = store.all_clicks().await?;
        let entries = export::build_research_export(&feedback, &clicks);
        match format.as_str() {
            "json" => export::research_to_json(&entries)?,
            "csv" => export::research_to_csv(&entries),
            other => {
                return Err(SearchError::ValidationFailed {
                    field: "format".to_string(),
                    reason: format!("Unknown format '{}', expected csv or json", other),
                })
            }
        }
    } else {
        match format.as_str() {
            "json" => export::feedback_to_json(&feedback)?,
            "csv" => export::feedback_to_csv(&feedback),
            other => {
                return Err(SearchError::ValidationFailed {
                    field: "format".to_string(),
                    reason: format!("Unknown format '{}', expected csv or json", other),
                })
            }
        }
    };

    std::fs::write(&output, content)?;
    tracing::info!("Wrote {} entries to {:?}", feedback.len(), output);
    println!("Exported {} feedback entries to {}", feedback.len(), output.display());
    Ok(())
}

/// Render segments for the terminal, emphasizing highlighted runs
fn render_segments(segments: &[TextSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        if segment.highlighted {
            out.push_str("\x1b[1;33m");
            out.push_str(&segment.text);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(&segment.text);
        }
    }
    out
}
