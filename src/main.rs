use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, Table};
use research_gap_finder::analysis::extract_topic;
use research_gap_finder::config::{default_config_path, load_config, Config, ConfigFile};
use research_gap_finder::models::{ExpertiseLevel, Paper, QualityScore, ResearchGap};
use research_gap_finder::search::SearchAggregator;
use research_gap_finder::session::{ResearchSession, DEFAULT_GRADE_LIMIT};
use research_gap_finder::utils::StatusReporter;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Gap Finder - find recent papers, grade them and spot research gaps
#[derive(Parser, Debug)]
#[command(name = "research-gap-finder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find recent papers, grade their quality and identify research gaps", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress progress messages and non-error logs
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable result caching for this run
    #[arg(long, global = true, default_value_t = false)]
    no_cache: bool,

    /// Log line format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Expertise {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl From<Expertise> for ExpertiseLevel {
    fn from(level: Expertise) -> Self {
        match level {
            Expertise::Beginner => ExpertiseLevel::Beginner,
            Expertise::Intermediate => ExpertiseLevel::Intermediate,
            Expertise::Advanced => ExpertiseLevel::Advanced,
            Expertise::Expert => ExpertiseLevel::Expert,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search papers on a topic across Semantic Scholar and Crossref
    #[command(alias = "s")]
    Search {
        /// Research topic
        topic: String,

        /// Only papers from the last few years, newest first
        #[arg(long)]
        recent: bool,

        /// Maximum number of results
        #[arg(long, short = 'n')]
        max_results: Option<usize>,
    },

    /// Search recent papers on a topic and grade their quality
    #[command(alias = "g")]
    Grade {
        /// Research topic
        topic: String,

        /// Number of papers to grade
        #[arg(long, short = 'n', default_value_t = DEFAULT_GRADE_LIMIT)]
        count: usize,
    },

    /// Search recent papers on a topic and identify research gaps
    Gaps {
        /// Research topic
        topic: String,

        /// Only show gaps suited to this expertise level
        #[arg(long, short, value_enum)]
        expertise: Option<Expertise>,
    },

    /// Extract a research topic from a free-form request
    Topic {
        /// Free-form text, e.g. "find papers about soil microbiomes"
        text: String,
    },

    /// Show the effective configuration, or write a starter config file
    Config {
        /// Write a default configuration file (to PATH, or the per-user config dir)
        #[arg(long, value_name = "PATH")]
        init: Option<Option<PathBuf>>,

        /// Overwrite an existing file when used with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.no_cache {
        config.search.cache_enabled = false;
    }

    init_tracing(&cli, &config);
    let format = cli.output.resolve();

    match cli.command {
        Commands::Search {
            ref topic,
            recent,
            max_results,
        } => {
            if let Some(n) = max_results {
                config.search.max_results = n;
            }
            let aggregator = build_aggregator(&config, cli.quiet)?;
            let papers = if recent {
                aggregator.find_recent_papers(topic).await
            } else {
                aggregator.search_topic(topic).await
            };

            if papers.is_empty() {
                eprintln!("No papers found for '{}'. Try broader search terms.", topic);
            }
            output_papers(&papers, format)?;
        }

        Commands::Grade { ref topic, count } => {
            let mut session = ResearchSession::new(build_aggregator(&config, cli.quiet)?);
            if session.find_papers(topic).await.is_empty() {
                eprintln!("No recent papers found for '{}'. Try broader search terms.", topic);
                return Ok(());
            }
            let graded = session.grade_papers(count);
            output_grades(&graded, format)?;
        }

        Commands::Gaps {
            ref topic,
            expertise,
        } => {
            let mut session = ResearchSession::new(build_aggregator(&config, cli.quiet)?);
            if let Some(level) = expertise {
                session.set_expertise(level.into());
            }
            if session.find_papers(topic).await.is_empty() {
                eprintln!("No recent papers found for '{}'. Try broader search terms.", topic);
                return Ok(());
            }
            session.analyze_gaps().await;
            output_gaps(&session.prioritized_gaps(), format)?;
        }

        Commands::Topic { ref text } => match extract_topic(text) {
            Some(topic) => match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "topic": topic }))?)
                }
                _ => println!("{}", topic),
            },
            None => bail!("no research topic found in: {}", text),
        },

        Commands::Config { ref init, force } => match init {
            Some(path) => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => default_config_path().context("no config directory on this platform")?,
                };
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                ConfigFile::default().save(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
            None => output_config(&config, format)?,
        },
    }

    Ok(())
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("research_gap_finder={}", level)),
    );

    let json = match cli.log_format {
        Some(LogFormat::Json) => true,
        Some(LogFormat::Text) => false,
        None => config.logging.format.as_deref() == Some("json"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_aggregator(config: &Config, quiet: bool) -> Result<SearchAggregator> {
    let status = if quiet || !std::io::stderr().is_terminal() {
        StatusReporter::quiet()
    } else {
        StatusReporter::new(|message| eprintln!("  {}", message))
    };
    Ok(SearchAggregator::from_config(config)?.with_status(status))
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

fn output_papers(papers: &[Paper], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(papers)?),
        _ => {
            let mut table = new_table(vec!["Title", "Authors", "Year", "Venue", "Citations", "Source"]);
            for paper in papers {
                let authors = match paper.authors.len() {
                    0 => String::new(),
                    1 => paper.authors[0].clone(),
                    _ => format!("{} et al.", paper.authors[0]),
                };
                table.add_row(vec![
                    Cell::new(shorten(&paper.title, 60)).add_attribute(Attribute::Bold),
                    Cell::new(shorten(&authors, 30)),
                    Cell::new(paper.year),
                    Cell::new(shorten(&paper.venue, 30)),
                    Cell::new(paper.citations),
                    Cell::new(paper.source.to_string()),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct GradedPaper<'a> {
    paper: &'a Paper,
    score: &'a QualityScore,
}

fn output_grades(graded: &[(&Paper, &QualityScore)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<GradedPaper> = graded
                .iter()
                .map(|(paper, score)| GradedPaper { paper, score })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            let mut table = new_table(vec![
                "Grade", "Score", "Title", "Year", "Method", "Impact", "Novelty", "Clarity", "Applic.",
            ]);
            for (paper, score) in graded {
                table.add_row(vec![
                    Cell::new(score.overall_grade).add_attribute(Attribute::Bold),
                    Cell::new(format!("{:.1}", score.overall_score)),
                    Cell::new(shorten(&paper.title, 50)),
                    Cell::new(paper.year),
                    Cell::new(format!("{:.1}", score.methodology)),
                    Cell::new(format!("{:.1}", score.citation_impact)),
                    Cell::new(format!("{:.1}", score.novelty)),
                    Cell::new(format!("{:.1}", score.clarity)),
                    Cell::new(format!("{:.1}", score.applicability)),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn output_gaps(gaps: &[ResearchGap], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(gaps)?),
        _ => {
            if gaps.is_empty() {
                println!("No clear research gaps identified.");
                return Ok(());
            }
            let mut table = new_table(vec![
                "Type", "Description", "Novelty", "Impact", "Expertise", "Timeline", "Confidence",
            ]);
            for gap in gaps {
                table.add_row(vec![
                    Cell::new(&gap.gap_type).add_attribute(Attribute::Bold),
                    Cell::new(shorten(&gap.description, 70)),
                    Cell::new(gap.novelty_grade),
                    Cell::new(gap.impact_grade),
                    Cell::new(format!("{:?}", gap.required_expertise)),
                    Cell::new(&gap.timeline),
                    Cell::new(format!("{:.2}", gap.confidence_score)),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn output_config(config: &Config, format: OutputFormat) -> Result<()> {
    let summary = config.summary();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            let missing = || "not set".to_string();
            let mut table = new_table(vec!["Setting", "Value"]);
            let rows = [
                (
                    "Semantic Scholar API key",
                    summary.semantic_scholar_key.clone().unwrap_or_else(missing),
                ),
                ("Crossref API key", summary.crossref_key.clone().unwrap_or_else(missing)),
                ("Rate limit (s)", summary.rate_limit_seconds.to_string()),
                ("Max retries", summary.max_retries.to_string()),
                ("Request timeout (s)", summary.request_timeout_seconds.to_string()),
                ("Cache enabled", summary.cache_enabled.to_string()),
                ("Cache duration (s)", summary.cache_duration_seconds.to_string()),
                ("Max results", summary.max_results.to_string()),
                ("Log level", summary.log_level.clone()),
            ];
            for (name, value) in rows {
                table.add_row(vec![Cell::new(name), Cell::new(value)]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
