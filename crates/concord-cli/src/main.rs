mod display;
mod input;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use concord_agreement::{
    AgreementOptions, MeasurementLevel, MetricId, compute_agreement, pairwise_cohen,
};
use concord_consensus::{
    ConsensusResult, PassResult, PatternPass, Persona, RemotePassSource,
    default_personas, resolve_consensus,
};
use concord_core::{Category, RaterRecord, annotations_to_batch};
use concord_match::{MatcherOptions, match_patterns};

/// Concord - inter-rater agreement, pattern matching and multi-pass consensus for qualitative coding
#[derive(Parser)]
#[command(name = "concord", version, about, long_about = None)]
struct Cli {
    /// Engine config JSON file
    #[arg(long, env = "CONCORD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the matcher's minimum confidence
    #[arg(long, env = "CONCORD_MIN_CONFIDENCE", global = true)]
    min_confidence: Option<f64>,

    /// Output as JSON
    #[arg(long, global = true, conflicts_with = "table")]
    json: bool,

    /// Output as an Arrow table
    #[arg(long, global = true)]
    table: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Agreement between raters (ratings file: array of rater records)
    Agreement {
        ratings: PathBuf,
        /// percent-agreement, cohens-kappa, fleiss-kappa or krippendorff-alpha
        #[arg(long)]
        metric: Option<MetricId>,
        /// Linear weights for Cohen's kappa
        #[arg(long)]
        weighted: bool,
        /// Krippendorff measurement level: nominal, ordinal, interval or ratio
        #[arg(long, value_parser = parse_level, default_value = "nominal")]
        level: MeasurementLevel,
        /// Ordinal category order, comma-separated
        #[arg(long, value_delimiter = ',')]
        order: Vec<String>,
        /// Also report Cohen's kappa for every rater pair
        #[arg(long)]
        pairwise: bool,
    },

    /// Rank categories for every segment of a plain-text document
    Match {
        document: PathBuf,
        categories: PathBuf,
    },

    /// Resolve consensus over completed passes (file: array of pass results)
    Consensus {
        passes: PathBuf,
        /// Fraction of passes that must agree
        #[arg(long)]
        fraction: Option<f64>,
    },

    /// Code a document with several personas and keep their consensus
    Code {
        document: PathBuf,
        categories: PathBuf,
        /// Personas JSON file (defaults to conservative / balanced / exploratory)
        #[arg(long)]
        personas: Option<PathBuf>,
        /// Fetch passes from a pass service instead of running them locally
        #[arg(long, env = "CONCORD_PASS_SERVICE")]
        remote: Option<String>,
        /// Fraction of passes that must agree
        #[arg(long)]
        fraction: Option<f64>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Card,
    Table,
    Json,
}

impl OutputMode {
    fn from_flags(json: bool, table: bool) -> Self {
        if json {
            Self::Json
        } else if table {
            Self::Table
        } else {
            Self::Card
        }
    }
}

fn parse_level(s: &str) -> Result<MeasurementLevel, String> {
    match s.to_ascii_lowercase().as_str() {
        "nominal" => Ok(MeasurementLevel::Nominal),
        "ordinal" => Ok(MeasurementLevel::Ordinal),
        "interval" => Ok(MeasurementLevel::Interval),
        "ratio" => Ok(MeasurementLevel::Ratio),
        other => Err(format!("unknown measurement level '{other}'")),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_consensus(result: &ConsensusResult, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => print_json(result),
        OutputMode::Table => {
            let batch = annotations_to_batch(&result.annotations)?;
            if batch.num_rows() == 1 {
                display::print_row_cards(&batch)
            } else {
                display::print_table(&batch)
            }
        }
        OutputMode::Card => {
            display::print_consensus_card(result);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("concord=info".parse()?),
        )
        .init();
    info!("concord v{}", env!("CARGO_PKG_VERSION"));

    let config = input::load_config(cli.config.as_deref(), cli.min_confidence)?;
    let mode = OutputMode::from_flags(cli.json, cli.table);

    match cli.command {
        Commands::Agreement {
            ratings,
            metric,
            weighted,
            level,
            order,
            pairwise,
        } => {
            let records: Vec<RaterRecord> = input::read_json(&ratings)?;
            let mut options = AgreementOptions::default().weighted(weighted).level(level);
            options.metric = metric;
            if !order.is_empty() {
                options = options.category_order(order);
            }

            let result = compute_agreement(&records, &options).context("computing agreement")?;
            let pairs = if pairwise {
                Some(pairwise_cohen(&records, &options).context("computing pairwise kappa")?)
            } else {
                None
            };

            match mode {
                OutputMode::Json => print_json(&serde_json::json!({
                    "agreement": result,
                    "pairwise": pairs,
                }))?,
                OutputMode::Table => {
                    display::print_agreement_card(&result);
                    if let Some(p) = &pairs {
                        display::print_table(&display::pairwise_to_batch(p)?)?;
                    }
                }
                OutputMode::Card => {
                    display::print_agreement_card(&result);
                    if let Some(p) = &pairs {
                        display::print_pairwise_card(p);
                    }
                }
            }
        }

        Commands::Match {
            document,
            categories,
        } => {
            let document = input::read_document(&document)?;
            let categories: Vec<Category> = input::read_json(&categories)?;
            let options = MatcherOptions::from(&config);
            let matches = match_patterns(&document, &categories, &options);

            match mode {
                OutputMode::Json => print_json(&matches)?,
                OutputMode::Table => {
                    display::print_table(&display::matches_to_batch(&matches, options.min_confidence)?)?
                }
                OutputMode::Card => display::print_match_cards(&matches, options.min_confidence),
            }
        }

        Commands::Consensus { passes, fraction } => {
            let passes: Vec<PassResult> = input::read_json(&passes)?;
            let fraction = fraction.unwrap_or(config.min_agreement_fraction);
            let result = resolve_consensus(&passes, Some(fraction)).context("resolving consensus")?;
            print_consensus(&result, mode)?;
        }

        Commands::Code {
            document,
            categories,
            personas,
            remote,
            fraction,
        } => {
            let document = input::read_document(&document)?;
            let fraction = fraction.unwrap_or(config.min_agreement_fraction);

            let (result, stats) = match remote {
                Some(url) => {
                    let source = RemotePassSource::new(url);
                    pipeline::run_remote_pipeline(&source, &document, fraction).await?
                }
                None => {
                    let categories: Vec<Category> = input::read_json(&categories)?;
                    let personas: Vec<Persona> = match personas {
                        Some(path) => input::read_json(&path)?,
                        None => default_personas(),
                    };
                    let producer = PatternPass::new(MatcherOptions::from(&config));
                    pipeline::run_code_pipeline(&producer, &document, &categories, &personas, fraction)
                        .await?
                }
            };
            eprintln!(
                "  {} passes, {} pass annotations, {} kept in {:.2}s",
                stats.passes,
                stats.pass_annotations,
                result.annotations.len(),
                stats.elapsed_secs
            );
            print_consensus(&result, mode)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn agreement_flags_parse() {
        let cli = Cli::try_parse_from([
            "concord",
            "agreement",
            "ratings.json",
            "--metric",
            "krippendorff-alpha",
            "--level",
            "Ordinal",
            "--order",
            "low,mid,high",
        ])
        .unwrap();
        match cli.command {
            Commands::Agreement {
                metric, level, order, ..
            } => {
                assert_eq!(metric, Some(MetricId::KrippendorffAlpha));
                assert_eq!(level, MeasurementLevel::Ordinal);
                assert_eq!(order, vec!["low", "mid", "high"]);
            }
            _ => panic!("expected agreement"),
        }
    }

    #[test]
    fn unknown_metric_rejected() {
        assert!(Cli::try_parse_from(["concord", "agreement", "r.json", "--metric", "scotts-pi"]).is_err());
    }

    #[test]
    fn output_mode_precedence() {
        assert!(OutputMode::from_flags(false, false) == OutputMode::Card);
        assert!(OutputMode::from_flags(false, true) == OutputMode::Table);
        assert!(OutputMode::from_flags(true, false) == OutputMode::Json);
    }
}
