//! CLI for the docguard fraud decision pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docguard_config::DocguardConfig;
use docguard_core::{DecisionMatrix, DocumentKind, NormalizedDocument};
use docguard_features::schema::schema_for;
use docguard_history::{HistoryStore, InMemoryHistoryStore, JsonFileHistoryStore};
use docguard_llm::{ChatCompletionClient, DecisionSynthesizer, LlmClient, ScriptedClient};
use docguard_pipeline::FraudPipeline;
use docguard_scoring::{artifacts::KindModels, FraudScorer};

#[derive(Parser)]
#[command(name = "docguard")]
#[command(about = "Fraud decision pipeline for OCR-normalized financial documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the decision pipeline on a normalized document
    Decide {
        /// Path to the normalized document JSON
        #[arg(short, long)]
        document: PathBuf,

        /// Path to the raw OCR text; empty text is assumed when omitted
        #[arg(short, long)]
        raw_text: Option<PathBuf>,

        /// Path to a YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use the mock scorer instead of loading model artifacts
        #[arg(long)]
        mock: bool,

        /// Skip the LLM and decide from the matrix alone
        #[arg(long)]
        no_llm: bool,

        /// History snapshot path, overriding the configured one
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Print the declared feature schema for a document kind
    Schema {
        /// One of: bank_statement, check, paystub, money_order
        #[arg(short, long)]
        kind: String,
    },

    /// Load and validate the model artifacts for every enabled kind
    ValidateModels {
        /// Artifact directory, overriding the configured one
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Path to a YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decide {
            document,
            raw_text,
            config,
            mock,
            no_llm,
            history,
        } => decide(document, raw_text, config, mock, no_llm, history).await,
        Commands::Schema { kind } => print_schema(&kind),
        Commands::ValidateModels { model_dir, config } => validate_models(model_dir, config),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<DocguardConfig> {
    match path {
        Some(path) => {
            DocguardConfig::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => DocguardConfig::from_env().context("loading configuration from environment"),
    }
}

fn enabled_kinds(config: &DocguardConfig) -> Vec<DocumentKind> {
    DocumentKind::all()
        .into_iter()
        .filter(|k| config.kinds.is_enabled(*k))
        .collect()
}

async fn decide(
    document: PathBuf,
    raw_text: Option<PathBuf>,
    config: Option<PathBuf>,
    mock: bool,
    no_llm: bool,
    history_override: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(path) = history_override {
        config.history.path = Some(path);
    }

    let doc_json = std::fs::read_to_string(&document)
        .with_context(|| format!("reading {}", document.display()))?;
    let doc: NormalizedDocument =
        serde_json::from_str(&doc_json).context("parsing normalized document")?;

    let raw_text = match raw_text {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => String::new(),
    };

    let scorer = if mock {
        FraudScorer::mock()
    } else {
        FraudScorer::from_artifacts(&config.model_dir, &enabled_kinds(&config))
            .context("loading model artifacts")?
    };

    let client: Arc<dyn LlmClient> = if no_llm {
        Arc::new(ScriptedClient::unreachable())
    } else {
        let api_key = std::env::var(&config.llm.api_key_env).ok();
        Arc::new(ChatCompletionClient::new(
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            api_key,
            Duration::from_secs(config.llm.timeout_seconds),
        )?)
    };

    let history: Arc<dyn HistoryStore> = match &config.history.path {
        Some(path) => Arc::new(JsonFileHistoryStore::open(path)?),
        None => Arc::new(InMemoryHistoryStore::new()),
    };

    let matrix = DecisionMatrix::new(config.thresholds);
    let synthesizer = DecisionSynthesizer::new(
        client,
        matrix,
        Duration::from_secs(config.llm.timeout_seconds),
    );
    let pipeline = FraudPipeline::new(scorer, synthesizer, history, matrix, config.kinds);

    let record = pipeline.process(&doc, &raw_text).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn print_schema(kind: &str) -> Result<()> {
    let kind = parse_kind(kind)?;
    let schema = schema_for(kind);
    println!("# {} ({} features)", kind, schema.len());
    println!("{:<5} {:<34} {:>12} {:>12} {:>9}", "index", "name", "min", "max", "default");
    for (index, spec) in schema.specs().iter().enumerate() {
        println!(
            "{:<5} {:<34} {:>12} {:>12} {:>9}",
            index, spec.name, spec.min, spec.max, spec.default
        );
    }
    Ok(())
}

fn validate_models(model_dir: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let model_dir = model_dir.unwrap_or_else(|| config.model_dir.clone());

    let mut failures = 0;
    for kind in enabled_kinds(&config) {
        match KindModels::load(&model_dir, kind) {
            Ok(models) => println!(
                "{kind}: ok ({} forest trees, {} boosted trees)",
                models.forest.trees.len(),
                models.boosted.trees.len()
            ),
            Err(error) => {
                failures += 1;
                println!("{kind}: FAILED - {error}");
            }
        }
    }
    if failures > 0 {
        bail!("{failures} artifact set(s) failed validation");
    }
    Ok(())
}

fn parse_kind(raw: &str) -> Result<DocumentKind> {
    let kind = match raw.trim().to_lowercase().as_str() {
        "bank_statement" | "statement" => DocumentKind::BankStatement,
        "check" => DocumentKind::Check,
        "paystub" => DocumentKind::Paystub,
        "money_order" => DocumentKind::MoneyOrder,
        other => bail!("unknown document kind `{other}`"),
    };
    Ok(kind)
}
