//! Command-line interface for market-brief

use anyhow::Context;
use brief_core::files::write_markup;
use brief_core::{
    BriefConfig, DisabledNarratives, MarketStore, NarrativeCache, NarrativeSource, ReportGenerator,
};
use brief_narrative::{CachedNarrator, MemoryNarrativeCache, NarrativePrompt, OpenAiProvider};
use brief_render::{DocumentFormat, DocumentRenderer};
use brief_store::SqliteStore;
use brief_utils::ConfigOverrides;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "market-brief")]
#[command(about = "Daily market report from stored prices and news", long_about = None)]
struct Cli {
    /// SQLite database with prices and news (env: SQLITE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Root directory for markup and documents (env: BRIEF_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Narrative model identifier (env: OPENAI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Skip the language model; sections report narratives as disabled
    #[arg(long, global = true)]
    no_narrative: bool,

    /// Keep generated narratives in memory only
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate the store, write the markup file and render the document
    Generate {
        /// Drop cached narratives for the report date before generating
        #[arg(long)]
        refresh_narratives: bool,

        /// Document format (pdf, html or text)
        #[arg(long, default_value_t = DocumentFormat::default())]
        format: DocumentFormat,

        /// Date used for the title when the store is empty (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Render a stored markup file without touching the store
    Render {
        /// Path of a report_<date>.md file
        markup: PathBuf,

        /// Document format (pdf, html or text)
        #[arg(long, default_value_t = DocumentFormat::default())]
        format: DocumentFormat,

        /// Output directory (default: <output-dir>/docs)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Files produced by a command
#[derive(Debug)]
struct Outcome {
    markup: Option<PathBuf>,
    document: PathBuf,
    failed_symbols: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brief_utils::load_env_file();
    brief_utils::init_tracing();

    let cli = Cli::parse();
    info!("Starting market-brief");

    let outcome = run(cli).await?;
    if let Some(markup) = &outcome.markup {
        println!("[OK] Wrote markup: {}", markup.display());
    }
    println!("[OK] Rendered document: {}", outcome.document.display());
    if !outcome.failed_symbols.is_empty() {
        println!(
            "[WARN] Narrative unavailable for: {}",
            outcome.failed_symbols.join(", ")
        );
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = ConfigOverrides {
        db_path: cli.db,
        output_dir: cli.output_dir,
        model: cli.model,
    }
    .resolve()
    .context("invalid configuration")?;

    match cli.command {
        Command::Generate {
            refresh_narratives,
            format,
            date,
        } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            generate(
                config,
                NarrativeMode::from_flags(cli.no_narrative, cli.no_cache),
                refresh_narratives,
                format,
                today,
            )
            .await
        }
        Command::Render {
            markup,
            format,
            out,
        } => {
            let document_dir = out.unwrap_or_else(|| config.document_dir());
            let document = DocumentRenderer::new()
                .render_markup_file(&markup, &document_dir, format)
                .with_context(|| format!("failed to render {}", markup.display()))?;
            Ok(Outcome {
                markup: None,
                document,
                failed_symbols: Vec::new(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NarrativeMode {
    Disabled,
    Cached,
    Ephemeral,
}

impl NarrativeMode {
    fn from_flags(no_narrative: bool, no_cache: bool) -> Self {
        match (no_narrative, no_cache) {
            (true, _) => Self::Disabled,
            (false, true) => Self::Ephemeral,
            (false, false) => Self::Cached,
        }
    }
}

fn narrative_source(
    mode: NarrativeMode,
    store: &Arc<SqliteStore>,
    config: &BriefConfig,
) -> anyhow::Result<Arc<dyn NarrativeSource>> {
    let cache: Arc<dyn NarrativeCache> = match mode {
        NarrativeMode::Disabled => return Ok(Arc::new(DisabledNarratives)),
        NarrativeMode::Cached => store.clone(),
        NarrativeMode::Ephemeral => Arc::new(MemoryNarrativeCache::new()),
    };

    let provider = OpenAiProvider::from_env()
        .context("narratives need OPENAI_API_KEY; pass --no-narrative to skip them")?;
    let prompt = NarrativePrompt::new(config.range_window)?;
    Ok(Arc::new(CachedNarrator::new(
        Arc::new(provider),
        cache,
        prompt,
        config.model.clone(),
    )))
}

async fn generate(
    config: BriefConfig,
    mode: NarrativeMode,
    refresh_narratives: bool,
    format: DocumentFormat,
    today: NaiveDate,
) -> anyhow::Result<Outcome> {
    let store = Arc::new(
        SqliteStore::open(&config.db_path)
            .with_context(|| format!("cannot open {}", config.db_path.display()))?,
    );
    let narratives = narrative_source(mode, &store, &config)?;
    let market: Arc<dyn MarketStore> = store;

    let config = Arc::new(config);
    let generator = ReportGenerator::new(market, narratives, Arc::clone(&config));
    let generated = if refresh_narratives {
        generator.regenerate(today).await?
    } else {
        generator.generate(today).await?
    };

    let markup = generated.to_markup(&config);
    let markup_path = write_markup(&config.markup_dir(), generated.report_date, &markup)?;
    info!("Wrote markup to {}", markup_path.display());

    // The document is always rendered from the file on disk
    let document =
        DocumentRenderer::new().render_markup_file(&markup_path, &config.document_dir(), format)?;

    Ok(Outcome {
        markup: Some(markup_path),
        document,
        failed_symbols: generated
            .failed_symbols()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::PriceSample;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "market-brief",
            "generate",
            "--refresh-narratives",
            "--format",
            "text",
            "--date",
            "2026-01-11",
            "--no-narrative",
        ])
        .unwrap();

        assert!(cli.no_narrative);
        match cli.command {
            Command::Generate {
                refresh_narratives,
                format,
                date,
            } => {
                assert!(refresh_narratives);
                assert_eq!(format, DocumentFormat::Text);
                assert_eq!(date, Some(day(11)));
            }
            Command::Render { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_render_defaults() {
        let cli = Cli::try_parse_from(["market-brief", "render", "repo/md/report_2026-01-11.md"])
            .unwrap();
        match cli.command {
            Command::Render {
                markup,
                format,
                out,
            } => {
                assert_eq!(markup, PathBuf::from("repo/md/report_2026-01-11.md"));
                assert_eq!(format, DocumentFormat::Pdf);
                assert!(out.is_none());
            }
            Command::Generate { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        assert!(Cli::try_parse_from(["market-brief", "generate", "--format", "docx"]).is_err());
    }

    #[test]
    fn test_narrative_mode() {
        assert_eq!(NarrativeMode::from_flags(true, true), NarrativeMode::Disabled);
        assert_eq!(NarrativeMode::from_flags(false, true), NarrativeMode::Ephemeral);
        assert_eq!(NarrativeMode::from_flags(false, false), NarrativeMode::Cached);
    }

    #[tokio::test]
    async fn test_generate_then_render() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("market.db");
        let out = tmp.path().join("repo");

        {
            let store = SqliteStore::open(&db).unwrap();
            store
                .upsert_price(&PriceSample::close_only("ACME", day(10), 10.0, 90_000))
                .unwrap();
            store
                .upsert_price(&PriceSample::close_only("ACME", day(11), 10.5, 100_000))
                .unwrap();
        }

        let args: Vec<OsString> = vec![
            "market-brief".into(),
            "--db".into(),
            db.clone().into_os_string(),
            "--output-dir".into(),
            out.clone().into_os_string(),
            "--no-narrative".into(),
            "generate".into(),
            "--format".into(),
            "text".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let outcome = run(cli).await.unwrap();

        let markup_path = outcome.markup.unwrap();
        assert_eq!(markup_path, out.join("md").join("report_2026-01-11.md"));
        assert_eq!(outcome.document, out.join("docs").join("report_2026-01-11.txt"));
        assert_eq!(outcome.failed_symbols, vec!["ACME".to_string()]);

        let markup = std::fs::read_to_string(&markup_path).unwrap();
        assert!(markup.contains("### ACME"));
        assert!(markup.contains("narratives disabled"));

        let document = std::fs::read_to_string(&outcome.document).unwrap();
        assert!(document.contains("ACME"));

        // Re-render the stored markup elsewhere in the default format
        let pdf_dir = tmp.path().join("pdf");
        let args: Vec<OsString> = vec![
            "market-brief".into(),
            "render".into(),
            markup_path.clone().into_os_string(),
            "--out".into(),
            pdf_dir.clone().into_os_string(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let outcome = run(cli).await.unwrap();
        assert!(outcome.markup.is_none());
        assert_eq!(outcome.document, pdf_dir.join("report_2026-01-11.pdf"));
        assert!(std::fs::read(&outcome.document).unwrap().starts_with(b"%PDF"));
    }
}
