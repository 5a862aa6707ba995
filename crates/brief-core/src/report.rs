//! Report assembly
//!
//! [`ReportGenerator`] runs the aggregation, asks the narrative source for
//! each symbol in turn, and assembles the structured [`Report`]. Symbols are
//! processed sequentially; a narrative failure only affects its own section.

use crate::aggregate::{Aggregation, MetricsAggregator, SymbolSnapshot};
use crate::config::BriefConfig;
use crate::error::Result;
use crate::format::{group_thousands, price, signed_pct};
use crate::markup::MarkupWriter;
use crate::model::{KeyField, Report, ReportSection, SymbolMetrics};
use crate::narrative::{Narrative, NarrativeSource};
use crate::store::MarketStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Shown instead of a percentage when only one sample exists
pub const NEEDS_MORE_DATA: &str = "(needs more data)";

/// Output of one generation run
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report_date: NaiveDate,
    pub report: Report,
    /// Narrative outcome per symbol, in section order
    pub narratives: Vec<(String, Narrative)>,
}

impl GeneratedReport {
    /// Serialize the report with the configured wrap width
    pub fn to_markup(&self, config: &BriefConfig) -> String {
        MarkupWriter::new(config.wrap_width).write(&self.report)
    }

    /// Symbols whose narrative could not be produced
    pub fn failed_symbols(&self) -> Vec<&str> {
        self.narratives
            .iter()
            .filter(|(_, n)| n.is_failure())
            .map(|(s, _)| s.as_str())
            .collect()
    }
}

/// Builds reports from the store and a narrative source
pub struct ReportGenerator {
    store: Arc<dyn MarketStore>,
    narratives: Arc<dyn NarrativeSource>,
    config: Arc<BriefConfig>,
    aggregator: MetricsAggregator,
}

impl ReportGenerator {
    pub fn new(
        store: Arc<dyn MarketStore>,
        narratives: Arc<dyn NarrativeSource>,
        config: Arc<BriefConfig>,
    ) -> Self {
        let aggregator = MetricsAggregator::from_config(&config);
        Self {
            store,
            narratives,
            config,
            aggregator,
        }
    }

    /// Report date implied by the store, `today` when it is empty
    pub fn report_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        self.aggregator.report_date(self.store.as_ref(), today)
    }

    /// Generate the report for the store's latest date
    pub async fn generate(&self, today: NaiveDate) -> Result<GeneratedReport> {
        let aggregation = self.aggregator.aggregate(self.store.as_ref(), today)?;
        self.assemble(aggregation).await
    }

    /// Drop cached narratives for the report date, then generate
    pub async fn regenerate(&self, today: NaiveDate) -> Result<GeneratedReport> {
        let report_date = self.report_date(today)?;
        let removed = self.narratives.invalidate(report_date).await?;
        info!("Cleared {} cached narratives for {}", removed, report_date);
        self.generate(today).await
    }

    async fn assemble(&self, aggregation: Aggregation) -> Result<GeneratedReport> {
        let Aggregation {
            report_date,
            symbols,
        } = aggregation;

        let mut report = Report::new(report_title(&self.config.title_prefix, report_date))
            .with_meta(format!(
                "Symbols: {} | Narrative model: {}",
                symbols.len(),
                self.narratives.model_id()
            ));
        let mut narratives = Vec::with_capacity(symbols.len());

        for snapshot in &symbols {
            let narrative = self.narrative_for(report_date, snapshot).await;
            report.sections.push(build_section(snapshot, &narrative));
            narratives.push((snapshot.metrics.symbol.clone(), narrative));
        }

        let failed = narratives.iter().filter(|(_, n)| n.is_failure()).count();
        info!(
            "Assembled report for {} ({} sections, {} narrative failures)",
            report_date,
            report.sections.len(),
            failed
        );

        Ok(GeneratedReport {
            report_date,
            report,
            narratives,
        })
    }

    async fn narrative_for(&self, report_date: NaiveDate, snapshot: &SymbolSnapshot) -> Narrative {
        if !snapshot.metrics.has_move() {
            return Narrative::InsufficientData;
        }

        let context = snapshot.narrative_context();
        let narrative =
            Narrative::from_result(self.narratives.get_or_compute(report_date, &context).await);
        if let Narrative::Failed { reason } = &narrative {
            warn!(symbol = %snapshot.metrics.symbol, %reason, "Narrative generation failed");
        }
        narrative
    }
}

/// `<prefix> (<date>)`
pub fn report_title(prefix: &str, report_date: NaiveDate) -> String {
    format!("{prefix} ({report_date})")
}

/// Section for one symbol: display strings, news lines and narrative text
pub fn build_section(snapshot: &SymbolSnapshot, narrative: &Narrative) -> ReportSection {
    let m = &snapshot.metrics;
    let mut section = ReportSection::new(&m.symbol)
        .with_value(KeyField::Date, date_value(m))
        .with_value(KeyField::Close, close_value(m))
        .with_value(KeyField::Volume, group_thousands(m.latest_volume))
        .with_value(KeyField::Range, range_value(m))
        .with_narrative(narrative.section_text());
    section.news = snapshot.news_display();
    section
}

fn date_value(m: &SymbolMetrics) -> String {
    if m.has_move() {
        format!("{} → {}", m.prior_date, m.latest_date)
    } else {
        m.latest_date.to_string()
    }
}

fn close_value(m: &SymbolMetrics) -> String {
    match m.pct_change {
        Some(pct) => format!(
            "{} → {} ({})",
            price(m.prior_close),
            price(m.latest_close),
            signed_pct(pct)
        ),
        None => format!("{} {NEEDS_MORE_DATA}", price(m.latest_close)),
    }
}

fn range_value(m: &SymbolMetrics) -> String {
    format!(
        "low {}, high {}, position {:.2}",
        price(m.range_low),
        price(m.range_high),
        m.range_position
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BriefError;
    use crate::markup::{parse, serialize};
    use crate::model::{NewsItem, PriceSample};
    use crate::narrative::{NarrativeContext, INSUFFICIENT_DATA_TEXT};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    /// Narrative source that fails for one symbol and counts calls
    #[derive(Default)]
    struct ScriptedNarratives {
        fail_for: Option<String>,
        calls: Mutex<Vec<String>>,
        invalidated: Mutex<Vec<NaiveDate>>,
    }

    #[async_trait]
    impl NarrativeSource for ScriptedNarratives {
        fn model_id(&self) -> &str {
            "test-model"
        }

        async fn get_or_compute(
            &self,
            _report_date: NaiveDate,
            context: &NarrativeContext,
        ) -> Result<String> {
            let symbol = context.symbol().to_string();
            self.calls.lock().unwrap().push(symbol.clone());
            if self.fail_for.as_deref() == Some(symbol.as_str()) {
                return Err(BriefError::Narrative("upstream timeout".to_string()));
            }
            Ok(format!("{symbol} moved on {} news items.", context.news.len()))
        }

        async fn invalidate(&self, report_date: NaiveDate) -> Result<usize> {
            self.invalidated.lock().unwrap().push(report_date);
            Ok(2)
        }
    }

    fn generator(store: MemoryStore, narratives: Arc<ScriptedNarratives>) -> ReportGenerator {
        ReportGenerator::new(Arc::new(store), narratives, Arc::new(BriefConfig::default()))
    }

    fn three_symbol_store() -> MemoryStore {
        MemoryStore::new()
            .with_price(PriceSample::close_only("ACME", day(10), 10.0, 90_000))
            .with_price(PriceSample::close_only("ACME", day(11), 10.5, 100_000))
            .with_price(PriceSample::close_only("BOLT", day(10), 4.0, 500))
            .with_price(PriceSample::close_only("BOLT", day(11), 3.0, 1_500))
            .with_price(PriceSample::close_only("CRUX", day(11), 7.25, 42))
            .with_news(NewsItem {
                symbol: "BOLT".to_string(),
                published_at: "2026-01-11T16:47:00Z".to_string(),
                headline: "BOLT cuts guidance".to_string(),
                summary: "Demand softened.".to_string(),
                url: "https://news.example.com/bolt".to_string(),
                source: "Yahoo".to_string(),
            })
    }

    #[tokio::test]
    async fn test_acme_end_to_end() {
        let store = MemoryStore::new()
            .with_price(PriceSample::close_only("ACME", day(10), 10.0, 90_000))
            .with_price(PriceSample::close_only("ACME", day(11), 10.5, 100_000));
        let generated = generator(store, Arc::default()).generate(day(20)).await.unwrap();

        assert_eq!(generated.report_date, day(11));
        assert_eq!(generated.report.title, "Daily Market Report (2026-01-11)");

        let markup = serialize(&generated.report);
        assert!(markup.contains("- Date: 2026-01-10 → 2026-01-11\n"));
        assert!(markup.contains("- Close: 10.00 → 10.50 (+5.00%)\n"));
        assert!(markup.contains("- Volume: 100,000\n"));
        assert!(markup.contains("  - (no recent news)\n"));
        assert!(markup.contains("- 20D Range: low 10.00, high 10.50, position 1.00\n"));
        assert!(markup.contains("  - ACME moved on 0 news items.\n"));
    }

    #[tokio::test]
    async fn test_narrative_failure_is_isolated() {
        let narratives = Arc::new(ScriptedNarratives {
            fail_for: Some("ACME".to_string()),
            ..Default::default()
        });
        let generated = generator(three_symbol_store(), narratives.clone())
            .generate(day(20))
            .await
            .unwrap();

        assert_eq!(generated.report.symbols(), vec!["ACME", "BOLT", "CRUX"]);
        assert_eq!(generated.failed_symbols(), vec!["ACME"]);

        let acme = generated.report.section("ACME").unwrap();
        assert_eq!(acme.narrative, "(Error: Narrative error: upstream timeout)");
        assert_eq!(acme.value(KeyField::Close), Some("10.00 → 10.50 (+5.00%)"));

        let bolt = generated.report.section("BOLT").unwrap();
        assert_eq!(bolt.narrative, "BOLT moved on 1 news items.");
        assert_eq!(bolt.value(KeyField::Close), Some("4.00 → 3.00 (-25.00%)"));
        assert_eq!(bolt.news[0].display_line, "2026-01-11 16:47 | Yahoo | BOLT cuts guidance");
    }

    #[tokio::test]
    async fn test_single_sample_skips_narrative() {
        let narratives = Arc::new(ScriptedNarratives::default());
        let generated = generator(three_symbol_store(), narratives.clone())
            .generate(day(20))
            .await
            .unwrap();

        let crux = generated.report.section("CRUX").unwrap();
        assert_eq!(crux.value(KeyField::Date), Some("2026-01-11"));
        assert_eq!(crux.value(KeyField::Close), Some("7.25 (needs more data)"));
        assert_eq!(crux.value(KeyField::Range), Some("low 7.25, high 7.25, position 0.50"));
        assert_eq!(crux.narrative, INSUFFICIENT_DATA_TEXT);

        let calls = narratives.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["ACME", "BOLT"]);
    }

    #[tokio::test]
    async fn test_empty_store_yields_well_formed_report() {
        let generated = generator(MemoryStore::new(), Arc::default())
            .generate(day(20))
            .await
            .unwrap();

        assert_eq!(generated.report_date, day(20));
        assert!(generated.report.sections.is_empty());
        assert_eq!(
            generated.report.meta_line.as_deref(),
            Some("Symbols: 0 | Narrative model: test-model")
        );

        let parsed = parse(&serialize(&generated.report));
        assert_eq!(parsed, generated.report);
    }

    #[tokio::test]
    async fn test_regenerate_invalidates_report_date() {
        let narratives = Arc::new(ScriptedNarratives::default());
        generator(three_symbol_store(), narratives.clone())
            .regenerate(day(20))
            .await
            .unwrap();

        assert_eq!(*narratives.invalidated.lock().unwrap(), vec![day(11)]);
    }

    #[tokio::test]
    async fn test_generated_report_round_trips() {
        let config = BriefConfig::default();
        let generated = generator(three_symbol_store(), Arc::default())
            .generate(day(20))
            .await
            .unwrap();

        assert_eq!(parse(&generated.to_markup(&config)), generated.report);
    }
}
