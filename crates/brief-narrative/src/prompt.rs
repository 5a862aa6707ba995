//! Daily brief prompt
//!
//! The prompt restricts the model to the supplied price data and news, asks
//! for 3 to 6 sentences and a closing "Watch next:" line, and forbids price
//! predictions.

use crate::error::Result;
use brief_core::aggregate::{MISSING, UNKNOWN};
use brief_core::format::{group_thousands, price, short_timestamp, signed_pct};
use brief_core::model::NewsItem;
use brief_core::narrative::NarrativeContext;
use minijinja::Environment;
use serde::Serialize;

const TEMPLATE_NAME: &str = "daily_brief.txt";

const DAILY_BRIEF_TEMPLATE: &str = r#"You are writing a concise daily market brief. Your job is to summarize *possible* drivers of the price move using ONLY:
1) the provided price/volume data,
2) the provided news headlines + summaries.

Hard rules:
- Do NOT browse the web.
- Do NOT invent catalysts not supported by the provided news content.
- Only use news that is directly relevant to the company's business, products, earnings, regulation, or industry conditions.
- Ignore news that is generic market commentary, macro news, or not clearly related to this specific company.
- If the provided news does not clearly explain the move, explicitly say:
  "No clear catalyst found in provided news."
- Prefer saying "No clear catalyst found" rather than speculating.

Stock: {{ ticker }}
Move: {{ prior_date }} -> {{ latest_date }}
Close: {{ prior_close }} -> {{ latest_close }} ({{ pct }})
Volume (latest day): {{ volume }}

{{ range_days }}-trading-day context:
- Range low: {{ range_low }}
- Range high: {{ range_high }}
- Current position in range (0=low, 1=high): {{ range_position }}

Provided news content:
{% for item in news %}
[News {{ loop.index }}]
Time: {{ item.time }}
Source: {{ item.source }}
Headline: {{ item.headline }}
Summary: {{ item.summary }}
URL: {{ item.url }}
{% if not loop.last %}

{% endif %}
{% else %}
(No recent company news content was provided.)
{% endfor %}

Write 3-6 sentences:
- Sentence 1: what happened (move + where it sits in the {{ range_days }}D range).
- Sentence 2-4: connect the move to the provided news summaries (quote/paraphrase specifics).
- Sentence 5: mention uncertainty if evidence is weak.
- Final: "Watch next: ..." (earnings/guidance/product/regulatory/etc.), but NO price prediction."#;

#[derive(Debug, Serialize)]
struct PromptNews {
    time: String,
    source: String,
    headline: String,
    summary: String,
    url: String,
}

impl From<&NewsItem> for PromptNews {
    fn from(item: &NewsItem) -> Self {
        Self {
            time: or_placeholder(&short_timestamp(&item.published_at), UNKNOWN),
            source: or_placeholder(&item.source, UNKNOWN),
            headline: or_placeholder(&item.headline, MISSING),
            summary: or_placeholder(&item.summary, MISSING),
            url: or_placeholder(&item.url, MISSING),
        }
    }
}

#[derive(Debug, Serialize)]
struct PromptVars {
    ticker: String,
    prior_date: String,
    latest_date: String,
    prior_close: String,
    latest_close: String,
    pct: String,
    volume: String,
    range_days: usize,
    range_low: String,
    range_high: String,
    range_position: String,
    news: Vec<PromptNews>,
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Renders the daily brief prompt for one symbol
pub struct NarrativePrompt {
    env: Environment<'static>,
    range_days: usize,
}

impl NarrativePrompt {
    /// `range_days` is the number of closes the range was computed over
    pub fn new(range_days: usize) -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template(TEMPLATE_NAME, DAILY_BRIEF_TEMPLATE)?;
        Ok(Self { env, range_days })
    }

    pub fn render(&self, context: &NarrativeContext) -> Result<String> {
        let m = &context.metrics;
        let vars = PromptVars {
            ticker: m.symbol.clone(),
            prior_date: m.prior_date.to_string(),
            latest_date: m.latest_date.to_string(),
            prior_close: price(m.prior_close),
            latest_close: price(m.latest_close),
            pct: m.pct_change.map_or_else(|| "n/a".to_string(), signed_pct),
            volume: group_thousands(m.latest_volume),
            range_days: self.range_days,
            range_low: price(m.range_low),
            range_high: price(m.range_high),
            range_position: format!("{:.2}", m.range_position),
            news: context.news.iter().map(PromptNews::from).collect(),
        };

        let template = self.env.get_template(TEMPLATE_NAME)?;
        Ok(template.render(&vars)?.trim().to_string())
    }
}

impl std::fmt::Debug for NarrativePrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativePrompt")
            .field("template", &TEMPLATE_NAME)
            .field("range_days", &self.range_days)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::model::SymbolMetrics;
    use chrono::NaiveDate;

    fn context(news: Vec<NewsItem>) -> NarrativeContext {
        NarrativeContext {
            metrics: SymbolMetrics {
                symbol: "ACME".to_string(),
                prior_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                latest_date: NaiveDate::from_ymd_opt(2026, 1, 11).unwrap(),
                prior_close: 10.0,
                latest_close: 10.5,
                pct_change: Some(5.0),
                latest_volume: 100_000,
                range_low: 10.0,
                range_high: 10.5,
                range_position: 1.0,
            },
            news,
        }
    }

    #[test]
    fn test_price_block() {
        let prompt = NarrativePrompt::new(20).unwrap().render(&context(vec![])).unwrap();

        assert!(prompt.starts_with("You are writing a concise daily market brief."));
        assert!(prompt.contains("Stock: ACME\n"));
        assert!(prompt.contains("Move: 2026-01-10 -> 2026-01-11\n"));
        assert!(prompt.contains("Close: 10.00 -> 10.50 (+5.00%)\n"));
        assert!(prompt.contains("Volume (latest day): 100,000\n"));
        assert!(prompt.contains("20-trading-day context:\n- Range low: 10.00\n- Range high: 10.50\n"));
        assert!(prompt.contains("(0=low, 1=high): 1.00"));
        assert!(prompt.contains("(No recent company news content was provided.)"));
        assert!(prompt.ends_with("NO price prediction."));
    }

    #[test]
    fn test_news_blocks_with_placeholders() {
        let news = vec![
            NewsItem {
                symbol: "ACME".to_string(),
                published_at: "2026-01-11T14:35:00Z".to_string(),
                headline: "ACME ships widgets".to_string(),
                summary: "Shipments doubled.".to_string(),
                url: "https://news.example.com/acme".to_string(),
                source: "Wire".to_string(),
            },
            NewsItem {
                symbol: "ACME".to_string(),
                ..Default::default()
            },
        ];
        let prompt = NarrativePrompt::new(20).unwrap().render(&context(news)).unwrap();

        assert!(prompt.contains(
            "[News 1]\nTime: 2026-01-11 14:35\nSource: Wire\nHeadline: ACME ships widgets\n\
             Summary: Shipments doubled.\nURL: https://news.example.com/acme\n"
        ));
        assert!(prompt.contains(
            "[News 2]\nTime: (unknown)\nSource: (unknown)\nHeadline: (missing)\n\
             Summary: (missing)\nURL: (missing)\n"
        ));
        assert!(!prompt.contains("No recent company news"));
    }

    #[test]
    fn test_news_times_shortened_to_minutes() {
        let item = |published_at: &str| NewsItem {
            symbol: "ACME".to_string(),
            published_at: published_at.to_string(),
            headline: "h".to_string(),
            ..Default::default()
        };
        let news = vec![
            item("2026-01-11T09:05:59.123-05:00"),
            item("  "),
            item("yesterday"),
        ];
        let prompt = NarrativePrompt::new(20).unwrap().render(&context(news)).unwrap();

        assert!(prompt.contains("[News 1]\nTime: 2026-01-11 09:05\n"));
        assert!(prompt.contains("[News 2]\nTime: (unknown)\n"));
        assert!(prompt.contains("[News 3]\nTime: yesterday\n"));
        assert!(!prompt.contains("09:05:59"));
    }

    #[test]
    fn test_missing_move() {
        let mut ctx = context(vec![]);
        ctx.metrics.pct_change = None;
        let prompt = NarrativePrompt::new(5).unwrap().render(&ctx).unwrap();
        assert!(prompt.contains("(n/a)"));
        assert!(prompt.contains("5-trading-day context:"));
    }
}
