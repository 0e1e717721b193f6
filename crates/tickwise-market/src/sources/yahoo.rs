use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tickwise_models::{Fundamentals, PriceBar, PriceSeries, TickerSymbol};
use tokio::sync::Mutex;

use super::MarketDataProvider;
use crate::error::MarketError;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData";
const USER_AGENT: &str = concat!("tickwise/", env!("CARGO_PKG_VERSION"));

/// Yahoo Finance's unofficial chart and quoteSummary endpoints.
///
/// quoteSummary needs a session cookie plus a crumb token; both are fetched
/// lazily and the crumb is cached until Yahoo rejects it.
pub struct YahooProvider {
    client: Client,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            crumb: Mutex::new(None),
        })
    }

    async fn crumb(&self) -> Result<String, MarketError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie matters here; the page itself is usually a 404.
        if let Err(e) = self.client.get(COOKIE_URL).send().await {
            tracing::debug!(error = %e, "Yahoo cookie request failed");
        }

        let response = self
            .client
            .get(CRUMB_URL)
            .header("referer", "https://finance.yahoo.com/")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let crumb = body.trim();

        if !status.is_success() || crumb.is_empty() || crumb.len() > 100 || crumb.contains(' ') {
            return Err(MarketError::Provider(format!(
                "failed to obtain Yahoo crumb (status {status})"
            )));
        }

        *cached = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_history(
        &self,
        ticker: &TickerSymbol,
        sessions: usize,
    ) -> Result<PriceSeries, MarketError> {
        let end = Utc::now();
        let start = end - Duration::days(calendar_days_for(sessions));
        let url = format!("{CHART_URL}/{ticker}");

        tracing::debug!(%ticker, sessions, "Fetching Yahoo chart");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::NOT_FOUND {
            // Unknown symbols come back as 404 with an error payload.
            return Ok(PriceSeries::new(ticker.clone(), Vec::new()));
        }
        if !status.is_success() {
            return Err(MarketError::Provider(format!(
                "yahoo chart returned status {status} for {ticker}"
            )));
        }

        Ok(parse_chart(ticker, &body)?.tail(sessions))
    }

    async fn fetch_info(&self, ticker: &TickerSymbol) -> Result<Fundamentals, MarketError> {
        let crumb = self.crumb().await?;
        let url = format!("{QUOTE_SUMMARY_URL}/{ticker}");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES), ("crumb", crumb.as_str())])
            .header("referer", "https://finance.yahoo.com/")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(%ticker, %status, "Yahoo rejected crumb");
            self.invalidate_crumb().await;
            return Err(MarketError::Provider(format!(
                "yahoo quoteSummary returned status {status} for {ticker}"
            )));
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MarketError::Provider(format!(
                "yahoo quoteSummary returned status {status} for {ticker}"
            )));
        }

        parse_quote_summary(&body)
    }
}

/// Roughly five trading sessions per seven calendar days, plus slack for
/// market holidays.
fn calendar_days_for(sessions: usize) -> i64 {
    (sessions as i64 * 7) / 5 + 14
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Parse a v8 chart payload. Rows without a close are dropped.
pub(crate) fn parse_chart(ticker: &TickerSymbol, body: &str) -> Result<PriceSeries, MarketError> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error.filter(|e| !e.is_null()) {
        return Err(MarketError::Provider(format!(
            "yahoo chart error for {ticker}: {error}"
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::new(ticker.clone(), Vec::new()));
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::new(ticker.clone(), Vec::new()));
    };

    let cell = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            let close = cell(&quote.close, i)?;
            Some(PriceBar {
                timestamp,
                open: cell(&quote.open, i).unwrap_or(close),
                high: cell(&quote.high, i).unwrap_or(close),
                low: cell(&quote.low, i).unwrap_or(close),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    Ok(PriceSeries::new(ticker.clone(), bars))
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default, rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    price_to_book: Option<RawValue>,
    #[serde(default)]
    profit_margins: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    #[serde(default)]
    debt_to_equity: Option<RawValue>,
    #[serde(default)]
    profit_margins: Option<RawValue>,
    #[serde(default)]
    revenue_growth: Option<RawValue>,
    #[serde(default)]
    return_on_equity: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; empty objects mean
/// the value is unavailable.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

pub(crate) fn parse_quote_summary(body: &str) -> Result<Fundamentals, MarketError> {
    let response: QuoteSummaryResponse = serde_json::from_str(body)?;

    if let Some(error) = response.quote_summary.error.filter(|e| !e.is_null()) {
        return Err(MarketError::Provider(format!("yahoo quoteSummary error: {error}")));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .unwrap_or_default();

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    Ok(Fundamentals {
        market_cap: raw(&price.market_cap).or_else(|| raw(&detail.market_cap)),
        trailing_pe: raw(&detail.trailing_pe),
        price_to_book: raw(&stats.price_to_book),
        debt_to_equity: raw(&financial.debt_to_equity),
        profit_margins: raw(&financial.profit_margins).or_else(|| raw(&stats.profit_margins)),
        revenue_growth: raw(&financial.revenue_growth),
        return_on_equity: raw(&financial.return_on_equity),
    })
}
