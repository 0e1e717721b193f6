//! Scripted market data for tests.
//!
//! `StubProvider` replays per-symbol history and fundamentals responses and
//! counts every call, so retry behaviour can be asserted without a network.
//! Builders here panic on an invalid ticker; they are meant for test code.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tickwise_models::{validate_ticker, Fundamentals, PriceBar, PriceSeries, TickerSymbol};

use crate::error::MarketError;
use crate::sources::MarketDataProvider;

/// Sixty closes ending at 250.00 after a 245.00 close, with SMA20 = 240,
/// SMA50 = 230 and a 14-period RSI of exactly 55.
pub const SYNTHETIC_CLOSES: [f64; 60] = [
    220.0, 220.0, 220.0, 220.0, 220.0, 220.0, 220.0, 220.0, 220.0, 220.0, //
    223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, //
    223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, //
    223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 223.0, 233.0, //
    209.375, 209.375, 209.375, 209.375, 209.375, 245.0, 249.5, 246.6875, 251.1875, 248.375, //
    252.875, 250.0625, 254.5625, 251.75, 256.25, 253.4375, 250.625, 247.8125, 245.0, 250.0,
];

/// Volume on every bar of the synthetic series.
pub const SYNTHETIC_VOLUME: u64 = 1_000_000;

fn ticker(symbol: &str) -> TickerSymbol {
    validate_ticker(symbol).unwrap_or_else(|e| panic!("invalid test ticker {symbol}: {e}"))
}

fn last_session() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap_or_default()
}

/// One bar per calendar day, the last one on a fixed date so that any two
/// builder series line up on their trailing sessions.
pub fn series_from_closes(symbol: &str, closes: &[f64], volume: u64) -> PriceSeries {
    let end = last_session();
    let n = closes.len() as i64;
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date = end - Duration::days(n - 1 - i as i64);
            let timestamp = Utc.from_utc_datetime(&date.and_hms_opt(20, 0, 0).unwrap_or_default());
            PriceBar {
                timestamp,
                open: close,
                high: close,
                low: close,
                close,
                volume,
            }
        })
        .collect();
    PriceSeries::new(ticker(symbol), bars)
}

pub fn synthetic_market_series(symbol: &str) -> PriceSeries {
    series_from_closes(symbol, &SYNTHETIC_CLOSES, SYNTHETIC_VOLUME)
}

/// A gently oscillating index series.
pub fn benchmark_series(symbol: &str, sessions: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..sessions)
        .map(|i| 500.0 + 4.0 * (i as f64 * 0.9).sin() + i as f64 * 0.3)
        .collect();
    series_from_closes(symbol, &closes, 50_000_000)
}

/// One scripted answer to `fetch_history`.
#[derive(Debug, Clone)]
pub enum HistoryScript {
    Series(PriceSeries),
    Empty,
    Fail(String),
}

#[derive(Debug, Clone)]
enum InfoScript {
    Info(Fundamentals),
    Fail(String),
}

/// Replays scripted responses per symbol. The last scripted history
/// response repeats forever; unknown symbols get an empty series and
/// default fundamentals.
#[derive(Default)]
pub struct StubProvider {
    history: Mutex<HashMap<String, VecDeque<HistoryScript>>>,
    info: Mutex<HashMap<String, InfoScript>>,
    history_calls: Mutex<HashMap<String, usize>>,
    total_history_calls: AtomicUsize,
    info_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_script(self, symbol: &str, script: Vec<HistoryScript>) -> Self {
        if let Ok(mut history) = self.history.lock() {
            history.insert(symbol.to_uppercase(), script.into());
        }
        self
    }

    pub fn with_series(self, series: PriceSeries) -> Self {
        let symbol = series.symbol().to_string();
        self.with_history_script(&symbol, vec![HistoryScript::Series(series)])
    }

    pub fn with_empty_history(self, symbol: &str) -> Self {
        self.with_history_script(symbol, vec![HistoryScript::Empty])
    }

    pub fn with_history_failure(self, symbol: &str, message: &str) -> Self {
        self.with_history_script(symbol, vec![HistoryScript::Fail(message.to_string())])
    }

    pub fn with_info(self, symbol: &str, info: Fundamentals) -> Self {
        if let Ok(mut map) = self.info.lock() {
            map.insert(symbol.to_uppercase(), InfoScript::Info(info));
        }
        self
    }

    pub fn with_info_failure(self, symbol: &str, message: &str) -> Self {
        if let Ok(mut map) = self.info.lock() {
            map.insert(symbol.to_uppercase(), InfoScript::Fail(message.to_string()));
        }
        self
    }

    /// `fetch_history` calls made for one symbol.
    pub fn history_calls(&self, symbol: &str) -> usize {
        self.history_calls
            .lock()
            .map(|calls| calls.get(&symbol.to_uppercase()).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_history_calls(&self) -> usize {
        self.total_history_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    fn next_history(&self, symbol: &str) -> HistoryScript {
        let Ok(mut history) = self.history.lock() else {
            return HistoryScript::Fail("stub poisoned".to_string());
        };
        match history.get_mut(symbol) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(HistoryScript::Empty),
            Some(queue) => queue.front().cloned().unwrap_or(HistoryScript::Empty),
            None => HistoryScript::Empty,
        }
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_history(
        &self,
        ticker: &TickerSymbol,
        sessions: usize,
    ) -> Result<PriceSeries, MarketError> {
        self.total_history_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.history_calls.lock() {
            *calls.entry(ticker.to_string()).or_insert(0) += 1;
        }

        match self.next_history(ticker.as_str()) {
            HistoryScript::Series(series) => Ok(series.tail(sessions)),
            HistoryScript::Empty => Ok(PriceSeries::new(ticker.clone(), Vec::new())),
            HistoryScript::Fail(message) => Err(MarketError::Provider(message)),
        }
    }

    async fn fetch_info(&self, ticker: &TickerSymbol) -> Result<Fundamentals, MarketError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .info
            .lock()
            .ok()
            .and_then(|map| map.get(ticker.as_str()).cloned());
        match script {
            Some(InfoScript::Info(info)) => Ok(info),
            Some(InfoScript::Fail(message)) => Err(MarketError::Provider(message)),
            None => Ok(Fundamentals::default()),
        }
    }
}
