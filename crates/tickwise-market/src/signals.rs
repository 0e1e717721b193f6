//! Fetched series in, validated signal records out.

use tickwise_models::{
    validate_market_signal, validate_risk_assessment, validate_technical_signal, BandPosition,
    BetaSource, Fundamentals, MarketSignal, MarketSignalFields, PriceSeries, RiskAssessment,
    RsiZone, TechnicalSignal, Trend,
};

use crate::error::MarketError;
use crate::indicators::{self, RSI_PERIOD};
use crate::risk::{self, NEUTRAL_BETA};

/// Closes needed for the longest moving average.
pub const MIN_SESSIONS: usize = 50;

const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_WIDTH: f64 = 2.0;

fn insufficient(series: &PriceSeries, required: usize) -> MarketError {
    MarketError::InsufficientData {
        ticker: series.symbol().to_string(),
        required,
        available: series.closes().len(),
    }
}

/// Latest price, change against the previous close, volume, RSI(14),
/// SMA20 and SMA50.
pub fn market_signal(series: &PriceSeries) -> Result<MarketSignal, MarketError> {
    let closes = series.closes();
    if closes.len() < MIN_SESSIONS {
        return Err(insufficient(series, MIN_SESSIONS));
    }

    let (rsi, sma_20, sma_50) = match (
        indicators::rsi(&closes, RSI_PERIOD),
        indicators::sma(&closes, 20),
        indicators::sma(&closes, 50),
    ) {
        (Some(r), Some(s20), Some(s50)) => (r, s20, s50),
        _ => return Err(insufficient(series, MIN_SESSIONS)),
    };

    // Price and volume come from the same session.
    let latest = series
        .latest_usable()
        .ok_or_else(|| insufficient(series, MIN_SESSIONS))?;
    let price = latest.close;
    let previous = closes[closes.len() - 2];
    let change_percent = (price - previous) / previous * 100.0;
    let volume = latest.volume;

    let signal = validate_market_signal(MarketSignalFields {
        ticker: series.symbol().clone(),
        price,
        change_percent,
        volume,
        rsi,
        sma_20,
        sma_50,
    })?;
    Ok(signal)
}

/// RSI zone, stacked-MA trend, MACD trend and Bollinger position.
pub fn technical_signal(series: &PriceSeries) -> Result<TechnicalSignal, MarketError> {
    let closes = series.closes();
    if closes.len() < MIN_SESSIONS {
        return Err(insufficient(series, MIN_SESSIONS));
    }

    let price = closes[closes.len() - 1];
    let rsi = indicators::rsi(&closes, RSI_PERIOD).ok_or_else(|| insufficient(series, MIN_SESSIONS))?;
    let sma_20 = indicators::sma(&closes, 20).ok_or_else(|| insufficient(series, MIN_SESSIONS))?;
    let sma_50 = indicators::sma(&closes, 50).ok_or_else(|| insufficient(series, MIN_SESSIONS))?;
    let (macd, macd_signal) =
        indicators::macd(&closes).ok_or_else(|| insufficient(series, MIN_SESSIONS))?;
    let (upper, _, lower) = indicators::bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH)
        .ok_or_else(|| insufficient(series, MIN_SESSIONS))?;

    let signal = TechnicalSignal {
        ticker: series.symbol().clone(),
        rsi,
        rsi_zone: RsiZone::classify(rsi),
        ma_trend: Trend::from_moving_averages(price, sma_20, sma_50),
        macd_trend: Trend::from_macd(macd, macd_signal),
        band_position: BandPosition::classify(price, upper, lower),
    };
    validate_technical_signal(&signal)?;
    Ok(signal)
}

/// Volatility, beta and the composite score.
///
/// `benchmark` is `None` when the benchmark fetch failed; beta then falls
/// back to [`NEUTRAL_BETA`], as it does when the two series share too few
/// dates for a correlation.
pub fn risk_assessment(
    series: &PriceSeries,
    benchmark: Option<&PriceSeries>,
    info: &Fundamentals,
) -> Result<RiskAssessment, MarketError> {
    let closes = series.closes();
    let volatility =
        indicators::annualized_volatility(&closes).ok_or_else(|| insufficient(series, 3))?;

    let measured = benchmark.and_then(|b| indicators::beta(&series.dated_closes(), &b.dated_closes()));
    let (beta, beta_source) = match measured {
        Some(beta) => (beta, BetaSource::Benchmark),
        None => {
            tracing::warn!(ticker = %series.symbol(), "Beta unavailable, using neutral default");
            (NEUTRAL_BETA, BetaSource::NeutralDefault)
        }
    };

    let debt_to_equity = Fundamentals::value_or_zero(info.debt_to_equity);
    let profit_margin = Fundamentals::value_or_zero(info.profit_margins);
    let (risk_score, factors) = risk::score_risk(volatility, beta, debt_to_equity, profit_margin);

    let assessment = RiskAssessment {
        ticker: series.symbol().clone(),
        volatility,
        beta,
        beta_source,
        risk_score,
        risk_level: risk::risk_level(risk_score),
        factors,
    };
    validate_risk_assessment(&assessment)?;
    Ok(assessment)
}
