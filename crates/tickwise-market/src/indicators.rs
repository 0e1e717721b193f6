//! Pure indicator functions over closing prices, oldest first.
//!
//! Every function returns `None` rather than NaN when the history is too
//! short or the result is undefined.

use std::collections::HashMap;

use chrono::NaiveDate;

pub const RSI_PERIOD: usize = 14;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

/// Trailing mean of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Recursive exponential smoothing with `alpha = 2 / (span + 1)`, seeded
/// with the first value. One output per input.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            None => v,
            Some(p) => alpha * v + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// RSI from simple trailing means of gains and losses.
///
/// Needs `period + 1` closes. When the mean loss is zero the ratio is
/// unbounded and RSI saturates at 100.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let window = &closes[closes.len() - period - 1..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), delta| {
            (g + delta.max(0.0), l + (-delta).max(0.0))
        });
    let mean_gain = gains / period as f64;
    let mean_loss = losses / period as f64;

    if mean_loss == 0.0 {
        return Some(100.0);
    }
    let rs = mean_gain / mean_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    value.is_finite().then_some(value)
}

/// Latest MACD line (EMA12 - EMA26) and its EMA9 signal line.
pub fn macd(closes: &[f64]) -> Option<(f64, f64)> {
    if closes.len() < MACD_SLOW {
        return None;
    }
    let fast = ema_series(closes, MACD_FAST);
    let slow = ema_series(closes, MACD_SLOW);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&line, MACD_SIGNAL);
    Some((*line.last()?, *signal.last()?))
}

/// Bands around the trailing `period` mean: (upper, middle, lower).
pub fn bollinger(closes: &[f64], period: usize, width: f64) -> Option<(f64, f64, f64)> {
    let middle = sma(closes, period)?;
    let sd = sample_std(&closes[closes.len() - period..])?;
    Some((middle + width * sd, middle, middle - width * sd))
}

/// Simple daily percentage returns.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample standard deviation of daily returns, annualized.
pub fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    let returns = pct_returns(closes);
    sample_std(&returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Beta of an asset against a benchmark.
///
/// Correlation is taken over returns that share a trading date; each
/// volatility uses its own full window. `None` when the correlation or the
/// benchmark volatility is undefined.
pub fn beta(asset: &[(NaiveDate, f64)], benchmark: &[(NaiveDate, f64)]) -> Option<f64> {
    let asset_returns = dated_returns(asset);
    let bench_returns = dated_returns(benchmark);

    let bench_by_date: HashMap<NaiveDate, f64> = bench_returns.iter().copied().collect();
    let (xs, ys): (Vec<f64>, Vec<f64>) = asset_returns
        .iter()
        .filter_map(|(date, r)| bench_by_date.get(date).map(|b| (*r, *b)))
        .unzip();

    let correlation = correlation(&xs, &ys)?;

    let asset_values: Vec<f64> = asset_returns.iter().map(|(_, r)| *r).collect();
    let bench_values: Vec<f64> = bench_returns.iter().map(|(_, r)| *r).collect();
    let asset_vol = sample_std(&asset_values)?;
    let bench_vol = sample_std(&bench_values)?;
    if bench_vol == 0.0 {
        return None;
    }

    let value = correlation * (asset_vol / bench_vol);
    value.is_finite().then_some(value)
}

fn dated_returns(closes: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    closes
        .windows(2)
        .map(|w| (w[1].0, w[1].1 / w[0].1 - 1.0))
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `n - 1` in the denominator.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let sd = var.sqrt();
    sd.is_finite().then_some(sd)
}

fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then_some(r)
}
