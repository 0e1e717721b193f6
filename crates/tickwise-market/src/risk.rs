use tickwise_models::{RiskFactor, RiskLevel};

/// Beta used when no benchmark comparison is possible.
pub const NEUTRAL_BETA: f64 = 1.5;

/// Linear additive risk score and the factors that contributed to it.
///
/// Each threshold is strict. Missing fundamentals should be passed as 0.
pub fn score_risk(
    volatility: f64,
    beta: f64,
    debt_to_equity: f64,
    profit_margin: f64,
) -> (u32, Vec<RiskFactor>) {
    let mut score = 0;
    let mut factors = Vec::new();

    if volatility > 0.5 {
        factors.push(RiskFactor::HighVolatility);
        score += 2;
    } else if volatility > 0.3 {
        factors.push(RiskFactor::ModerateVolatility);
        score += 1;
    }

    if beta > 1.5 {
        factors.push(RiskFactor::HighBeta);
        score += 2;
    } else if beta > 1.2 {
        factors.push(RiskFactor::ElevatedBeta);
        score += 1;
    }

    if debt_to_equity > 1.0 {
        factors.push(RiskFactor::HighDebt);
        score += 2;
    } else if debt_to_equity > 0.5 {
        factors.push(RiskFactor::ModerateDebt);
        score += 1;
    }

    if profit_margin < 0.0 {
        factors.push(RiskFactor::NegativeMargins);
        score += 1;
    }

    (score, factors)
}

pub fn risk_level(score: u32) -> RiskLevel {
    RiskLevel::from_score(score)
}
