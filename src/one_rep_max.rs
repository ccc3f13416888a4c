//! One-rep-max estimation pipeline
//!
//! Pure functions that turn logged sets into strength metrics:
//! 1. per-set estimated 1RM (Epley or Brzycki)
//! 2. one max point per calendar day, ascending by date
//! 3. nearest-neighbour local linear smoothing of the daily series
//! 4. suggested training weights at fixed rep targets
//!
//! Every stats endpoint and chart series goes through this module; nothing
//! here touches the database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

/// Epley: `weight * (1 + reps / 30)`
pub const EPLEY_REPS_DIVISOR: f64 = 30.0;

/// Brzycki: `weight / (1.0278 - 0.0278 * reps)`
pub const BRZYCKI_INTERCEPT: f64 = 1.0278;
pub const BRZYCKI_SLOPE: f64 = 0.0278;

/// Load-at-reps relation used for suggestions: `1rm * (1.02 - 0.02 * reps)`.
/// Deliberately not the Brzycki pair above.
pub const TARGET_LOAD_INTERCEPT: f64 = 1.02;
pub const TARGET_LOAD_SLOPE: f64 = 0.02;

/// Fraction of the series used as the smoothing window
pub const DEFAULT_BANDWIDTH: f64 = 0.08;

/// Smallest smoothing window, regardless of bandwidth
pub const MIN_WINDOW: usize = 2;

/// Below this many daily points the latest point is used as-is
pub const MIN_POINTS_FOR_SMOOTHING: usize = 3;

/// Added to the current estimate before deriving suggestions
pub const PROGRESSION_INCREMENT: f64 = 1.0;

/// Rep targets reported in suggested weights
pub const TARGET_REPS: [i64; 4] = [3, 5, 8, 12];

/// ---------------------------------------------------------------------------
/// Formula
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneRepMaxFormula {
  /// `weight * (1 + reps / 30)`
  Epley,
  /// `weight / (1.0278 - 0.0278 * reps)`
  Brzycki,
}

impl OneRepMaxFormula {
  /// Estimated single-rep load. Zero weight or zero reps yields 0.
  pub fn estimate(self, weight: f64, reps: i64) -> f64 {
    if weight == 0.0 || reps == 0 {
      return 0.0;
    }
    let reps = reps as f64;
    match self {
      Self::Epley => weight * (1.0 + reps / EPLEY_REPS_DIVISOR),
      Self::Brzycki => weight / (BRZYCKI_INTERCEPT - BRZYCKI_SLOPE * reps),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Epley => "epley",
      Self::Brzycki => "brzycki",
    }
  }
}

impl std::fmt::Display for OneRepMaxFormula {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for OneRepMaxFormula {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "epley" => Ok(Self::Epley),
      "brzycki" => Ok(Self::Brzycki),
      _ => Err(format!("Unknown one-rep-max formula: {}", s)),
    }
  }
}

/// Estimated 1RM for a single set
pub fn estimate_one_rep_max(formula: OneRepMaxFormula, weight: f64, reps: i64) -> f64 {
  formula.estimate(weight, reps)
}

/// ---------------------------------------------------------------------------
/// Series Types
/// ---------------------------------------------------------------------------

/// One logged set, already scoped to a single (user, exercise)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Observation {
  /// ISO-8601 date; anything after the first 10 characters is ignored
  pub date: String,
  pub weight: f64,
  pub reps: i64,
}

/// A dated 1RM value. Used both per set and per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRepMaxPoint {
  pub date: String,
  pub one_rm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestedWeights {
  pub reps_3: f64,
  pub reps_5: f64,
  pub reps_8: f64,
  pub reps_12: f64,
}

/// Current estimate plus the loads to aim for next session
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OneRepMaxSummary {
  pub estimated_one_rep_max: f64,
  pub new_one_rep_max: f64,
  pub suggested_weights: SuggestedWeights,
}

/// ---------------------------------------------------------------------------
/// Stage 1 + 2: Points and Daily Reduction
/// ---------------------------------------------------------------------------

/// Calendar-day key of an ISO date or timestamp string
pub fn day_key(date: &str) -> &str {
  date.get(..10).unwrap_or(date)
}

/// Apply the formula to every observation, keeping input order
pub fn estimated_points(observations: &[Observation], formula: OneRepMaxFormula) -> Vec<OneRepMaxPoint> {
  observations
    .iter()
    .map(|obs| OneRepMaxPoint {
      date: obs.date.clone(),
      one_rm: formula.estimate(obs.weight, obs.reps),
    })
    .collect()
}

/// Collapse points to the best value per calendar day, sorted by date.
pub fn daily_max_series(points: &[OneRepMaxPoint]) -> Vec<OneRepMaxPoint> {
  let mut by_day: BTreeMap<&str, f64> = BTreeMap::new();

  for pt in points {
    let day = day_key(&pt.date);
    match by_day.get_mut(day) {
      Some(best) if pt.one_rm > *best => *best = pt.one_rm,
      Some(_) => {}
      None => {
        by_day.insert(day, pt.one_rm);
      }
    }
  }

  by_day
    .into_iter()
    .map(|(date, one_rm)| OneRepMaxPoint {
      date: date.to_string(),
      one_rm,
    })
    .collect()
}

/// Milliseconds since the epoch at UTC midnight of the point's day
pub fn day_timestamp_millis(date: &str) -> Option<f64> {
  let day = NaiveDate::parse_from_str(day_key(date), "%Y-%m-%d").ok()?;
  let midnight = day.and_hms_opt(0, 0, 0)?;
  Some(midnight.and_utc().timestamp_millis() as f64)
}

/// ---------------------------------------------------------------------------
/// Stage 3: Local Linear Smoothing
/// ---------------------------------------------------------------------------

/// Nearest-neighbour local linear regression.
///
/// For every `xs[i]`, the `max(2, floor(bandwidth * n))` points closest in
/// x (stable order on ties) get an unweighted least-squares line, which is
/// then evaluated at `xs[i]`. Input does not need to be sorted.
///
/// Returns one `(x, fitted_y)` pair per input point.
pub fn loess_smooth(xs: &[f64], ys: &[f64], bandwidth: f64) -> Vec<(f64, f64)> {
  let n = xs.len().min(ys.len());
  let window = ((bandwidth * n as f64).floor().max(0.0) as usize).max(MIN_WINDOW);
  // With fewer points than the minimum window the whole series is the window
  let window = window.min(n);

  let mut fitted = Vec::with_capacity(n);
  for i in 0..n {
    let distances: Vec<f64> = xs[..n].iter().map(|x| (x - xs[i]).abs()).collect();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

    let (alpha, beta) = fit_line(&order[..window], xs, ys);
    fitted.push((xs[i], alpha + beta * xs[i]));
  }

  fitted
}

/// Ordinary least squares over the selected indices: (intercept, slope)
fn fit_line(indices: &[usize], xs: &[f64], ys: &[f64]) -> (f64, f64) {
  if indices.is_empty() {
    return (0.0, 0.0);
  }
  let count = indices.len() as f64;
  let x_bar = indices.iter().map(|&j| xs[j]).sum::<f64>() / count;
  let y_bar = indices.iter().map(|&j| ys[j]).sum::<f64>() / count;

  let num: f64 = indices
    .iter()
    .map(|&j| (xs[j] - x_bar) * (ys[j] - y_bar))
    .sum();
  let den: f64 = indices.iter().map(|&j| (xs[j] - x_bar).powi(2)).sum();

  // Every x identical: flat line through the local mean
  let beta = if den == 0.0 { 0.0 } else { num / den };
  (y_bar - beta * x_bar, beta)
}

/// Smoothed trend over a daily series, as (epoch millis, 1RM) pairs.
/// Empty when the series is too short to smooth.
pub fn trend_line(daily: &[OneRepMaxPoint]) -> Vec<(f64, f64)> {
  if daily.len() < MIN_POINTS_FOR_SMOOTHING {
    return Vec::new();
  }
  let (xs, ys) = timestamped(daily);
  if xs.len() < MIN_POINTS_FOR_SMOOTHING {
    return Vec::new();
  }
  loess_smooth(&xs, &ys, DEFAULT_BANDWIDTH)
}

fn timestamped(daily: &[OneRepMaxPoint]) -> (Vec<f64>, Vec<f64>) {
  let mut xs = Vec::with_capacity(daily.len());
  let mut ys = Vec::with_capacity(daily.len());
  for pt in daily {
    match day_timestamp_millis(&pt.date) {
      Some(x) => {
        xs.push(x);
        ys.push(pt.one_rm);
      }
      None => tracing::warn!(date = %pt.date, "Skipping point with unparseable date"),
    }
  }
  (xs, ys)
}

/// ---------------------------------------------------------------------------
/// Stage 4: Current Estimate and Suggested Weights
/// ---------------------------------------------------------------------------

/// Trend-adjusted current 1RM of a date-ascending daily series
pub fn current_estimate(daily: &[OneRepMaxPoint]) -> f64 {
  let latest = daily.last().map(|pt| pt.one_rm).unwrap_or(0.0);
  if daily.len() < MIN_POINTS_FOR_SMOOTHING {
    return latest;
  }
  trend_line(daily)
    .last()
    .map(|&(_, y)| y)
    .unwrap_or(latest)
}

/// Load to use for `reps` given a target 1RM
pub fn weight_for_reps(one_rep_max: f64, reps: i64) -> f64 {
  one_rep_max * (TARGET_LOAD_INTERCEPT - TARGET_LOAD_SLOPE * reps as f64)
}

/// Round to one decimal place, halves rounding up
pub fn round1(value: f64) -> f64 {
  (value * 10.0 + 0.5).floor() / 10.0
}

/// Estimate and suggestions from a date-ascending daily max series.
/// An empty series gives an all-zero summary.
pub fn suggested_weights(daily: &[OneRepMaxPoint]) -> OneRepMaxSummary {
  if daily.is_empty() {
    return OneRepMaxSummary::default();
  }

  let estimated = current_estimate(daily);
  let target = estimated + PROGRESSION_INCREMENT;
  let [reps_3, reps_5, reps_8, reps_12] = TARGET_REPS.map(|r| round1(weight_for_reps(target, r)));

  OneRepMaxSummary {
    estimated_one_rep_max: round1(estimated),
    new_one_rep_max: round1(target),
    suggested_weights: SuggestedWeights {
      reps_3,
      reps_5,
      reps_8,
      reps_12,
    },
  }
}

/// Full pipeline: observations -> daily max -> smoothing -> suggestions
pub fn summarize(observations: &[Observation], formula: OneRepMaxFormula) -> OneRepMaxSummary {
  let daily = daily_max_series(&estimated_points(observations, formula));
  suggested_weights(&daily)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
