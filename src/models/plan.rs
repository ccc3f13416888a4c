use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One exercise slot in a planned session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanEntry {
  #[serde(default)]
  pub exercise: String,
  /// Planned set count; the planner UI sends numbers or numeric strings
  #[serde(default)]
  pub sets: serde_json::Value,
}

impl PlanEntry {
  /// Planned sets, reading a leading integer from strings. Anything else is 0.
  pub fn set_count(&self) -> i64 {
    match &self.sets {
      serde_json::Value::Number(n) => n
        .as_i64()
        .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
        .unwrap_or(0),
      serde_json::Value::String(s) => {
        let s = s.trim();
        let end = s
          .char_indices()
          .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
          .map(|(i, _)| i)
          .unwrap_or(s.len());
        s[..end].parse().unwrap_or(0)
      }
      _ => 0,
    }
  }
}

/// Planned exercises for one session.
///
/// The planner stores whatever rows the user left behind, so entries that are
/// not exercise objects (nulls, numbers, strings) are dropped on read, and a
/// null session reads as empty.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PlanSession(pub Vec<PlanEntry>);

impl PlanSession {
  pub fn entries(&self) -> &[PlanEntry] {
    &self.0
  }
}

impl<'de> Deserialize<'de> for PlanSession {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let entries = raw
      .into_iter()
      .filter(Value::is_object)
      .filter_map(|v| serde_json::from_value(v).ok())
      .collect();
    Ok(Self(entries))
  }
}

/// Session label (e.g. "Monday AM") to its planned exercises
pub type WeeklyPlan = BTreeMap<String, PlanSession>;
