use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::models::RawRecord;

pub const DEFAULT_PASS_THRESHOLD: f64 = 0.9;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SummaryError {
    #[error("less than {:.0}% of the items from {spider} passed validation for: {}", .threshold * 100.0, .fields.join(", "))]
    BelowThreshold {
        spider: String,
        threshold: f64,
        fields: Vec<String>,
    },
    #[error("no validated items from {0}")]
    Empty(String),
}

/// Pass rate of every `val_*` flag across one spider's validated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSummary {
    pub spider: String,
    pub items: usize,
    pub pass_rates: BTreeMap<String, f64>,
}

impl ValidationSummary {
    /// Empty records (skipped past meetings) are left out of the rates.
    pub fn from_records(spider: &str, records: &[RawRecord]) -> Self {
        let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        let mut items = 0;
        for record in records.iter().filter(|r| !r.is_empty()) {
            items += 1;
            for (key, value) in record.iter().filter(|(k, _)| k.starts_with("val_")) {
                let entry = totals.entry(key.clone()).or_insert((0.0, 0));
                entry.0 += flag_value(value);
                entry.1 += 1;
            }
        }

        Self {
            spider: spider.to_string(),
            items,
            pass_rates: totals
                .into_iter()
                .map(|(key, (sum, count))| (key, sum / count as f64))
                .collect(),
        }
    }

    pub fn check(&self, threshold: f64) -> Result<(), SummaryError> {
        if self.items == 0 {
            return Err(SummaryError::Empty(self.spider.clone()));
        }
        let fields: Vec<String> = self
            .pass_rates
            .iter()
            .filter(|(_, rate)| **rate < threshold)
            .map(|(key, _)| key.trim_start_matches("val_").to_string())
            .collect();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(SummaryError::BelowThreshold {
                spider: self.spider.clone(),
                threshold,
                fields,
            })
        }
    }
}

fn flag_value(value: &Value) -> f64 {
    match value {
        Value::Bool(true) => 1.0,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------ Validation summary for: {} ------------", self.spider)?;
        writeln!(f, "Validating {} items", self.items)?;
        for (key, rate) in &self.pass_rates {
            writeln!(f, "{}: {:.0}%", key.trim_start_matches("val_"), rate * 100.0)?;
        }
        Ok(())
    }
}
