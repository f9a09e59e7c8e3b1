use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use super::schema::{
    FieldRule, Schema, DOCUMENTS_SCHEMA, END_SCHEMA, EVENT_SCHEMA, LOCATION_SCHEMA,
    SOURCES_SCHEMA, START_SCHEMA,
};
use crate::models::RawRecord;
use crate::scraping::base;

pub type Flags = BTreeMap<String, bool>;

/// Annotates records with one `val_*` flag per schema field; never rejects a record.
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    pub event: Schema,
    pub start: Schema,
    pub end: Schema,
    pub location: Schema,
    pub documents: Schema,
    pub sources: Schema,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self {
            event: EVENT_SCHEMA.clone(),
            start: START_SCHEMA.clone(),
            end: END_SCHEMA.clone(),
            location: LOCATION_SCHEMA.clone(),
            documents: DOCUMENTS_SCHEMA.clone(),
            sources: SOURCES_SCHEMA.clone(),
        }
    }
}

impl ValidationPipeline {
    /// Returns an empty record for meetings that already happened.
    pub fn process_item(&self, mut record: RawRecord, today: NaiveDate) -> RawRecord {
        if let Some(start) = start_date(&record) {
            if start < today {
                debug!(id = ?record.get("id"), %start, "skipping past meeting");
                return Map::new();
            }
        }

        let empty = Map::new();
        let mut flags = validate_against_schema(&record, &self.event, "");
        flags.extend(validate_against_schema(
            object_or(&record, "start", &empty),
            &self.start,
            "start",
        ));
        flags.extend(validate_against_schema(
            object_or(&record, "end", &empty),
            &self.end,
            "end",
        ));
        flags.extend(validate_against_schema(
            object_or(&record, "location", &empty),
            &self.location,
            "loc",
        ));
        flags.extend(validate_list(
            list_or_empty(&record, "documents"),
            &self.documents,
            "doc",
        ));
        flags.extend(validate_list(
            list_or_empty(&record, "sources"),
            &self.sources,
            "sources",
        ));

        for (key, valid) in &flags {
            if !valid {
                debug!(id = ?record.get("id"), field = %key, "field failed validation");
            }
            record.insert(key.clone(), Value::from(u8::from(*valid)));
        }
        record
    }
}

pub fn flag_key(prefix: &str, field: &str) -> String {
    format!("val_{prefix}_{field}").replace("__", "_")
}

pub fn validate_against_schema(item: &RawRecord, schema: &Schema, prefix: &str) -> Flags {
    schema
        .fields()
        .map(|(field, rule)| (flag_key(prefix, field), validate_field(item.get(field), rule)))
        .collect()
}

/// A flag is true only when every element passes for that field.
pub fn validate_list(items: &[Value], schema: &Schema, prefix: &str) -> Flags {
    let empty = Map::new();
    let mut combined = Flags::new();
    for item in items {
        let item = item.as_object().unwrap_or(&empty);
        for (key, valid) in validate_against_schema(item, schema, prefix) {
            combined
                .entry(key)
                .and_modify(|all| *all = *all && valid)
                .or_insert(valid);
        }
    }
    combined
}

pub fn validate_field(value: Option<&Value>, rule: &FieldRule) -> bool {
    let value = match value {
        Some(v) if !is_null(v) => v,
        _ => return !rule.required,
    };
    if let Some(field_type) = rule.field_type {
        if !field_type.matches(value) {
            return false;
        }
    }
    if let Some(values) = &rule.values {
        let member = value
            .as_str()
            .map(|s| values.iter().any(|allowed| allowed == s))
            .unwrap_or(false);
        if !member {
            return false;
        }
    }
    if let Some(format) = &rule.format {
        return value.as_str().map(|s| format.is_match(s)).unwrap_or(false);
    }
    true
}

// an empty list counts as absent, so a required list needs at least one element
fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn start_date(record: &RawRecord) -> Option<NaiveDate> {
    record
        .get("start")?
        .get("date")?
        .as_str()
        .and_then(base::parse_date)
}

fn object_or<'a>(record: &'a RawRecord, key: &str, fallback: &'a RawRecord) -> &'a RawRecord {
    record
        .get(key)
        .and_then(Value::as_object)
        .unwrap_or(fallback)
}

fn list_or_empty<'a>(record: &'a RawRecord, key: &str) -> &'a [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
