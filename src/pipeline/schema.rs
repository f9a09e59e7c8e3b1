use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::constants::{Classification, Status};
use crate::models::EVENT_TYPE;
use crate::scraping::base;

pub const ID_FORMAT: &str = r".+/\d{12}/.+/.+";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Bool,
    /// ISO `YYYY-MM-DD` string.
    Date,
    /// `HH:MM[:SS]` string.
    Time,
    Map,
    List,
}

impl FieldType {
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Str, Value::String(_)) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Date, Value::String(s)) => base::parse_date(s).is_some(),
            (FieldType::Time, Value::String(s)) => base::parse_time(s).is_some(),
            (FieldType::Map, Value::Object(_)) => true,
            (FieldType::List, Value::Array(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub required: bool,
    pub field_type: Option<FieldType>,
    pub values: Option<Vec<String>>,
    pub format: Option<Regex>,
}

impl FieldRule {
    pub fn required(field_type: FieldType) -> Self {
        Self {
            required: true,
            field_type: Some(field_type),
            values: None,
            format: None,
        }
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(field_type)
        }
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// The pattern only has to match at the start of the value.
    pub fn format(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.format = Some(Regex::new(&format!("^(?:{pattern})"))?);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub static EVENT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("_type", FieldRule::required(FieldType::Str).values([EVENT_TYPE]))
        .field(
            "id",
            FieldRule::required(FieldType::Str)
                .format(ID_FORMAT)
                .expect("valid id format"),
        )
        .field("name", FieldRule::required(FieldType::Str))
        .field("event_description", FieldRule::optional(FieldType::Str))
        .field("all_day", FieldRule::required(FieldType::Bool))
        .field(
            "status",
            FieldRule::required(FieldType::Str).values(Status::ALL.iter().map(Status::as_str)),
        )
        .field(
            "classification",
            FieldRule::optional(FieldType::Str)
                .values(Classification::ALL.iter().map(Classification::as_str)),
        )
        .field("start", FieldRule::required(FieldType::Map))
        .field("end", FieldRule::required(FieldType::Map))
        .field("location", FieldRule::required(FieldType::Map))
        .field("documents", FieldRule::optional(FieldType::List))
        .field("sources", FieldRule::required(FieldType::List))
});

pub static START_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("date", FieldRule::required(FieldType::Date))
        .field("time", FieldRule::optional(FieldType::Time))
        .field("note", FieldRule::optional(FieldType::Str))
});

pub static END_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("date", FieldRule::optional(FieldType::Date))
        .field("time", FieldRule::optional(FieldType::Time))
        .field("note", FieldRule::optional(FieldType::Str))
});

pub static LOCATION_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("name", FieldRule::optional(FieldType::Str))
        .field("address", FieldRule::required(FieldType::Str))
        .field("neighborhood", FieldRule::optional(FieldType::Str))
});

pub static DOCUMENTS_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("url", FieldRule::required(FieldType::Str))
        .field("note", FieldRule::required(FieldType::Str))
});

pub static SOURCES_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("url", FieldRule::required(FieldType::Str))
        .field("note", FieldRule::optional(FieldType::Str))
});
