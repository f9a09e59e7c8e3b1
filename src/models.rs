use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{Classification, Status};

/// Loosely-typed record as it travels through the pipelines.
pub type RawRecord = Map<String, Value>;

pub const EVENT_TYPE: &str = "event";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct When {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub note: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub neighborhood: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Document {
    pub url: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Source {
    pub url: String,
    #[serde(default)]
    pub note: String,
}

/// Legacy event shape every producer maps into before the pipelines run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    #[serde(rename = "_type", default = "event_type")]
    pub kind: String,
    /// spider/start/fragment/slug, set by `Spider::finalize`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Producer-supplied part of the id; `x` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_fragment: Option<String>,
    pub name: String,
    #[serde(default)]
    pub event_description: String,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub start: When,
    #[serde(default)]
    pub end: When,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

fn event_type() -> String {
    EVENT_TYPE.to_string()
}

impl Event {
    pub fn new(name: impl Into<String>, start: When, source_url: impl Into<String>) -> Self {
        Self {
            kind: event_type(),
            id: None,
            id_fragment: None,
            name: name.into(),
            event_description: String::new(),
            classification: None,
            start,
            end: When::default(),
            all_day: false,
            location: Location::default(),
            documents: Vec::new(),
            sources: vec![Source {
                url: source_url.into(),
                note: String::new(),
            }],
            status: None,
        }
    }

    pub fn first_source(&self) -> Option<&str> {
        self.sources
            .first()
            .map(|source| source.url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn to_record(&self) -> RawRecord {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Link {
    pub href: String,
    pub title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MeetingLocation {
    pub name: String,
    pub address: String,
}

/// Normalized item produced by the migration mapping.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Meeting {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub classification: Option<String>,
    pub status: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub time_notes: String,
    pub location: MeetingLocation,
    pub links: Vec<Link>,
    pub source: String,
}
