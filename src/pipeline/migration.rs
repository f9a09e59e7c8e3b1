use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::models::{Link, Meeting, MeetingLocation, RawRecord};
use crate::scraping::base;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MigrationError {
    #[error("record {0} has no source url")]
    MissingSource(String),
}

/// Maps a legacy record onto the normalized [`Meeting`] item.
pub fn migrate(record: &RawRecord) -> Result<Meeting, MigrationError> {
    let id = string_field(record, &["id"]);
    let source = first_source(record)
        .ok_or_else(|| MigrationError::MissingSource(id.clone().unwrap_or_default()))?;

    let start = record.get("start");
    let end = record.get("end");
    let location = record.get("location");

    Ok(Meeting {
        title: string_field(record, &["name", "title"]).unwrap_or_default(),
        description: string_field(record, &["event_description", "description"])
            .unwrap_or_default(),
        classification: string_field(record, &["classification"]),
        status: string_field(record, &["status"]).map(normalize_status),
        start: start.and_then(combine_date_time),
        end: end.and_then(combine_date_time),
        all_day: record
            .get("all_day")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        time_notes: time_notes(start, end),
        location: MeetingLocation {
            name: nested_str(location, "name"),
            address: nested_str(location, "address"),
        },
        links: links(record),
        source,
        id,
    })
}

pub fn normalize_status(status: String) -> String {
    if status == "canceled" {
        "cancelled".to_string()
    } else {
        status
    }
}

/// Midnight when the time is absent; `None` when the date is absent or malformed.
pub fn combine_date_time(when: &Value) -> Option<NaiveDateTime> {
    let date = when.get("date")?.as_str().and_then(base::parse_date)?;
    let time = when
        .get("time")
        .and_then(Value::as_str)
        .and_then(base::parse_time)
        .unwrap_or_default();
    Some(NaiveDateTime::new(date, time))
}

fn time_notes(start: Option<&Value>, end: Option<&Value>) -> String {
    format!("{} {}", nested_str(start, "note"), nested_str(end, "note"))
        .trim()
        .to_string()
}

fn links(record: &RawRecord) -> Vec<Link> {
    let entries = record
        .get("documents")
        .or_else(|| record.get("links"))
        .and_then(Value::as_array);
    entries
        .map(|docs| {
            docs.iter()
                .map(|doc| {
                    let title = first_str(doc, &["note", "title"]).unwrap_or_default();
                    let href = first_str(doc, &["url", "href"]).unwrap_or_else(|| {
                        debug!(%title, "document has no url");
                        String::new()
                    });
                    Link { href, title }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn first_source(record: &RawRecord) -> Option<String> {
    record
        .get("sources")?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn string_field(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn nested_str(value: Option<&Value>, key: &str) -> String {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn legacy_record() -> RawRecord {
        json!({
            "_type": "event",
            "id": "chi_ssa_18/202611051800/x/commission",
            "name": "Commission",
            "event_description": "Regular meeting",
            "classification": "Commission",
            "start": {"date": "2026-11-05", "time": "18:00:00", "note": "See agenda to confirm time"},
            "end": {"date": null, "time": null, "note": ""},
            "all_day": false,
            "location": {"name": "Northcenter Chamber", "address": "4054 N Lincoln Ave", "neighborhood": ""},
            "documents": [
                {"url": "https://example.gov/agenda.pdf", "note": "Agenda"},
                {"url": "https://example.gov/minutes.pdf", "note": "Minutes"}
            ],
            "sources": [
                {"url": "https://example.gov/meetings", "note": ""},
                {"url": "https://example.gov/archive", "note": ""}
            ],
            "status": "canceled"
        })
        .as_object()
        .cloned()
        .expect("object fixture")
    }

    #[test]
    fn maps_legacy_fields() {
        let meeting = migrate(&legacy_record()).expect("migrate record");
        assert_eq!(meeting.title, "Commission");
        assert_eq!(meeting.description, "Regular meeting");
        assert_eq!(meeting.status.as_deref(), Some("cancelled"));
        assert_eq!(meeting.source, "https://example.gov/meetings");
        assert_eq!(meeting.time_notes, "See agenda to confirm time");
        assert_eq!(meeting.end, None);
        assert_eq!(meeting.location.address, "4054 N Lincoln Ave");
        assert_eq!(
            meeting.links,
            vec![
                Link {
                    href: "https://example.gov/agenda.pdf".to_string(),
                    title: "Agenda".to_string(),
                },
                Link {
                    href: "https://example.gov/minutes.pdf".to_string(),
                    title: "Minutes".to_string(),
                },
            ]
        );
        let expected = NaiveDate::from_ymd_opt(2026, 11, 5)
            .and_then(|d| d.and_hms_opt(18, 0, 0))
            .expect("valid datetime");
        assert_eq!(meeting.start, Some(expected));
    }

    #[test]
    fn keeps_documents_without_url() {
        let mut record = legacy_record();
        record.insert(
            "documents".into(),
            json!([{"note": "Minutes pending"}, {"url": "https://example.gov/a.pdf"}]),
        );
        let meeting = migrate(&record).expect("migrate record");
        assert_eq!(
            meeting.links,
            vec![
                Link {
                    href: String::new(),
                    title: "Minutes pending".to_string(),
                },
                Link {
                    href: "https://example.gov/a.pdf".to_string(),
                    title: String::new(),
                },
            ]
        );
    }

    #[test]
    fn other_statuses_pass_through() {
        for status in ["cancelled", "tentative", "confirmed", "passed", "postponed"] {
            assert_eq!(normalize_status(status.to_string()), status);
        }
    }

    #[test]
    fn missing_time_defaults_to_midnight() {
        let combined = combine_date_time(&json!({"date": "2026-11-05", "time": null}));
        let expected = NaiveDate::from_ymd_opt(2026, 11, 5).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(combined, expected);
        assert_eq!(combine_date_time(&json!({"time": "10:00"})), None);
        assert_eq!(combine_date_time(&json!({"date": "Nov 5"})), None);
    }

    #[test]
    fn joins_notes_from_start_and_end() {
        let mut record = legacy_record();
        record.insert("start".into(), json!({"date": "2026-11-05", "note": ""}));
        record.insert("end".into(), json!({"note": "estimated 3 hours after the start time"}));
        let meeting = migrate(&record).expect("migrate record");
        assert_eq!(meeting.time_notes, "estimated 3 hours after the start time");
    }

    #[test]
    fn accepts_already_normalized_keys() {
        let record = json!({
            "title": "Board",
            "description": "",
            "links": [{"href": "https://example.gov/a", "title": "Agenda"}],
            "sources": [{"url": "https://example.gov"}]
        })
        .as_object()
        .cloned()
        .expect("object fixture");
        let meeting = migrate(&record).expect("migrate record");
        assert_eq!(meeting.title, "Board");
        assert_eq!(meeting.links[0].href, "https://example.gov/a");
        assert_eq!(meeting.start, None);
        assert!(!meeting.all_day);
    }

    #[test]
    fn missing_source_is_an_error() {
        let mut record = legacy_record();
        record.insert("sources".into(), json!([]));
        assert_eq!(
            migrate(&record),
            Err(MigrationError::MissingSource(
                "chi_ssa_18/202611051800/x/commission".to_string()
            ))
        );

        record.insert("sources".into(), json!("https://example.gov"));
        assert!(migrate(&record).is_err());
    }
}
