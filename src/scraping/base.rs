use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::constants::Status;
use crate::models::{Event, When};

static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

pub const DEFAULT_ID_FRAGMENT: &str = "x";
pub const CONFIRM_WINDOW_DAYS: i64 = 7;
const EMPTY_START: &str = "000000000000";

pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accented letters fold to their ASCII base before separators collapse.
pub fn slugify(name: &str) -> String {
    let lowered = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    SLUG_SEPARATOR_RE
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// `YYYYMMDDHHMM`, zero-filled where the date or time is unknown.
pub fn format_start(start: &When) -> String {
    match (start.date, start.time) {
        (Some(date), Some(time)) => NaiveDateTime::new(date, time)
            .format("%Y%m%d%H%M")
            .to_string(),
        (Some(date), None) => format!("{}0000", date.format("%Y%m%d")),
        (None, _) => EMPTY_START.to_string(),
    }
}

pub fn generate_id(spider_name: &str, event: &Event) -> String {
    let fragment = event
        .id_fragment
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_ID_FRAGMENT)
        .replace('/', "-");
    [
        spider_name.to_string(),
        format_start(&event.start),
        fragment,
        slugify(&event.name),
    ]
    .join("/")
}

pub fn generate_status(event: &Event, text: &str, today: NaiveDate) -> Status {
    let lowered = text.to_lowercase();
    if lowered.contains("cancel") || lowered.contains("rescheduled") {
        return Status::Cancelled;
    }
    if let Some(start) = event.start.date {
        if start < today {
            return Status::Passed;
        }
        if (start - today).num_days() <= CONFIRM_WINDOW_DAYS {
            return Status::Confirmed;
        }
    }
    if event
        .documents
        .iter()
        .any(|doc| doc.note.to_lowercase().contains("agenda"))
    {
        return Status::Confirmed;
    }
    Status::Tentative
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let cleaned = text.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(cleaned, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn event_on(date: Option<NaiveDate>) -> Event {
        Event::new(
            "Special Board Meeting",
            When {
                date,
                time: NaiveTime::from_hms_opt(9, 30, 0),
                note: None,
            },
            "https://example.gov",
        )
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("  Board of Trustees: Regular Meeting "), "board_of_trustees_regular_meeting");
        assert_eq!(slugify("SSA #18 - Commission"), "ssa_18_commission");
    }

    #[test]
    fn slug_folds_accented_letters() {
        assert_eq!(slugify("Consejo de Niños Café"), "consejo_de_ninos_cafe");
        assert_eq!(slugify("Comité Consultivo"), "comite_consultivo");
    }

    #[test]
    fn id_ignores_previously_generated_id() {
        let mut event = event_on(NaiveDate::from_ymd_opt(2026, 11, 2));
        let first = generate_id("s", &event);
        event.id = Some(first.clone());
        assert_eq!(generate_id("s", &event), first);
    }

    #[test]
    fn id_is_deterministic() {
        let event = event_on(NaiveDate::from_ymd_opt(2026, 11, 2));
        let first = generate_id("chi_animal", &event);
        assert_eq!(first, generate_id("chi_animal", &event));
        assert_eq!(first, "chi_animal/202611020930/x/special_board_meeting");
    }

    #[test]
    fn changing_start_only_changes_timestamp_segment() {
        let event = event_on(NaiveDate::from_ymd_opt(2026, 11, 2));
        let mut moved = event.clone();
        moved.start.time = NaiveTime::from_hms_opt(14, 0, 0);

        let before: Vec<String> = generate_id("s", &event).split('/').map(String::from).collect();
        let after: Vec<String> = generate_id("s", &moved).split('/').map(String::from).collect();
        assert_eq!(before[0], after[0]);
        assert_ne!(before[1], after[1]);
        assert_eq!(after[1], "202611021400");
        assert_eq!(before[2..], after[2..]);
    }

    #[test]
    fn id_zero_fills_and_escapes_fragment() {
        let mut event = event_on(None);
        event.id_fragment = Some("2026/11".to_string());
        assert_eq!(generate_id("s", &event), "s/000000000000/2026-11/special_board_meeting");

        let mut date_only = event_on(NaiveDate::from_ymd_opt(2026, 1, 5));
        date_only.start.time = None;
        assert_eq!(format_start(&date_only.start), "202601050000");
    }

    #[test]
    fn cancellation_text_beats_date() {
        let event = event_on(Some(today() + Duration::days(30)));
        assert_eq!(generate_status(&event, "Meeting CANCELLED", today()), Status::Cancelled);
        assert_eq!(generate_status(&event, "Rescheduled to May", today()), Status::Cancelled);
    }

    #[test]
    fn past_and_near_term_dates() {
        let past = event_on(Some(today() - Duration::days(1)));
        assert_eq!(generate_status(&past, "", today()), Status::Passed);

        let soon = event_on(Some(today() + Duration::days(3)));
        assert_eq!(generate_status(&soon, "", today()), Status::Confirmed);
    }

    #[test]
    fn confirm_window_boundaries() {
        let same_day = event_on(Some(today()));
        assert_eq!(generate_status(&same_day, "", today()), Status::Confirmed);

        let last_day = event_on(Some(today() + Duration::days(CONFIRM_WINDOW_DAYS)));
        assert_eq!(generate_status(&last_day, "", today()), Status::Confirmed);

        let outside = event_on(Some(today() + Duration::days(CONFIRM_WINDOW_DAYS + 1)));
        assert_eq!(generate_status(&outside, "", today()), Status::Tentative);
    }

    #[test]
    fn agenda_document_confirms() {
        let mut event = event_on(Some(today() + Duration::days(40)));
        assert_eq!(generate_status(&event, "", today()), Status::Tentative);

        event.documents.push(Document {
            url: "https://example.gov/agenda.pdf".to_string(),
            note: "Agenda".to_string(),
        });
        assert_eq!(generate_status(&event, "", today()), Status::Confirmed);
    }

    #[test]
    fn unknown_date_falls_through_to_text_checks() {
        let event = event_on(None);
        assert_eq!(generate_status(&event, "regular meeting", today()), Status::Tentative);
    }

    #[test]
    fn parses_record_date_and_time_strings() {
        assert_eq!(parse_date("2026-11-02"), NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(parse_date("11/02/2026"), None);
        assert_eq!(parse_time("18:30"), NaiveTime::from_hms_opt(18, 30, 0));
        assert_eq!(parse_time("18:30:15"), NaiveTime::from_hms_opt(18, 30, 15));
        assert_eq!(parse_time("6pm"), None);
        assert_eq!(clean_text("  a \n  b "), "a b");
    }
}
