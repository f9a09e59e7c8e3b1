pub mod base;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::constants::Status;
use crate::models::Event;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Chicago;

/// Shared behaviour for anything that yields meeting events.
pub trait Spider {
    fn name(&self) -> &str;

    fn agency(&self) -> &str;

    fn timezone(&self) -> Tz {
        DEFAULT_TIMEZONE
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone()).date_naive()
    }

    fn generate_id(&self, event: &Event) -> String {
        base::generate_id(self.name(), event)
    }

    fn generate_status(&self, event: &Event, text: &str) -> Status {
        base::generate_status(event, text, self.today())
    }

    /// Stamps the derived id and status; the id is rebuilt from `id_fragment`, so re-running is stable.
    fn finalize(&self, mut event: Event, text: &str) -> Event {
        let id = self.generate_id(&event);
        let status = self.generate_status(&event, text);
        event.id = Some(id);
        event.status = Some(status);
        event
    }
}

/// Spider identity for events that were scraped elsewhere and handed over as a feed.
pub struct FeedSpider {
    name: String,
    agency: String,
    timezone: Tz,
}

impl FeedSpider {
    pub fn new(name: impl Into<String>, timezone: Tz) -> Self {
        let name = name.into();
        Self {
            agency: name.clone(),
            name,
            timezone,
        }
    }

    pub fn with_agency(mut self, agency: impl Into<String>) -> Self {
        self.agency = agency.into();
        self
    }
}

impl Spider for FeedSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// Text the status heuristics read for a feed event.
pub fn status_text(event: &Event) -> String {
    base::clean_text(&format!("{} {}", event.name, event.event_description))
}

pub fn finalize_all<S: Spider + ?Sized>(spider: &S, events: Vec<Event>) -> Vec<Event> {
    debug!(
        spider = spider.name(),
        agency = spider.agency(),
        count = events.len(),
        "finalizing events"
    );
    events
        .into_iter()
        .map(|event| {
            let text = status_text(&event);
            spider.finalize(event, &text)
        })
        .collect()
}
