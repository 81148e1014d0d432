//! Event, category and festival types, plus the time-derived event view.

use chrono::{DateTime, FixedOffset, Month, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::permissions::Publishable;
use crate::util::{excerpt, BADGE_COLOR};

/// Calendar colour when the event type has none of its own.
pub const DEFAULT_EVENT_COLOR: &str = "#8B4513";

const CALENDAR_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Festival,
    Ceremony,
    Meeting,
    Celebration,
    Memorial,
    Official,
    Community,
    #[default]
    Other,
}

impl EventType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Festival => "Traditional Festival",
            Self::Ceremony => "Ceremony",
            Self::Meeting => "Palace Meeting",
            Self::Celebration => "Celebration",
            Self::Memorial => "Memorial",
            Self::Official => "Official Event",
            Self::Community => "Community Event",
            Self::Other => "Other",
        }
    }

    /// Calendar background colour.
    #[must_use]
    pub const fn calendar_color(self) -> &'static str {
        match self {
            Self::Ceremony => "#8B4513",
            Self::Festival => "#228B22",
            Self::Meeting => "#17a2b8",
            Self::Celebration => "#ffc107",
            Self::Other => "#6c757d",
            _ => DEFAULT_EVENT_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recurrence_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    None,
    Annual,
    Monthly,
    Weekly,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EventCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 120))]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(regex(path = *BADGE_COLOR, message = "Colour must be a theme name or #RRGGBB"))]
    #[serde(default = "default_category_color")]
    pub color: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub icon: String,
}

fn default_category_color() -> String {
    DEFAULT_EVENT_COLOR.to_string()
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub short_description: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub category_color: Option<String>,
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_all_day: bool,
    pub recurrence: Recurrence,
    pub venue: String,
    pub address: String,
    pub map_url: String,
    pub featured_image: Option<String>,
    pub dress_code: String,
    pub special_instructions: String,
    pub contact_info: String,
    pub is_published: bool,
    pub is_featured: bool,
    pub is_cancelled: bool,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for Event {
    fn is_published(&self) -> bool {
        self.is_published
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct EventInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 220))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(max = 300))]
    #[serde(default)]
    pub short_description: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[validate(length(min = 1, max = 200, message = "Venue is required"))]
    pub venue: String,
    #[serde(default)]
    pub address: String,
    #[validate(url)]
    pub map_url: Option<String>,
    pub featured_image: Option<String>,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub dress_code: String,
    #[serde(default)]
    pub special_instructions: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_cancelled: bool,
}

impl EventInput {
    /// An event cannot end before it starts.
    pub fn check_dates(&self) -> Result<(), ApiError> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(ApiError::InvalidInput(
                "End date must not be before the start date".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// An event with its schedule state at a given instant.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub event_type_label: &'static str,
    pub is_upcoming: bool,
    pub is_ongoing: bool,
    pub is_past: bool,
    pub days_until: i64,
    pub duration_hours: Option<f64>,
}

impl EventView {
    /// Derive schedule flags at `now`. Calendar days are taken in `offset`.
    #[must_use]
    pub fn at(event: Event, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let start = event.start_date;
        let is_upcoming = start > now;

        let is_ongoing = match event.end_date {
            Some(end) => start <= now && now <= end,
            None => start.with_timezone(&offset).date_naive() == now.with_timezone(&offset).date_naive(),
        };

        let is_past = match event.end_date {
            Some(end) => end < now,
            None => start < now,
        };

        let days_until = if is_upcoming { (start - now).num_days() } else { 0 };

        #[allow(clippy::cast_precision_loss)]
        let duration_hours = event
            .end_date
            .map(|end| (end - start).num_seconds() as f64 / 3600.0);

        Self {
            event_type_label: event.event_type.label(),
            event,
            is_upcoming,
            is_ongoing,
            is_past,
            days_until,
            duration_hours,
        }
    }
}

/// One list page plus the featured upcoming events shown above it.
#[derive(Debug, Serialize)]
pub struct EventList {
    #[serde(flatten)]
    pub page: crate::listing::Paginated<EventView>,
    pub featured: Vec<EventView>,
    pub time: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EventDetail {
    pub event: EventView,
    pub related: Vec<EventView>,
}

/// Calendar feed entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub url: String,
    pub background_color: &'static str,
    pub extended_props: CalendarProps,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarProps {
    pub venue: String,
    pub event_type: &'static str,
    /// Local start time such as `04:30 PM`; absent for all-day events.
    pub time: Option<String>,
    pub description: String,
}

impl CalendarEntry {
    #[must_use]
    pub fn from_event(event: Event, offset: FixedOffset) -> Self {
        let time = (!event.is_all_day).then(|| {
            event
                .start_date
                .with_timezone(&offset)
                .format("%I:%M %p")
                .to_string()
        });

        Self {
            id: event.id,
            url: format!("/events/{}", event.slug),
            start: event.start_date,
            end: event.end_date,
            all_day: event.is_all_day,
            background_color: event.event_type.calendar_color(),
            extended_props: CalendarProps {
                venue: event.venue,
                event_type: event.event_type.label(),
                time,
                description: excerpt(&event.description, CALENDAR_EXCERPT_CHARS),
            },
            title: event.title,
        }
    }
}

// ============================================================================
// Traditional Festivals
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Festival {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub history: String,
    pub typical_month: Option<i16>,
    pub duration_days: i32,
    pub featured_image: Option<String>,
    pub activities: String,
    pub traditional_attire: String,
    pub food_and_drinks: String,
    pub is_active: bool,
    pub is_published: bool,
    pub is_featured: bool,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for Festival {
    fn is_published(&self) -> bool {
        self.is_published
    }
}

impl Festival {
    /// English month name, or `Various` when the month is not fixed.
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        self.typical_month
            .and_then(|m| u8::try_from(m).ok())
            .and_then(|m| Month::try_from(m).ok())
            .map_or("Various", |m| m.name())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FestivalView {
    #[serde(flatten)]
    pub festival: Festival,
    pub month_name: &'static str,
}

impl From<Festival> for FestivalView {
    fn from(festival: Festival) -> Self {
        Self {
            month_name: festival.month_name(),
            festival,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct FestivalInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 220))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub history: String,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub typical_month: Option<i16>,
    #[validate(range(min = 1))]
    #[serde(default = "default_duration")]
    pub duration_days: i32,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub activities: String,
    #[serde(default)]
    pub traditional_attire: String,
    #[serde(default)]
    pub food_and_drinks: String,
    #[serde(default = "crate::util::default_true")]
    pub is_active: bool,
    #[serde(default = "crate::util::default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
}

const fn default_duration() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn wat() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap()
    }

    fn event(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Ocho Festival".into(),
            slug: "ocho-festival".into(),
            description: "d".repeat(150),
            short_description: String::new(),
            category_id: None,
            category_name: None,
            category_slug: None,
            category_color: None,
            event_type: EventType::Festival,
            start_date: start,
            end_date: end,
            is_all_day: false,
            recurrence: Recurrence::Annual,
            venue: "Palace Square".into(),
            address: String::new(),
            map_url: String::new(),
            featured_image: None,
            dress_code: String::new(),
            special_instructions: String::new(),
            contact_info: String::new(),
            is_published: true,
            is_featured: false,
            is_cancelled: false,
            view_count: 0,
            created_at: noon(),
            updated_at: noon(),
        }
    }

    #[test]
    fn test_upcoming_event() {
        let start = noon() + Duration::days(3) + Duration::hours(5);
        let view = EventView::at(event(start, None), noon(), wat());
        assert!(view.is_upcoming);
        assert!(!view.is_past);
        assert!(!view.is_ongoing);
        assert_eq!(view.days_until, 3);
        assert_eq!(view.duration_hours, None);
    }

    #[test]
    fn test_ongoing_with_end() {
        let start = noon() - Duration::hours(2);
        let view = EventView::at(event(start, Some(noon() + Duration::hours(4))), noon(), wat());
        assert!(view.is_ongoing);
        assert!(!view.is_past);
        assert!(!view.is_upcoming);
        assert_eq!(view.days_until, 0);
        assert_eq!(view.duration_hours, Some(6.0));
    }

    #[test]
    fn test_without_end_ongoing_same_local_day() {
        let start = noon() - Duration::hours(3);
        let view = EventView::at(event(start, None), noon(), wat());
        assert!(view.is_ongoing);
        assert!(view.is_past);
    }

    #[test]
    fn test_local_day_boundary_uses_offset() {
        // 23:30 UTC is 00:30 the next day at UTC+1.
        let now = Utc.with_ymd_and_hms(2026, 8, 10, 23, 30, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 8, 10, 22, 0, 0).unwrap();
        assert!(!EventView::at(event(start, None), now, wat()).is_ongoing);
        assert!(EventView::at(event(start, None), now, FixedOffset::east_opt(0).unwrap()).is_ongoing);
    }

    #[test]
    fn test_finished_event() {
        let start = noon() - Duration::days(2);
        let view = EventView::at(event(start, Some(start + Duration::hours(3))), noon(), wat());
        assert!(view.is_past);
        assert!(!view.is_ongoing);
    }

    #[test]
    fn test_calendar_entry() {
        let entry = CalendarEntry::from_event(event(noon(), None), wat());
        assert_eq!(entry.background_color, "#228B22");
        assert_eq!(entry.url, "/events/ocho-festival");
        assert_eq!(entry.extended_props.time.as_deref(), Some("01:00 PM"));
        assert_eq!(entry.extended_props.description.chars().count(), 103);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["allDay"], false);
        assert_eq!(json["extendedProps"]["eventType"], "Traditional Festival");
    }

    #[test]
    fn test_calendar_colors() {
        assert_eq!(EventType::Meeting.calendar_color(), "#17a2b8");
        assert_eq!(EventType::Memorial.calendar_color(), DEFAULT_EVENT_COLOR);
    }

    #[test]
    fn test_event_dates_checked() {
        let input: EventInput = serde_json::from_value(serde_json::json!({
            "title": "Council sitting",
            "description": "Monthly sitting",
            "venue": "Palace Hall",
            "start_date": "2026-09-01T10:00:00Z",
            "end_date": "2026-09-01T09:00:00Z"
        }))
        .unwrap();
        assert!(matches!(input.check_dates(), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_festival_month_name() {
        let mut festival = Festival {
            id: Uuid::new_v4(),
            name: "Ogani".into(),
            slug: "ogani".into(),
            description: String::new(),
            history: String::new(),
            typical_month: Some(8),
            duration_days: 3,
            featured_image: None,
            activities: String::new(),
            traditional_attire: String::new(),
            food_and_drinks: String::new(),
            is_active: true,
            is_published: true,
            is_featured: false,
            view_count: 0,
            created_at: noon(),
            updated_at: noon(),
        };
        assert_eq!(festival.month_name(), "August");
        festival.typical_month = None;
        assert_eq!(FestivalView::from(festival).month_name, "Various");
    }
}
