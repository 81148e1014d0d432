//! Advisory list filters.
//!
//! Filters never fail a request. A value that cannot match anything
//! (unknown enum variant, malformed date, unknown time frame) turns the
//! whole listing into an empty page.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::de::{value::StrDeserializer, DeserializeOwned, IntoDeserializer};

/// A filter value parsed from a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory<T> {
    /// Parameter missing or blank.
    Any,
    Is(T),
    /// Parameter present but unparseable.
    Unmatchable,
}

impl<T> Advisory<T> {
    /// `None` when the filter can never match, otherwise the optional SQL bind value.
    #[must_use]
    pub fn into_bind(self) -> Option<Option<T>> {
        match self {
            Self::Any => Some(None),
            Self::Is(value) => Some(Some(value)),
            Self::Unmatchable => None,
        }
    }

    /// Parse a non-blank parameter with `parse`; failure is `Unmatchable`.
    pub fn parse_with(raw: Option<&str>, parse: impl FnOnce(&str) -> Option<T>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Any,
            Some(s) => parse(s).map_or(Self::Unmatchable, Self::Is),
        }
    }
}

impl<T: DeserializeOwned> Advisory<T> {
    /// Parse an enum by its serde wire name.
    pub fn parse_enum(raw: Option<&str>) -> Self {
        Self::parse_with(raw, |s| {
            let de: StrDeserializer<'_, serde::de::value::Error> = s.into_deserializer();
            T::deserialize(de).ok()
        })
    }
}

impl Advisory<String> {
    /// Free text such as a category slug. Unknown values simply match no rows.
    pub fn parse_text(raw: Option<&str>) -> Self {
        Self::parse_with(raw, |s| Some(s.to_string()))
    }
}

impl Advisory<NaiveDate> {
    /// `YYYY-MM-DD`.
    pub fn parse_date(raw: Option<&str>) -> Self {
        Self::parse_with(raw, |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }
}

/// Build a case-insensitive substring pattern for `ILIKE`.
///
/// Returns `None` for blank input. `%`, `_` and `\` are escaped so they
/// match literally.
#[must_use]
pub fn search_pattern(raw: Option<&str>) -> Option<String> {
    let text = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Half-open `[from, to)` bound on a timestamp column. `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Window {
    /// The calendar day `date` in the site offset.
    #[must_use]
    pub fn day(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let start = (local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc();
        Self {
            from: Some(start),
            to: Some(start + Duration::days(1)),
        }
    }

    /// Narrow to the overlap of both windows.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let from = match (self.from, other.from) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let to = match (self.to, other.to) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self { from, to }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|f| at >= f) && self.to.is_none_or(|t| at < t)
    }
}

/// Event time-frame filter on `start_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFrame {
    /// Starts at or after now.
    #[default]
    Upcoming,
    /// Started before now.
    Past,
    /// Starts on today's calendar day in the site offset.
    Today,
    All,
}

impl TimeFrame {
    /// Blank means `Upcoming`; unknown names are `Unmatchable`.
    pub fn parse(raw: Option<&str>) -> Advisory<Self> {
        match Advisory::parse_with(raw, |s| match s.to_ascii_lowercase().as_str() {
            "upcoming" => Some(Self::Upcoming),
            "past" => Some(Self::Past),
            "today" => Some(Self::Today),
            "all" => Some(Self::All),
            _ => None,
        }) {
            Advisory::Any => Advisory::Is(Self::default()),
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::Today => "today",
            Self::All => "all",
        }
    }

    /// Bounds on `start_date` for this frame at `now`.
    #[must_use]
    pub fn bounds(self, now: DateTime<Utc>, offset: FixedOffset) -> Window {
        match self {
            Self::Upcoming => Window {
                from: Some(now),
                to: None,
            },
            Self::Past => Window {
                from: None,
                to: Some(now),
            },
            Self::Today => Window::day(now.with_timezone(&offset).date_naive(), offset),
            Self::All => Window::default(),
        }
    }
}
