//! Publish date resolution and sort key derivation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;

use crate::attrs::open_tags;

/// Date used when a post carries no discoverable date.
pub const SENTINEL_DATE: &str = "1970-01-01";

static TIME_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<time\b([^>]*)>").expect("Invalid time tag regex"));

static FILENAME_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[-_]?(\d{2})[-_]?(\d{2})").expect("Invalid filename date regex")
});

/// Exact shape of an ISO-8601 date accepted as a sort key. chrono alone also
/// takes single-digit fields and signed years.
static ISO_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d{1,6})?)?(?:Z|[+-]\d{2}:\d{2})?)?$",
    )
    .expect("Invalid ISO shape regex")
});

/// Naive datetime layouts accepted for sort keys, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts, tried in order. A trailing `Z` is rewritten to
/// `+00:00` first.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Resolve the display date of a post.
///
/// Markup matchers run first, then the filename pattern, then the sentinel.
pub fn resolve_date(html: &str, filename: &str) -> String {
    [post_date_time(html), any_time(html), filename_date(filename)]
        .into_iter()
        .flatten()
        .next()
        .unwrap_or_else(|| SENTINEL_DATE.to_string())
}

/// `datetime` of the first `<time>` tagged with the `post-date` class.
pub fn post_date_time(html: &str) -> Option<String> {
    open_tags(&TIME_TAG_RE, html)
        .filter(|tag| tag.has_class("post-date"))
        .find_map(|tag| datetime_of(tag.attr("datetime")))
}

/// `datetime` of the first `<time>` carrying one.
pub fn any_time(html: &str) -> Option<String> {
    open_tags(&TIME_TAG_RE, html).find_map(|tag| datetime_of(tag.attr("datetime")))
}

/// An eight-digit date in the filename, optionally separated by `-` or `_`.
pub fn filename_date(filename: &str) -> Option<String> {
    let caps = FILENAME_DATE_RE.captures(filename)?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

fn datetime_of(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Derive the sort key of a date.
///
/// Parseable ISO-8601 dates become `YYYY-MM-DDTHH:MM:SS`, with microseconds
/// when non-zero and the UTC offset when one was given. Anything else is
/// returned unchanged and sorts by plain string comparison.
pub fn sort_key(date: &str) -> String {
    parse_iso(date).unwrap_or_else(|| date.to_string())
}

fn parse_iso(date: &str) -> Option<String> {
    if !ISO_SHAPE_RE.is_match(date) {
        return None;
    }

    if date.len() == 10 {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        return Some(format_naive(&day.and_hms_opt(0, 0, 0)?));
    }

    let zoned = match date.strip_suffix('Z') {
        Some(rest) => Some(format!("{}+00:00", rest)),
        None if has_offset(date) => Some(date.to_string()),
        None => None,
    };

    match zoned {
        Some(zoned) => {
            let dt = OFFSET_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(&zoned, format).ok())?;
            (!is_leap_second(&dt.naive_local())).then(|| format_aware(&dt))
        }
        None => {
            let dt = NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())?;
            (!is_leap_second(&dt)).then(|| format_naive(&dt))
        }
    }
}

/// Whether a shape-checked datetime ends in a `±HH:MM` offset.
fn has_offset(date: &str) -> bool {
    let tail = &date.as_bytes()[date.len().saturating_sub(6)..];
    tail.len() == 6 && (tail[0] == b'+' || tail[0] == b'-') && tail[3] == b':'
}

/// chrono represents `:60` as a nanosecond overflow of second 59.
fn is_leap_second(dt: &NaiveDateTime) -> bool {
    dt.nanosecond() >= 1_000_000_000
}

fn format_naive(dt: &NaiveDateTime) -> String {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let micros = dt.nanosecond() / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

fn format_aware(dt: &DateTime<FixedOffset>) -> String {
    let mut out = format_naive(&dt.naive_local());
    out.push_str(&dt.format("%:z").to_string());
    out
}
