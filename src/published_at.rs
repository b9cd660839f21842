use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 6] = [
  "%d/%m/%Y, %H:%M",
  "%d/%m/%Y %H:%M",
  "%d/%m/%Y, %H:%M:%S",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// 1970-01-01 00:00:00.
pub fn epoch() -> NaiveDateTime {
  NaiveDateTime::default()
}

/// Parses a sheet date cell. Unparseable input falls back to the Unix epoch
/// so that such rows sort first.
pub fn parse_published_at(raw: &str) -> NaiveDateTime {
  try_parse_published_at(raw).unwrap_or_else(epoch)
}

pub fn try_parse_published_at(raw: &str) -> Option<NaiveDateTime> {
  let value = raw.trim();
  if value.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(dt.naive_utc());
  }

  for fmt in DATETIME_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
      return Some(dt);
    }
  }

  for fmt in DATE_FORMATS {
    if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
      return d.and_hms_opt(0, 0, 0);
    }
  }

  None
}

pub fn format_display_date(dt: NaiveDateTime) -> String {
  dt.format("%d/%m/%Y").to_string()
}
