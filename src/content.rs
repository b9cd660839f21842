use std::collections::HashMap;
use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::providers::oembed::{detect_platform, youtube_thumbnail_url, youtube_video_id, Platform};
use crate::published_at::parse_published_at;
use crate::sheet_cells::{parse_metric, parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
  Senbo,
  Senne,
  Reels,
}

impl ContentSource {
  pub fn key(self) -> &'static str {
    match self {
      Self::Senbo => "senbo",
      Self::Senne => "senne",
      Self::Reels => "reels",
    }
  }

  pub fn from_key(key: &str) -> Option<Self> {
    match key.trim().to_ascii_lowercase().as_str() {
      "senbo" => Some(Self::Senbo),
      "senne" => Some(Self::Senne),
      "reels" | "reel" => Some(Self::Reels),
      _ => None,
    }
  }
}

/// Canonical shape every view works with. `views` is the primary metric the
/// outlier scorer operates on; the rest ride along for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
  pub identity: String,
  pub source: ContentSource,
  pub title: String,
  pub url: String,
  pub thumbnail_url: Option<String>,
  pub published_at: NaiveDateTime,
  pub views: f64,
  pub likes: f64,
  pub comments: f64,
  pub shares: f64,
  pub revenue: f64,
  pub watch_minutes: f64,
  pub subscribers_gained: f64,
}

impl ContentItem {
  pub fn primary_metric(&self) -> f64 {
    self.views
  }
}

fn cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    None | Some(serde_json::Value::Null) => String::new(),
    Some(serde_json::Value::String(s)) => s,
    Some(other) => other.to_string(),
  })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SenboVideoRecord {
  #[serde(default, deserialize_with = "cell")]
  pub video_id: String,
  #[serde(default, deserialize_with = "cell")]
  pub title: String,
  #[serde(default, deserialize_with = "cell")]
  pub url: String,
  #[serde(default, deserialize_with = "cell")]
  pub published: String,
  #[serde(default, deserialize_with = "cell")]
  pub views: String,
  #[serde(default, deserialize_with = "cell")]
  pub likes: String,
  #[serde(default, deserialize_with = "cell")]
  pub comments: String,
  #[serde(default, deserialize_with = "cell")]
  pub revenue: String,
  #[serde(default, deserialize_with = "cell")]
  pub watch_minutes: String,
  #[serde(default, deserialize_with = "cell")]
  pub subscribers_gained: String,
}

/// Senne's sheet has no platform id column and tracks shares instead of
/// watch time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SenneVideoRecord {
  #[serde(default, deserialize_with = "cell")]
  pub title: String,
  #[serde(default, deserialize_with = "cell")]
  pub url: String,
  #[serde(default, deserialize_with = "cell")]
  pub published: String,
  #[serde(default, deserialize_with = "cell")]
  pub views: String,
  #[serde(default, deserialize_with = "cell")]
  pub likes: String,
  #[serde(default, deserialize_with = "cell")]
  pub comments: String,
  #[serde(default, deserialize_with = "cell")]
  pub shares: String,
  #[serde(default, deserialize_with = "cell")]
  pub revenue: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReelRecord {
  #[serde(default, deserialize_with = "cell")]
  pub reel_id: String,
  #[serde(default, deserialize_with = "cell")]
  pub caption: String,
  #[serde(default, deserialize_with = "cell")]
  pub url: String,
  #[serde(default, deserialize_with = "cell")]
  pub published: String,
  #[serde(default, deserialize_with = "cell")]
  pub views: String,
  #[serde(default, deserialize_with = "cell")]
  pub likes: String,
  #[serde(default, deserialize_with = "cell")]
  pub comments: String,
  #[serde(default, deserialize_with = "cell")]
  pub shares: String,
}

/// A raw row as it comes out of one of the sheets, keyed by the sheet it
/// was read from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceRecord {
  #[serde(rename = "senbo")]
  SenboVideo(SenboVideoRecord),
  #[serde(rename = "senne")]
  SenneVideo(SenneVideoRecord),
  #[serde(rename = "reels", alias = "reel")]
  Reel(ReelRecord),
}

fn first_of(row: &HashMap<String, String>, keys: &[&str]) -> String {
  keys
    .iter()
    .find_map(|k| row.get(*k).map(|v| v.trim()).filter(|v| !v.is_empty()))
    .unwrap_or("")
    .to_string()
}

/// Thumbnails that can be derived without a network call. Other platforms
/// are resolved on demand through oEmbed.
fn offline_thumbnail(url: &str) -> Option<String> {
  if detect_platform(url) != Some(Platform::YouTube) {
    return None;
  }
  youtube_video_id(url).map(|id| youtube_thumbnail_url(&id))
}

fn composite_identity(url: &str, title: &str) -> String {
  format!("{}|{}", url.trim(), title.trim())
}

impl SourceRecord {
  pub fn source(&self) -> ContentSource {
    match self {
      Self::SenboVideo(_) => ContentSource::Senbo,
      Self::SenneVideo(_) => ContentSource::Senne,
      Self::Reel(_) => ContentSource::Reels,
    }
  }

  /// Builds a record from a sheet row whose keys are lower-cased header
  /// names (see `providers::sheets::rows_to_maps`).
  pub fn from_row(source: ContentSource, row: &HashMap<String, String>) -> Self {
    let published = first_of(row, &["date", "published", "published at", "upload date", "datum"]);
    let url = first_of(row, &["url", "link"]);
    let views = first_of(row, &["views", "weergaven", "plays"]);
    let likes = first_of(row, &["likes"]);
    let comments = first_of(row, &["comments", "reacties"]);

    match source {
      ContentSource::Senbo => Self::SenboVideo(SenboVideoRecord {
        video_id: first_of(row, &["video id", "id", "video_id"]),
        title: first_of(row, &["title", "titel"]),
        url,
        published,
        views,
        likes,
        comments,
        revenue: first_of(row, &["revenue", "estimated revenue", "opbrengst"]),
        watch_minutes: first_of(row, &["watch time (minutes)", "watch minutes", "watch_minutes"]),
        subscribers_gained: first_of(row, &["subscribers", "subscribers gained", "abonnees"]),
      }),
      ContentSource::Senne => Self::SenneVideo(SenneVideoRecord {
        title: first_of(row, &["title", "titel"]),
        url,
        published,
        views,
        likes,
        comments,
        shares: first_of(row, &["shares", "gedeeld"]),
        revenue: first_of(row, &["revenue", "estimated revenue", "opbrengst"]),
      }),
      ContentSource::Reels => Self::Reel(ReelRecord {
        reel_id: first_of(row, &["reel id", "id", "reel_id"]),
        caption: first_of(row, &["caption", "title", "titel"]),
        url,
        published,
        views,
        likes,
        comments,
        shares: first_of(row, &["shares", "gedeeld"]),
      }),
    }
  }

  pub fn normalize(&self) -> ContentItem {
    match self {
      Self::SenboVideo(r) => {
        let identity = if r.video_id.trim().is_empty() {
          composite_identity(&r.url, &r.title)
        } else {
          r.video_id.trim().to_string()
        };
        ContentItem {
          identity,
          source: ContentSource::Senbo,
          title: r.title.trim().to_string(),
          url: r.url.trim().to_string(),
          thumbnail_url: offline_thumbnail(&r.url),
          published_at: parse_published_at(&r.published),
          views: parse_metric(&r.views),
          likes: parse_metric(&r.likes),
          comments: parse_metric(&r.comments),
          shares: 0.0,
          revenue: parse_metric(&r.revenue),
          watch_minutes: parse_metric(&r.watch_minutes),
          subscribers_gained: parse_number(&r.subscribers_gained),
        }
      }
      Self::SenneVideo(r) => ContentItem {
        identity: composite_identity(&r.url, &r.title),
        source: ContentSource::Senne,
        title: r.title.trim().to_string(),
        url: r.url.trim().to_string(),
        thumbnail_url: offline_thumbnail(&r.url),
        published_at: parse_published_at(&r.published),
        views: parse_metric(&r.views),
        likes: parse_metric(&r.likes),
        comments: parse_metric(&r.comments),
        shares: parse_metric(&r.shares),
        revenue: parse_metric(&r.revenue),
        watch_minutes: 0.0,
        subscribers_gained: 0.0,
      },
      Self::Reel(r) => {
        let identity = if r.reel_id.trim().is_empty() {
          composite_identity(&r.url, &r.caption)
        } else {
          r.reel_id.trim().to_string()
        };
        ContentItem {
          identity,
          source: ContentSource::Reels,
          title: r.caption.trim().to_string(),
          url: r.url.trim().to_string(),
          thumbnail_url: offline_thumbnail(&r.url),
          published_at: parse_published_at(&r.published),
          views: parse_metric(&r.views),
          likes: parse_metric(&r.likes),
          comments: parse_metric(&r.comments),
          shares: parse_metric(&r.shares),
          revenue: 0.0,
          watch_minutes: 0.0,
          subscribers_gained: 0.0,
        }
      }
    }
  }
}

/// Normalises a batch, skipping rows that carry neither an id, url nor
/// title, and suffixing repeated identities (`id#2`, `id#3`, ...) so keys
/// stay unique within the batch.
pub fn normalize_batch(records: &[SourceRecord]) -> Vec<ContentItem> {
  let mut seen: HashSet<String> = HashSet::new();
  let mut out = Vec::with_capacity(records.len());

  for record in records {
    let mut item = record.normalize();
    if item.identity.is_empty() || item.identity == "|" {
      continue;
    }

    if !seen.insert(item.identity.clone()) {
      let base = item.identity.clone();
      let mut n = 2usize;
      loop {
        let candidate = format!("{base}#{n}");
        if seen.insert(candidate.clone()) {
          item.identity = candidate;
          break;
        }
        n += 1;
      }
    }

    out.push(item);
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn senbo_row_uses_video_id_as_identity() {
    let r = row(&[
      ("video id", "abc123"),
      ("title", "Grote vlog"),
      ("date", "03/02/2025, 18:30"),
      ("views", "12.345"),
      ("revenue", "€ 45,10"),
    ]);
    let item = SourceRecord::from_row(ContentSource::Senbo, &r).normalize();
    assert_eq!(item.identity, "abc123");
    assert_eq!(item.views, 12345.0);
    assert!((item.revenue - 45.10).abs() < 1e-9);
    assert_eq!(
      item.published_at,
      NaiveDate::from_ymd_opt(2025, 2, 3).unwrap().and_hms_opt(18, 30, 0).unwrap()
    );
  }

  #[test]
  fn only_youtube_links_get_an_offline_thumbnail() {
    let reel = SourceRecord::from_row(
      ContentSource::Reels,
      &row(&[("reel id", "r1"), ("url", "https://www.instagram.com/reel/abc/")]),
    )
    .normalize();
    assert_eq!(reel.thumbnail_url, None);

    let video = SourceRecord::from_row(
      ContentSource::Senbo,
      &row(&[("video id", "v1"), ("url", "https://www.youtube.com/watch?dev=1&v=v1")]),
    )
    .normalize();
    assert_eq!(video.thumbnail_url.as_deref(), Some("https://i.ytimg.com/vi/v1/hqdefault.jpg"));
  }

  #[test]
  fn senne_row_gets_composite_identity() {
    let r = row(&[
      ("title", "Shortje"),
      ("url", "https://youtu.be/xyz"),
      ("views", "900"),
      ("shares", "12"),
    ]);
    let item = SourceRecord::from_row(ContentSource::Senne, &r).normalize();
    assert_eq!(item.identity, "https://youtu.be/xyz|Shortje");
    assert_eq!(item.thumbnail_url.as_deref(), Some("https://i.ytimg.com/vi/xyz/hqdefault.jpg"));
    assert_eq!(item.shares, 12.0);
    assert_eq!(item.source, ContentSource::Senne);
  }

  #[test]
  fn missing_metrics_become_zero_and_bad_dates_epoch() {
    let r = row(&[("reel id", "r1"), ("date", "gisteren")]);
    let item = SourceRecord::from_row(ContentSource::Reels, &r).normalize();
    assert_eq!(item.views, 0.0);
    assert_eq!(item.published_at, crate::published_at::epoch());
  }

  #[test]
  fn deserializes_tagged_records_with_numeric_cells() {
    let json = r#"[
      {"source": "senbo", "video_id": "v1", "title": "A", "published": "2025-01-01 10:00", "views": 1500},
      {"source": "reels", "reel_id": "r1", "caption": "B", "views": "2.000"}
    ]"#;
    let records: Vec<SourceRecord> = serde_json::from_str(json).unwrap();
    let items = normalize_batch(&records);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].views, 1500.0);
    assert_eq!(items[1].views, 2000.0);
    assert_eq!(items[1].source, ContentSource::Reels);
  }

  #[test]
  fn normalize_batch_keeps_identities_unique() {
    let rec = SourceRecord::SenboVideo(SenboVideoRecord {
      video_id: "dup".to_string(),
      ..Default::default()
    });
    let empty = SourceRecord::SenneVideo(SenneVideoRecord::default());
    let items = normalize_batch(&[rec.clone(), empty, rec.clone(), rec]);
    let ids: Vec<&str> = items.iter().map(|i| i.identity.as_str()).collect();
    assert_eq!(ids, vec!["dup", "dup#2", "dup#3"]);
  }

  #[test]
  fn source_keys_round_trip() {
    for s in [ContentSource::Senbo, ContentSource::Senne, ContentSource::Reels] {
      assert_eq!(ContentSource::from_key(s.key()), Some(s));
    }
    assert_eq!(ContentSource::from_key("other"), None);
  }
}
