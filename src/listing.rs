use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::content::{ContentItem, ContentSource};
use crate::error::DashboardError;
use crate::outlier::OutlierScores;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  Views,
  Likes,
  Revenue,
  Shares,
  WatchMinutes,
  PublishedAt,
  OutlierRatio,
  Title,
}

impl SortKey {
  pub fn from_key(key: &str) -> Result<Self, DashboardError> {
    match key.trim().to_ascii_lowercase().as_str() {
      "views" => Ok(Self::Views),
      "likes" => Ok(Self::Likes),
      "revenue" => Ok(Self::Revenue),
      "shares" => Ok(Self::Shares),
      "watch_minutes" | "watchtime" => Ok(Self::WatchMinutes),
      "date" | "published_at" => Ok(Self::PublishedAt),
      "outlier" | "ratio" | "outlier_ratio" => Ok(Self::OutlierRatio),
      "title" => Ok(Self::Title),
      other => Err(DashboardError::BadRequest(format!("unknown sort key: {other}"))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

impl SortDirection {
  pub fn from_key(key: &str) -> Self {
    if key.trim().eq_ignore_ascii_case("asc") {
      Self::Asc
    } else {
      Self::Desc
    }
  }
}

fn compare(a: &ContentItem, b: &ContentItem, key: SortKey, scores: Option<&OutlierScores>) -> Ordering {
  match key {
    SortKey::Views => a.views.total_cmp(&b.views),
    SortKey::Likes => a.likes.total_cmp(&b.likes),
    SortKey::Revenue => a.revenue.total_cmp(&b.revenue),
    SortKey::Shares => a.shares.total_cmp(&b.shares),
    SortKey::WatchMinutes => a.watch_minutes.total_cmp(&b.watch_minutes),
    SortKey::PublishedAt => a.published_at.cmp(&b.published_at),
    SortKey::OutlierRatio => {
      let ra = scores.map(|s| s.ratio_or_neutral(&a.identity)).unwrap_or(1.0);
      let rb = scores.map(|s| s.ratio_or_neutral(&b.identity)).unwrap_or(1.0);
      ra.total_cmp(&rb)
    }
    SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
  }
}

/// Stable sort on a single key. `scores` is only consulted for
/// [`SortKey::OutlierRatio`].
pub fn sort_items(items: &mut [ContentItem], key: SortKey, dir: SortDirection, scores: Option<&OutlierScores>) {
  items.sort_by(|a, b| {
    let ord = compare(a, b, key, scores);
    match dir {
      SortDirection::Asc => ord,
      SortDirection::Desc => ord.reverse(),
    }
  });
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
  pub title_query: Option<String>,
  pub from: Option<NaiveDateTime>,
  pub to: Option<NaiveDateTime>,
  pub source: Option<ContentSource>,
}

impl ItemFilter {
  pub fn matches(&self, item: &ContentItem) -> bool {
    if let Some(q) = self.title_query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
      if !item.title.to_lowercase().contains(&q.to_lowercase()) {
        return false;
      }
    }
    if let Some(from) = self.from {
      if item.published_at < from {
        return false;
      }
    }
    if let Some(to) = self.to {
      if item.published_at > to {
        return false;
      }
    }
    if let Some(source) = self.source {
      if item.source != source {
        return false;
      }
    }
    true
  }

  pub fn apply(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
    items.into_iter().filter(|i| self.matches(i)).collect()
  }
}

pub fn outliers_only(items: Vec<ContentItem>, scores: &OutlierScores) -> Vec<ContentItem> {
  items
    .into_iter()
    .filter(|i| scores.is_outlier(&i.identity))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn at(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap().and_hms_opt(9, 0, 0).unwrap()
  }

  fn item(id: &str, title: &str, source: ContentSource, d: u32, views: f64, revenue: f64) -> ContentItem {
    ContentItem {
      identity: id.to_string(),
      source,
      title: title.to_string(),
      url: String::new(),
      thumbnail_url: None,
      published_at: at(d),
      views,
      likes: 0.0,
      comments: 0.0,
      shares: 0.0,
      revenue,
      watch_minutes: 0.0,
      subscribers_gained: 0.0,
    }
  }

  fn sample() -> Vec<ContentItem> {
    vec![
      item("a", "Kerst vlog", ContentSource::Senbo, 1, 300.0, 5.0),
      item("b", "Pranks", ContentSource::Senne, 2, 900.0, 1.0),
      item("c", "kerstshow", ContentSource::Senne, 3, 300.0, 9.0),
      item("d", "Q&A", ContentSource::Senbo, 4, 100.0, 2.0),
    ]
  }

  fn ids(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(|i| i.identity.as_str()).collect()
  }

  #[test]
  fn sort_by_views_desc_is_stable() {
    let mut items = sample();
    sort_items(&mut items, SortKey::Views, SortDirection::Desc, None);
    assert_eq!(ids(&items), vec!["b", "a", "c", "d"]);
  }

  #[test]
  fn sort_by_date_asc_and_revenue_desc() {
    let mut items = sample();
    items.reverse();
    sort_items(&mut items, SortKey::PublishedAt, SortDirection::Asc, None);
    assert_eq!(ids(&items), vec!["a", "b", "c", "d"]);

    sort_items(&mut items, SortKey::Revenue, SortDirection::Desc, None);
    assert_eq!(ids(&items), vec!["c", "a", "d", "b"]);
  }

  #[test]
  fn sort_by_ratio_uses_neutral_default() {
    let mut scores = OutlierScores::default();
    scores.ratios.insert("d".to_string(), 4.0);
    scores.ratios.insert("a".to_string(), 0.2);
    let mut items = sample();
    sort_items(&mut items, SortKey::OutlierRatio, SortDirection::Desc, Some(&scores));
    assert_eq!(ids(&items), vec!["d", "b", "c", "a"]);
  }

  #[test]
  fn filters_compose() {
    let filter = ItemFilter {
      title_query: Some("KERST".to_string()),
      source: Some(ContentSource::Senne),
      ..Default::default()
    };
    assert_eq!(ids(&filter.apply(sample())), vec!["c"]);

    let range = ItemFilter {
      from: Some(at(2)),
      to: Some(at(3)),
      ..Default::default()
    };
    assert_eq!(ids(&range.apply(sample())), vec!["b", "c"]);
  }

  #[test]
  fn blank_query_matches_everything() {
    let filter = ItemFilter {
      title_query: Some("   ".to_string()),
      ..Default::default()
    };
    assert_eq!(filter.apply(sample()).len(), 4);
  }

  #[test]
  fn unknown_sort_key_is_rejected() {
    assert!(SortKey::from_key("popularity").is_err());
    assert_eq!(SortKey::from_key("Date").unwrap(), SortKey::PublishedAt);
    assert_eq!(SortDirection::from_key("ASC"), SortDirection::Asc);
    assert_eq!(SortDirection::from_key("whatever"), SortDirection::Desc);
  }
}
