use serde::{Deserialize, Serialize};

use crate::content::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
  Views,
  Likes,
  Comments,
  Shares,
  Revenue,
  WatchMinutes,
  SubscribersGained,
}

struct MetricDef {
  metric: Metric,
  key: &'static str,
  label: &'static str,
  value: fn(&ContentItem) -> f64,
}

fn views(i: &ContentItem) -> f64 {
  i.views
}
fn likes(i: &ContentItem) -> f64 {
  i.likes
}
fn comments(i: &ContentItem) -> f64 {
  i.comments
}
fn shares(i: &ContentItem) -> f64 {
  i.shares
}
fn revenue(i: &ContentItem) -> f64 {
  i.revenue
}
fn watch_minutes(i: &ContentItem) -> f64 {
  i.watch_minutes
}
fn subscribers_gained(i: &ContentItem) -> f64 {
  i.subscribers_gained
}

static TABLE: [MetricDef; 7] = [
  MetricDef { metric: Metric::Views, key: "views", label: "views", value: views },
  MetricDef { metric: Metric::Likes, key: "likes", label: "likes", value: likes },
  MetricDef { metric: Metric::Comments, key: "comments", label: "comments", value: comments },
  MetricDef { metric: Metric::Shares, key: "shares", label: "shares", value: shares },
  MetricDef { metric: Metric::Revenue, key: "revenue", label: "revenue", value: revenue },
  MetricDef {
    metric: Metric::WatchMinutes,
    key: "watch_minutes",
    label: "minutes watched",
    value: watch_minutes,
  },
  MetricDef {
    metric: Metric::SubscribersGained,
    key: "subscribers_gained",
    label: "subscribers gained",
    value: subscribers_gained,
  },
];

impl Metric {
  pub const ALL: [Metric; 7] = [
    Metric::Views,
    Metric::Likes,
    Metric::Comments,
    Metric::Shares,
    Metric::Revenue,
    Metric::WatchMinutes,
    Metric::SubscribersGained,
  ];

  fn def(self) -> &'static MetricDef {
    // TABLE is ordered like the enum.
    &TABLE[self as usize]
  }

  pub fn value(self, item: &ContentItem) -> f64 {
    (self.def().value)(item)
  }

  pub fn key(self) -> &'static str {
    self.def().key
  }

  pub fn label(self) -> &'static str {
    self.def().label
  }

  pub fn from_key(key: &str) -> Option<Self> {
    let key = key.trim();
    TABLE.iter().find(|s| s.key.eq_ignore_ascii_case(key)).map(|s| s.metric)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::ContentSource;

  fn sample() -> ContentItem {
    ContentItem {
      identity: "x".to_string(),
      source: ContentSource::Senbo,
      title: "x".to_string(),
      url: String::new(),
      thumbnail_url: None,
      published_at: crate::published_at::epoch(),
      views: 1.0,
      likes: 2.0,
      comments: 3.0,
      shares: 4.0,
      revenue: 5.0,
      watch_minutes: 6.0,
      subscribers_gained: 7.0,
    }
  }

  #[test]
  fn table_order_matches_enum() {
    for (idx, metric) in Metric::ALL.iter().enumerate() {
      assert_eq!(TABLE[idx].metric, *metric);
    }
  }

  #[test]
  fn accessors_read_the_right_field() {
    let item = sample();
    let values: Vec<f64> = Metric::ALL.iter().map(|m| m.value(&item)).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
  }

  #[test]
  fn keys_resolve_back() {
    for m in Metric::ALL {
      assert_eq!(Metric::from_key(m.key()), Some(m));
    }
    assert_eq!(Metric::from_key("VIEWS"), Some(Metric::Views));
    assert_eq!(Metric::from_key("dislikes"), None);
  }
}
