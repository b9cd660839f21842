use std::collections::BTreeMap;

use serde::Serialize;

use crate::content::{ContentItem, ContentSource};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceTotals {
  pub item_count: usize,
  pub views: f64,
  pub likes: f64,
  pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
  pub item_count: usize,
  pub total_views: f64,
  pub total_likes: f64,
  pub total_comments: f64,
  pub total_shares: f64,
  pub total_revenue: f64,
  pub total_watch_minutes: f64,
  pub total_subscribers_gained: f64,
  pub engagement_rate: f64,
  pub revenue_per_mille: f64,
  pub by_source: BTreeMap<ContentSource, SourceTotals>,
}

pub fn summarize(items: &[ContentItem]) -> Summary {
  let mut s = Summary {
    item_count: items.len(),
    ..Summary::default()
  };

  for item in items {
    s.total_views += item.views;
    s.total_likes += item.likes;
    s.total_comments += item.comments;
    s.total_shares += item.shares;
    s.total_revenue += item.revenue;
    s.total_watch_minutes += item.watch_minutes;
    s.total_subscribers_gained += item.subscribers_gained;

    let per_source = s.by_source.entry(item.source).or_default();
    per_source.item_count += 1;
    per_source.views += item.views;
    per_source.likes += item.likes;
    per_source.revenue += item.revenue;
  }

  if s.total_views > 0.0 {
    s.engagement_rate = (s.total_likes + s.total_comments + s.total_shares) / s.total_views;
    s.revenue_per_mille = (s.total_revenue / s.total_views) * 1000.0;
  }

  s
}

impl Summary {
  /// Copy with every revenue figure zeroed, for the hide-revenue toggle.
  pub fn redacted(&self) -> Self {
    let mut out = self.clone();
    out.total_revenue = 0.0;
    out.revenue_per_mille = 0.0;
    for totals in out.by_source.values_mut() {
      totals.revenue = 0.0;
    }
    out
  }
}
