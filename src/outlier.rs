use std::collections::{HashMap, HashSet};

use crate::config::OutlierConfig;
use crate::content::ContentItem;

/// Ratio used for items the scorer could not rate (no neighbours, or a zero
/// neighbour average).
pub const NEUTRAL_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlierScores {
  pub ratios: HashMap<String, f64>,
  pub outliers: HashSet<String>,
}

impl OutlierScores {
  pub fn ratio(&self, identity: &str) -> Option<f64> {
    self.ratios.get(identity).copied()
  }

  pub fn ratio_or_neutral(&self, identity: &str) -> f64 {
    self.ratio(identity).unwrap_or(NEUTRAL_RATIO)
  }

  pub fn is_outlier(&self, identity: &str) -> bool {
    self.outliers.contains(identity)
  }
}

/// Positions `[start, end)` around `i`, excluding `i` itself.
fn neighbor_bounds(i: usize, len: usize, window_radius: usize) -> (usize, usize) {
  let start = i.saturating_sub(window_radius);
  let end = (i + window_radius + 1).min(len);
  (start, end)
}

/// Scores every item against the mean views of its chronological neighbours.
///
/// The batch is sorted by `published_at` on a copy (stable, so equal
/// timestamps keep input order); `items` is never reordered. Items with no
/// neighbours or a zero neighbour average get no ratio. An item is an
/// outlier when `ratio >= threshold`. The threshold is not validated.
pub fn score(items: &[ContentItem], threshold: f64, window_radius: usize) -> OutlierScores {
  let mut sorted: Vec<&ContentItem> = items.iter().collect();
  sorted.sort_by_key(|item| item.published_at);

  let len = sorted.len();
  let mut out = OutlierScores {
    ratios: HashMap::with_capacity(len),
    outliers: HashSet::new(),
  };

  for (i, item) in sorted.iter().enumerate() {
    let (start, end) = neighbor_bounds(i, len, window_radius);

    let mut sum = 0.0;
    let mut count = 0usize;
    for (j, neighbor) in sorted[start..end].iter().enumerate() {
      if start + j == i {
        continue;
      }
      sum += neighbor.primary_metric();
      count += 1;
    }

    if count == 0 {
      continue;
    }

    let neighbor_avg = sum / (count as f64);
    if neighbor_avg == 0.0 {
      continue;
    }

    let ratio = item.primary_metric() / neighbor_avg;
    if !ratio.is_finite() {
      continue;
    }

    if ratio >= threshold {
      out.outliers.insert(item.identity.clone());
    }
    out.ratios.insert(item.identity.clone(), ratio);
  }

  out
}

pub fn score_with(items: &[ContentItem], cfg: &OutlierConfig) -> OutlierScores {
  score(items, cfg.threshold, cfg.window_radius)
}

/// Orders the whole batch strongest outlier first. Unrated items count as
/// [`NEUTRAL_RATIO`]; ties keep input order.
pub fn rank_by_outlier_strength<'a>(items: &'a [ContentItem], scores: &OutlierScores) -> Vec<&'a ContentItem> {
  let mut ranked: Vec<&ContentItem> = items.iter().collect();
  ranked.sort_by(|a, b| {
    let ra = scores.ratio_or_neutral(&a.identity);
    let rb = scores.ratio_or_neutral(&b.identity);
    rb.total_cmp(&ra)
  });
  ranked
}

/// Badge text shown on a card, e.g. `2.3x`.
pub fn format_ratio_badge(ratio: f64) -> String {
  if ratio >= 10.0 {
    format!("{:.0}x", ratio)
  } else {
    format!("{:.1}x", ratio)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::ContentSource;
  use chrono::{Duration, NaiveDate, NaiveDateTime};

  fn day(n: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
      .unwrap()
      .and_hms_opt(12, 0, 0)
      .unwrap()
      + Duration::days(n)
  }

  fn item(id: &str, published_at: NaiveDateTime, views: f64) -> ContentItem {
    ContentItem {
      identity: id.to_string(),
      source: ContentSource::Senbo,
      title: format!("video {id}"),
      url: String::new(),
      thumbnail_url: None,
      published_at,
      views,
      likes: 0.0,
      comments: 0.0,
      shares: 0.0,
      revenue: 0.0,
      watch_minutes: 0.0,
      subscribers_gained: 0.0,
    }
  }

  fn daily(views: &[f64]) -> Vec<ContentItem> {
    views
      .iter()
      .enumerate()
      .map(|(i, v)| item(&format!("v{i}"), day(i as i64), *v))
      .collect()
  }

  #[test]
  fn empty_batch_yields_empty_result() {
    let scores = score(&[], 2.0, 5);
    assert!(scores.ratios.is_empty());
    assert!(scores.outliers.is_empty());
  }

  #[test]
  fn single_item_has_no_neighbors() {
    let scores = score(&daily(&[1_000_000.0]), 2.0, 5);
    assert!(scores.ratios.is_empty());
    assert!(scores.outliers.is_empty());
  }

  #[test]
  fn all_zero_batch_is_safe() {
    let scores = score(&daily(&[0.0; 8]), 2.0, 5);
    assert!(scores.outliers.is_empty());
    assert!(scores.ratios.values().all(|r| r.is_finite()));
    assert!(scores.ratios.is_empty());
  }

  #[test]
  fn zero_item_among_nonzero_neighbors_gets_zero_ratio() {
    let scores = score(&daily(&[10.0, 0.0, 10.0]), 2.0, 5);
    assert_eq!(scores.ratio("v1"), Some(0.0));
    assert!(!scores.is_outlier("v1"));
  }

  #[test]
  fn spike_in_eleven_daily_items() {
    let views = [10.0, 10.0, 10.0, 10.0, 10.0, 500.0, 10.0, 10.0, 10.0, 10.0, 10.0];
    let scores = score(&daily(&views), 2.0, 5);

    assert_eq!(scores.ratio("v5"), Some(50.0));
    assert!(scores.is_outlier("v5"));
    assert_eq!(scores.outliers.len(), 1);

    // v6 sees v1..=v5 and v7..=v10: eight plain items plus the spike.
    let adjacent = scores.ratio("v6").unwrap();
    assert!((adjacent - 10.0 / (580.0 / 9.0)).abs() < 1e-12);
    assert!((adjacent - 0.155).abs() < 0.001);
    assert!(!scores.is_outlier("v6"));
  }

  #[test]
  fn scores_are_deterministic() {
    let items = daily(&[5.0, 80.0, 7.0, 3.0, 40.0, 9.0, 1.0]);
    let a = score(&items, 2.0, 5);
    let b = score(&items, 2.0, 5);
    assert_eq!(a, b);
  }

  #[test]
  fn own_metric_is_never_its_own_neighbor() {
    // With radius 1 the middle item only sees its two zero neighbours, so
    // any self-inclusion would make the average non-zero.
    let items = daily(&[0.0, 100.0, 0.0]);
    let scores = score(&items, 2.0, 1);
    assert_eq!(scores.ratio("v1"), None);

    let items = daily(&[10.0, 30.0]);
    let scores = score(&items, 2.0, 5);
    assert_eq!(scores.ratio("v1"), Some(3.0));
    assert_eq!(scores.ratio("v0"), Some(10.0 / 30.0));
  }

  #[test]
  fn boundary_items_use_only_existing_neighbors() {
    let radius = 5;
    for n in 2..(2 * radius + 1) {
      for i in [0, n - 1] {
        let (start, end) = neighbor_bounds(i, n, radius);
        let count = end - start - 1;
        assert!(count <= n - 1);
        assert_eq!(count, (n - 1).min(radius));
      }
    }

    // First item of 4 sees exactly the 3 later ones: mean(2, 4, 6) = 4.
    let scores = score(&daily(&[8.0, 2.0, 4.0, 6.0]), 2.0, radius);
    assert_eq!(scores.ratio("v0"), Some(2.0));
    assert!(scores.is_outlier("v0"));
  }

  #[test]
  fn interior_window_uses_full_radius() {
    let (start, end) = neighbor_bounds(10, 30, 5);
    assert_eq!((start, end), (5, 16));
    assert_eq!(end - start - 1, 10);
  }

  #[test]
  fn sorting_is_chronological_and_input_untouched() {
    let items = vec![
      item("late", day(3), 10.0),
      item("early", day(0), 10.0),
      item("spike", day(1), 100.0),
      item("mid", day(2), 10.0),
    ];
    let before: Vec<String> = items.iter().map(|i| i.identity.clone()).collect();

    let scores = score(&items, 2.0, 1);

    let after: Vec<String> = items.iter().map(|i| i.identity.clone()).collect();
    assert_eq!(before, after);
    // Chronologically: early, spike, mid, late. "late" only neighbours "mid".
    assert_eq!(scores.ratio("late"), Some(1.0));
    assert_eq!(scores.ratio("spike"), Some(10.0));
    assert_eq!(scores.ratio("early"), Some(0.1));
  }

  #[test]
  fn epoch_dates_sort_first() {
    let items = vec![
      item("a", day(0), 10.0),
      item("b", day(1), 10.0),
      item("undated", crate::published_at::epoch(), 40.0),
    ];
    let scores = score(&items, 2.0, 1);
    // "undated" sorts before "a" and only neighbours it.
    assert_eq!(scores.ratio("undated"), Some(4.0));
  }

  #[test]
  fn raising_threshold_never_adds_outliers() {
    let items = daily(&[3.0, 90.0, 4.0, 12.0, 1.0, 55.0, 6.0, 7.0, 30.0, 2.0, 18.0, 5.0]);
    let mut prev = usize::MAX;
    for t in [0.5, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0, 50.0] {
      let n = score(&items, t, 5).outliers.len();
      assert!(n <= prev, "threshold {t} produced {n} > {prev}");
      prev = n;
    }
  }

  #[test]
  fn threshold_below_one_is_honored() {
    let items = daily(&[10.0, 10.0, 10.0]);
    let scores = score(&items, 0.5, 5);
    assert_eq!(scores.outliers.len(), 3);
  }

  #[test]
  fn ranking_treats_unrated_as_neutral() {
    let items = daily(&[1.0, 1.0, 1.0, 1.0, 1.0]);
    let mut scores = OutlierScores::default();
    scores.ratios.insert("v0".to_string(), 0.5);
    scores.ratios.insert("v1".to_string(), 3.0);
    scores.ratios.insert("v3".to_string(), 1.0);
    scores.ratios.insert("v4".to_string(), 5.0);

    let ranked: Vec<&str> = rank_by_outlier_strength(&items, &scores)
      .iter()
      .map(|i| i.identity.as_str())
      .collect();
    // v2 (unrated) and v3 (1.0) tie; input order wins.
    assert_eq!(ranked, vec!["v4", "v1", "v2", "v3", "v0"]);

    let ratios: Vec<f64> = ranked.iter().map(|id| scores.ratio_or_neutral(id)).collect();
    assert_eq!(ratios, vec![5.0, 3.0, 1.0, 1.0, 0.5]);
  }

  #[test]
  fn score_with_uses_config() {
    let items = daily(&[10.0, 10.0, 25.0, 10.0, 10.0]);
    let strict = score_with(&items, &OutlierConfig::with_threshold(3.0));
    let loose = score_with(&items, &OutlierConfig::default());
    assert!(strict.outliers.is_empty());
    assert!(loose.is_outlier("v2"));
  }

  #[test]
  fn badge_formatting() {
    assert_eq!(format_ratio_badge(2.34), "2.3x");
    assert_eq!(format_ratio_badge(50.0), "50x");
  }
}
