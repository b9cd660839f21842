use serde::Serialize;

use crate::config::OutlierConfig;
use crate::content::ContentItem;
use crate::listing::{outliers_only, sort_items, ItemFilter, SortDirection, SortKey};
use crate::outlier::{format_ratio_badge, score_with, OutlierScores};
use crate::summary::{summarize, Summary};

#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
  pub filter: ItemFilter,
  pub sort: Option<(SortKey, SortDirection)>,
  pub outliers_only: bool,
  pub hide_revenue: bool,
  pub outlier: OutlierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedItem {
  #[serde(flatten)]
  pub item: ContentItem,
  pub ratio: Option<f64>,
  pub is_outlier: bool,
  pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult {
  pub items: Vec<AnnotatedItem>,
  pub threshold: f64,
  pub window_radius: usize,
  pub outlier_count: usize,
  pub summary: Summary,
}

/// Filters, scores the filtered batch, then sorts. Outliers are relative to
/// whatever survived the filter. Without an explicit sort the list comes
/// back strongest outlier first.
pub fn build_view(items: Vec<ContentItem>, query: &ViewQuery) -> ViewResult {
  let filtered = query.filter.apply(items);
  let scores: OutlierScores = score_with(&filtered, &query.outlier);

  let mut shown = if query.outliers_only {
    outliers_only(filtered, &scores)
  } else {
    filtered
  };

  let default_sort = (SortKey::OutlierRatio, SortDirection::Desc);
  // Hidden revenue is never a sort key.
  let (key, dir) = match query.sort {
    Some((SortKey::Revenue, _)) if query.hide_revenue => default_sort,
    Some(sort) => sort,
    None => default_sort,
  };
  sort_items(&mut shown, key, dir, Some(&scores));

  let mut summary = summarize(&shown);
  if query.hide_revenue {
    summary = summary.redacted();
  }

  let items = shown
    .into_iter()
    .map(|mut item| {
      if query.hide_revenue {
        item.revenue = 0.0;
      }
      let ratio = scores.ratio(&item.identity);
      AnnotatedItem {
        is_outlier: scores.is_outlier(&item.identity),
        badge: ratio.map(format_ratio_badge),
        ratio,
        item,
      }
    })
    .collect();

  ViewResult {
    items,
    threshold: query.outlier.threshold,
    window_radius: query.outlier.window_radius,
    outlier_count: scores.outliers.len(),
    summary,
  }
}
