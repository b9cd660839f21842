use vercel_runtime::Error;

use senbo_dashboard::app_state::{AppStateHandle, JsonFileStore};
use senbo_dashboard::config::OutlierConfig;
use senbo_dashboard::content::{normalize_batch, SourceRecord};
use senbo_dashboard::outlier::{format_ratio_badge, rank_by_outlier_strength, score_with};
use senbo_dashboard::published_at::format_display_date;

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
  args
    .iter()
    .position(|a| a == flag)
    .and_then(|idx| args.get(idx + 1))
    .cloned()
}

/// Threshold for this run. With `--state`, the dashboard's saved threshold is
/// the default and an explicit `--threshold` is written back to it.
fn resolve_threshold(args: &[String]) -> Result<f64, Error> {
  let explicit = parse_flag_value(args, "--threshold");
  let Some(state_path) = parse_flag_value(args, "--state").filter(|v| !v.trim().is_empty()) else {
    return Ok(OutlierConfig::from_query(explicit.as_deref()).threshold);
  };

  let mut handle = AppStateHandle::open(JsonFileStore::new(state_path.trim()));
  match explicit {
    Some(raw) => Ok(handle.set_outlier_threshold(OutlierConfig::from_query(Some(&raw)).threshold)?),
    None => Ok(handle.state().outlier_threshold),
  }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  senbo_dashboard::telemetry::init();
  let args: Vec<String> = std::env::args().collect();

  let Some(file) = parse_flag_value(&args, "--file").filter(|v| !v.trim().is_empty()) else {
    eprintln!("Missing required --file <items.json>");
    return Ok(());
  };

  let mut cfg = OutlierConfig::with_threshold(resolve_threshold(&args)?);
  if let Some(radius) = parse_flag_value(&args, "--radius") {
    match radius.trim().parse::<usize>() {
      Ok(r) if r > 0 => cfg.window_radius = r,
      _ => {
        eprintln!("--radius must be a positive integer");
        return Ok(());
      }
    }
  }
  let top = parse_flag_value(&args, "--top")
    .and_then(|v| v.trim().parse::<usize>().ok())
    .unwrap_or(20);

  let raw = tokio::fs::read(file.trim())
    .await
    .map_err(|e| Box::new(std::io::Error::other(format!("read {}: {e}", file.trim()))) as Error)?;
  let records: Vec<SourceRecord> = serde_json::from_slice(&raw)?;
  let items = normalize_batch(&records);
  let scores = score_with(&items, &cfg);

  println!("items={}", items.len());
  println!("threshold={}", cfg.threshold);
  println!("window_radius={}", cfg.window_radius);
  println!("outliers={}", scores.outliers.len());

  for item in rank_by_outlier_strength(&items, &scores).into_iter().take(top) {
    let ratio = scores.ratio_or_neutral(&item.identity);
    println!(
      "{}\t{}\t{}\t{}\t{}\t{}",
      format_ratio_badge(ratio),
      if scores.is_outlier(&item.identity) { "outlier" } else { "-" },
      item.source.key(),
      format_display_date(item.published_at),
      item.views,
      item.title
    );
  }

  Ok(())
}
