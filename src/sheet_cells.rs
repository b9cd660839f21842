//! Normalisation of formatted Google Sheets cells.
//!
//! The sheets are kept in a Dutch locale, so `1.234` is one thousand two
//! hundred thirty-four and `12,5` is twelve and a half. Cells formatted in
//! an English locale (`1,234.56`) are also understood because the last
//! separator present decides which one is decimal.

fn is_noise(ch: char) -> bool {
  matches!(ch, '€' | '$' | '£' | '%' | ' ' | '\u{a0}' | '\u{202f}' | '\'')
}

fn split_suffix(value: &str) -> (&str, f64) {
  match value.chars().last() {
    Some('k') | Some('K') => (&value[..value.len() - 1], 1_000.0),
    Some('m') | Some('M') => (&value[..value.len() - 1], 1_000_000.0),
    Some('b') | Some('B') => (&value[..value.len() - 1], 1_000_000_000.0),
    _ => (value, 1.0),
  }
}

fn normalize_separators(digits: &str) -> String {
  let last_dot = digits.rfind('.');
  let last_comma = digits.rfind(',');

  match (last_dot, last_comma) {
    (Some(dot), Some(comma)) => {
      if comma > dot {
        digits.replace('.', "").replace(',', ".")
      } else {
        digits.replace(',', "")
      }
    }
    (None, Some(_)) => {
      if digits.matches(',').count() > 1 {
        digits.replace(',', "")
      } else {
        digits.replace(',', ".")
      }
    }
    (Some(dot), None) => {
      if digits.matches('.').count() > 1 {
        return digits.replace('.', "");
      }
      let int_part = digits[..dot].trim_start_matches('-');
      let frac_len = digits[dot + 1..].len();
      let looks_grouped = frac_len == 3 && !int_part.is_empty() && int_part != "0";
      if looks_grouped {
        digits.replace('.', "")
      } else {
        digits.to_string()
      }
    }
    (None, None) => digits.to_string(),
  }
}

/// Parses a formatted numeric cell. Empty or unparseable cells become `0.0`;
/// the result is always finite.
pub fn parse_number(raw: &str) -> f64 {
  let cleaned: String = raw.trim().chars().filter(|c| !is_noise(*c)).collect();
  if cleaned.is_empty() {
    return 0.0;
  }

  let (body, multiplier) = split_suffix(&cleaned);
  let normalized = normalize_separators(body);

  match normalized.parse::<f64>() {
    Ok(v) if v.is_finite() => {
      let scaled = v * multiplier;
      if scaled.is_finite() {
        scaled
      } else {
        0.0
      }
    }
    _ => 0.0,
  }
}

/// Like [`parse_number`] but clamps negatives to zero, for counters such as
/// views or likes.
pub fn parse_metric(raw: &str) -> f64 {
  parse_number(raw).max(0.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dutch_grouping_and_decimals() {
    assert_eq!(parse_number("1.234"), 1234.0);
    assert_eq!(parse_number("1.234.567"), 1_234_567.0);
    assert_eq!(parse_number("12,5"), 12.5);
    assert_eq!(parse_number("1.234,56"), 1234.56);
  }

  #[test]
  fn english_grouping_and_decimals() {
    assert_eq!(parse_number("1,234,567"), 1_234_567.0);
    assert_eq!(parse_number("1,234.56"), 1234.56);
    assert_eq!(parse_number("12.5"), 12.5);
    assert_eq!(parse_number("0.125"), 0.125);
  }

  #[test]
  fn strips_currency_and_spaces() {
    assert_eq!(parse_number("€ 1.234,50"), 1234.5);
    assert_eq!(parse_number("$99"), 99.0);
    assert_eq!(parse_number("1\u{a0}234"), 1234.0);
    assert_eq!(parse_number("45%"), 45.0);
  }

  #[test]
  fn handles_compact_suffixes() {
    assert_eq!(parse_number("1,2K"), 1200.0);
    assert_eq!(parse_number("3.5M"), 3_500_000.0);
  }

  #[test]
  fn garbage_and_empty_are_zero() {
    assert_eq!(parse_number(""), 0.0);
    assert_eq!(parse_number("n/a"), 0.0);
    assert_eq!(parse_number("—"), 0.0);
  }

  #[test]
  fn metrics_never_go_negative() {
    assert_eq!(parse_number("-12"), -12.0);
    assert_eq!(parse_metric("-12"), 0.0);
  }
}
