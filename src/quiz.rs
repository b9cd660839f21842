use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::content::ContentItem;
use crate::metric::Metric;

const MAX_PAIR_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOption {
  pub identity: String,
  pub title: String,
  pub thumbnail_url: Option<String>,
  /// Revealed by the client only after the player answers.
  pub value: f64,
}

impl QuizOption {
  fn from_item(item: &ContentItem, metric: Metric) -> Self {
    Self {
      identity: item.identity.clone(),
      title: item.title.clone(),
      thumbnail_url: item.thumbnail_url.clone(),
      value: metric.value(item),
    }
  }
}

/// "Which of these two got more <metric>?"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizQuestion {
  pub metric: Metric,
  pub left: QuizOption,
  pub right: QuizOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizVerdict {
  pub correct: bool,
  pub winner_identity: String,
  pub winner_value: f64,
  pub loser_value: f64,
  /// Winner over loser; `None` when the loser scored zero.
  pub multiple: Option<f64>,
}

impl QuizQuestion {
  pub fn prompt(&self) -> String {
    format!("Which video has more {}?", self.metric.label())
  }

  fn winner_and_loser(&self) -> (&QuizOption, &QuizOption) {
    if self.left.value >= self.right.value {
      (&self.left, &self.right)
    } else {
      (&self.right, &self.left)
    }
  }

  /// Returns `None` when `answer` names neither option.
  pub fn check(&self, answer: &str) -> Option<QuizVerdict> {
    if answer != self.left.identity && answer != self.right.identity {
      return None;
    }
    let (winner, loser) = self.winner_and_loser();
    let multiple = if loser.value > 0.0 {
      Some(winner.value / loser.value)
    } else {
      None
    };
    Some(QuizVerdict {
      correct: answer == winner.identity,
      winner_identity: winner.identity.clone(),
      winner_value: winner.value,
      loser_value: loser.value,
      multiple,
    })
  }
}

fn has_spread(items: &[ContentItem], metric: Metric) -> bool {
  let mut values = items.iter().map(|i| metric.value(i));
  match values.next() {
    Some(first) => values.any(|v| v != first),
    None => false,
  }
}

/// Builds up to `rounds` questions. The same seed over the same batch gives
/// the same quiz. Pairs with equal values are never asked; metrics where
/// every item scores the same are skipped.
pub fn build_quiz(items: &[ContentItem], rounds: usize, seed: u64) -> Vec<QuizQuestion> {
  if items.len() < 2 {
    return Vec::new();
  }

  let metrics: Vec<Metric> = Metric::ALL
    .iter()
    .copied()
    .filter(|m| has_spread(items, *m))
    .collect();
  if metrics.is_empty() {
    return Vec::new();
  }

  let mut rng = StdRng::seed_from_u64(seed);
  let mut out = Vec::with_capacity(rounds);

  for _ in 0..rounds {
    let Some(metric) = metrics.choose(&mut rng).copied() else {
      break;
    };

    for _ in 0..MAX_PAIR_ATTEMPTS {
      let a = rng.gen_range(0..items.len());
      let b = rng.gen_range(0..items.len());
      if a == b {
        continue;
      }
      if metric.value(&items[a]) == metric.value(&items[b]) {
        continue;
      }
      out.push(QuizQuestion {
        metric,
        left: QuizOption::from_item(&items[a], metric),
        right: QuizOption::from_item(&items[b], metric),
      });
      break;
    }
  }

  out
}
