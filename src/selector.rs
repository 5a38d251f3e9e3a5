//! Daily problem sampling.
//!
//! For each tier (Easy, Medium, Hard) the pool is filtered to that tier,
//! shuffled with the caller's RNG, and truncated to the requested count.
//! A tier with fewer candidates than requested contributes all of them.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument};

use crate::domain::{Difficulty, Preference, ProblemRecord};

#[instrument(level = "debug", skip_all, fields(pool_len = pool.len()))]
pub fn select<R: Rng + ?Sized>(pool: &[ProblemRecord], pref: &Preference, rng: &mut R) -> Vec<ProblemRecord> {
  let mut out = Vec::new();
  // A slug already taken is never offered again, even if the pool repeats it.
  let mut seen: HashSet<&str> = HashSet::new();

  for tier in Difficulty::ALL {
    let wanted = pref.count(tier) as usize;
    if wanted == 0 {
      continue;
    }

    let mut candidates: Vec<&ProblemRecord> = pool
      .iter()
      .filter(|r| r.difficulty == tier)
      .filter(|&r| seen.insert(r.title_slug.as_str()))
      .collect();
    candidates.shuffle(rng);

    let take = wanted.min(candidates.len());
    debug!(target: "selector", %tier, wanted, available = candidates.len(), take, "Tier sampled");
    out.extend(candidates.into_iter().take(take).cloned());
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{record, SolveStatus::NotAccepted};
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use crate::domain::Difficulty::*;

  fn pool() -> Vec<ProblemRecord> {
    let mut v = Vec::new();
    for i in 0..8 { v.push(record(&format!("e{i}"), Easy, NotAccepted, false)); }
    for i in 0..5 { v.push(record(&format!("m{i}"), Medium, NotAccepted, false)); }
    for i in 0..2 { v.push(record(&format!("h{i}"), Hard, NotAccepted, false)); }
    v
  }

  #[test]
  fn concrete_scenario() {
    let pool = vec![
      record("E1", Easy, NotAccepted, false),
      record("E2", Easy, NotAccepted, false),
      record("M1", Medium, NotAccepted, false),
    ];
    let mut rng = StdRng::seed_from_u64(7);
    let out = select(&pool, &Preference::new(1, 1, 2), &mut rng);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].difficulty, Easy);
    assert!(out[0].title_slug == "E1" || out[0].title_slug == "E2");
    assert_eq!(out[1].title_slug, "M1");
  }

  #[test]
  fn respects_bounds_and_tier_order() {
    let pool = pool();
    let pref = Preference::new(3, 10, 1);
    let mut rng = StdRng::seed_from_u64(1);
    let out = select(&pool, &pref, &mut rng);
    assert!(out.len() as u64 <= pref.count_by_difficulty.total());
    let tiers: Vec<Difficulty> = out.iter().map(|r| r.difficulty).collect();
    assert_eq!(tiers, vec![Easy, Easy, Easy, Medium, Medium, Medium, Medium, Medium, Hard]);
  }

  #[test]
  fn shortfall_returns_everything_available() {
    let pool = vec![
      record("a", Easy, NotAccepted, false),
      record("b", Easy, NotAccepted, false),
      record("c", Easy, NotAccepted, false),
    ];
    let mut rng = StdRng::seed_from_u64(3);
    let mut slugs: Vec<String> = select(&pool, &Preference::new(10, 0, 0), &mut rng)
      .into_iter()
      .map(|r| r.title_slug)
      .collect();
    slugs.sort();
    assert_eq!(slugs, vec!["a", "b", "c"]);
  }

  #[test]
  fn no_duplicates_even_with_repeated_pool_entries() {
    let mut pool = pool();
    pool.extend(pool.clone());
    let mut rng = StdRng::seed_from_u64(11);
    let out = select(&pool, &Preference::new(20, 20, 20), &mut rng);
    let unique: HashSet<&str> = out.iter().map(|r| r.title_slug.as_str()).collect();
    assert_eq!(unique.len(), out.len());
    assert_eq!(out.len(), 15);
  }

  #[test]
  fn same_seed_same_result() {
    let pool = pool();
    let pref = Preference::new(4, 2, 1);
    let a = select(&pool, &pref, &mut StdRng::seed_from_u64(42));
    let b = select(&pool, &pref, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
  }

  #[test]
  fn empty_inputs_yield_empty() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(select(&[], &Preference::new(5, 5, 5), &mut rng).is_empty());
    assert!(select(&pool(), &Preference::default(), &mut rng).is_empty());
  }
}
