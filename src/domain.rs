//! Domain models: problem records, difficulty tiers, per-user preference and
//! credential, and the solved/not-solved catalog snapshot.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Difficulty tier. Declaration order is the selection order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  /// Parse the provider's difficulty label ("Easy", "Medium", "Hard").
  pub fn from_label(label: &str) -> Option<Self> {
    match label {
      "Easy" => Some(Difficulty::Easy),
      "Medium" => Some(Difficulty::Medium),
      "Hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SolveStatus {
  Accepted,
  NotAccepted,
}

impl SolveStatus {
  /// The provider reports "ac" for accepted; "notac", null or anything else is not accepted.
  pub fn from_raw(raw: Option<&str>) -> Self {
    match raw {
      Some("ac") => SolveStatus::Accepted,
      _ => SolveStatus::NotAccepted,
    }
  }
}

/// One catalog entry at the time of the last refresh.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
  pub title: String,
  pub title_slug: String,
  pub difficulty: Difficulty,
  pub status: SolveStatus,
  pub is_paid_only: bool,
}

impl ProblemRecord {
  /// Canonical problem page, e.g. `https://leetcode.com/problems/two-sum/`.
  pub fn url(&self, problems_base: &str) -> String {
    format!("{}/{}/", problems_base.trim_end_matches('/'), self.title_slug)
  }
}

/// A count per difficulty tier. Serialized with the tier labels as keys.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TierCounts {
  #[serde(default)] pub easy: u32,
  #[serde(default)] pub medium: u32,
  #[serde(default)] pub hard: u32,
}

impl TierCounts {
  pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
    Self { easy, medium, hard }
  }

  pub fn get(&self, tier: Difficulty) -> u32 {
    match tier {
      Difficulty::Easy => self.easy,
      Difficulty::Medium => self.medium,
      Difficulty::Hard => self.hard,
    }
  }

  fn bump(&mut self, tier: Difficulty) {
    let slot = match tier {
      Difficulty::Easy => &mut self.easy,
      Difficulty::Medium => &mut self.medium,
      Difficulty::Hard => &mut self.hard,
    };
    *slot = slot.saturating_add(1);
  }

  pub fn total(&self) -> u64 {
    self.easy as u64 + self.medium as u64 + self.hard as u64
  }

  /// Tally records by difficulty.
  pub fn tally<'a, I>(records: I) -> Self
  where
    I: IntoIterator<Item = &'a ProblemRecord>,
  {
    let mut counts = TierCounts::default();
    for r in records {
      counts.bump(r.difficulty);
    }
    counts
  }
}

/// Desired number of problems per tier for one user.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
  pub count_by_difficulty: TierCounts,
}

impl Preference {
  pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
    Self { count_by_difficulty: TierCounts::new(easy, medium, hard) }
  }

  pub fn count(&self, tier: Difficulty) -> u32 {
    self.count_by_difficulty.get(tier)
  }
}

/// Opaque session token for the catalog provider. Never printed.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
  pub token: String,
}

impl Credential {
  pub fn new(token: impl Into<String>) -> Self {
    Self { token: token.into() }
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credential").field("token", &"<redacted>").finish()
  }
}

/// Stable caller identity. Every store is keyed by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
  /// Rejects empty or whitespace-only ids.
  pub fn parse(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// The result of one refresh, split into the two partitions.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  #[serde(default)] pub not_solved: Vec<ProblemRecord>,
  #[serde(default)] pub solved: Vec<ProblemRecord>,
}

impl Snapshot {
  /// Split a full fetch into partitions.
  ///
  /// Solved holds every accepted record (paid or not). Not-solved holds the
  /// free, not-accepted records whose slug is not already solved, so the two
  /// partitions never share a slug even when the provider repeats an entry.
  pub fn partition(records: Vec<ProblemRecord>) -> Self {
    let solved_slugs: HashSet<String> = records
      .iter()
      .filter(|r| r.status == SolveStatus::Accepted)
      .map(|r| r.title_slug.clone())
      .collect();

    let mut not_solved = Vec::new();
    let mut solved = Vec::new();
    for r in records {
      match r.status {
        SolveStatus::Accepted => solved.push(r),
        SolveStatus::NotAccepted if !r.is_paid_only && !solved_slugs.contains(&r.title_slug) => {
          not_solved.push(r)
        }
        SolveStatus::NotAccepted => {}
      }
    }
    Self { not_solved, solved }
  }
}

#[cfg(test)]
pub(crate) fn record(slug: &str, difficulty: Difficulty, status: SolveStatus, paid: bool) -> ProblemRecord {
  ProblemRecord {
    title: slug.to_uppercase(),
    title_slug: slug.to_string(),
    difficulty,
    status,
    is_paid_only: paid,
  }
}
