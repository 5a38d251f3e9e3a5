//! Chat adapter: slash commands, the multi-step settings dialog, and reply text.
//!
//! `Conversation` is a small state machine owned by one chat session. It only
//! parses input; the orchestrator is invoked by the caller on the `Action`s it
//! emits, so the core never sees partial dialog state.

use tracing::{debug, instrument};

use crate::domain::{Difficulty, Preference, ProblemRecord, TierCounts, UserId};
use crate::error::ServiceError;
use crate::orchestrator::{Orchestrator, RefreshCounts};

pub const HELP_TEXT: &str = "Available commands:\n\
/start - start talking to the bot\n\
/today - get today's problems\n\
/refresh - reload the catalog of unsolved problems\n\
/set - configure how many problems per difficulty\n\
/token - set the LeetCode session cookie\n\
/solved - show solved counts per difficulty\n\
/cancel - abort the current dialog\n\
/help - show this message";

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum DialogState {
  #[default]
  Idle,
  AwaitingEasyCount,
  AwaitingMediumCount { easy: u32 },
  AwaitingHardCount { easy: u32, medium: u32 },
  AwaitingCredential,
}

/// What the session should do with one incoming message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
  Reply(String),
  Today,
  Refresh,
  Solved,
  SavePreference(Preference),
  SaveCredential(String),
}

#[derive(Debug, Default)]
pub struct Conversation {
  state: DialogState,
}

impl Conversation {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &DialogState {
    &self.state
  }

  /// Advance the dialog with one message.
  ///
  /// Slash commands always win over a pending dialog step, so a user stuck in
  /// the middle of `/set` can still run `/today`.
  #[instrument(level = "debug", skip(self, text), fields(state = ?self.state))]
  pub fn handle(&mut self, text: &str) -> Action {
    let text = text.trim();
    if text.starts_with('/') {
      return self.command(text);
    }

    match self.state.clone() {
      DialogState::Idle => Action::Reply("Use /today, /refresh, /set or /solved. /help lists everything.".into()),
      DialogState::AwaitingEasyCount => match parse_count(text) {
        Some(easy) => {
          self.state = DialogState::AwaitingMediumCount { easy };
          Action::Reply(prompt_for(Difficulty::Medium))
        }
        None => Action::Reply("Please enter a number.".into()),
      },
      DialogState::AwaitingMediumCount { easy } => match parse_count(text) {
        Some(medium) => {
          self.state = DialogState::AwaitingHardCount { easy, medium };
          Action::Reply(prompt_for(Difficulty::Hard))
        }
        None => Action::Reply("Please enter a number.".into()),
      },
      DialogState::AwaitingHardCount { easy, medium } => match parse_count(text) {
        Some(hard) => {
          self.state = DialogState::Idle;
          Action::SavePreference(Preference::new(easy, medium, hard))
        }
        None => Action::Reply("Please enter a number.".into()),
      },
      DialogState::AwaitingCredential => {
        if text.is_empty() {
          return Action::Reply("The session cookie cannot be empty.".into());
        }
        self.state = DialogState::Idle;
        Action::SaveCredential(text.to_string())
      }
    }
  }

  fn command(&mut self, text: &str) -> Action {
    // "/today@botname extra" -> "/today"
    let name = text.split_whitespace().next().unwrap_or("").split('@').next().unwrap_or("");
    debug!(target: "chat", command = %name, "Command received");
    match name {
      "/start" => {
        self.state = DialogState::Idle;
        Action::Reply("Welcome! Use /today, /refresh, /set or /solved.".into())
      }
      "/help" => Action::Reply(HELP_TEXT.into()),
      "/today" => {
        self.state = DialogState::Idle;
        Action::Today
      }
      "/refresh" => {
        self.state = DialogState::Idle;
        Action::Refresh
      }
      "/solved" => {
        self.state = DialogState::Idle;
        Action::Solved
      }
      "/set" => {
        self.state = DialogState::AwaitingEasyCount;
        Action::Reply(prompt_for(Difficulty::Easy))
      }
      "/token" => {
        self.state = DialogState::AwaitingCredential;
        Action::Reply("Send your LEETCODE_SESSION cookie value.".into())
      }
      "/cancel" => {
        self.state = DialogState::Idle;
        Action::Reply("Cancelled.".into())
      }
      _ => Action::Reply(format!("Unknown command {name}. /help lists what I understand.")),
    }
  }
}

fn parse_count(text: &str) -> Option<u32> {
  text.parse::<u32>().ok()
}

fn prompt_for(tier: Difficulty) -> String {
  format!("How many {tier} problems do you want to solve?")
}

/// Run an action against the orchestrator and render the reply text.
#[instrument(level = "info", skip(orch, action, problems_url), fields(%user))]
pub async fn perform(orch: &Orchestrator, user: &UserId, action: Action, problems_url: &str) -> String {
  match action {
    Action::Reply(text) => text,
    Action::Today => match orch.today_selection(user).await {
      Ok(picks) => format_problems(&picks, problems_url),
      Err(e) => format_error(&e),
    },
    Action::Refresh => match orch.refresh_catalog(user).await {
      Ok(counts) => format_refresh(counts),
      Err(e) => format_error(&e),
    },
    Action::Solved => format_solved(orch.solved_counts(user).await),
    Action::SavePreference(pref) => match orch.set_preference(user, pref).await {
      Ok(()) => format!(
        "Settings saved: Easy {}, Medium {}, Hard {}.",
        pref.count(Difficulty::Easy),
        pref.count(Difficulty::Medium),
        pref.count(Difficulty::Hard)
      ),
      Err(e) => format_error(&e),
    },
    Action::SaveCredential(token) => match orch.set_credential(user, &token).await {
      Ok(()) => "Session cookie saved. Run /refresh to load your problems.".into(),
      Err(e) => format_error(&e),
    },
  }
}

pub fn format_problems(problems: &[ProblemRecord], problems_url: &str) -> String {
  if problems.is_empty() {
    return "No matching problems.".into();
  }
  problems
    .iter()
    .map(|p| format!("{} ({})\n{}", p.title, p.difficulty, p.url(problems_url)))
    .collect::<Vec<_>>()
    .join("\n\n")
}

pub fn format_refresh(counts: RefreshCounts) -> String {
  format!("Updated. Got {} unsolved and {} solved problems.", counts.not_solved, counts.solved)
}

pub fn format_solved(counts: TierCounts) -> String {
  format!("Solved problems:\nEasy: {}\nMedium: {}\nHard: {}", counts.easy, counts.medium, counts.hard)
}

pub fn format_error(e: &ServiceError) -> String {
  match e {
    ServiceError::ConfigurationMissing => "No settings yet. Use /set to choose how many problems per difficulty.".into(),
    ServiceError::CredentialMissing => "No session cookie yet. Use /token to provide one.".into(),
    ServiceError::BlankCredential => "The session cookie cannot be empty.".into(),
    ServiceError::FetchFailed(_) => "Could not refresh problems. Check the session cookie or try again later.".into(),
    other => format!("Something went wrong: {other}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{record, Difficulty::*, SolveStatus::*};
  use crate::orchestrator::tests::{catalog, orchestrator, StaticFetcher};

  #[test]
  fn set_dialog_walks_all_tiers() {
    let mut c = Conversation::new();
    assert!(matches!(c.handle("/set"), Action::Reply(_)));
    assert_eq!(c.state(), &DialogState::AwaitingEasyCount);
    c.handle("2");
    assert_eq!(c.state(), &DialogState::AwaitingMediumCount { easy: 2 });
    c.handle("1");
    assert_eq!(c.state(), &DialogState::AwaitingHardCount { easy: 2, medium: 1 });
    assert_eq!(c.handle(" 0 "), Action::SavePreference(Preference::new(2, 1, 0)));
    assert_eq!(c.state(), &DialogState::Idle);
  }

  #[test]
  fn non_numeric_reprompts_without_advancing() {
    let mut c = Conversation::new();
    c.handle("/set");
    assert_eq!(c.handle("lots"), Action::Reply("Please enter a number.".into()));
    assert_eq!(c.handle("-1"), Action::Reply("Please enter a number.".into()));
    assert_eq!(c.state(), &DialogState::AwaitingEasyCount);
  }

  #[test]
  fn commands_interrupt_dialog() {
    let mut c = Conversation::new();
    c.handle("/set");
    assert_eq!(c.handle("/today@leetdaily_bot"), Action::Today);
    assert_eq!(c.state(), &DialogState::Idle);
  }

  #[test]
  fn token_dialog() {
    let mut c = Conversation::new();
    c.handle("/token");
    assert_eq!(c.state(), &DialogState::AwaitingCredential);
    assert_eq!(c.handle("abc123"), Action::SaveCredential("abc123".into()));
    assert_eq!(c.state(), &DialogState::Idle);
  }

  #[test]
  fn formats_problem_list() {
    let text = format_problems(&[record("two-sum", Easy, NotAccepted, false)], "https://leetcode.com/problems");
    assert_eq!(text, "TWO-SUM (Easy)\nhttps://leetcode.com/problems/two-sum/");
    assert_eq!(format_problems(&[], "x"), "No matching problems.");
  }

  #[tokio::test]
  async fn full_chat_session() {
    let orch = orchestrator(StaticFetcher::ok(catalog()));
    let user = UserId::parse("chat-user").unwrap();
    let base = "https://leetcode.com/problems";
    let mut c = Conversation::new();

    let reply = perform(&orch, &user, c.handle("/today"), base).await;
    assert!(reply.contains("/set"));

    let reply = perform(&orch, &user, c.handle("/refresh"), base).await;
    assert!(reply.contains("/token"));

    c.handle("/token");
    perform(&orch, &user, c.handle("cookie"), base).await;
    let reply = perform(&orch, &user, c.handle("/refresh"), base).await;
    assert_eq!(reply, "Updated. Got 3 unsolved and 2 solved problems.");

    c.handle("/set");
    c.handle("0");
    c.handle("1");
    let reply = perform(&orch, &user, c.handle("5"), base).await;
    assert_eq!(reply, "Settings saved: Easy 0, Medium 1, Hard 5.");

    let reply = perform(&orch, &user, c.handle("/today"), base).await;
    assert_eq!(reply, "M1 (Medium)\nhttps://leetcode.com/problems/m1/");

    let reply = perform(&orch, &user, c.handle("/solved"), base).await;
    assert_eq!(reply, "Solved problems:\nEasy: 1\nMedium: 0\nHard: 1");
  }
}
