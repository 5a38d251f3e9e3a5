//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and clients independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, Preference, ProblemRecord, TierCounts};
use crate::orchestrator::RefreshCounts;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Chat { text: String },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Reply { text: String },
    Error { message: String },
}

/// DTO used for problem delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOut {
    pub title: String,
    pub title_slug: String,
    pub difficulty: Difficulty,
    pub url: String,
}

/// Convert a `ProblemRecord` (internal) to the public DTO.
pub fn to_out(p: &ProblemRecord, problems_url: &str) -> ProblemOut {
    ProblemOut {
        title: p.title.clone(),
        title_slug: p.title_slug.clone(),
        difficulty: p.difficulty,
        url: p.url(problems_url),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Serialize)]
pub struct TodayOut {
    pub problems: Vec<ProblemOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOut {
    pub not_solved_count: usize,
    pub solved_count: usize,
}

impl From<RefreshCounts> for RefreshOut {
    fn from(c: RefreshCounts) -> Self {
        Self { not_solved_count: c.not_solved, solved_count: c.solved }
    }
}

#[derive(Debug, Deserialize)]
pub struct PreferenceIn {
    #[serde(default)]
    pub easy: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub hard: u32,
}

impl From<PreferenceIn> for Preference {
    fn from(p: PreferenceIn) -> Self {
        Preference::new(p.easy, p.medium, p.hard)
    }
}

#[derive(Deserialize)]
pub struct CredentialIn {
    pub token: String,
}

/// Solved tally, keyed by tier label.
pub type SolvedOut = TierCounts;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub user: String,
}

#[derive(Serialize)]
pub struct AckOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
