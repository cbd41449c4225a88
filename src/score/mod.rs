//! Competition scoring
//!
//! Track-specific scores computed from a classified run and the task's
//! best-known bounds:
//!
//! | Track | Field | Formula |
//! |-------|-------|---------|
//! | OPT | `is_optimal` | `lower <= cost <= upper` |
//! | SAT | `quality_score` | `upper / cost` |
//! | AGL | `agile_score` | `1 - ln(t) / ln(limit)` |
//!
//! Scores are never stored as ground truth; they are recomputed from the
//! measurement every time a report is generated.

mod engine;

pub use engine::ScoreEngine;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Competition track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Optimal track: the plan must have optimal cost
    Opt,
    /// Satisficing track: plan quality relative to the best known plan
    Sat,
    /// Agile track: time to the first plan
    Agl,
}

impl Track {
    /// All tracks in report order.
    pub const ALL: [Self; 3] = [Self::Opt, Self::Sat, Self::Agl];

    /// Short identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Opt => "opt",
            Self::Sat => "sat",
            Self::Agl => "agl",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opt" | "optimal" => Ok(Self::Opt),
            "sat" | "satisficing" | "quality" => Ok(Self::Sat),
            "agl" | "agile" => Ok(Self::Agl),
            _ => Err(Error::UnknownTrack(s.to_string())),
        }
    }
}

/// Optimal-track result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalScore {
    /// `1` for a plan within the known optimal bounds, else `0`
    pub score: f64,
    /// `None` when the run had no plan and optimality was not evaluated
    pub is_optimal: Option<bool>,
    /// Set when a plan was found but its cost lies outside the bounds
    pub has_suboptimal_plan: Option<bool>,
}

impl OptimalScore {
    /// Score of a run without a plan.
    #[must_use]
    pub const fn unsolved() -> Self {
        Self {
            score: 0.0,
            is_optimal: None,
            has_suboptimal_plan: None,
        }
    }
}

/// Scores of one run. A field is `None` when its track was not active,
/// which is distinct from a computed `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// OPT track result
    pub optimal: Option<OptimalScore>,
    /// SAT track result
    pub quality_score: Option<f64>,
    /// AGL track result
    pub agile_score: Option<f64>,
}

impl Score {
    /// Numeric score for one track, if it was computed.
    #[must_use]
    pub fn for_track(&self, track: Track) -> Option<f64> {
        match track {
            Track::Opt => self.optimal.map(|o| o.score),
            Track::Sat => self.quality_score,
            Track::Agl => self.agile_score,
        }
    }

    /// Tracks that were computed.
    #[must_use]
    pub fn tracks(&self) -> Vec<Track> {
        Track::ALL
            .into_iter()
            .filter(|t| self.for_track(*t).is_some())
            .collect()
    }
}
