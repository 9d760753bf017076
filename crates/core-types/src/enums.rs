use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way capital moved across the bridge, relative to the destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Inbound, Direction::Outbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("inbound") {
            Ok(Direction::Inbound)
        } else if trimmed.eq_ignore_ascii_case("outbound") {
            Ok(Direction::Outbound)
        } else {
            Err(CoreError::InvalidInput(
                "direction".to_string(),
                format!("expected 'inbound' or 'outbound', got '{}'", s),
            ))
        }
    }
}

/// A time partition of the ledger relative to the program window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    During,
    After,
}

impl Phase {
    /// All phases in chronological order.
    pub const ALL: [Phase; 3] = [Phase::Before, Phase::During, Phase::After];

    /// Human-readable label used by renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Before => "Before Program",
            Phase::During => "During Program",
            Phase::After => "After Program",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three sections a report is organized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportSection {
    Overview,
    UserBehavior,
    ProgramImpact,
}

impl ReportSection {
    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::Overview => "Overview",
            ReportSection::UserBehavior => "User Behavior",
            ReportSection::ProgramImpact => "Program Impact",
        }
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing_is_case_insensitive() {
        assert_eq!("inbound".parse::<Direction>().unwrap(), Direction::Inbound);
        assert_eq!(" OutBound ".parse::<Direction>().unwrap(), Direction::Outbound);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_phase_order_is_chronological() {
        let mut phases = vec![Phase::After, Phase::Before, Phase::During];
        phases.sort();
        assert_eq!(phases, Phase::ALL.to_vec());
    }
}
