use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }

    /// Per-candle drift applied to the series while a signal is live.
    /// Small enough to stay inside normal noise.
    pub fn bias_factor(bias: Option<Direction>) -> f64 {
        match bias {
            Some(Direction::Up) => 0.00003,
            Some(Direction::Down) => -0.00003,
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pending,
    Win,
    Loss,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pending => write!(f, "pending"),
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
        }
    }
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Win | Outcome::Loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_factor_signs() {
        assert!(Direction::bias_factor(Some(Direction::Up)) > 0.0);
        assert!(Direction::bias_factor(Some(Direction::Down)) < 0.0);
        assert_eq!(Direction::bias_factor(None), 0.0);
    }

    #[test]
    fn outcome_terminality() {
        assert!(!Outcome::Pending.is_terminal());
        assert!(Outcome::Win.is_terminal());
        assert!(Outcome::Loss.is_terminal());
    }

    #[test]
    fn direction_serde_uppercase() {
        let json = serde_json::to_string(&Direction::Up).unwrap();
        assert_eq!(json, "\"UP\"");
        let back: Direction = serde_json::from_str("\"DOWN\"").unwrap();
        assert_eq!(back, Direction::Down);
    }
}
