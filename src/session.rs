use crate::geometry::{self, PieceKind, Square};
use crate::round::{self, Round};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Session constants, fixed for the lifetime of one controller.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub piece: PieceKind,
    pub rounds: u32,
    pub trials_per_round: usize,
    pub countdown_secs: u32,
    pub response_window: Duration,
    pub round_delay: Duration,
    pub voice: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            piece: PieceKind::Knight,
            rounds: 3,
            trials_per_round: 8,
            countdown_secs: 3,
            response_window: Duration::from_millis(3000),
            round_delay: Duration::from_millis(1500),
            voice: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    ZeroRounds,
    ZeroTrials,
    RoundTooLong {
        trials: usize,
    },
    TooManyTargets {
        piece: PieceKind,
        needed: usize,
        available: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroRounds => write!(f, "a session needs at least one round"),
            ConfigError::ZeroTrials => write!(f, "a round needs at least one trial"),
            ConfigError::RoundTooLong { trials } => {
                write!(f, "{} trials per round exceed the 64 board squares", trials)
            }
            ConfigError::TooManyTargets {
                piece,
                needed,
                available,
            } => write!(
                f,
                "round length needs up to {} targets but a {} reaches at most {} squares",
                needed,
                piece.to_string().to_lowercase(),
                available
            ),
        }
    }
}

impl Error for ConfigError {}

impl SessionConfig {
    /// Reject configurations the round generator cannot satisfy, so
    /// generation never loops or fails mid-session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if self.trials_per_round == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.trials_per_round > 64 {
            return Err(ConfigError::RoundTooLong {
                trials: self.trials_per_round,
            });
        }
        let needed = round::max_target_count(self.trials_per_round);
        let available = geometry::max_reachable(self.piece);
        if needed > available {
            return Err(ConfigError::TooManyTargets {
                piece: self.piece,
                needed,
                available,
            });
        }
        Ok(())
    }
}

/// The aggregate mutable state of one running session. Owned exclusively by
/// the controller; the presentation layer sees it read-only via snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    /// 1-based number of the round in play; 0 before the first round.
    pub round_number: u32,
    pub trials_remaining: usize,
    pub current_square: Option<Square>,
    /// Correct classifications (hits + correct rejections) so far.
    pub score: u32,
    /// Incorrect classifications (false alarms + misses) so far.
    pub mistakes: u32,
    pub voice_enabled: bool,
    pub countdown: u32,
    pub rounds: BTreeMap<u32, Round>,
    /// Final accuracy percentage, computed once at session end.
    pub accuracy: Option<f64>,
}

impl SessionContext {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            round_number: 0,
            trials_remaining: 0,
            current_square: None,
            score: 0,
            mistakes: 0,
            voice_enabled: config.voice,
            countdown: config.countdown_secs,
            rounds: BTreeMap::new(),
            accuracy: None,
        }
    }

    /// Back to initial values for a fresh session. The voice flag is a user
    /// preference independent of round state and survives the reset.
    pub fn reset(&mut self, config: &SessionConfig) {
        let voice_enabled = self.voice_enabled;
        *self = Self::new(config);
        self.voice_enabled = voice_enabled;
    }
}
