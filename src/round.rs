use crate::geometry::{self, PieceKind, Square};
use crate::trial::Trial;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;

/// Candidate target ratios; one is drawn per round with equal probability.
pub const TARGET_FRACTIONS: [f64; 2] = [0.4, 0.6];

/// Largest target count a round of `length` trials can ask for.
pub fn max_target_count(length: usize) -> usize {
    let max_fraction = TARGET_FRACTIONS.iter().copied().fold(0.0, f64::max);
    (length as f64 * max_fraction).floor() as usize
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// The drawn target count exceeds the reachable set of the origin.
    NotEnoughTargets {
        piece: PieceKind,
        origin: Square,
        requested: usize,
        available: usize,
    },
    /// More stimuli requested than there are board squares.
    BoardExhausted { length: usize },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::NotEnoughTargets {
                piece,
                origin,
                requested,
                available,
            } => write!(
                f,
                "{} targets requested but a {} on {} reaches only {} squares",
                requested,
                piece.to_string().to_lowercase(),
                origin,
                available
            ),
            GenerateError::BoardExhausted { length } => {
                write!(f, "round length {} exceeds the 64 board squares", length)
            }
        }
    }
}

impl Error for GenerateError {}

/// Generate one round's stimulus sequence: a shuffled, duplicate-free mix of
/// targets (drawn from the reachable set) and distractors (drawn from the
/// whole board). Distractors that happen to be reachable are accepted.
pub fn generate_sequence<R: Rng>(
    piece: PieceKind,
    origin: Square,
    length: usize,
    rng: &mut R,
) -> Result<Vec<Square>, GenerateError> {
    if length > 64 {
        return Err(GenerateError::BoardExhausted { length });
    }

    let reachable = geometry::reachable_squares(piece, origin);
    let fraction = TARGET_FRACTIONS[rng.gen_range(0..TARGET_FRACTIONS.len())];
    let target_count = (length as f64 * fraction).floor() as usize;
    if target_count > reachable.len() {
        return Err(GenerateError::NotEnoughTargets {
            piece,
            origin,
            requested: target_count,
            available: reachable.len(),
        });
    }

    let mut chosen: HashSet<Square> = HashSet::with_capacity(length);
    let mut sequence: Vec<Square> = Vec::with_capacity(length);

    // Targets: uniform draws from the reachable set, re-drawing duplicates.
    // Terminates because target_count <= reachable.len().
    while sequence.len() < target_count {
        let square = reachable[rng.gen_range(0..reachable.len())];
        if chosen.insert(square) {
            sequence.push(square);
        }
    }

    // Distractors: uniform draws from the whole board, skipping collisions.
    while sequence.len() < length {
        if let Some(square) = Square::from_index(rng.gen_range(0..64)) {
            if chosen.insert(square) {
                sequence.push(square);
            }
        }
    }

    sequence.shuffle(rng);
    Ok(sequence)
}

/// Pick a round origin uniformly at random, re-drawing until its reachable
/// set can supply the worst-case target count for `length` trials. Callers
/// must have validated that such an origin exists for the piece.
pub fn choose_origin<R: Rng>(piece: PieceKind, length: usize, rng: &mut R) -> Square {
    let needed = max_target_count(length);
    loop {
        if let Some(square) = Square::from_index(rng.gen_range(0..64)) {
            if geometry::reachable_squares(piece, square).len() >= needed {
                return square;
            }
        }
    }
}

/// One timed round: the generated stimulus sequence and the trial records
/// appended as each presentation is classified. Origin, piece and sequence
/// never change after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub origin: Square,
    pub piece: PieceKind,
    pub sequence: Vec<Square>,
    pub trials: Vec<Trial>,
}

impl Round {
    pub fn new<R: Rng>(
        piece: PieceKind,
        origin: Square,
        length: usize,
        rng: &mut R,
    ) -> Result<Self, GenerateError> {
        let sequence = generate_sequence(piece, origin, length, rng)?;
        Ok(Self {
            origin,
            piece,
            sequence,
            trials: Vec::with_capacity(length),
        })
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Target/distractor identity of a stimulus, recomputed from geometry
    /// rather than carried from generator bookkeeping.
    pub fn is_target(&self, square: Square) -> bool {
        geometry::is_reachable(self.piece, self.origin, square)
    }
}
