use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub const BOARD_FILES: u8 = 8;
pub const BOARD_RANKS: u8 = 8;

/// One of the 64 board squares, file and rank both 0-based internally.
/// Formats and parses as algebraic notation ("e4").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SquareColor {
    Light,
    Dark,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_FILES && rank < BOARD_RANKS {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// Square for a 0-63 board index (rank-major, a1 = 0, h8 = 63).
    pub fn from_index(index: u8) -> Option<Self> {
        if index < BOARD_FILES * BOARD_RANKS {
            Some(Self {
                file: index % BOARD_FILES,
                rank: index / BOARD_FILES,
            })
        } else {
            None
        }
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn index(&self) -> u8 {
        self.rank * BOARD_FILES + self.file
    }

    /// Color from file+rank parity; a1 is dark.
    pub fn color(&self) -> SquareColor {
        if (self.file + self.rank) % 2 == 0 {
            SquareColor::Dark
        } else {
            SquareColor::Light
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_FILES * BOARD_RANKS).filter_map(Square::from_index)
    }

    fn offset(&self, d_file: i8, d_rank: i8) -> Option<Self> {
        let file = self.file as i8 + d_file;
        let rank = self.rank as i8 + d_rank;
        if (0..BOARD_FILES as i8).contains(&file) && (0..BOARD_RANKS as i8).contains(&rank) {
            Some(Self {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseSquareError(String);

impl fmt::Display for ParseSquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a board square: {:?}", self.0)
    }
}

impl Error for ParseSquareError {}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseSquareError(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| ParseSquareError(s.to_string()))
    }
}

/// Reference piece the reachability drill is keyed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PieceKind {
    Knight,
    Bishop,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Every square the piece can reach from `origin`, in no significant order,
/// without duplicates. Knight uses the fixed offset set; bishop slides along
/// each diagonal until leaving the board.
pub fn reachable_squares(piece: PieceKind, origin: Square) -> Vec<Square> {
    match piece {
        PieceKind::Knight => KNIGHT_OFFSETS
            .iter()
            .filter_map(|&(df, dr)| origin.offset(df, dr))
            .collect(),
        PieceKind::Bishop => {
            let mut squares = Vec::new();
            for &(df, dr) in &BISHOP_DIRECTIONS {
                let mut current = origin;
                while let Some(next) = current.offset(df, dr) {
                    squares.push(next);
                    current = next;
                }
            }
            squares
        }
    }
}

pub fn is_reachable(piece: PieceKind, origin: Square, target: Square) -> bool {
    reachable_squares(piece, origin).contains(&target)
}

/// Largest reachable-set size the piece attains anywhere on the board.
/// Bounds how many targets a round can ever ask for.
pub fn max_reachable(piece: PieceKind) -> usize {
    Square::all()
        .map(|sq| reachable_squares(piece, sq).len())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn sorted(mut squares: Vec<Square>) -> Vec<Square> {
        squares.sort();
        squares
    }

    #[test]
    fn test_square_new_bounds() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
    }

    #[test]
    fn test_square_index_roundtrip() {
        for index in 0..64 {
            let square = Square::from_index(index).unwrap();
            assert_eq!(square.index(), index);
        }
        assert!(Square::from_index(64).is_none());
    }

    #[test]
    fn test_algebraic_display() {
        assert_eq!(sq("a1").to_string(), "a1");
        assert_eq!(sq("h8").to_string(), "h8");
        assert_eq!(sq("e4").to_string(), "e4");
    }

    #[test]
    fn test_algebraic_parse_rejects_garbage() {
        assert!("".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("A1".parse::<Square>().is_err());
    }

    #[test]
    fn test_color_parity() {
        assert_eq!(sq("a1").color(), SquareColor::Dark);
        assert_eq!(sq("h1").color(), SquareColor::Light);
        assert_eq!(sq("a8").color(), SquareColor::Light);
        assert_eq!(sq("h8").color(), SquareColor::Dark);
        assert_eq!(sq("e4").color(), SquareColor::Light);
        assert_eq!(sq("d4").color(), SquareColor::Dark);
    }

    #[test]
    fn test_color_is_stable() {
        for square in Square::all() {
            assert_eq!(square.color(), square.color());
        }
    }

    #[test]
    fn test_adjacent_squares_alternate_color() {
        for square in Square::all() {
            if let Some(right) = square.offset(1, 0) {
                assert_ne!(square.color(), right.color());
            }
            if let Some(up) = square.offset(0, 1) {
                assert_ne!(square.color(), up.color());
            }
        }
    }

    #[test]
    fn test_knight_from_d4() {
        let expected = ["b3", "b5", "c2", "c6", "e2", "e6", "f3", "f5"]
            .iter()
            .map(|s| sq(s))
            .sorted()
            .collect::<Vec<_>>();
        assert_eq!(
            sorted(reachable_squares(PieceKind::Knight, sq("d4"))),
            expected
        );
    }

    #[test]
    fn test_knight_from_corner() {
        let expected = ["b3", "c2"].iter().map(|s| sq(s)).sorted().collect::<Vec<_>>();
        assert_eq!(
            sorted(reachable_squares(PieceKind::Knight, sq("a1"))),
            expected
        );
    }

    #[test]
    fn test_bishop_from_a1_is_one_diagonal() {
        let expected = ["b2", "c3", "d4", "e5", "f6", "g7", "h8"]
            .iter()
            .map(|s| sq(s))
            .sorted()
            .collect::<Vec<_>>();
        assert_eq!(
            sorted(reachable_squares(PieceKind::Bishop, sq("a1"))),
            expected
        );
    }

    #[test]
    fn test_bishop_slides_past_adjacent_squares() {
        let reachable = reachable_squares(PieceKind::Bishop, sq("d4"));
        assert!(reachable.contains(&sq("a7")));
        assert!(reachable.contains(&sq("h8")));
        assert!(reachable.contains(&sq("a1")));
        assert!(reachable.contains(&sq("g1")));
        assert_eq!(reachable.len(), 13);
    }

    #[test]
    fn test_reachable_sets_have_no_duplicates() {
        for piece in [PieceKind::Knight, PieceKind::Bishop] {
            for origin in Square::all() {
                let reachable = reachable_squares(piece, origin);
                assert_eq!(reachable.iter().unique().count(), reachable.len());
            }
        }
    }

    #[test]
    fn test_is_reachable_matches_reachable_squares() {
        for piece in [PieceKind::Knight, PieceKind::Bishop] {
            for origin in [sq("a1"), sq("d4"), sq("h8"), sq("b7")] {
                let reachable = reachable_squares(piece, origin);
                for target in Square::all() {
                    assert_eq!(
                        is_reachable(piece, origin, target),
                        reachable.contains(&target)
                    );
                }
            }
        }
    }

    #[test]
    fn test_max_reachable() {
        assert_eq!(max_reachable(PieceKind::Knight), 8);
        assert_eq!(max_reachable(PieceKind::Bishop), 13);
    }
}
