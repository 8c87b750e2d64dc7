use core::fmt;

use serde::{Deserialize, Serialize};

use crate::shapes::{Shape, ShapeCounts};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EliminationResult {
    CircleEliminated,
    SquareEliminated,
    TriangleEliminated,
    NothingEliminated,
}

impl EliminationResult {
    pub fn eliminated(self) -> Option<Shape> {
        match self {
            Self::CircleEliminated => Some(Shape::Circle),
            Self::SquareEliminated => Some(Shape::Square),
            Self::TriangleEliminated => Some(Shape::Triangle),
            Self::NothingEliminated => None,
        }
    }

    /// The two shapes still in play, or `None` when nothing was eliminated.
    pub fn survivors(self) -> Option<[Shape; 2]> {
        match self {
            Self::CircleEliminated => Some([Shape::Square, Shape::Triangle]),
            Self::SquareEliminated => Some([Shape::Circle, Shape::Triangle]),
            Self::TriangleEliminated => Some([Shape::Circle, Shape::Square]),
            Self::NothingEliminated => None,
        }
    }

    /// Plays from `player` that carry over past this elimination.
    pub fn surviving_plays(self, player: &ShapeCounts) -> u64 {
        match self.survivors() {
            Some(survivors) => player.sum_of(survivors),
            None => player.total(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CircleEliminated => "CircleEliminated",
            Self::SquareEliminated => "SquareEliminated",
            Self::TriangleEliminated => "TriangleEliminated",
            Self::NothingEliminated => "NothingEliminated",
        }
    }
}

impl fmt::Display for EliminationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Majority shape is eliminated. On ties circles go before squares, and
/// triangles go whenever they tie the leader.
pub fn eliminate(counts: &ShapeCounts) -> EliminationResult {
    let ShapeCounts {
        circles,
        squares,
        triangles,
    } = *counts;

    if circles > squares {
        if circles >= triangles {
            EliminationResult::CircleEliminated
        } else {
            EliminationResult::TriangleEliminated
        }
    } else if circles == squares {
        if circles < triangles {
            EliminationResult::TriangleEliminated
        } else if circles == triangles {
            EliminationResult::NothingEliminated
        } else {
            EliminationResult::CircleEliminated
        }
    } else if squares >= triangles {
        EliminationResult::SquareEliminated
    } else {
        EliminationResult::TriangleEliminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elim(circles: u64, squares: u64, triangles: u64) -> EliminationResult {
        eliminate(&ShapeCounts::new(circles, squares, triangles))
    }

    #[test]
    fn tie_breaks() {
        assert_eq!(elim(5, 5, 3), EliminationResult::CircleEliminated);
        assert_eq!(elim(3, 3, 5), EliminationResult::TriangleEliminated);
        assert_eq!(elim(5, 5, 5), EliminationResult::NothingEliminated);
        assert_eq!(elim(4, 2, 4), EliminationResult::CircleEliminated);
        assert_eq!(elim(2, 4, 4), EliminationResult::SquareEliminated);
        assert_eq!(elim(0, 0, 0), EliminationResult::NothingEliminated);
    }

    #[test]
    fn strict_majority_is_eliminated() {
        assert_eq!(elim(7, 1, 2), EliminationResult::CircleEliminated);
        assert_eq!(elim(1, 7, 2), EliminationResult::SquareEliminated);
        assert_eq!(elim(1, 2, 7), EliminationResult::TriangleEliminated);
        assert_eq!(elim(3, 1, 4), EliminationResult::TriangleEliminated);
        assert_eq!(elim(1, 3, 4), EliminationResult::TriangleEliminated);
    }

    #[test]
    fn nothing_eliminated_iff_all_equal() {
        for circles in 0..6 {
            for squares in 0..6 {
                for triangles in 0..6 {
                    let result = elim(circles, squares, triangles);
                    let all_equal = circles == squares && squares == triangles;
                    assert_eq!(
                        result == EliminationResult::NothingEliminated,
                        all_equal,
                        "({circles},{squares},{triangles}) -> {result}"
                    );
                    if let Some(shape) = result.eliminated() {
                        let counts = ShapeCounts::new(circles, squares, triangles);
                        let eliminated = counts.get(shape);
                        assert!(Shape::ALL.iter().all(|s| counts.get(*s) <= eliminated));
                    }
                }
            }
        }
    }

    #[test]
    fn surviving_plays_skip_eliminated_shape() {
        let player = ShapeCounts::new(3, 2, 1);
        assert_eq!(EliminationResult::CircleEliminated.surviving_plays(&player), 3);
        assert_eq!(EliminationResult::SquareEliminated.surviving_plays(&player), 4);
        assert_eq!(EliminationResult::TriangleEliminated.surviving_plays(&player), 5);
        assert_eq!(EliminationResult::NothingEliminated.surviving_plays(&player), 6);
    }
}
