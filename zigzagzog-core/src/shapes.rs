use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Circle, Shape::Square, Shape::Triangle];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-shape tally for one round, either global or for a single player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCounts {
    pub circles: u64,
    pub squares: u64,
    pub triangles: u64,
}

impl ShapeCounts {
    pub const fn new(circles: u64, squares: u64, triangles: u64) -> Self {
        Self {
            circles,
            squares,
            triangles,
        }
    }

    pub fn get(&self, shape: Shape) -> u64 {
        match shape {
            Shape::Circle => self.circles,
            Shape::Square => self.squares,
            Shape::Triangle => self.triangles,
        }
    }

    pub fn total(&self) -> u64 {
        self.circles
            .saturating_add(self.squares)
            .saturating_add(self.triangles)
    }

    pub fn sum_of(&self, shapes: [Shape; 2]) -> u64 {
        self.get(shapes[0]).saturating_add(self.get(shapes[1]))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for ShapeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "circles={} squares={} triangles={}",
            self.circles, self.squares, self.triangles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_sum_follow_shape() {
        let counts = ShapeCounts::new(1, 2, 4);
        assert_eq!(counts.get(Shape::Circle), 1);
        assert_eq!(counts.get(Shape::Square), 2);
        assert_eq!(counts.get(Shape::Triangle), 4);
        assert_eq!(counts.sum_of([Shape::Square, Shape::Triangle]), 6);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn total_saturates() {
        let counts = ShapeCounts::new(u64::MAX, 1, 1);
        assert_eq!(counts.total(), u64::MAX);
    }
}
