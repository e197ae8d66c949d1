//! Face Directions
//!
//! The six axis-aligned directions a block face can point in, plus a small
//! fixed-size map keyed by direction.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// A world/local coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index usable with `Vec3` indexing.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// The axis along which `n` has its largest-magnitude component.
    ///
    /// Ties resolve X first, then Z, then Y.
    pub fn dominant(n: Vec3) -> Axis {
        let a = n.abs();
        if a.x >= a.y && a.x >= a.z {
            Axis::X
        } else if a.z >= a.x && a.z >= a.y {
            Axis::Z
        } else {
            Axis::Y
        }
    }

    /// The two tangential axes used when sliding across a face with this normal.
    pub fn tangents(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// One of the six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

const_assert_eq!(Direction::ALL.len(), 6);

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 6] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Front,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Top | Direction::Bottom => Axis::Y,
            Direction::Front | Direction::Back => Axis::Z,
            Direction::Left | Direction::Right => Axis::X,
        }
    }

    /// True for the face lying on the maximum side of its axis.
    pub fn is_max(self) -> bool {
        matches!(self, Direction::Top | Direction::Front | Direction::Right)
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        let sign = if self.is_max() { 1.0 } else { -1.0 };
        self.axis().unit() * sign
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Front => "front",
            Direction::Back => "back",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parse a direction label, case-insensitively.
    pub fn parse(label: &str) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(label.trim()))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fixed-size map with one slot per [`Direction`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectionMap<T> {
    slots: [T; 6],
}

impl<T> DirectionMap<T> {
    /// Build a map by evaluating `f` for every direction in canonical order.
    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        Self {
            slots: Direction::ALL.map(&mut f),
        }
    }

    pub fn get(&self, dir: Direction) -> &T {
        &self.slots[dir.index()]
    }

    pub fn get_mut(&mut self, dir: Direction) -> &mut T {
        &mut self.slots[dir.index()]
    }

    pub fn set(&mut self, dir: Direction, value: T) -> T {
        std::mem::replace(&mut self.slots[dir.index()], value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &T)> {
        Direction::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Direction, &mut T)> {
        Direction::ALL.into_iter().zip(self.slots.iter_mut())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Direction, &T) -> U) -> DirectionMap<U> {
        DirectionMap::from_fn(|d| f(d, self.get(d)))
    }
}

impl<T> std::ops::Index<Direction> for DirectionMap<T> {
    type Output = T;
    fn index(&self, dir: Direction) -> &T {
        self.get(dir)
    }
}

impl<T> std::ops::IndexMut<Direction> for DirectionMap<T> {
    fn index_mut(&mut self, dir: Direction) -> &mut T {
        self.get_mut(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_and_side() {
        assert_eq!(Direction::Top.axis(), Axis::Y);
        assert!(Direction::Top.is_max());
        assert!(!Direction::Left.is_max());
        assert_eq!(Direction::Right.normal(), Vec3::X);
        assert_eq!(Direction::Back.normal(), Vec3::NEG_Z);
    }

    #[test]
    fn test_dominant_axis_ties() {
        assert_eq!(Axis::dominant(Vec3::new(1.0, 1.0, 1.0)), Axis::X);
        assert_eq!(Axis::dominant(Vec3::new(0.0, 0.5, 0.5)), Axis::Z);
        assert_eq!(Axis::dominant(Vec3::new(0.1, -0.9, 0.2)), Axis::Y);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(Direction::parse("TOP"), Some(Direction::Top));
        assert_eq!(Direction::parse(" left "), Some(Direction::Left));
        assert_eq!(Direction::parse("up"), None);
    }

    #[test]
    fn test_direction_map_roundtrip() {
        let mut map = DirectionMap::from_fn(|d| d.index());
        assert_eq!(map[Direction::Front], 2);
        map[Direction::Front] = 42;
        assert_eq!(map.set(Direction::Front, 7), 42);
        let names: Vec<_> = map.iter().map(|(d, _)| d.name()).collect();
        assert_eq!(names, ["top", "bottom", "front", "back", "left", "right"]);
    }
}
