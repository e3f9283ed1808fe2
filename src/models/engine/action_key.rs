//! Lane bitmask shared by the chart model, the input layer and the judge.
//!
//! Every judgement decision is expressed as set algebra over `ActionKey`
//! (intersection, difference, union), so the type stays a plain flag set.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// A set of lanes, in fixed order Left, Down, Up, Right.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionKey: u8 {
        const LEFT = 0b0001;
        const DOWN = 0b0010;
        const UP = 0b0100;
        const RIGHT = 0b1000;
    }
}

impl ActionKey {
    /// Number of lanes in the set.
    #[inline]
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Iterates the lanes contained in this set, in lane order.
    pub fn lanes(self) -> impl Iterator<Item = Lane> {
        Lane::ALL.into_iter().filter(move |lane| self.contains(lane.key()))
    }

    /// Builds a set from one chart row, keeping the lanes whose column holds `symbol`.
    ///
    /// The row must contain at least four characters; extra characters are ignored.
    pub fn from_row(row: &str, symbol: char) -> Self {
        row.chars()
            .zip(Lane::ALL)
            .filter(|(c, _)| *c == symbol)
            .fold(ActionKey::empty(), |acc, (_, lane)| acc | lane.key())
    }
}

impl fmt::Display for ActionKey {
    /// Renders the set as four columns, `L D U R` or `.` for absent lanes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lane in Lane::ALL {
            let c = if self.contains(lane.key()) {
                lane.symbol()
            } else {
                '.'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// One of the four input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lane {
    Left,
    Down,
    Up,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::Left, Lane::Down, Lane::Up, Lane::Right];

    /// Single-lane mask for this lane.
    pub const fn key(self) -> ActionKey {
        match self {
            Lane::Left => ActionKey::LEFT,
            Lane::Down => ActionKey::DOWN,
            Lane::Up => ActionKey::UP,
            Lane::Right => ActionKey::RIGHT,
        }
    }

    /// Column index of the lane in a chart row.
    pub const fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Down => 1,
            Lane::Up => 2,
            Lane::Right => 3,
        }
    }

    const fn symbol(self) -> char {
        match self {
            Lane::Left => 'L',
            Lane::Down => 'D',
            Lane::Up => 'U',
            Lane::Right => 'R',
        }
    }

    /// Parses a settings lane name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Lane::Left),
            "down" => Some(Lane::Down),
            "up" => Some(Lane::Up),
            "right" => Some(Lane::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_population_count() {
        assert_eq!((ActionKey::LEFT | ActionKey::RIGHT).count(), 2);
        assert_eq!(ActionKey::empty().count(), 0);
        assert_eq!(ActionKey::all().count(), 4);
    }

    #[test]
    fn from_row_reads_columns_in_lane_order() {
        assert_eq!(ActionKey::from_row("1001", '1'), ActionKey::LEFT | ActionKey::RIGHT);
        assert_eq!(ActionKey::from_row("0230", '2'), ActionKey::DOWN);
        assert_eq!(ActionKey::from_row("0230", '3'), ActionKey::UP);
        assert_eq!(ActionKey::from_row("MM00", '1'), ActionKey::empty());
    }

    #[test]
    fn set_algebra_is_order_independent() {
        let a = ActionKey::LEFT | ActionKey::UP;
        let b = ActionKey::UP | ActionKey::RIGHT;
        assert_eq!(a & !b, ActionKey::LEFT);
        assert_eq!((a | b) & !a, ActionKey::RIGHT);
        assert_eq!(a | a, a);
        assert_eq!(a | b, b | a);
    }

    #[test]
    fn lanes_iterates_in_order() {
        let lanes: Vec<Lane> = (ActionKey::RIGHT | ActionKey::DOWN).lanes().collect();
        assert_eq!(lanes, vec![Lane::Down, Lane::Right]);
    }

    #[test]
    fn display_shows_columns() {
        assert_eq!((ActionKey::LEFT | ActionKey::UP).to_string(), "L.U.");
    }
}
