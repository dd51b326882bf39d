//! Placement context handed to the host for directional placement.

use serde::{Deserialize, Serialize};

use crate::grid::{Axis, CellPos, Direction};

/// Describes a directional placement into one cell.
///
/// The clicked cell is always the target cell itself; the host must not try
/// to replace the cell that was "clicked through", which can recurse
/// indefinitely on some replaceable materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementContext {
    /// Cell being placed into.
    pub clicked_cell: CellPos,
    /// Face that was hit (the mounting side).
    pub hit_face: Direction,
    /// Direction the placer looks (opposite the mounting side).
    pub look_direction: Direction,
    /// Facing candidates in preference order.
    pub looking_directions: [Direction; 6],
    /// Horizontal facing; north when looking straight up or down.
    pub horizontal_direction: Direction,
    /// View yaw in degrees.
    pub rotation_degrees: i32,
    /// Sneak-equivalent modifier, always off.
    pub secondary_use_active: bool,
}

impl PlacementContext {
    /// Build the context for placing into `target` while looking along `look`.
    #[must_use]
    pub const fn new(target: CellPos, look: Direction) -> Self {
        Self {
            clicked_cell: target,
            hit_face: look.opposite(),
            look_direction: look,
            looking_directions: looking_order(look),
            horizontal_direction: match look.axis() {
                Axis::Y => Direction::North,
                Axis::X | Axis::Z => look,
            },
            rotation_degrees: look.horizontal_index() * 90,
            secondary_use_active: false,
        }
    }

    /// Single nearest looking direction reported to the host.
    #[must_use]
    pub const fn nearest_looking_direction(&self) -> Direction {
        Direction::Down
    }
}

/// Facing preference for each look direction. Down always comes first.
#[must_use]
pub const fn looking_order(look: Direction) -> [Direction; 6] {
    use Direction::{Down, East, North, South, Up, West};
    match look {
        Down => [Down, North, East, South, West, Up],
        Up => [Down, Up, North, East, South, West],
        North => [Down, North, East, West, Up, South],
        South => [Down, South, East, West, Up, North],
        West => [Down, West, South, Up, North, East],
        East => [Down, East, South, Up, North, West],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_are_permutations() {
        for look in Direction::ALL {
            let order = looking_order(look);
            assert_eq!(order[0], Direction::Down);
            for dir in Direction::ALL {
                assert_eq!(order.iter().filter(|d| **d == dir).count(), 1, "{look:?} misses {dir:?}");
            }
            if look != Direction::Down {
                assert_eq!(order[1], look);
            }
        }
    }

    #[test]
    fn test_context_for_horizontal_look() {
        let target = CellPos::new(1, 2, 3);
        let ctx = PlacementContext::new(target, Direction::East);
        assert_eq!(ctx.clicked_cell, target);
        assert_eq!(ctx.hit_face, Direction::West);
        assert_eq!(ctx.horizontal_direction, Direction::East);
        assert_eq!(ctx.rotation_degrees, 270);
        assert!(!ctx.secondary_use_active);
        assert_eq!(ctx.nearest_looking_direction(), Direction::Down);
    }

    #[test]
    fn test_context_for_vertical_look() {
        let ctx = PlacementContext::new(CellPos::default(), Direction::Down);
        assert_eq!(ctx.horizontal_direction, Direction::North);
        assert_eq!(ctx.rotation_degrees, -90);
        assert_eq!(ctx.hit_face, Direction::Up);
    }
}
