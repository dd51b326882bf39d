//! Spawn position and velocity for free-floating entities.

use crate::grid::{CellPos, Direction};
use crate::host::{EntityDimensions, FreeEntitySpawn};
use crate::math::{ratio, Fixed, Vec3Fixed};
use crate::random::RandomSource;
use crate::resource::ItemStack;

/// Compute where an entity pushed out of `origin` along `direction` appears.
///
/// The entity starts from the bottom-centre of the origin cell. On the axis
/// of `direction` it is pushed 0.525 cells plus half its width out of the
/// origin; on the other axes it is jittered uniformly within the room its
/// bounding box leaves inside the cell. It drifts along `direction` at 0.1
/// cells per tick.
pub fn free_entity_spawn<R>(
    origin: CellPos,
    direction: Direction,
    dimensions: EntityDimensions,
    stack: ItemStack,
    rng: &mut R,
) -> FreeEntitySpawn
where
    R: RandomSource + ?Sized,
{
    let one = Fixed::from_num(1);
    let half = ratio(1, 2);
    let center = Vec3Fixed::new(
        Fixed::from_num(origin.x) + half,
        Fixed::from_num(origin.y),
        Fixed::from_num(origin.z) + half,
    );

    let (step_x, step_y, step_z) = direction.step();

    // Entities stand on their feet, so a downward push lifts them flush
    // with the face instead.
    let lift = if step_y == -1 {
        one - dimensions.height
    } else {
        Fixed::ZERO
    };

    let room_height = (one - dimensions.height).max(Fixed::ZERO);
    let room_width = (one - dimensions.width).max(Fixed::ZERO);
    let push = ratio(525, 1000) + dimensions.width * half;

    let offset_x = if step_x == 0 {
        rng.next_unit() * room_width - room_width * half
    } else {
        Fixed::from_num(step_x) * push
    };
    let offset_y = if step_y == 0 {
        rng.next_unit() * room_height
    } else {
        Fixed::from_num(step_y) + lift
    };
    let offset_z = if step_z == 0 {
        rng.next_unit() * room_width - room_width * half
    } else {
        Fixed::from_num(step_z) * push
    };

    let unit = Vec3Fixed::new(
        Fixed::from_num(step_x),
        Fixed::from_num(step_y),
        Fixed::from_num(step_z),
    );

    FreeEntitySpawn {
        position: center + Vec3Fixed::new(offset_x, offset_y, offset_z),
        velocity: unit.scale(ratio(1, 10)),
        stack,
    }
}
