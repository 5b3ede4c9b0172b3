//! Player kinematic model.
//!
//! Pure functions that compute one player's next [`DynamicState`] over one
//! fixed tick from their abilities, current state and intention. Turning and
//! moving are mutually exclusive within a tick: a player asked to move while
//! facing the wrong way spends the tick pivoting toward the destination, which
//! gives the stop-pivot-advance gait rather than strafing.
//!
//! Energy is read but never changed here.

use crate::math::{angles_approx_equal, normalize_degrees, signed_angle_delta, Vec2};
use crate::player::{DynamicState, Intentions, StaticState};

/// Maximum running speed, in metres/second, at full ability and energy.
pub const MAX_SPEED: f64 = 10.0;

/// Energy every player starts with.
pub const MAX_ENERGY: f64 = 100.0;

/// Maximum turning rate, in degrees/second.
pub const MAX_TURNING_RATE: f64 = 600.0;

/// Current running speed in m/s.
///
/// `(running_ability / 100) * (energy / 100) * MAX_SPEED`, so either factor
/// at zero stops the player.
#[must_use]
pub fn speed(abilities: &StaticState, dynamic: &DynamicState) -> f64 {
    let running = abilities.running_ability / 100.0;
    let energy = dynamic.energy / 100.0;
    running * energy * MAX_SPEED
}

/// Advance `dynamic` by one tick according to `intentions`.
#[must_use]
pub fn step(
    abilities: &StaticState,
    dynamic: &DynamicState,
    intentions: &Intentions,
    tick_seconds: f64,
) -> DynamicState {
    match *intentions {
        Intentions::None => *dynamic,
        Intentions::Turn { direction } => turn(dynamic, direction, tick_seconds),
        Intentions::Move { destination } => {
            move_towards(abilities, dynamic, destination, tick_seconds)
        }
    }
}

/// Rotate toward `desired` degrees, capped at `MAX_TURNING_RATE * tick`.
#[must_use]
pub fn turn(dynamic: &DynamicState, desired: f64, tick_seconds: f64) -> DynamicState {
    let angle_to_turn = signed_angle_delta(dynamic.direction, desired);
    let max_angle = MAX_TURNING_RATE * tick_seconds.max(0.0);
    let applied = angle_to_turn.clamp(-max_angle, max_angle);

    let mut next = *dynamic;
    next.direction = normalize_degrees(dynamic.direction + applied);

    #[cfg(feature = "debug-validation")]
    debug_assert!((0.0..360.0).contains(&next.direction));

    next
}

/// Move toward `destination`, or pivot toward it if not yet facing it.
#[must_use]
pub fn move_towards(
    abilities: &StaticState,
    dynamic: &DynamicState,
    destination: Vec2,
    tick_seconds: f64,
) -> DynamicState {
    let position = dynamic.position;
    if position.approx_equal(destination) {
        return *dynamic;
    }

    let bearing = position.bearing_to(destination);
    if !angles_approx_equal(dynamic.direction, bearing) {
        return turn(dynamic, bearing, tick_seconds);
    }

    let distance_to_destination = position.distance_to(destination);
    let distance_to_move = speed(abilities, dynamic) * tick_seconds.max(0.0);

    let mut next = *dynamic;
    if distance_to_move >= distance_to_destination {
        next.position = destination;
    } else {
        let scale = distance_to_move / distance_to_destination;
        next.position = position + position.vector_to(destination).scale(scale);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_equal;
    use crate::player::PlayerType;

    fn fast_runner() -> StaticState {
        let mut abilities = StaticState::new(0, PlayerType::Player);
        abilities.running_ability = 100.0;
        abilities
    }

    fn at(x: f64, y: f64, direction: f64) -> DynamicState {
        DynamicState {
            position: Vec2::new(x, y),
            direction,
            energy: MAX_ENERGY,
        }
    }

    #[test]
    fn test_turn_capped_by_rate() {
        let next = turn(&at(0.0, 0.0, 0.0), 90.0, 0.1);
        assert!(approx_equal(next.direction, 60.0));
    }

    #[test]
    fn test_turn_completes_within_cap() {
        let next = turn(&at(0.0, 0.0, 0.0), 45.0, 0.1);
        assert!(approx_equal(next.direction, 45.0));
    }

    #[test]
    fn test_turn_left_through_zero() {
        let next = turn(&at(0.0, 0.0, 10.0), 350.0, 0.01);
        // 6 degrees per tick, turning down through zero
        assert!(approx_equal(next.direction, 4.0));
        let next = turn(&next, 350.0, 0.01);
        assert!(approx_equal(next.direction, 358.0));
    }

    #[test]
    fn test_zero_tick_does_not_turn() {
        let next = turn(&at(0.0, 0.0, 10.0), 200.0, 0.0);
        assert!(approx_equal(next.direction, 10.0));
    }

    #[test]
    fn test_half_turn_goes_positive() {
        let next = turn(&at(0.0, 0.0, 0.0), 180.0, 0.1);
        assert!(approx_equal(next.direction, 60.0));
    }

    #[test]
    fn test_move_advances_max_speed() {
        let next = move_towards(&fast_runner(), &at(0.0, 0.0, 0.0), Vec2::new(20.0, 0.0), 1.0);
        assert!(approx_equal(next.position.x, MAX_SPEED));
        assert!(approx_equal(next.position.y, 0.0));
    }

    #[test]
    fn test_move_lands_on_destination() {
        let destination = Vec2::new(10.0, 0.0);
        let next = move_towards(&fast_runner(), &at(0.0, 0.0, 0.0), destination, 1.0);
        assert_eq!(next.position, destination);

        let after = move_towards(&fast_runner(), &next, destination, 1.0);
        assert_eq!(after, next);
    }

    #[test]
    fn test_move_pivots_before_advancing() {
        let start = at(0.0, 0.0, 180.0);
        let next = move_towards(&fast_runner(), &start, Vec2::new(10.0, 0.0), 0.1);
        assert_eq!(next.position, start.position);
        assert!(!approx_equal(next.direction, start.direction));
    }

    #[test]
    fn test_speed_zero_energy_or_ability() {
        let mut tired = at(0.0, 0.0, 0.0);
        tired.energy = 0.0;
        assert!(approx_equal(speed(&fast_runner(), &tired), 0.0));

        let mut slow = fast_runner();
        slow.running_ability = 0.0;
        assert!(approx_equal(speed(&slow, &at(0.0, 0.0, 0.0)), 0.0));
    }

    #[test]
    fn test_no_intention_is_noop() {
        let start = at(3.0, 4.0, 33.0);
        let next = step(&fast_runner(), &start, &Intentions::None, 1.0);
        assert_eq!(next, start);
    }
}
