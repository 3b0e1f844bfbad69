//! Thumbstick polar decomposition.
//!
//! Converts cartesian stick positions into a polar (radius, theta) pair
//! and maps the theta angle onto one of eight compass directions, which
//! in turn name a [`VirtualButton`] per stick. The sampler uses this to
//! report stick deflection as held direction buttons.

use std::f32::consts::PI;

use crate::controller::buttons::VirtualButton;

/// Which thumbstick a direction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

/// Eight-way direction of a deflected thumbstick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

const PI_8: f32 = PI / 8.0;

/// Computes the polar pair `(radius, theta)` for a stick position.
///
/// Both inputs at exactly zero cannot be computed; the smallest positive
/// value is substituted so the result stays well defined.
pub fn compute_polar_pair(x: f32, y: f32) -> (f32, f32) {
    let both_zero = x == 0.0 && y == 0.0;
    let x = if both_zero { f32::MIN_POSITIVE } else { x };
    let y = if both_zero { f32::MIN_POSITIVE } else { y };
    (x.hypot(y), y.atan2(x))
}

/// Maps a polar theta angle (−π..π, 0 pointing right, counter-clockwise
/// positive) onto its compass direction.
///
/// Each direction owns a π/4 sector centered on its compass heading; the
/// Left sector spans the ±π seam and is checked against both signs.
pub fn direction_for_polar_theta(theta: f32) -> Option<StickDirection> {
    let direction = match theta {
        t if (-PI_8..=PI_8).contains(&t) => StickDirection::Right,
        t if (PI_8..=3.0 * PI_8).contains(&t) => StickDirection::UpRight,
        t if (3.0 * PI_8..=5.0 * PI_8).contains(&t) => StickDirection::Up,
        t if (5.0 * PI_8..=7.0 * PI_8).contains(&t) => StickDirection::UpLeft,
        t if t >= 7.0 * PI_8 || t <= -7.0 * PI_8 => StickDirection::Left,
        t if (-7.0 * PI_8..=-5.0 * PI_8).contains(&t) => StickDirection::DownLeft,
        t if (-5.0 * PI_8..=-3.0 * PI_8).contains(&t) => StickDirection::Down,
        t if (-3.0 * PI_8..=-PI_8).contains(&t) => StickDirection::DownRight,
        _ => return None,
    };
    Some(direction)
}

/// The virtual button matching a direction on the given stick.
pub fn button_for_direction(direction: StickDirection, stick: Stick) -> VirtualButton {
    use VirtualButton::*;
    let left = stick == Stick::Left;

    match direction {
        StickDirection::Up => {
            if left {
                LeftStickUp
            } else {
                RightStickUp
            }
        }
        StickDirection::UpRight => {
            if left {
                LeftStickUpRight
            } else {
                RightStickUpRight
            }
        }
        StickDirection::Right => {
            if left {
                LeftStickRight
            } else {
                RightStickRight
            }
        }
        StickDirection::DownRight => {
            if left {
                LeftStickDownRight
            } else {
                RightStickDownRight
            }
        }
        StickDirection::Down => {
            if left {
                LeftStickDown
            } else {
                RightStickDown
            }
        }
        StickDirection::DownLeft => {
            if left {
                LeftStickDownLeft
            } else {
                RightStickDownLeft
            }
        }
        StickDirection::Left => {
            if left {
                LeftStickLeft
            } else {
                RightStickLeft
            }
        }
        StickDirection::UpLeft => {
            if left {
                LeftStickUpLeft
            } else {
                RightStickUpLeft
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_directions() {
        let (_, theta) = compute_polar_pair(1.0, 0.0);
        assert_eq!(direction_for_polar_theta(theta), Some(StickDirection::Right));

        let (_, theta) = compute_polar_pair(0.0, 1.0);
        assert_eq!(direction_for_polar_theta(theta), Some(StickDirection::Up));

        let (_, theta) = compute_polar_pair(-1.0, 0.0);
        assert_eq!(direction_for_polar_theta(theta), Some(StickDirection::Left));

        let (_, theta) = compute_polar_pair(0.0, -1.0);
        assert_eq!(direction_for_polar_theta(theta), Some(StickDirection::Down));
    }

    #[test]
    fn diagonal_sectors() {
        let (_, theta) = compute_polar_pair(0.7, 0.7);
        assert_eq!(
            direction_for_polar_theta(theta),
            Some(StickDirection::UpRight)
        );

        let (_, theta) = compute_polar_pair(-0.7, -0.7);
        assert_eq!(
            direction_for_polar_theta(theta),
            Some(StickDirection::DownLeft)
        );
    }

    #[test]
    fn left_sector_spans_the_seam() {
        // Slightly above and below the ±π seam both read as Left.
        let (_, theta) = compute_polar_pair(-1.0, 0.05);
        assert_eq!(direction_for_polar_theta(theta), Some(StickDirection::Left));
        let (_, theta) = compute_polar_pair(-1.0, -0.05);
        assert_eq!(direction_for_polar_theta(theta), Some(StickDirection::Left));
    }

    #[test]
    fn centered_stick_has_tiny_radius() {
        let (radius, _) = compute_polar_pair(0.0, 0.0);
        assert!(radius < 1e-6);
    }

    #[test]
    fn direction_buttons_differ_per_stick() {
        assert_eq!(
            button_for_direction(StickDirection::Up, Stick::Left),
            VirtualButton::LeftStickUp
        );
        assert_eq!(
            button_for_direction(StickDirection::Up, Stick::Right),
            VirtualButton::RightStickUp
        );
    }
}
