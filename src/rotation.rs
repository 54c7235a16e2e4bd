//! Rotation transform for 4x4 piece patterns
//!
//! Rotated orientations are never stored. Instead each rotation maps a local
//! `(x, y)` cell of the bounding box straight to an index in the unrotated,
//! flattened pattern: `index = a*y + b*x + c`.

/// `(y coefficient, x coefficient, constant)` per quarter turn clockwise
const ROTATION_COEFFICIENTS: [(i32, i32, i32); 4] = [
    (4, 1, 0),    // 0°
    (1, -4, 12),  // 90°
    (-4, -1, 15), // 180°
    (-1, 4, 3),   // 270°
];

/// Map local cell `(x, y)` in `[0, 4)` under `rotation` quarter turns to an
/// index into a flattened 4x4 pattern. Only `rotation % 4` matters.
pub fn rotate(x: i32, y: i32, rotation: u32) -> usize {
    debug_assert!((0..4).contains(&x) && (0..4).contains(&y));
    let (a, b, c) = ROTATION_COEFFICIENTS[(rotation % 4) as usize];
    (a * y + b * x + c) as usize
}
