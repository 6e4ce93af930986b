use serde::{Deserialize, Serialize};

/// Camera movement directions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML files stay readable:
/// ```toml
/// [keybindings.bindings]
/// forward = "KeyW"
/// left = "KeyA"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Along the camera front vector.
    Forward,
    /// Against the camera front vector.
    Back,
    /// Against the camera right vector.
    Left,
    /// Along the camera right vector.
    Right,
}

impl MoveDirection {
    /// Every direction, in binding order.
    pub const ALL: [Self; 4] =
        [Self::Forward, Self::Back, Self::Left, Self::Right];

    /// `(front, right)` coefficients of the unit movement for this
    /// direction.
    #[must_use]
    pub const fn basis_weights(self) -> (f32, f32) {
        match self {
            Self::Forward => (1.0, 0.0),
            Self::Back => (-1.0, 0.0),
            Self::Left => (0.0, -1.0),
            Self::Right => (0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel() {
        let (f1, r1) = MoveDirection::Forward.basis_weights();
        let (f2, r2) = MoveDirection::Back.basis_weights();
        assert_eq!((f1 + f2, r1 + r2), (0.0, 0.0));
        let (f1, r1) = MoveDirection::Left.basis_weights();
        let (f2, r2) = MoveDirection::Right.basis_weights();
        assert_eq!((f1 + f2, r1 + r2), (0.0, 0.0));
    }
}
