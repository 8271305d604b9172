//! Boundary policies over block-grid coordinates.
//!
//! Every coordinate handled here is a block coordinate (`cell.div_euclid(8)`),
//! so an extent `[low, high]` covers cells `[low * 8, high * 8 + 7]`.
//! Block coordinates are limited to `[MIN_BLOCK, MAX_BLOCK]`, the blocks whose
//! cells all fit in `i32`.

use super::block::BLOCK_SIZE_I32;
use super::error::ConfigError;

pub const MIN_BLOCK: i32 = i32::MIN / BLOCK_SIZE_I32;
pub const MAX_BLOCK: i32 = i32::MAX / BLOCK_SIZE_I32;

#[inline(always)]
fn block_in_range(v: i32) -> bool {
    (MIN_BLOCK..=MAX_BLOCK).contains(&v)
}

/// Inclusive `[low, high]` range of block coordinates on one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    low: i32,
    high: i32,
}

impl Extent {
    pub fn new(low: i32, high: i32) -> Result<Self, ConfigError> {
        if low > high || !block_in_range(low) || !block_in_range(high) {
            return Err(ConfigError::InvalidExtent { low, high });
        }
        Ok(Self { low, high })
    }

    #[inline(always)]
    pub fn low(&self) -> i32 {
        self.low
    }

    #[inline(always)]
    pub fn high(&self) -> i32 {
        self.high
    }

    /// Number of block coordinates in the range.
    #[inline(always)]
    pub fn width(&self) -> i64 {
        self.high as i64 - self.low as i64 + 1
    }

    #[inline(always)]
    pub fn contains(&self, v: i32) -> bool {
        v >= self.low && v <= self.high
    }

    /// Single fold into range. Only valid for `|dv| <= width`.
    #[inline(always)]
    fn fold_step(&self, v: i32, dv: i32) -> i32 {
        let width = self.width();
        debug_assert!(
            (dv as i64).abs() <= width,
            "toroidal step {dv} exceeds extent width {width}"
        );
        let mut stepped = v as i64 + dv as i64;
        if stepped < self.low as i64 {
            stepped += width;
        } else if stepped > self.high as i64 {
            stepped -= width;
        }
        debug_assert!(
            stepped >= self.low as i64 && stepped <= self.high as i64,
            "toroidal step from {v} by {dv} left [{}, {}]",
            self.low,
            self.high
        );
        stepped as i32
    }

    #[inline(always)]
    fn fixed_step(&self, v: i32, dv: i32) -> Option<i32> {
        let stepped = v.checked_add(dv)?;
        self.contains(stepped).then_some(stepped)
    }

    #[inline(always)]
    fn wrap(&self, v: i32) -> i32 {
        let offset = (v as i64 - self.low as i64).rem_euclid(self.width());
        (self.low as i64 + offset) as i32
    }
}

/// How block coordinates behave at the edge of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Infinite plane.
    #[default]
    Unbounded,
    /// Edges wrap around; a torus of `x.width() * y.width()` blocks.
    Toroidal { x: Extent, y: Extent },
    /// Everything outside the extents is permanently dead.
    Fixed { x: Extent, y: Extent },
}

impl Boundary {
    pub fn toroidal(low_x: i32, low_y: i32, high_x: i32, high_y: i32) -> Result<Self, ConfigError> {
        Ok(Boundary::Toroidal {
            x: Extent::new(low_x, high_x)?,
            y: Extent::new(low_y, high_y)?,
        })
    }

    pub fn fixed(low_x: i32, low_y: i32, high_x: i32, high_y: i32) -> Result<Self, ConfigError> {
        Ok(Boundary::Fixed {
            x: Extent::new(low_x, high_x)?,
            y: Extent::new(low_y, high_y)?,
        })
    }

    /// `x + dx` under this policy, or `None` when the result is off-grid.
    ///
    /// Toroidal wrapping folds once, which is exact for the unit steps the
    /// engine performs.
    #[inline(always)]
    pub fn step_x(&self, x: i32, dx: i32) -> Option<i32> {
        match self {
            Boundary::Unbounded => x.checked_add(dx).filter(|&v| block_in_range(v)),
            Boundary::Toroidal { x: ext, .. } => Some(ext.fold_step(x, dx)),
            Boundary::Fixed { x: ext, .. } => ext.fixed_step(x, dx),
        }
    }

    #[inline(always)]
    pub fn step_y(&self, y: i32, dy: i32) -> Option<i32> {
        match self {
            Boundary::Unbounded => y.checked_add(dy).filter(|&v| block_in_range(v)),
            Boundary::Toroidal { y: ext, .. } => Some(ext.fold_step(y, dy)),
            Boundary::Fixed { y: ext, .. } => ext.fixed_step(y, dy),
        }
    }

    #[inline(always)]
    pub fn is_valid_x(&self, x: i32) -> bool {
        match self {
            Boundary::Unbounded => block_in_range(x),
            Boundary::Toroidal { .. } => true,
            Boundary::Fixed { x: ext, .. } => ext.contains(x),
        }
    }

    #[inline(always)]
    pub fn is_valid_y(&self, y: i32) -> bool {
        match self {
            Boundary::Unbounded => block_in_range(y),
            Boundary::Toroidal { .. } => true,
            Boundary::Fixed { y: ext, .. } => ext.contains(y),
        }
    }

    /// Canonical block x: true modulo into a toroidal extent, identity otherwise.
    #[inline]
    pub fn wrap_x(&self, x: i32) -> i32 {
        match self {
            Boundary::Toroidal { x: ext, .. } => ext.wrap(x),
            _ => x,
        }
    }

    #[inline]
    pub fn wrap_y(&self, y: i32) -> i32 {
        match self {
            Boundary::Toroidal { y: ext, .. } => ext.wrap(y),
            _ => y,
        }
    }

    /// Whether the block holding cell `(x, y)` is on the grid.
    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        self.is_valid_x(x.div_euclid(BLOCK_SIZE_I32)) && self.is_valid_y(y.div_euclid(BLOCK_SIZE_I32))
    }

    /// Resolve the block coordinate one step in direction `(dx, dy)`.
    #[inline(always)]
    pub fn neighbor(&self, x: i32, y: i32, dx: i32, dy: i32) -> Option<(i32, i32)> {
        Some((self.step_x(x, dx)?, self.step_y(y, dy)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_always_steps() {
        let b = Boundary::Unbounded;
        assert_eq!(b.step_x(-1_000_000, -1), Some(-1_000_001));
        assert_eq!(b.step_y(7, 1), Some(8));
        assert!(b.is_valid_x(MIN_BLOCK));
        assert!(b.is_valid_y(MAX_BLOCK));
    }

    #[test]
    fn unbounded_stops_at_the_last_representable_block() {
        let b = Boundary::Unbounded;
        assert_eq!(MAX_BLOCK, 268_435_455);
        assert_eq!(MIN_BLOCK, -268_435_456);
        assert_eq!(b.step_x(MAX_BLOCK, 1), None);
        assert_eq!(b.step_y(MIN_BLOCK, -1), None);
        assert_eq!(b.step_x(MAX_BLOCK, -1), Some(MAX_BLOCK - 1));
        assert!(!b.is_valid_x(MAX_BLOCK + 1));
        assert!(!b.is_valid_y(i32::MIN));
        assert!(b.contains_cell(i32::MAX, i32::MIN));
    }

    #[test]
    fn extents_past_the_block_range_are_rejected() {
        assert!(Extent::new(0, MAX_BLOCK).is_ok());
        assert!(matches!(
            Extent::new(0, MAX_BLOCK + 1),
            Err(ConfigError::InvalidExtent { .. })
        ));
        assert!(Boundary::fixed(i32::MIN, 0, 0, 0).is_err());
    }

    #[test]
    fn toroidal_wraps_single_steps() {
        let b = Boundary::toroidal(-2, 0, 3, 4).unwrap();
        assert_eq!(b.step_x(-2, -1), Some(3));
        assert_eq!(b.step_x(3, 1), Some(-2));
        assert_eq!(b.step_x(0, 1), Some(1));
        assert_eq!(b.step_y(0, -1), Some(4));
        assert_eq!(b.step_y(4, 1), Some(0));
        assert!(b.is_valid_x(100));
    }

    #[test]
    fn toroidal_single_block_extent_wraps_onto_itself() {
        let b = Boundary::toroidal(5, 5, 5, 5).unwrap();
        assert_eq!(b.step_x(5, 1), Some(5));
        assert_eq!(b.step_y(5, -1), Some(5));
    }

    #[test]
    fn toroidal_wrap_is_true_modulo() {
        let b = Boundary::toroidal(-2, 0, 3, 4).unwrap();
        assert_eq!(b.wrap_x(4), -2);
        assert_eq!(b.wrap_x(-3), 3);
        assert_eq!(b.wrap_x(16), 4 - 6);
        assert_eq!(b.wrap_y(-11), 4);
        assert_eq!(Boundary::Unbounded.wrap_x(-11), -11);
    }

    #[test]
    fn fixed_rejects_out_of_range() {
        let b = Boundary::fixed(0, 0, 9, 4).unwrap();
        assert_eq!(b.step_x(0, -1), None);
        assert_eq!(b.step_x(9, 1), None);
        assert_eq!(b.step_x(4, 1), Some(5));
        assert_eq!(b.step_y(4, 1), None);
        assert!(!b.is_valid_x(10));
        assert!(b.is_valid_y(4));
        assert!(b.contains_cell(79, 39));
        assert!(!b.contains_cell(80, 0));
        assert!(!b.contains_cell(-1, 0));
    }

    #[test]
    fn inverted_extent_is_rejected() {
        assert!(matches!(
            Boundary::fixed(3, 0, 2, 0),
            Err(ConfigError::InvalidExtent { low: 3, high: 2 })
        ));
        assert!(Boundary::toroidal(0, 1, 0, 0).is_err());
    }

    #[test]
    fn neighbor_combines_axes() {
        let b = Boundary::fixed(0, 0, 1, 1).unwrap();
        assert_eq!(b.neighbor(0, 0, 1, 1), Some((1, 1)));
        assert_eq!(b.neighbor(0, 0, -1, 1), None);
        assert_eq!(b.neighbor(1, 0, 0, -1), None);
    }
}
