//! # Core Type Definitions
//!
//! Fundamental value types shared by the grid configuration, the rebuild path
//! and the query path.
//!
//! ## Key Types
//!
//! - [`Vec3`] - double-precision 3D point / vector
//! - [`Axis`] and [`AxisFlags`] - per-axis selection used for axis collapse
//! - [`WorldBounds`] - origin + size of the indexed region
//! - [`EntityId`] - default opaque identifier for tracked entities
//! - [`TrackedObject`] / [`IndexedObject`] - snapshot input and query output

use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::ops::{Add, Sub};
use uuid::Uuid;

/// Bound for identifiers the grid can index.
///
/// Any small copyable key works: gameplay layers typically pass their own
/// entity handles, tests use plain integers.
pub trait ObjectId: Copy + Eq + Hash + Send + Sync + std::fmt::Debug + 'static {}

impl<T> ObjectId for T where T: Copy + Eq + Hash + Send + Sync + std::fmt::Debug + 'static {}

/// Unique identifier for an entity tracked by the grid.
///
/// Wrapper around a UUID so entity ids cannot be confused with other ids.
///
/// # Examples
///
/// ```rust
/// use proximity_grid::EntityId;
///
/// let id = EntityId::new();
/// let parsed: EntityId = id.to_string().parse()?;
/// assert_eq!(id, parsed);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Creates a new random entity ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in storage order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in `[x, y, z]` arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Represents a 3D point or vector in world space.
///
/// Uses double precision so large worlds keep sub-unit accuracy.
///
/// # Examples
///
/// ```rust
/// use proximity_grid::Vec3;
///
/// let a = Vec3::new(1.0, 2.0, 2.0);
/// assert_eq!(a.distance_squared(Vec3::zero()), 9.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate (typically east-west axis)
    pub x: f64,
    /// Y coordinate (typically vertical axis)
    pub y: f64,
    /// Z coordinate (typically north-south axis)
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3 with the specified coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero vector (0, 0, 0).
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Creates a vector with every component set to `value`.
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value)
    }

    /// Returns the component on `axis`.
    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Returns a copy with the component on `axis` replaced.
    #[inline]
    pub fn with(mut self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    /// True when no component is NaN or infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_squared(&self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Vec3) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Per-axis boolean flags. Used to mark axes that are collapsed out of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisFlags {
    #[serde(default)]
    pub x: bool,
    #[serde(default)]
    pub y: bool,
    #[serde(default)]
    pub z: bool,
}

impl AxisFlags {
    /// No axis flagged: full 3D indexing.
    pub const NONE: AxisFlags = AxisFlags { x: false, y: false, z: false };

    /// Flags exactly one axis.
    pub fn only(axis: Axis) -> Self {
        Self::NONE.with(axis, true)
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn with(mut self, axis: Axis, value: bool) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    /// Number of flagged axes.
    pub fn count(&self) -> usize {
        Axis::ALL.iter().filter(|&&axis| self.get(axis)).count()
    }

    /// Zeroes every component of `v` whose axis is flagged.
    ///
    /// With the flags interpreted as "disabled axes" this projects a point onto
    /// the remaining 2D plane or 1D line.
    #[inline]
    pub fn project(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { 0.0 } else { v.x },
            if self.y { 0.0 } else { v.y },
            if self.z { 0.0 } else { v.z },
        )
    }
}

/// Axis-aligned region of the world covered by the grid.
///
/// Objects outside the region are still indexed: they are pinned to the
/// nearest edge cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Minimum corner of the region
    pub origin: Vec3,
    /// Extent of the region along each axis
    pub size: Vec3,
}

impl WorldBounds {
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self { origin, size }
    }

    /// Builds bounds from two opposite corners.
    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }

    /// Maximum corner of the region.
    pub fn max(&self) -> Vec3 {
        self.origin + self.size
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::from_corners(
            Vec3::new(-1000.0, -100.0, -1000.0),
            Vec3::new(1000.0, 100.0, 1000.0),
        )
    }
}

/// One entry of the per-tick snapshot handed to
/// [`ProximityGrid::rebuild`](crate::ProximityGrid::rebuild).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject<I = EntityId> {
    pub id: I,
    pub position: Vec3,
}

impl<I> TrackedObject<I> {
    pub fn new(id: I, position: Vec3) -> Self {
        Self { id, position }
    }
}

/// An object as stored in the cell index and returned by queries.
///
/// `position` has disabled-axis components zeroed. `slot` is the object's
/// index in the snapshot passed to the most recent rebuild and has no meaning
/// outside of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedObject<I = EntityId> {
    pub id: I,
    pub position: Vec3,
    pub slot: usize,
}
