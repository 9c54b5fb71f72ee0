//! scanbeam - Scanline polygon clipping and offsetting
//!
//! Boolean operations (intersection, union, difference, xor) over sets of
//! polygonal paths, and polygon offsetting, built on a Vatti-style scanline
//! sweep over 64-bit integer coordinates. Floating-point inputs go through a
//! fixed-point scaling adapter at the boundary; everything inside the sweep
//! is exact integer arithmetic.
//!
//! # Example
//!
//! ```
//! use scanbeam::{paths_union, FillRule, Point64};
//!
//! let subject = vec![vec![
//!     Point64::new(0, 0),
//!     Point64::new(10, 0),
//!     Point64::new(10, 10),
//!     Point64::new(0, 10),
//! ]];
//! let clip = vec![vec![
//!     Point64::new(5, 5),
//!     Point64::new(15, 5),
//!     Point64::new(15, 15),
//!     Point64::new(5, 15),
//! ]];
//!
//! let merged = paths_union(&subject, &clip, FillRule::NonZero).unwrap();
//! assert_eq!(merged.len(), 1); // one L-shaped outline
//! ```

pub mod boolean;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod offset;
pub mod scale;
pub mod tree;

pub use boolean::{
    boolean_op, boolean_op_tree, inflate_paths, paths_difference, paths_intersection, paths_union,
    paths_xor,
};
pub use engine::{ClipType, Clipper64, FillRule, PathType};
pub use error::ClipError;
pub use geometry::{
    area, is_positive, point_in_polygon, Path64, PathD, Paths64, PathsD, Point2, Point64,
    PointD, PointInPolygonResult, Rect64,
};
pub use offset::{ClipperOffset, EndType, JoinType};
pub use scale::{scale_path, scale_paths, unscale_path, unscale_paths, ClipperD, PolyTreeD};
pub use tree::{PolyPath64, PolyTree64};
