//! Coordinate primitives and exact integer predicates.
//!
//! All clipping arithmetic happens on [`Point64`] integer coordinates;
//! floating-point callers go through the scaling adapter in [`crate::scale`].

mod ops;
mod point;
mod rect;

pub use ops::{area, is_positive, point_in_polygon, PointInPolygonResult};
pub use point::{Path64, PathD, Paths64, PathsD, Point2, Point64, PointD};
pub use rect::Rect64;

pub(crate) use ops::{
    area_triangle, cross_product, dot_product, get_intersect_point, is_collinear,
    segments_intersect, strip_duplicates, Crossing,
};
