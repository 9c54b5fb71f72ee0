//! Hierarchical (nested) clipping output.
//!
//! A [`PolyTree64`] preserves the ownership relationships between output
//! polygons that a flat path list discards: holes are children of the outer
//! that contains them, islands inside holes are children of the hole, and
//! so on. The tree is read-only once built.

use crate::geometry::{area, Path64};

/// One node of a polygon nesting tree: a polygon plus the polygons it
/// directly contains.
#[derive(Debug, Clone, Default)]
pub struct PolyPath64 {
    polygon: Path64,
    children: Vec<PolyPath64>,
    is_hole: bool,
}

impl PolyPath64 {
    /// The polygon at this node. Empty for the tree root.
    #[inline]
    pub fn polygon(&self) -> &Path64 {
        &self.polygon
    }

    /// True when this polygon is a hole: outer/hole status alternates with
    /// each nesting level, so children of outers are holes and children of
    /// holes are (island) outers.
    #[inline]
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Direct children (polygons immediately contained by this one).
    #[inline]
    pub fn children(&self) -> &[PolyPath64] {
        &self.children
    }

    /// Number of direct children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn add_child(&mut self, polygon: Path64) -> &mut PolyPath64 {
        let is_hole = !self.polygon.is_empty() && !self.is_hole;
        self.children.push(PolyPath64 {
            polygon,
            children: Vec::new(),
            is_hole,
        });
        self.children.last_mut().unwrap()
    }

    /// Net area of this polygon and everything nested below it.
    ///
    /// Holes carry opposite winding, so their (signed) areas subtract.
    pub fn area(&self) -> f64 {
        let mut result = area(&self.polygon);
        for child in &self.children {
            result += child.area();
        }
        result
    }

    /// Total number of polygons in this subtree, excluding the node itself
    /// when it is the (empty) root.
    pub fn polygon_count(&self) -> usize {
        let own = usize::from(!self.polygon.is_empty());
        own + self
            .children
            .iter()
            .map(PolyPath64::polygon_count)
            .sum::<usize>()
    }

    fn collect_into(&self, out: &mut Vec<Path64>) {
        if !self.polygon.is_empty() {
            out.push(self.polygon.clone());
        }
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

/// The root of a polygon nesting hierarchy.
///
/// Top-level children are outermost polygons; each alternation of depth
/// flips between outer and hole.
#[derive(Debug, Clone, Default)]
pub struct PolyTree64 {
    root: PolyPath64,
}

impl PolyTree64 {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level (outermost) polygons.
    #[inline]
    pub fn children(&self) -> &[PolyPath64] {
        self.root.children()
    }

    /// Number of top-level polygons.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.root.child_count()
    }

    /// Net area of every polygon in the tree.
    pub fn area(&self) -> f64 {
        self.root.area()
    }

    /// Total number of polygons in the tree.
    pub fn polygon_count(&self) -> usize {
        self.root.polygon_count()
    }

    /// Flattens the tree back into a path list, depth first.
    pub fn to_paths(&self) -> Vec<Path64> {
        let mut out = Vec::new();
        self.root.collect_into(&mut out);
        out
    }

    pub(crate) fn clear(&mut self) {
        self.root.children.clear();
    }

    pub(crate) fn root_mut(&mut self) -> &mut PolyPath64 {
        &mut self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point64;

    fn square(origin: i64, side: i64) -> Path64 {
        vec![
            Point64::new(origin, origin),
            Point64::new(origin + side, origin),
            Point64::new(origin + side, origin + side),
            Point64::new(origin, origin + side),
        ]
    }

    #[test]
    fn test_nested_area() {
        let mut tree = PolyTree64::new();
        let outer = tree.root_mut().add_child(square(0, 10));
        // Hole wound clockwise: negative area.
        let mut hole = square(2, 6);
        hole.reverse();
        outer.add_child(hole);
        assert_eq!(tree.area(), 100.0 - 36.0);
        assert_eq!(tree.polygon_count(), 2);
        assert_eq!(tree.to_paths().len(), 2);
    }

    #[test]
    fn test_is_hole_alternates_with_depth() {
        let mut tree = PolyTree64::new();
        let outer = tree.root_mut().add_child(square(0, 40));
        assert!(!outer.is_hole());
        let mut ring = square(10, 20);
        ring.reverse();
        let hole = outer.add_child(ring);
        assert!(hole.is_hole());
        let island = hole.add_child(square(15, 10));
        assert!(!island.is_hole());
    }
}
