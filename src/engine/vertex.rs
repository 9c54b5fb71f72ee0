//! Input path decomposition into flagged vertex rings (the sweep's source
//! of local minima and maxima).

use crate::engine::{Clipper64, LocalMinima, PathType, Vertex, VertexFlags, VertexId};
use crate::geometry::{strip_duplicates, Point64};

impl Clipper64 {
    /// Converts one input path into a doubly linked vertex ring, flagging
    /// local minima/maxima and open ends, and records one [`LocalMinima`]
    /// per minimum.
    ///
    /// Horizontal runs never change the monotone trend, so the vertex that
    /// starts the first non-horizontal edge after a run carries the flag.
    pub(crate) fn add_path_to_vertex_list(
        &mut self,
        path: &[Point64],
        polytype: PathType,
        is_open: bool,
    ) {
        let pts = strip_duplicates(path, !is_open);
        if pts.len() < if is_open { 2 } else { 3 } {
            return;
        }

        // Allocate the ring. Open paths link circularly too; OPEN_START /
        // OPEN_END flags stop any traversal from walking past the ends.
        let base = self.vertices.len() as u32;
        let n = pts.len() as u32;
        for (i, &pt) in pts.iter().enumerate() {
            let i = i as u32;
            self.vertices.push(Vertex {
                pt,
                next: VertexId(base + (i + 1) % n),
                prev: VertexId(base + (i + n - 1) % n),
                flags: VertexFlags::empty(),
            });
        }
        let v0 = VertexId(base);

        let mut going_up;
        if is_open {
            // Trend of the first non-horizontal edge.
            let mut v = self.vertex(v0).next;
            while v != v0 && self.vertex(v).pt.y == self.vertex(v0).pt.y {
                v = self.vertex(v).next;
            }
            going_up = self.vertex(v).pt.y > self.vertex(v0).pt.y;

            self.vertex_mut(v0).flags |= VertexFlags::OPEN_START;
            if going_up {
                self.add_loc_min(v0, polytype, is_open);
            } else {
                self.vertex_mut(v0).flags |= VertexFlags::LOCAL_MAX;
            }
        } else {
            // Trend entering v0, read from the nearest preceding
            // non-horizontal edge.
            let mut v = self.vertex(v0).prev;
            while v != v0 && self.vertex(v).pt.y == self.vertex(v0).pt.y {
                v = self.vertex(v).prev;
            }
            if v == v0 {
                return; // fully horizontal ring: no minima, never swept
            }
            going_up = self.vertex(v0).pt.y > self.vertex(v).pt.y;
        }

        // Walk every edge once; a trend reversal flags the edge's start.
        let mut v = v0;
        loop {
            let next = self.vertex(v).next;
            let (vy, ny) = (self.vertex(v).pt.y, self.vertex(next).pt.y);
            if ny > vy && !going_up {
                self.add_loc_min(v, polytype, is_open);
                going_up = true;
            } else if ny < vy && going_up {
                self.vertex_mut(v).flags |= VertexFlags::LOCAL_MAX;
                going_up = false;
            }
            v = next;
            if v == v0 {
                break;
            }
            if is_open && self.vertex(v).next == v0 {
                // `v` is the final vertex of the open path: its outgoing
                // edge wraps and must not be treated as real.
                self.vertex_mut(v).flags |= VertexFlags::OPEN_END;
                if going_up {
                    self.vertex_mut(v).flags |= VertexFlags::LOCAL_MAX;
                } else {
                    self.add_loc_min(v, polytype, is_open);
                }
                break;
            }
        }
    }

    fn add_loc_min(&mut self, vertex: VertexId, polytype: PathType, is_open: bool) {
        let flags = &mut self.vertex_mut(vertex).flags;
        if flags.contains(VertexFlags::LOCAL_MIN) {
            return;
        }
        *flags |= VertexFlags::LOCAL_MIN;
        self.minima.push(LocalMinima {
            vertex,
            polytype,
            is_open,
        });
    }

    /// Dequeues the next local minimum whose vertex sits exactly on
    /// scanline `y`, in (y, x) order.
    pub(crate) fn pop_local_minima(&mut self, y: i64) -> Option<LocalMinima> {
        let lm = *self.minima.get(self.cur_min)?;
        if self.vertex(lm.vertex).pt.y != y {
            return None;
        }
        self.cur_min += 1;
        Some(lm)
    }
}
