//! Decomposition of polygon sets into y-monotone pieces by a two-pass
//! sweep, and the public triangulation entry points.
//!
//! The sweep-line is horizontal and moves from -y to +y, south to north.
//! The forward sweep classifies every vertex and reorders degeneracies
//! (monotone ordering in the x direction, sweep ordering in the y
//! direction) without changing the polygons. The backward sweep then cuts
//! the polygons apart at the fusion points the forward sweep recorded,
//! using only that stored topology — no geometric test is ever needed on
//! the way back, which is what keeps ε-colinear input from cycling.

use crate::checks::{check_geometry, check_topology};
use crate::math::Point;
use crate::math_utils::{ccw, DEFAULT_PRECISION_RATIO};
use crate::monotone::MonotoneTriangulator;
use crate::{
    GeometryError, IndexedPolygon, PolygonVertex, SimplePolygon, TopologyError, Triangle,
    TriangulationError, TriangulationOptions, TriangulationResult, UnsupportedParameter, VertexId,
};

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::mem;

#[cfg(debug_assertions)]
macro_rules! sweep_log {
    ($obj:ident, $fmt:expr) => {
        if $obj.options.verbose {
            println!($fmt);
        }
    };
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {
        if $obj.options.verbose {
            println!($fmt, $($arg)*);
        }
    };
}

#[cfg(not(debug_assertions))]
macro_rules! sweep_log {
    ($obj:ident, $fmt:expr) => {};
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {};
}

/// Bails out of the current sweep when `cond` does not hold: with an error
/// by default, silently when the caller opted into overlap processing (the
/// rings are left as they stand and the monotone triangulator still closes
/// them up, just without a geometric-validity guarantee).
macro_rules! overlap_assert {
    ($obj:ident, $cond:expr, $err:expr) => {
        if !($cond) {
            if $obj.options.process_overlaps {
                sweep_log!($obj, "geometry violation tolerated, abandoning the sweep");
                return Ok(true);
            }
            return Err(TriangulationError::Geometry($err));
        }
    };
}

type VertIdx = usize;
type EdgeIdx = usize;

/// Sentinel for "no vertex", "no edge" and "list end".
const NIL: usize = usize::MAX;

const PROCESSED: i32 = -1;
const SKIPPED: i32 = -2;

/// Intrusive doubly-linked list position. Records never move in their
/// arena; splicing rewrites links only, so indices stay stable the way
/// `std::list` iterators would.
#[derive(Copy, Clone, Debug)]
struct Links {
    prev: usize,
    next: usize,
}

const UNLINKED: Links = Links {
    prev: NIL,
    next: NIL,
};

#[derive(Copy, Clone, Debug)]
struct List {
    head: usize,
    tail: usize,
}

const EMPTY_LIST: List = List {
    head: NIL,
    tail: NIL,
};

trait Linked {
    fn links(&self) -> Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// Insert `item` before `pos` (`NIL` appends at the back).
fn list_insert_before<T: Linked>(list: &mut List, items: &mut [T], pos: usize, item: usize) {
    let prev = if pos == NIL {
        list.tail
    } else {
        items[pos].links().prev
    };
    *items[item].links_mut() = Links { prev, next: pos };
    if prev == NIL {
        list.head = item;
    } else {
        items[prev].links_mut().next = item;
    }
    if pos == NIL {
        list.tail = item;
    } else {
        items[pos].links_mut().prev = item;
    }
}

fn list_remove<T: Linked>(list: &mut List, items: &mut [T], item: usize) {
    let Links { prev, next } = items[item].links();
    if prev == NIL {
        list.head = next;
    } else {
        items[prev].links_mut().next = next;
    }
    if next == NIL {
        list.tail = prev;
    } else {
        items[next].links_mut().prev = prev;
    }
    *items[item].links_mut() = UNLINKED;
}

/// One vertex of the polygons being decomposed.
///
/// The `left`/`right` pointers form the polygon rings while `order` threads
/// all vertices of all polygons into a single sweep-ordered list, so the
/// sweep can move through every ring at once. `mesh_idx` is the caller's
/// vertex identity and is transferred verbatim to the output triangles.
#[derive(Clone)]
struct VertAdj {
    pos: Point,
    mesh_idx: VertexId,
    /// Sweep state: `0` unprocessed, `-1` processed, `-2` permanently
    /// skipped; positive during triangulation, where it holds the
    /// sweep-order rank.
    index: i32,
    left: VertIdx,
    right: VertIdx,
    edge_l: EdgeIdx,
    edge_r: EdgeIdx,
    order: Links,
}

impl VertAdj {
    fn processed(&self) -> bool {
        self.index < 0
    }

    fn set_processed(&mut self, processed: bool) {
        // A permanently skipped record stays skipped.
        if self.index == SKIPPED {
            return;
        }
        self.index = if processed { PROCESSED } else { 0 };
    }
}

impl Linked for VertAdj {
    fn links(&self) -> Links {
        self.order
    }
    fn links_mut(&mut self) -> &mut Links {
        &mut self.order
    }
}

/// One active or retired sweep edge.
///
/// Active edges pair up west↔east to delimit the interior of the monotone
/// polygons as they are built; the active list is ordered west to east
/// along the sweep line. The west edge of a pair runs against the winding
/// and the east edge with it, a topological constraint; if the polygon is
/// geometrically valid the west edge is also on the -x side, hence the
/// name.
struct Edge {
    /// Southernmost vertex currently bounding the edge.
    south: VertIdx,
    /// The paired edge of the same monotone.
    linked: EdgeIdx,
    /// Remembered neighbour edge. When a pair is retired this records the
    /// edge it used to sit next to, so the backward sweep reopens it in
    /// place instead of searching geometrically; a backward-sweep Merge
    /// stores here which edge to split against further down.
    reopen: EdgeIdx,
    /// Polygon winding is south→north for this edge (the east side of a
    /// monotone).
    forward: bool,
    flipped: bool,
    /// Whether the placement of this edge relative to its east neighbour
    /// was ε-certain when it was made.
    east_certain: bool,
    links: Links,
}

impl Linked for Edge {
    fn links(&self) -> Links {
        self.links
    }
    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum VertType {
    Start,
    Backward,
    Forward,
    Merge,
    End,
    Skip,
}

/// Entry of the forward sweep's attached-vertex queue, ordered so the
/// southernmost vertex pops first.
struct SweepEvent {
    y: f32,
    vert: VertIdx,
}

impl PartialEq for SweepEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SweepEvent {}

impl PartialOrd for SweepEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other.y.total_cmp(&self.y)
    }
}

/// Turns the input polygons into y-monotone polygons, then triangulates
/// them one by one.
pub(crate) struct Monotones {
    verts: Vec<VertAdj>,
    edges: Vec<Edge>,
    /// All vertices, in sweep order.
    sweep_order: List,
    /// Edges currently crossing the sweep line, west to east.
    active: List,
    /// Retired monotone pairs.
    inactive: List,
    /// A triangle of this height or less is degenerate.
    precision: f32,
    options: TriangulationOptions,
}

impl Monotones {
    pub(crate) fn new(
        polygons: &[IndexedPolygon],
        precision: f32,
        options: TriangulationOptions,
    ) -> Result<Self, TriangulationError> {
        let num_verts = polygons.iter().map(Vec::len).sum();
        let mut monotones = Monotones {
            verts: Vec::with_capacity(num_verts),
            edges: Vec::new(),
            sweep_order: EMPTY_LIST,
            active: EMPTY_LIST,
            inactive: EMPTY_LIST,
            precision,
            options,
        };

        let mut bound = 0.0_f32;
        for poly in polygons {
            let first = monotones.verts.len();
            for (i, vert) in poly.iter().enumerate() {
                let current = monotones.verts.len();
                monotones.verts.push(VertAdj {
                    pos: vert.position,
                    mesh_idx: vert.id,
                    index: 0,
                    left: NIL,
                    right: NIL,
                    edge_l: NIL,
                    edge_r: NIL,
                    order: UNLINKED,
                });
                list_insert_before(
                    &mut monotones.sweep_order,
                    &mut monotones.verts,
                    NIL,
                    current,
                );
                bound = bound
                    .max(vert.position.x.abs())
                    .max(vert.position.y.abs());
                if i > 0 {
                    monotones.link(current - 1, current);
                }
            }
            monotones.link(monotones.verts.len() - 1, first);
        }

        if monotones.precision <= 0.0 {
            monotones.precision = bound * DEFAULT_PRECISION_RATIO;
        }

        if !monotones.sweep_forward()? {
            monotones.check()?;
            if !monotones.sweep_back()? {
                monotones.check()?;
            }
        }
        Ok(monotones)
    }

    pub(crate) fn precision(&self) -> f32 {
        self.precision
    }

    fn link(&mut self, left: VertIdx, right: VertIdx) {
        self.verts[left].right = right;
        self.verts[right].left = left;
    }

    fn update_edge(&mut self, edge: EdgeIdx, vert: VertIdx) {
        self.edges[edge].south = vert;
        self.verts[vert].edge_l = edge;
        self.verts[vert].edge_r = edge;
    }

    fn link_edges(&mut self, edge1: EdgeIdx, edge2: EdgeIdx) {
        self.edges[edge1].linked = edge2;
        self.edges[edge2].linked = edge1;
    }

    /// Fuse the two active edges arriving from `vert`'s ring neighbours at
    /// `vert` itself.
    fn close_end(&mut self, vert: VertIdx, edge_r: EdgeIdx, edge_l: EdgeIdx) {
        self.edges[edge_r].south = vert;
        self.edges[edge_l].south = vert;
        self.verts[vert].edge_r = edge_r;
        self.verts[vert].edge_l = edge_l;
    }

    /// Opposite end of the edge, following the ring in winding direction.
    fn north(&self, edge: EdgeIdx) -> VertIdx {
        let edge = &self.edges[edge];
        if edge.forward {
            self.verts[edge.south].right
        } else {
            self.verts[edge.south].left
        }
    }

    fn east_of(&self, edge: EdgeIdx, vert: VertIdx, precision: f32) -> i32 {
        let south = self.verts[self.edges[edge].south].pos;
        let north = self.verts[self.north(edge)].pos;
        let pos = self.verts[vert].pos;
        if south.x - precision > pos.x && north.x - precision > pos.x {
            return 1;
        }
        if south.x + precision < pos.x && north.x + precision < pos.x {
            return -1;
        }
        ccw(south, north, pos, precision)
    }

    fn is_start(&self, vert: VertIdx) -> bool {
        let v = &self.verts[vert];
        let left = &self.verts[v.left];
        let right = &self.verts[v.right];
        (left.pos.y >= v.pos.y && right.pos.y > v.pos.y)
            || (left.pos.y == v.pos.y
                && right.pos.y == v.pos.y
                && left.pos.x <= v.pos.x
                && right.pos.x < v.pos.x)
    }

    fn is_past(&self, vert: VertIdx, other: VertIdx) -> bool {
        self.verts[vert].pos.y > self.verts[other].pos.y + self.precision
    }

    /// Classify a vertex from the processed state of its ring neighbours.
    /// Shared between the forward and backward sweeps: the inversion of the
    /// sweep direction inverts the processed states, so the same rules give
    /// the topology relative to either sweep line.
    fn process_vert(&mut self, vert: VertIdx) -> VertType {
        let right = self.verts[vert].right;
        let left = self.verts[vert].left;
        if self.verts[right].processed() {
            if self.verts[left].processed() {
                let edge_r = self.verts[right].edge_l;
                let edge_l = self.verts[left].edge_r;

                if self.edges[edge_r].links.next != edge_l
                    && self.edges[edge_l].links.next != edge_r
                {
                    sweep_log!(self, "Skip");
                    return VertType::Skip;
                }

                self.close_end(vert, edge_r, edge_l);
                let (outer_l, outer_r) = (self.edges[edge_l].linked, self.edges[edge_r].linked);
                self.link_edges(outer_l, outer_r);

                if self.edges[edge_r].links.next == edge_l {
                    // The neighbours' edges face in.
                    sweep_log!(self, "End");
                    VertType::End
                } else {
                    // Facing out: the interior continues on both sides.
                    sweep_log!(self, "Merge");
                    VertType::Merge
                }
            } else {
                let bwd_edge = self.verts[right].edge_l;
                let fwd_edge = self.edges[bwd_edge].links.next;
                if fwd_edge != NIL {
                    let fwd_south = self.edges[fwd_edge].south;
                    let fwd_north = self.verts[fwd_south].right;
                    if !self.is_past(vert, right)
                        && !self.is_past(fwd_north, vert)
                        && self.is_past(vert, fwd_south)
                        && self.verts[vert].pos.x > self.verts[fwd_north].pos.x + self.precision
                    {
                        sweep_log!(self, "Skip backward edge");
                        return VertType::Skip;
                    }
                }
                self.update_edge(bwd_edge, vert);
                sweep_log!(self, "Backward");
                VertType::Backward
            }
        } else if self.verts[left].processed() {
            let fwd_edge = self.verts[left].edge_r;
            let bwd_edge = self.edges[fwd_edge].links.prev;
            if bwd_edge != NIL {
                let bwd_south = self.edges[bwd_edge].south;
                let bwd_north = self.verts[bwd_south].left;
                if !self.is_past(vert, left)
                    && !self.is_past(bwd_north, vert)
                    && self.is_past(vert, bwd_south)
                    && self.verts[vert].pos.x < self.verts[bwd_north].pos.x - self.precision
                {
                    sweep_log!(self, "Skip forward edge");
                    return VertType::Skip;
                }
            }
            self.update_edge(fwd_edge, vert);
            sweep_log!(self, "Forward");
            VertType::Forward
        } else {
            sweep_log!(self, "Start");
            VertType::Start
        }
    }

    /// Retire this edge and its pair to the east, remembering the edge they
    /// used to sit next to. When the backward sweep reopens the pair it is
    /// placed next to that last neighbour instead of using geometry.
    fn remove_pair(&mut self, west_edge: EdgeIdx) {
        let east_edge = self.edges[west_edge].links.next;
        let next_east = self.edges[east_edge].links.next;
        self.edges[west_edge].reopen = next_east;
        self.edges[east_edge].reopen = next_east;
        list_remove(&mut self.active, &mut self.edges, west_edge);
        list_insert_before(&mut self.inactive, &mut self.edges, NIL, west_edge);
        list_remove(&mut self.active, &mut self.edges, east_edge);
        list_insert_before(&mut self.inactive, &mut self.edges, NIL, east_edge);
    }

    /// Find the slot in the active-edge list for a new Start pair, decide
    /// hole vs. outer, and reconcile the two when they disagree: an
    /// ε-uncertain winding flips the hole decision, an ε-certain one shifts
    /// the slot instead. If neither repair applies the vertex is not yet
    /// placeable and is skipped.
    fn place_start(&mut self, vert: VertIdx) -> VertType {
        let mut east_edge = self.active.head;
        while east_edge != NIL && self.east_of(east_edge, vert, 0.0) <= 0 {
            east_edge = self.edges[east_edge].links.next;
        }

        let left = self.verts[self.verts[vert].left].pos;
        let pos = self.verts[vert].pos;
        let right = self.verts[self.verts[vert].right].pos;
        let mut is_hole = ccw(left, pos, right, 0.0) < 0;
        let hole_certain = ccw(left, pos, right, self.precision) != 0;
        let should_be_start = east_edge == NIL || !self.edges[east_edge].forward;

        if is_hole == should_be_start {
            if !hole_certain {
                is_hole = !is_hole;
            } else if east_edge != NIL && self.east_of(east_edge, vert, self.precision) <= 0 {
                east_edge = self.edges[east_edge].links.next;
            } else {
                let west = if east_edge == NIL {
                    self.active.tail
                } else {
                    self.edges[east_edge].links.prev
                };
                if east_edge != self.active.head && self.east_of(west, vert, self.precision) >= 0 {
                    east_edge = west;
                } else {
                    sweep_log!(self, "Skip start");
                    return VertType::Skip;
                }
            }
        }

        let east_certain = east_edge == NIL || self.east_of(east_edge, vert, self.precision) > 0;
        let new_east = self.alloc_edge(Edge {
            south: vert,
            linked: NIL,
            reopen: NIL,
            forward: !is_hole,
            flipped: false,
            east_certain,
            links: UNLINKED,
        });
        list_insert_before(&mut self.active, &mut self.edges, east_edge, new_east);
        let new_west = self.alloc_edge(Edge {
            south: vert,
            linked: NIL,
            reopen: NIL,
            forward: is_hole,
            flipped: false,
            east_certain: hole_certain,
            links: UNLINKED,
        });
        list_insert_before(&mut self.active, &mut self.edges, new_east, new_west);

        let v = &mut self.verts[vert];
        v.edge_r = if is_hole { new_west } else { new_east };
        v.edge_l = if is_hole { new_east } else { new_west };
        self.link_edges(new_east, new_west);
        VertType::Start
    }

    fn alloc_edge(&mut self, edge: Edge) -> EdgeIdx {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    fn alloc_vert_copy(&mut self, vert: VertIdx) -> VertIdx {
        let copy = self.verts[vert].clone();
        self.verts.push(copy);
        self.verts.len() - 1
    }

    /// The only operation that changes the polygons themselves; everything
    /// else is bookkeeping. Divides a ring by connecting two verts: both
    /// are duplicated, the originals form one side of the cut and the
    /// duplicates the other. Returns the east copy of `north`.
    fn split_verts(&mut self, north: VertIdx, south: VertIdx) -> VertIdx {
        sweep_log!(
            self,
            "split from {:?} to {:?}",
            self.verts[north].mesh_idx,
            self.verts[south].mesh_idx
        );

        let north_east = self.alloc_vert_copy(north);
        list_insert_before(&mut self.sweep_order, &mut self.verts, north, north_east);
        let north_left = self.verts[north].left;
        self.link(north_left, north_east);
        self.verts[north_east].set_processed(true);

        let south_east = self.alloc_vert_copy(south);
        let after_south = self.verts[south].order.next;
        list_insert_before(&mut self.sweep_order, &mut self.verts, after_south, south_east);
        let south_right = self.verts[south].right;
        self.link(south_east, south_right);
        self.verts[south_east].set_processed(true);

        self.link(south, north);
        self.link(north_east, south_east);

        north_east
    }

    /// Perform the split a backward-sweep Merge recorded on `west_edge`,
    /// if any, and clear the mark.
    fn check_split(&mut self, vert: VertIdx, west_edge: EdgeIdx) -> VertIdx {
        let reopen = self.edges[west_edge].reopen;
        if reopen != NIL {
            let south = self.edges[reopen].south;
            let east_vert = self.split_verts(vert, south);
            self.edges[west_edge].reopen = NIL;
            return east_vert;
        }
        vert
    }

    /// The forward (south to north) sweep. Tracks the monotone pairs and
    /// reorders degeneracies; the polygons themselves are not changed.
    /// Returns `true` when a tolerated geometry violation abandoned the
    /// sweep early.
    fn sweep_forward(&mut self) -> Result<bool, TriangulationError> {
        let mut next_attached: BinaryHeap<SweepEvent> = BinaryHeap::new();

        let mut starts = Vec::new();
        let mut v = self.sweep_order.head;
        while v != NIL {
            if self.is_start(v) {
                starts.push(v);
            }
            v = self.verts[v].order.next;
        }
        // Southernmost start at the back, so it pops first.
        starts.sort_by(|&a, &b| self.verts[b].pos.y.total_cmp(&self.verts[a].pos.y));

        let mut skipped: Vec<VertIdx> = Vec::new();
        let mut insert_at = self.sweep_order.head;

        while insert_at != NIL {
            // Fallback for completely degenerate polygons that have no
            // starts.
            let mut vert = insert_at;
            // Prefer attached neighbours, which may process starts without
            // needing a new pair.
            let take_attached = match (next_attached.peek(), starts.last()) {
                (Some(top), Some(&start)) => !self.is_past(top.vert, start),
                (Some(_), None) => true,
                (None, _) => false,
            };
            if take_attached {
                if let Some(top) = next_attached.pop() {
                    vert = top.vert;
                }
            } else if let Some(start) = starts.pop() {
                vert = start;
            } else {
                insert_at = self.verts[insert_at].order.next;
            }

            if self.verts[vert].processed() {
                continue;
            }

            sweep_log!(self, "mesh_idx = {:?}", self.verts[vert].mesh_idx);

            overlap_assert!(
                self,
                skipped.last().map_or(true, |&skip| !self.is_past(vert, skip)),
                GeometryError::StaleSkippedVertices
            );

            let mut vert_type = self.process_vert(vert);
            if vert_type == VertType::Start {
                vert_type = self.place_start(vert);
            }

            if vert_type == VertType::Skip {
                overlap_assert!(
                    self,
                    insert_at != NIL && self.verts[insert_at].order.next != NIL,
                    GeometryError::SkippedFinalVertex
                );
                overlap_assert!(
                    self,
                    !next_attached.is_empty() || !starts.is_empty(),
                    GeometryError::SkippedLastQueuedVertex
                );
                skipped.push(vert);
                sweep_log!(self, "skipping vert");
                continue;
            }

            // Splice the vertex into its sweep-order position.
            if vert == insert_at {
                insert_at = self.verts[insert_at].order.next;
            } else {
                list_remove(&mut self.sweep_order, &mut self.verts, vert);
                list_insert_before(&mut self.sweep_order, &mut self.verts, insert_at, vert);
            }

            match vert_type {
                VertType::Backward => {
                    let left = self.verts[vert].left;
                    next_attached.push(SweepEvent {
                        y: self.verts[left].pos.y,
                        vert: left,
                    });
                }
                VertType::Forward => {
                    let right = self.verts[vert].right;
                    next_attached.push(SweepEvent {
                        y: self.verts[right].pos.y,
                        vert: right,
                    });
                }
                VertType::Start => {
                    let (left, right) = (self.verts[vert].left, self.verts[vert].right);
                    next_attached.push(SweepEvent {
                        y: self.verts[left].pos.y,
                        vert: left,
                    });
                    next_attached.push(SweepEvent {
                        y: self.verts[right].pos.y,
                        vert: right,
                    });
                }
                VertType::Merge => {
                    let edge_l = self.verts[vert].edge_l;
                    self.remove_pair(edge_l);
                }
                VertType::End => {
                    let edge_r = self.verts[vert].edge_r;
                    self.remove_pair(edge_r);
                }
                VertType::Skip => {}
            }

            self.verts[vert].set_processed(true);

            // Skipped verts must be retried before the sweep moves on.
            while let Some(skip) = skipped.pop() {
                starts.push(skip);
            }

            self.log_active_edges();
        }
        Ok(false)
    }

    /// The backward sweep. Walks the vertices north to south, re-deriving
    /// each vertex type in the inverted orientation, and performs the
    /// splits that undo the fusions the forward sweep recorded. Everything
    /// is driven by stored topology; by construction this pass never needs
    /// to skip. Even though the sweep runs backward, the polygon is
    /// considered rotated, so the code still speaks of south-to-north and
    /// west-to-east.
    fn sweep_back(&mut self) -> Result<bool, TriangulationError> {
        let mut v = self.sweep_order.head;
        while v != NIL {
            self.verts[v].set_processed(false);
            v = self.verts[v].order.next;
        }

        let mut vert = self.sweep_order.tail;
        while vert != NIL {
            if self.verts[vert].processed() {
                vert = self.verts[vert].order.prev;
                continue;
            }

            sweep_log!(self, "mesh_idx = {:?}", self.verts[vert].mesh_idx);

            let vert_type = self.process_vert(vert);
            overlap_assert!(
                self,
                vert_type != VertType::Skip,
                GeometryError::SkipOnBackwardSweep
            );

            let mut cur = vert;
            match vert_type {
                VertType::Merge => {
                    let edge_r = self.verts[cur].edge_r;
                    cur = self.check_split(cur, edge_r);
                    let edge_l = self.verts[cur].edge_l;
                    let west_of = self.edges[edge_l].links.prev;
                    if west_of != NIL {
                        self.check_split(cur, west_of);
                        self.edges[west_of].reopen = edge_l;
                    }
                    self.retire_pair_of(cur);
                }
                VertType::End => {
                    let edge_r = self.verts[cur].edge_r;
                    self.check_split(cur, edge_r);
                    self.retire_pair_of(cur);
                }
                VertType::Forward => {
                    let edge_l = self.verts[cur].edge_l;
                    let west_of = self.edges[edge_l].links.prev;
                    if west_of != NIL {
                        self.check_split(cur, west_of);
                    }
                }
                VertType::Backward => {
                    let edge_r = self.verts[cur].edge_r;
                    self.check_split(cur, edge_r);
                }
                VertType::Start => {
                    // East and west are swapped in this direction, what was
                    // the next pair is now the previous pair, and begin and
                    // end trade places.
                    let mut west_edge = self.verts[cur].edge_l;
                    let mut east_edge = self.verts[cur].edge_r;
                    let mut east_of = self.edges[west_edge].reopen;

                    if self.edges[east_edge].links.next == west_edge {
                        mem::swap(&mut west_edge, &mut east_edge);
                    }
                    if !self.edges[west_edge].flipped {
                        mem::swap(&mut west_edge, &mut east_edge);
                        east_of = if east_of == NIL {
                            self.active.head
                        } else {
                            self.edges[east_of].links.next
                        };
                    }

                    list_remove(&mut self.inactive, &mut self.edges, east_edge);
                    list_insert_before(&mut self.active, &mut self.edges, east_of, east_edge);
                    list_remove(&mut self.inactive, &mut self.edges, west_edge);
                    list_insert_before(&mut self.active, &mut self.edges, east_edge, west_edge);
                    self.edges[west_edge].forward ^= true;
                    self.edges[east_edge].forward ^= true;
                    let is_hole = self.edges[west_edge].forward;

                    if is_hole {
                        let west_of = self.edges[west_edge].links.prev;
                        overlap_assert!(
                            self,
                            west_of != NIL,
                            GeometryError::HoleWithoutEnclosingPair
                        );
                        let reopen = self.edges[west_of].reopen;
                        let split = if reopen != NIL {
                            self.edges[reopen].south
                        } else {
                            let west_south = self.edges[west_of].south;
                            let east_south = if east_of == NIL {
                                NIL
                            } else {
                                self.edges[east_of].south
                            };
                            if east_south != NIL
                                && self.verts[west_south].pos.y < self.verts[east_south].pos.y
                            {
                                east_south
                            } else {
                                west_south
                            }
                        };
                        let east_vert = self.split_verts(cur, split);
                        self.edges[west_of].reopen = NIL;
                        self.update_edge(east_edge, east_vert);
                        self.update_edge(west_edge, cur);
                    } else {
                        self.verts[cur].edge_l = west_edge;
                        self.verts[cur].edge_r = east_edge;
                    }
                    self.edges[west_edge].reopen = NIL;
                    self.edges[east_edge].reopen = NIL;
                }
                VertType::Skip => {}
            }

            self.verts[cur].set_processed(true);
            self.log_active_edges();
            vert = self.verts[cur].order.prev;
        }
        Ok(false)
    }

    /// Move both of `vert`'s edges out of the active list.
    fn retire_pair_of(&mut self, vert: VertIdx) {
        let edge_r = self.verts[vert].edge_r;
        let edge_l = self.verts[vert].edge_l;
        list_remove(&mut self.active, &mut self.edges, edge_r);
        list_insert_before(&mut self.inactive, &mut self.edges, NIL, edge_r);
        list_remove(&mut self.active, &mut self.edges, edge_l);
        list_insert_before(&mut self.inactive, &mut self.edges, NIL, edge_l);
    }

    /// Sanity checks on the rings between sweeps. Only performed when
    /// intermediate checks are enabled.
    fn check(&mut self) -> Result<(), TriangulationError> {
        if !self.options.intermediate_checks {
            return Ok(());
        }
        let mut v = self.sweep_order.head;
        while v != NIL {
            self.verts[v].set_processed(false);
            let right = self.verts[v].right;
            if self.verts[right].right == v {
                return Err(TopologyError::DegenerateMonotone.into());
            }
            if self.verts[self.verts[v].left].right != v {
                return Err(TopologyError::BrokenRing.into());
            }
            v = self.verts[v].order.next;
        }
        self.log_monotones();
        Ok(())
    }

    fn first_unprocessed(&self) -> VertIdx {
        let mut v = self.sweep_order.head;
        while v != NIL {
            if !self.verts[v].processed() {
                return v;
            }
            v = self.verts[v].order.next;
        }
        NIL
    }

    /// Triangulate the now-monotone rings. Each ring is walked from its
    /// southernmost vertex, feeding the reflex-chain triangulator whichever
    /// of the two open ends comes next in sweep order.
    pub(crate) fn triangulate(&mut self) -> Result<Vec<Triangle>, TriangulationError> {
        let mut triangles = Vec::with_capacity(self.verts.len());

        // Save the sweep-line rank in each vert to drive the walks.
        let mut rank = 1;
        let mut v = self.sweep_order.head;
        while v != NIL {
            self.verts[v].index = rank;
            rank += 1;
            v = self.verts[v].order.next;
        }

        let mut triangles_left = self.verts.len() as i64;
        let mut start = self.sweep_order.head;
        while start != NIL {
            sweep_log!(self, "monotone seed {:?}", self.verts[start].mesh_idx);
            let mut mono = MonotoneTriangulator::new(
                self.verts[start].pos,
                self.verts[start].mesh_idx,
                self.precision,
            );
            self.verts[start].set_processed(true);
            let mut v_right = self.verts[start].right;
            let mut v_left = self.verts[start].left;
            while v_right != v_left {
                if self.verts[v_right].index < self.verts[v_left].index {
                    let v = &self.verts[v_right];
                    mono.process_vert(v.pos, v.mesh_idx, true, false, &mut triangles);
                    self.verts[v_right].set_processed(true);
                    v_right = self.verts[v_right].right;
                } else {
                    let v = &self.verts[v_left];
                    mono.process_vert(v.pos, v.mesh_idx, false, false, &mut triangles);
                    self.verts[v_left].set_processed(true);
                    v_left = self.verts[v_left].left;
                }
            }
            let v = &self.verts[v_right];
            mono.process_vert(v.pos, v.mesh_idx, true, true, &mut triangles);
            self.verts[v_right].set_processed(true);

            if mono.num_triangles() == 0 {
                return Err(TopologyError::EmptyMonotone.into());
            }
            triangles_left -= 2 + mono.num_triangles() as i64;

            start = self.first_unprocessed();
        }
        if triangles_left != 0 {
            return Err(TopologyError::TriangleCountMismatch.into());
        }
        Ok(triangles)
    }

    #[cfg(debug_assertions)]
    fn log_active_edges(&self) {
        if !self.options.verbose {
            return;
        }
        println!("active edges:");
        let mut e = self.active.head;
        while e != NIL {
            let edge = &self.edges[e];
            println!(
                "{}: S = {:?}, N = {:?},{}{}",
                if edge.forward { "Fwd" } else { "Bwd" },
                self.verts[edge.south].mesh_idx,
                self.verts[self.north(e)].mesh_idx,
                if edge.reopen == NIL { " none" } else { " reopen" },
                if edge.east_certain {
                    " certain"
                } else {
                    " uncertain"
                },
            );
            let back = if edge.forward {
                self.verts[edge.south].edge_r
            } else {
                self.verts[edge.south].edge_l
            };
            if back != e {
                println!("edge does not point back at its south vert!");
            }
            e = edge.links.next;
        }
    }

    #[cfg(not(debug_assertions))]
    fn log_active_edges(&self) {}

    #[cfg(debug_assertions)]
    fn log_monotones(&mut self) {
        if !self.options.verbose {
            return;
        }
        let mut start = self.first_unprocessed();
        while start != NIL {
            self.verts[start].set_processed(true);
            println!(
                "monotone start: {:?}, {}",
                self.verts[start].mesh_idx, self.verts[start].pos.y
            );
            let mut v = self.verts[start].right;
            while v != start {
                println!("{:?}, {}", self.verts[v].mesh_idx, self.verts[v].pos.y);
                self.verts[v].set_processed(true);
                v = self.verts[v].right;
            }
            println!();
            start = self.first_unprocessed();
        }
    }

    #[cfg(not(debug_assertions))]
    fn log_monotones(&mut self) {}
}

/// Triangulates a set of ε-valid polygons. If the input is not ε-valid the
/// triangulation may overlap, but it always matches the input edge
/// directions with a manifold set of triangles.
///
/// Outer contours are wound counter-clockwise, holes clockwise. The output
/// triangles reference the points of all polygons numbered 0..N−1 in
/// traversal order. `precision` is the value of ε bounding the uncertainty
/// of the input; a non-positive value requests the default of
/// 1e-5 times the largest absolute input coordinate.
pub fn triangulate(polygons: &[SimplePolygon], precision: f32) -> TriangulationResult {
    triangulate_with_options(polygons, precision, &TriangulationOptions::DEFAULT)
}

/// Same as [`triangulate`], with explicit options.
pub fn triangulate_with_options(
    polygons: &[SimplePolygon],
    precision: f32,
    options: &TriangulationOptions,
) -> TriangulationResult {
    let mut next_id = 0u32;
    let indexed: Vec<IndexedPolygon> = polygons
        .iter()
        .map(|poly| {
            poly.iter()
                .map(|&position| {
                    let vert = PolygonVertex {
                        position,
                        id: VertexId(next_id),
                    };
                    next_id += 1;
                    vert
                })
                .collect()
        })
        .collect();
    triangulate_indexed_with_options(&indexed, precision, options)
}

/// Triangulates a set of ε-valid polygons whose vertices carry
/// caller-supplied ids, which the output triangles reference verbatim.
///
/// This is the entry point for a surrounding mesh pipeline: the 2D
/// projected positions come with references back into the original mesh,
/// and those references are what the triangles are made of.
pub fn triangulate_indexed(polygons: &[IndexedPolygon], precision: f32) -> TriangulationResult {
    triangulate_indexed_with_options(polygons, precision, &TriangulationOptions::DEFAULT)
}

/// Same as [`triangulate_indexed`], with explicit options.
pub fn triangulate_indexed_with_options(
    polygons: &[IndexedPolygon],
    precision: f32,
    options: &TriangulationOptions,
) -> TriangulationResult {
    if precision.is_nan() {
        return Err(UnsupportedParameter::PrecisionIsNaN.into());
    }
    for poly in polygons {
        if poly.len() < 3 {
            return Err(UnsupportedParameter::PolygonTooSmall.into());
        }
        for vert in poly {
            if !vert.position.x.is_finite() || !vert.position.y.is_finite() {
                return Err(UnsupportedParameter::PositionNotFinite.into());
            }
        }
    }

    let result = (|| -> TriangulationResult {
        let mut monotones = Monotones::new(polygons, precision, *options)?;
        let triangles = monotones.triangulate()?;
        if options.intermediate_checks {
            check_topology(&triangles, polygons)?;
            if !options.process_overlaps {
                check_geometry(&triangles, polygons, 2.0 * monotones.precision())?;
            }
        }
        Ok(triangles)
    })();

    if let Err(ref error) = result {
        dump_failure(polygons, precision, error, options);
    }
    result
}

#[cfg(debug_assertions)]
fn dump_failure(
    polygons: &[IndexedPolygon],
    precision: f32,
    error: &TriangulationError,
    options: &TriangulationOptions,
) {
    if !options.verbose {
        return;
    }
    println!("triangulation failed: {error}, precision = {precision}");
    for poly in polygons {
        println!("polygon:");
        for vert in poly {
            println!(
                "    {{{}, {}}},  // {:?}",
                vert.position.x, vert.position.y, vert.id
            );
        }
    }
}

#[cfg(not(debug_assertions))]
fn dump_failure(
    _polygons: &[IndexedPolygon],
    _precision: f32,
    _error: &TriangulationError,
    _options: &TriangulationOptions,
) {
}
