//! Edge collapse decimation
//!
//! Implements iterative edge collapse mesh decimation using a half-edge
//! data structure for efficient topology operations and quadric error metrics
//! (QEM) for error-driven edge prioritization.

use crate::{MeshDecimationEngine, ProgressCallback};
use meshdec_core::{Error, Float, IndexTriple, IndexedMesh, Point3f, Result};
use nalgebra::{Matrix4, Vector4};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

const INVALID: usize = usize::MAX;

/// Collapses between two full queue rebuilds
const REBUILD_INTERVAL: usize = 100;

// ============================================================
// Half-Edge Data Structure
// ============================================================

#[derive(Debug, Clone)]
struct HalfEdge {
    target: usize,
    twin: usize,
    next: usize,
    prev: usize,
    face: usize,
}

/// Half-edge mesh for topology-aware edge collapse operations.
struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex (INVALID if removed or unreferenced)
    vertex_edge: Vec<usize>,
    /// One half-edge per face (INVALID if removed)
    face_edge: Vec<usize>,
    active_face_count: usize,
    active_vertex_count: usize,
    positions: Vec<Point3f>,
    quadrics: Vec<Matrix4<f64>>,
    vertex_removed: Vec<bool>,
}

impl HalfEdgeMesh {
    fn new(positions: &[Point3f], faces: &[[usize; 3]]) -> Self {
        let nv = positions.len();
        let nf = faces.len();

        let mut half_edges = Vec::with_capacity(nf * 3);
        let mut vertex_edge = vec![INVALID; nv];
        let mut face_edge = Vec::with_capacity(nf);

        for (fi, face) in faces.iter().enumerate() {
            let base = fi * 3;
            for j in 0..3usize {
                half_edges.push(HalfEdge {
                    target: face[(j + 1) % 3],
                    twin: INVALID,
                    next: base + (j + 1) % 3,
                    prev: base + (j + 2) % 3,
                    face: fi,
                });
                if vertex_edge[face[j]] == INVALID {
                    vertex_edge[face[j]] = base + j;
                }
            }
            face_edge.push(base);
        }

        // Build twin pointers; a directed edge shared by more than two faces
        // keeps only its first pairing
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(nf * 3);
        for (he_idx, he) in half_edges.iter().enumerate() {
            let src = half_edges[he.prev].target;
            edge_map.entry((src, he.target)).or_insert(he_idx);
        }
        for he_idx in 0..half_edges.len() {
            if half_edges[he_idx].twin != INVALID {
                continue;
            }
            let src = half_edges[half_edges[he_idx].prev].target;
            let tgt = half_edges[he_idx].target;
            if let Some(&twin_idx) = edge_map.get(&(tgt, src)) {
                if half_edges[twin_idx].twin == INVALID {
                    half_edges[he_idx].twin = twin_idx;
                    half_edges[twin_idx].twin = he_idx;
                }
            }
        }

        let active_vertex_count = vertex_edge.iter().filter(|&&he| he != INVALID).count();
        let mut hem = HalfEdgeMesh {
            half_edges,
            vertex_edge,
            face_edge,
            active_face_count: nf,
            active_vertex_count,
            positions: positions.to_vec(),
            quadrics: vec![Matrix4::zeros(); nv],
            vertex_removed: vec![false; nv],
        };
        hem.initialize_quadrics();
        hem
    }

    #[inline]
    fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].target
    }

    fn compute_plane(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> Vector4<f64> {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let n = e1.cross(&e2).normalize();
        if !n.iter().all(|x| x.is_finite()) {
            // Zero-area triangle: no plane, no contribution
            return Vector4::zeros();
        }
        let d = -n.dot(&v0.coords);
        Vector4::new(n.x as f64, n.y as f64, n.z as f64, d as f64)
    }

    fn plane_to_quadric(p: &Vector4<f64>) -> Matrix4<f64> {
        p * p.transpose()
    }

    fn initialize_quadrics(&mut self) {
        for fi in 0..self.face_edge.len() {
            let he0 = self.face_edge[fi];
            if he0 == INVALID {
                continue;
            }
            let he1 = self.half_edges[he0].next;
            let v0 = self.source(he0);
            let v1 = self.half_edges[he0].target;
            let v2 = self.half_edges[he1].target;
            let plane =
                Self::compute_plane(&self.positions[v0], &self.positions[v1], &self.positions[v2]);
            let q = Self::plane_to_quadric(&plane);
            self.quadrics[v0] += q;
            self.quadrics[v1] += q;
            self.quadrics[v2] += q;
        }
    }

    /// Outgoing half-edges of `v`. An open fan is walked from the anchor in
    /// both directions, so boundary vertices see their whole umbrella.
    fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let start = self.vertex_edge[v];
        if start == INVALID {
            return Vec::new();
        }

        let limit = self.half_edges.len();
        let mut fan = vec![start];

        let mut he = self.half_edges[self.half_edges[start].prev].twin;
        while he != INVALID && fan.len() <= limit {
            if he == start {
                return fan;
            }
            fan.push(he);
            he = self.half_edges[self.half_edges[he].prev].twin;
        }

        // Hit a border: continue on the other side of the anchor
        let mut twin = self.half_edges[start].twin;
        while twin != INVALID && fan.len() <= limit {
            let he = self.half_edges[twin].next;
            if he == start {
                break;
            }
            fan.push(he);
            twin = self.half_edges[he].twin;
        }

        fan
    }

    fn neighbors(&self, v: usize) -> HashSet<usize> {
        self.outgoing_half_edges(v)
            .iter()
            .map(|&he| self.half_edges[he].target)
            .collect()
    }

    fn is_boundary_vertex(&self, v: usize) -> bool {
        self.outgoing_half_edges(v)
            .iter()
            .any(|&he| self.half_edges[he].twin == INVALID)
    }

    /// Check the link condition: common neighbors must equal exactly the
    /// face apices opposite the edge (2 for interior, 1 for boundary).
    fn check_link_condition(&self, v1: usize, v2: usize) -> bool {
        let n1 = self.neighbors(v1);
        let n2 = self.neighbors(v2);
        let common_count = n1.intersection(&n2).count();

        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };
        let is_boundary = self.half_edges[h].twin == INVALID;
        let expected = if is_boundary { 1 } else { 2 };
        common_count == expected
    }

    fn find_half_edge(&self, from: usize, to: usize) -> Option<usize> {
        self.outgoing_half_edges(from)
            .into_iter()
            .find(|&he| self.half_edges[he].target == to)
    }

    fn is_alive(&self, v: usize) -> bool {
        !self.vertex_removed[v] && self.vertex_edge[v] != INVALID
    }

    /// Point minimizing the merged quadric of `v1` and `v2`, with its
    /// quadric cost. A singular quadric places the point at the edge midpoint.
    fn placement(&self, v1: usize, v2: usize) -> (Point3f, f64) {
        let q = self.quadrics[v1] + self.quadrics[v2];
        let position = q
            .fixed_view::<3, 3>(0, 0)
            .try_inverse()
            .map(|inv| {
                let p = -inv * q.fixed_view::<3, 1>(0, 3);
                Point3f::new(p.x as Float, p.y as Float, p.z as Float)
            })
            .unwrap_or_else(|| nalgebra::center(&self.positions[v1], &self.positions[v2]));
        (position, quadric_cost(&q, &position))
    }

    /// Find any valid outgoing half-edge from a vertex (linear scan fallback).
    fn find_valid_outgoing(&self, v: usize) -> usize {
        for (i, he) in self.half_edges.iter().enumerate() {
            if he.face != INVALID && self.source(i) == v {
                return i;
            }
        }
        INVALID
    }

    /// Unlink the face owning `he` and stitch the twins of its other two
    /// edges to each other. Returns those twins as (after `he`, before `he`).
    fn remove_face(&mut self, he: usize) -> (usize, usize) {
        let next = self.half_edges[he].next;
        let prev = self.half_edges[he].prev;
        let next_twin = self.half_edges[next].twin;
        let prev_twin = self.half_edges[prev].twin;

        if next_twin != INVALID {
            self.half_edges[next_twin].twin = prev_twin;
        }
        if prev_twin != INVALID {
            self.half_edges[prev_twin].twin = next_twin;
        }

        let face = self.half_edges[he].face;
        for edge in [he, next, prev] {
            self.half_edges[edge].face = INVALID;
        }
        self.face_edge[face] = INVALID;
        self.active_face_count -= 1;

        (next_twin, prev_twin)
    }

    /// Give `v` a live anchor once its current one sits on a removed face
    fn reanchor(&mut self, v: usize, candidate: usize) {
        let anchor = self.vertex_edge[v];
        if anchor == INVALID || self.half_edges[anchor].face != INVALID {
            return;
        }
        self.vertex_edge[v] = if candidate != INVALID && self.half_edges[candidate].face != INVALID {
            candidate
        } else {
            self.find_valid_outgoing(v)
        };
    }

    /// Merge `v2` into `v1` and move `v1` to `position`. The faces on either
    /// side of the edge disappear. Returns false if no edge joins the two.
    fn collapse_edge(&mut self, v1: usize, v2: usize, position: Point3f) -> bool {
        let h = match self.find_half_edge(v1, v2) {
            Some(h) => h,
            None => return false,
        };
        let opposite = self.half_edges[h].twin;
        let c = self.half_edges[self.half_edges[h].next].target;
        let d = if opposite != INVALID {
            self.half_edges[self.half_edges[opposite].next].target
        } else {
            INVALID
        };

        // v2's umbrella as it was before any face goes away
        let v2_fan = self.outgoing_half_edges(v2);

        let (c_to_v2, v1_to_c) = self.remove_face(h);
        let d_to_v1 = if opposite != INVALID {
            self.remove_face(opposite).0
        } else {
            INVALID
        };

        for &he in &v2_fan {
            let incoming = self.half_edges[he].prev;
            self.half_edges[incoming].target = v1;

            let twin = self.half_edges[he].twin;
            if twin != INVALID && self.half_edges[twin].face != INVALID {
                self.half_edges[twin].target = v1;
            }
        }

        self.reanchor(v1, v1_to_c);
        if c != INVALID {
            self.reanchor(c, c_to_v2);
        }
        if d != INVALID && d != c {
            self.reanchor(d, d_to_v1);
        }

        self.vertex_edge[v2] = INVALID;
        self.vertex_removed[v2] = true;
        self.active_vertex_count -= 1;

        let absorbed = self.quadrics[v2];
        self.quadrics[v1] += absorbed;
        self.positions[v1] = position;

        true
    }

    /// Compact surviving vertices and faces into an indexed mesh
    fn to_indexed_mesh(&self) -> IndexedMesh {
        let mut old_to_new: HashMap<usize, usize> = HashMap::new();
        let mut points = Vec::new();

        for i in 0..self.positions.len() {
            if self.is_alive(i) {
                old_to_new.insert(i, points.len());
                points.push(self.positions[i]);
            }
        }

        let mut triangles = Vec::new();
        for fi in 0..self.face_edge.len() {
            let he0 = self.face_edge[fi];
            if he0 == INVALID {
                continue;
            }
            let he1 = self.half_edges[he0].next;
            let v0 = self.source(he0);
            let v1 = self.half_edges[he0].target;
            let v2 = self.half_edges[he1].target;

            if let (Some(&nv0), Some(&nv1), Some(&nv2)) =
                (old_to_new.get(&v0), old_to_new.get(&v1), old_to_new.get(&v2))
            {
                if nv0 != nv1 && nv1 != nv2 && nv2 != nv0 {
                    // Compacted indices never exceed the i32 input indices
                    triangles.push(IndexTriple::new(nv0 as i32, nv1 as i32, nv2 as i32));
                }
            }
        }

        IndexedMesh::from_parts(points, triangles)
    }
}

// ============================================================
// Edge Cost for Priority Queue
// ============================================================

#[derive(Debug, Clone)]
struct EdgeCost {
    v1: usize,
    v2: usize,
    cost: f64,
}

impl PartialEq for EdgeCost {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}
impl Eq for EdgeCost {}

impl PartialOrd for EdgeCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCost {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest cost first
        other.cost.total_cmp(&self.cost)
    }
}

/// `vᵀ Q v` for `p` in homogeneous coordinates, never negative
fn quadric_cost(q: &Matrix4<f64>, p: &Point3f) -> f64 {
    let v = Vector4::new(f64::from(p.x), f64::from(p.y), f64::from(p.z), 1.0);
    v.dot(&(q * v)).max(0.0)
}

/// Geometric error of a quadric cost, in the units of the coordinates
fn geometric_error(cost: f64) -> f64 {
    cost.max(0.0).sqrt()
}

// ============================================================
// Edge Collapse Decimator
// ============================================================

/// Edge collapse decimation engine using a half-edge structure and QEM.
///
/// Edges are collapsed cheapest first, with each merged vertex placed at the
/// position minimizing the summed quadric of its two endpoints. Collapses that
/// would break the link condition are skipped, so manifold input stays
/// manifold. The decimated mesh is compacted: removed and unreferenced
/// vertices are dropped and indices remapped.
pub struct EdgeCollapseDecimator {
    /// Never collapse an edge touching the mesh boundary
    pub preserve_boundary: bool,
    /// Extra cost added to boundary edges when they may collapse
    pub boundary_weight: f64,
    callback: Option<ProgressCallback>,
    points: Vec<Point3f>,
    faces: Vec<[usize; 3]>,
    initialized: bool,
    result: IndexedMesh,
    max_error_reached: f64,
}

impl Default for EdgeCollapseDecimator {
    fn default() -> Self {
        Self {
            preserve_boundary: false,
            boundary_weight: 0.0,
            callback: None,
            points: Vec::new(),
            faces: Vec::new(),
            initialized: false,
            result: IndexedMesh::new(),
            max_error_reached: 0.0,
        }
    }
}

impl EdgeCollapseDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundary(preserve_boundary: bool, boundary_weight: f64) -> Self {
        Self {
            preserve_boundary,
            boundary_weight,
            ..Self::default()
        }
    }

    /// Largest geometric error introduced by a collapse in the last run
    pub fn max_error_reached(&self) -> f64 {
        self.max_error_reached
    }

    fn report(&mut self, message: &str) {
        if let Some(callback) = self.callback.as_mut() {
            callback(message);
        }
    }

    /// One candidate per live edge, keyed from `id_offset` upward
    fn build_queue(&self, hem: &HalfEdgeMesh, id_offset: usize) -> PriorityQueue<usize, EdgeCost> {
        let mut queue = PriorityQueue::new();
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();
        let mut edge_id = id_offset;

        for vi in 0..hem.positions.len() {
            if !hem.is_alive(vi) {
                continue;
            }
            for &he in &hem.outgoing_half_edges(vi) {
                if hem.half_edges[he].face == INVALID {
                    continue;
                }
                let target = hem.half_edges[he].target;
                let key = (vi.min(target), vi.max(target));
                if !seen_edges.insert(key) {
                    continue;
                }

                let on_boundary = hem.is_boundary_vertex(vi) || hem.is_boundary_vertex(target);
                if self.preserve_boundary && on_boundary {
                    continue;
                }

                let (_, mut cost) = hem.placement(vi, target);
                if on_boundary {
                    cost += self.boundary_weight;
                }

                queue.push(
                    edge_id,
                    EdgeCost {
                        v1: vi,
                        v2: target,
                        cost,
                    },
                );
                edge_id += 1;
            }
        }

        queue
    }
}

/// Fraction of the requested reduction already achieved, in `[0, 1]`
fn reduction_progress(initial: usize, current: usize, target: usize) -> f64 {
    if initial <= target {
        return 1.0;
    }
    (initial - current.max(target)) as f64 / (initial - target) as f64
}

impl MeshDecimationEngine for EdgeCollapseDecimator {
    fn register_callback(&mut self, callback: ProgressCallback) {
        self.callback = Some(callback);
    }

    fn initialize(&mut self, points: &[Point3f], triangles: &[IndexTriple]) -> Result<()> {
        let mut faces = Vec::with_capacity(triangles.len());
        let mut degenerate = 0usize;

        for (ti, triangle) in triangles.iter().enumerate() {
            let face = triangle.to_usize(points.len()).ok_or_else(|| {
                Error::InvalidData(format!(
                    "triangle {} {} references a vertex outside 0..{}",
                    ti,
                    triangle,
                    points.len()
                ))
            })?;
            if triangle.is_degenerate() {
                degenerate += 1;
                continue;
            }
            faces.push(face);
        }

        self.points = points.to_vec();
        self.faces = faces;
        self.result = IndexedMesh::new();
        self.max_error_reached = 0.0;
        self.initialized = true;

        let message = format!(
            "+ Mesh: {} vertices, {} triangles\n",
            self.points.len(),
            self.faces.len()
        );
        self.report(&message);
        if degenerate > 0 {
            let message = format!("\t {} degenerate triangles dropped\n", degenerate);
            self.report(&message);
        }
        Ok(())
    }

    fn decimate(
        &mut self,
        target_vertex_count: usize,
        target_triangle_count: usize,
        max_error: Float,
    ) -> Result<()> {
        if !self.initialized {
            return Err(Error::Algorithm(
                "decimate called before initialize".to_string(),
            ));
        }
        if max_error.is_nan() || max_error < 0.0 {
            return Err(Error::InvalidData(format!(
                "maximum decimation error must be non-negative, got {}",
                max_error
            )));
        }

        let mut hem = HalfEdgeMesh::new(&self.points, &self.faces);
        let initial_vertices = hem.active_vertex_count;
        let initial_faces = hem.active_face_count;
        let max_error = f64::from(max_error);

        self.report("+ Decimation\n");
        let mut queue = self.build_queue(&hem, 0);
        let mut collapse_count = 0usize;
        let mut next_milestone = 10usize;
        self.max_error_reached = 0.0;

        while hem.active_vertex_count > target_vertex_count
            && hem.active_face_count > target_triangle_count
        {
            let (_, edge_cost) = match queue.pop() {
                Some(item) => item,
                None => break,
            };

            // The queue minimum already exceeds the bound
            if geometric_error(edge_cost.cost) > max_error {
                break;
            }

            let v1 = edge_cost.v1;
            let v2 = edge_cost.v2;

            // Stale candidate
            if !hem.is_alive(v1) || !hem.is_alive(v2) {
                continue;
            }
            if hem.find_half_edge(v1, v2).is_none() {
                continue;
            }

            if !hem.check_link_condition(v1, v2) {
                continue;
            }

            // Quadrics have moved on since the candidate was queued
            let (pos, cost) = hem.placement(v1, v2);
            let error = geometric_error(cost);
            if error > max_error {
                continue;
            }

            if hem.collapse_edge(v1, v2, pos) {
                collapse_count += 1;
                self.max_error_reached = self.max_error_reached.max(error);

                let progress = reduction_progress(
                    initial_faces,
                    hem.active_face_count,
                    target_triangle_count,
                )
                .max(reduction_progress(
                    initial_vertices,
                    hem.active_vertex_count,
                    target_vertex_count,
                ));
                let percent = (progress * 100.0) as usize;
                if percent >= next_milestone {
                    let message = format!(
                        "\t progress {}% ({} vertices, {} triangles)\n",
                        percent.min(100),
                        hem.active_vertex_count,
                        hem.active_face_count
                    );
                    self.report(&message);
                    next_milestone = (percent / 10 + 1) * 10;
                }

                if collapse_count % REBUILD_INTERVAL == 0 {
                    queue = self.build_queue(&hem, collapse_count * 1000);
                }
            }
        }

        self.result = hem.to_indexed_mesh();
        log::debug!(
            "edge collapse: {} collapses, max error {:.6}",
            collapse_count,
            self.max_error_reached
        );
        let message = format!(
            "+ Decimated mesh: {} vertices, {} triangles, max error {}\n",
            self.result.vertex_count(),
            self.result.triangle_count(),
            self.max_error_reached
        );
        self.report(&message);
        Ok(())
    }

    fn result_vertex_count(&self) -> usize {
        self.result.vertex_count()
    }

    fn result_triangle_count(&self) -> usize {
        self.result.triangle_count()
    }

    fn extract_result(&self, out_points: &mut [Point3f], out_triangles: &mut [IndexTriple]) -> Result<()> {
        if out_points.len() != self.result.vertex_count()
            || out_triangles.len() != self.result.triangle_count()
        {
            return Err(Error::InvalidData(format!(
                "output buffers sized {}/{} but result has {} vertices and {} triangles",
                out_points.len(),
                out_triangles.len(),
                self.result.vertex_count(),
                self.result.triangle_count()
            )));
        }
        out_points.copy_from_slice(&self.result.points);
        out_triangles.copy_from_slice(&self.result.triangles);
        Ok(())
    }
}
