//! Voronoi dual boundary
//!
//! The pole estimator never builds a Voronoi diagram itself. A [`VoronoiDual`]
//! backend turns a point set into raw Voronoi vertices (each tagged with the
//! points that generate it), and [`VoronoiDiagram::from_raw`] filters those
//! into the loci and per-point cell incidence the rest of the crate reads.

mod delaunay;

pub use delaunay::DelaunayDual;

use glam::DVec3;

use crate::bounds::Bounds;
use crate::error::{MedialError, Result};

/// Relative size below which a point set is treated as lower-dimensional
const SPAN_EPSILON: f64 = 1e-10;

/// A Voronoi vertex as produced by a backend, before bounding-volume filtering
#[derive(Debug, Clone, PartialEq)]
pub struct RawVertex {
    /// Vertex position
    pub position: DVec3,
    /// Indices of the input points whose cells meet at this vertex
    pub generators: Vec<usize>,
    /// Vertex belongs to the unbounded side of the dual and is never a locus
    pub unbounded: bool,
}

/// Raw output of a dual computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDual {
    pub vertices: Vec<RawVertex>,
}

/// Source of Voronoi vertices for a point set
///
/// Implementations must be deterministic: the same points produce the same
/// vertices in the same order. They fail with `DegenerateInput` when no
/// diagram can be built.
pub trait VoronoiDual {
    fn compute(&self, points: &[DVec3]) -> Result<RawDual>;
}

/// Dual that hands back a diagram computed elsewhere
///
/// Used to feed the output of an external geometry library (or a hand-built
/// fixture) through the same pipeline.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedDual {
    raw: RawDual,
}

impl PrecomputedDual {
    pub fn new(raw: RawDual) -> Self {
        Self { raw }
    }
}

impl VoronoiDual for PrecomputedDual {
    fn compute(&self, _points: &[DVec3]) -> Result<RawDual> {
        Ok(self.raw.clone())
    }
}

/// Loci inside the bounding volume and the cells that touch them
#[derive(Debug, Clone)]
pub struct VoronoiDiagram {
    /// Surviving Voronoi vertices, in the order they were encountered
    pub loci: Vec<DVec3>,
    /// Per input point, the loci on the boundary of its Voronoi cell
    pub incidence: Vec<Vec<usize>>,
    /// Volume the loci were filtered with
    pub bounds: Bounds,
    /// Raw vertices dropped for lying on the unbounded side
    pub discarded_unbounded: usize,
    /// Raw vertices dropped for lying outside `bounds`
    pub discarded_outside: usize,
}

impl VoronoiDiagram {
    /// Filter a raw dual into loci and cell incidence
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if a generator index is not below `point_count`
    /// - `DegenerateInput` if no vertex survives filtering
    pub fn from_raw(raw: &RawDual, bounds: Bounds, point_count: usize) -> Result<Self> {
        let mut loci = Vec::new();
        let mut incidence: Vec<Vec<usize>> = vec![Vec::new(); point_count];
        let mut discarded_unbounded = 0;
        let mut discarded_outside = 0;

        for vertex in &raw.vertices {
            if vertex.unbounded {
                discarded_unbounded += 1;
                continue;
            }
            if !vertex.position.is_finite() || !bounds.contains(vertex.position) {
                discarded_outside += 1;
                continue;
            }

            if let Some(&bad) = vertex.generators.iter().find(|&&g| g >= point_count) {
                return Err(MedialError::InvalidInput(format!(
                    "voronoi vertex references point {} but only {} points exist",
                    bad, point_count
                )));
            }

            let locus = loci.len();
            loci.push(vertex.position);

            for &g in &vertex.generators {
                let cell = &mut incidence[g];
                if !cell.contains(&locus) {
                    cell.push(locus);
                }
            }
        }

        if loci.is_empty() {
            return Err(MedialError::DegenerateInput(format!(
                "no voronoi vertex inside the bounding volume ({} raw, {} unbounded, {} outside)",
                raw.vertices.len(),
                discarded_unbounded,
                discarded_outside
            )));
        }

        tracing::debug!(
            loci = loci.len(),
            discarded_unbounded,
            discarded_outside,
            "filtered voronoi dual"
        );

        Ok(Self {
            loci,
            incidence,
            bounds,
            discarded_unbounded,
            discarded_outside,
        })
    }

    #[inline]
    pub fn locus_count(&self) -> usize {
        self.loci.len()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.incidence.len()
    }

    /// Loci on the boundary of a point's cell (empty for unknown points)
    pub fn cell(&self, point: usize) -> &[usize] {
        self.incidence
            .get(point)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }
}

/// Check that a point set spans a 3D volume
///
/// Returns four point indices forming a non-flat tetrahedron.
///
/// # Errors
///
/// Returns `DegenerateInput` if there are fewer than 4 points, any coordinate
/// is not finite, or the points are coincident, collinear or coplanar.
pub fn affine_frame(points: &[DVec3]) -> Result<[usize; 4]> {
    if points.len() < 4 {
        return Err(MedialError::DegenerateInput(format!(
            "need at least 4 points, got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(MedialError::DegenerateInput(format!(
            "point {} has a non-finite coordinate",
            i
        )));
    }

    let scale = Bounds::from_points(points)
        .map(|b| b.max_extent())
        .unwrap_or(0.0);
    if scale <= 0.0 {
        return Err(MedialError::DegenerateInput("all points coincide".into()));
    }

    let p0 = points[0];
    let (i1, d1) = argmax(points, |p| (p - p0).length());
    if d1 <= SPAN_EPSILON * scale {
        return Err(MedialError::DegenerateInput("all points coincide".into()));
    }

    let axis = (points[i1] - p0) / d1;
    let (i2, d2) = argmax(points, |p| (p - p0).cross(axis).length());
    if d2 <= SPAN_EPSILON * scale {
        return Err(MedialError::DegenerateInput("all points are collinear".into()));
    }

    let normal = (points[i1] - p0).cross(points[i2] - p0).normalize();
    let (i3, d3) = argmax(points, |p| (p - p0).dot(normal).abs());
    if d3 <= SPAN_EPSILON * scale {
        return Err(MedialError::DegenerateInput("all points are coplanar".into()));
    }

    Ok([0, i1, i2, i3])
}

/// Index and value of the largest `f(p)`, first index on ties
fn argmax(points: &[DVec3], f: impl Fn(DVec3) -> f64) -> (usize, f64) {
    points
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &p)| {
            let v = f(p);
            if v > best { (i, v) } else { (best_i, best) }
        })
}
