//! Voronoi vertices via Delaunay tetrahedralization
//!
//! The Voronoi vertices of a 3D point set are the circumcenters of its
//! Delaunay tetrahedra, and the four corners of a tetrahedron are exactly the
//! points whose cells meet at that vertex. The tetrahedralization itself comes
//! from the `delaunay` crate; this module only turns its cells into
//! [`RawVertex`] records indexed by input point.

use delaunay::prelude::*;
use glam::DVec3;
use std::collections::HashMap;
use std::time::Instant;

use super::{affine_frame, RawDual, RawVertex, VoronoiDual};
use crate::error::{MedialError, Result};

/// Relative volume below which a cell is considered flat
const FLAT_EPSILON: f64 = 1e-14;

/// Delaunay-based [`VoronoiDual`] backend
///
/// Every finite cell of the tetrahedralization becomes one raw vertex. The
/// point at infinity is never materialized, so no vertex is reported as
/// unbounded. Points that coincide with an earlier point are skipped by the
/// triangulation and do not generate any vertex.
///
/// Vertices are sorted by their generator indices, so the output does not
/// depend on the triangulation's internal storage order.
///
/// # Example
///
/// ```rust
/// use medial_poles::{DelaunayDual, VoronoiDual};
/// use glam::DVec3;
///
/// let points = vec![
///     DVec3::new(1.0, 1.0, 1.0),
///     DVec3::new(1.0, -1.0, -1.0),
///     DVec3::new(-1.0, 1.0, -1.0),
///     DVec3::new(-1.0, -1.0, 1.0),
/// ];
///
/// let raw = DelaunayDual::new().compute(&points).unwrap();
/// assert_eq!(raw.vertices.len(), 1);
/// assert!(raw.vertices[0].position.length() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayDual;

impl DelaunayDual {
    pub fn new() -> Self {
        Self
    }
}

/// Circumcenter of a tetrahedron
///
/// Returns `None` when the four points are (numerically) coplanar.
fn circumcenter(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Option<DVec3> {
    let u = b - a;
    let v = c - a;
    let w = d - a;

    let det = u.dot(v.cross(w));
    let scale = u.length() * v.length() * w.length();
    if !det.is_finite() || det.abs() <= FLAT_EPSILON * scale {
        return None;
    }

    let offset = (u.length_squared() * v.cross(w)
        + v.length_squared() * w.cross(u)
        + w.length_squared() * u.cross(v))
        / (2.0 * det);

    Some(a + offset)
}

/// Exact bit pattern of a coordinate triple, for mapping vertices back to input indices
#[inline]
fn coord_key(coords: &[f64]) -> Option<[u64; 3]> {
    match coords {
        [x, y, z] => Some([x.to_bits(), y.to_bits(), z.to_bits()]),
        _ => None,
    }
}

impl VoronoiDual for DelaunayDual {
    fn compute(&self, points: &[DVec3]) -> Result<RawDual> {
        affine_frame(points)?;

        let start = Instant::now();

        // First occurrence wins, duplicates are dropped by the triangulation
        let mut index_of: HashMap<[u64; 3], usize> = HashMap::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            index_of
                .entry([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                .or_insert(i);
        }

        let vertices: Vec<_> = points.iter().map(|p| vertex!([p.x, p.y, p.z])).collect();
        let dt: DelaunayTriangulation<_, (), (), 3> = DelaunayTriangulation::new(&vertices)
            .map_err(|e| MedialError::DegenerateInput(format!("tetrahedralization failed: {}", e)))?;
        let tri = dt.as_triangulation();

        if tri.dim() < 3 {
            return Err(MedialError::DegenerateInput(format!(
                "triangulation has dimension {}",
                tri.dim()
            )));
        }

        let mut raw = Vec::with_capacity(tri.number_of_simplices());
        let mut flat = 0usize;
        for (cell_key, _) in tri.simplices() {
            let corners = tri.simplex_vertices(cell_key).ok_or_else(|| {
                MedialError::DegenerateInput("cell refers to a missing vertex".into())
            })?;

            let mut generators = Vec::with_capacity(corners.len());
            let mut positions = Vec::with_capacity(corners.len());
            for &vk in corners {
                let index = tri
                    .vertex_coords(vk)
                    .and_then(coord_key)
                    .and_then(|key| index_of.get(&key).copied())
                    .ok_or_else(|| {
                        MedialError::DegenerateInput("triangulation vertex not found among inputs".into())
                    })?;
                generators.push(index);
                positions.push(points[index]);
            }

            let &[a, b, c, d] = positions.as_slice() else {
                return Err(MedialError::DegenerateInput(format!(
                    "cell with {} corners in a 3D triangulation",
                    positions.len()
                )));
            };
            let Some(center) = circumcenter(a, b, c, d) else {
                flat += 1;
                continue;
            };

            generators.sort_unstable();
            raw.push(RawVertex {
                position: center,
                generators,
                unbounded: false,
            });
        }

        raw.sort_by(|x, y| x.generators.cmp(&y.generators));

        let skipped = points.len().saturating_sub(tri.number_of_vertices());
        if skipped > 0 {
            tracing::warn!(skipped, "duplicate points skipped during tetrahedralization");
        }
        tracing::debug!(
            points = points.len(),
            cells = tri.number_of_simplices(),
            flat,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "delaunay dual computed"
        );

        Ok(RawDual { vertices: raw })
    }
}
