//! Negative pole selection
//!
//! For every surface sample the negative pole is the Voronoi locus on the
//! boundary of its cell that lies farthest along the inward normal. While the
//! cells are scanned, each locus also collects the samples that nominated it
//! (its spoke sources).

use glam::DVec3;
use smallvec::SmallVec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dual::VoronoiDiagram;
use crate::error::{MedialError, Result};

/// Deviation of `|n|` from 1 above which a normal is reported
const NORMAL_LENGTH_TOLERANCE: f64 = 1e-3;

/// Pole assignment of one surface sample
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pole {
    /// Interior pole found
    Resolved {
        /// Index into the diagram's loci
        locus: usize,
        /// Signed projection `dot(locus - point, normal)`, always negative
        depth: f64,
    },
    /// No locus of the cell lies on the interior side of the normal
    Unresolved,
}

impl Pole {
    #[inline]
    pub fn locus(&self) -> Option<usize> {
        match *self {
            Pole::Resolved { locus, .. } => Some(locus),
            Pole::Unresolved => None,
        }
    }

    #[inline]
    pub fn depth(&self) -> Option<f64> {
        match *self {
            Pole::Resolved { depth, .. } => Some(depth),
            Pole::Unresolved => None,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Pole::Resolved { .. })
    }
}

/// Samples that nominated a locus, in nomination order
///
/// Capacity is bounded by configuration; nominations past the cap are
/// counted in `dropped` instead of being stored.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpokeSources {
    pub points: SmallVec<[usize; 4]>,
    pub dropped: usize,
}

impl SpokeSources {
    /// Register a nominating point, returns false if the capacity is exhausted
    fn register(&mut self, point: usize, capacity: usize) -> bool {
        if self.points.len() < capacity {
            self.points.push(point);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total nominations observed, kept or dropped
    #[inline]
    pub fn nominations(&self) -> usize {
        self.points.len() + self.dropped
    }
}

/// Result of pole selection
#[derive(Debug, Clone, PartialEq)]
pub struct PoleSelection {
    /// One entry per input point
    pub assignments: Vec<Pole>,
    /// One entry per locus
    pub sources: Vec<SpokeSources>,
}

impl PoleSelection {
    pub fn resolved_count(&self) -> usize {
        self.assignments.iter().filter(|p| p.is_resolved()).count()
    }

    pub fn unresolved_points(&self) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_resolved())
            .map(|(i, _)| i)
    }
}

/// Select the negative pole of every point and collect spoke sources
///
/// Ties in projection depth keep the first locus in cell order. Points whose
/// cell has no locus strictly behind the surface get `Pole::Unresolved`.
///
/// # Errors
///
/// Returns `InvalidInput` if the point, normal and incidence counts differ, a
/// cell lists a locus the diagram does not have, a normal is zero or not
/// finite, or `max_sources < 2`.
pub fn select_poles(
    points: &[DVec3],
    normals: &[DVec3],
    diagram: &VoronoiDiagram,
    max_sources: usize,
) -> Result<PoleSelection> {
    validate_inputs(points, normals, diagram, max_sources)?;

    #[cfg(feature = "parallel")]
    let assignments: Vec<Pole> = (0..points.len())
        .into_par_iter()
        .map(|i| deepest_interior_locus(points[i], normals[i], &diagram.incidence[i], &diagram.loci))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let assignments: Vec<Pole> = (0..points.len())
        .map(|i| deepest_interior_locus(points[i], normals[i], &diagram.incidence[i], &diagram.loci))
        .collect();

    // Registration order must follow point order, so it stays sequential
    let mut sources = vec![SpokeSources::default(); diagram.loci.len()];
    for (point, cell) in diagram.incidence.iter().enumerate() {
        for &locus in cell {
            sources[locus].register(point, max_sources);
        }
    }

    let overflowing = sources.iter().filter(|s| s.dropped > 0).count();
    if overflowing > 0 {
        tracing::warn!(
            overflowing,
            max_sources,
            "loci nominated by more points than the spoke source capacity"
        );
    }

    Ok(PoleSelection {
        assignments,
        sources,
    })
}

/// Locus with the most negative projection onto the normal
fn deepest_interior_locus(point: DVec3, normal: DVec3, cell: &[usize], loci: &[DVec3]) -> Pole {
    let mut best = Pole::Unresolved;
    let mut best_depth = 0.0;

    for &locus in cell {
        let t = (loci[locus] - point).dot(normal);
        if t < best_depth {
            best_depth = t;
            best = Pole::Resolved { locus, depth: t };
        }
    }

    best
}

fn validate_inputs(
    points: &[DVec3],
    normals: &[DVec3],
    diagram: &VoronoiDiagram,
    max_sources: usize,
) -> Result<()> {
    if points.len() != normals.len() {
        return Err(MedialError::InvalidInput(format!(
            "{} points but {} normals",
            points.len(),
            normals.len()
        )));
    }
    if diagram.point_count() != points.len() {
        return Err(MedialError::InvalidInput(format!(
            "diagram built for {} points but {} were given",
            diagram.point_count(),
            points.len()
        )));
    }
    if max_sources < 2 {
        return Err(MedialError::InvalidInput(format!(
            "spoke source capacity must be at least 2 (got {})",
            max_sources
        )));
    }
    let loci = diagram.locus_count();
    for (point, cell) in diagram.incidence.iter().enumerate() {
        if let Some(&locus) = cell.iter().find(|&&l| l >= loci) {
            return Err(MedialError::InvalidInput(format!(
                "cell of point {} refers to locus {} but the diagram has {}",
                point, locus, loci
            )));
        }
    }

    let mut off_unit = 0usize;
    for (i, n) in normals.iter().enumerate() {
        let len = n.length();
        if !len.is_finite() || len == 0.0 {
            return Err(MedialError::InvalidInput(format!(
                "normal {} is zero or not finite",
                i
            )));
        }
        if (len - 1.0).abs() > NORMAL_LENGTH_TOLERANCE {
            off_unit += 1;
        }
    }
    if off_unit > 0 {
        tracing::warn!(off_unit, "normals deviate from unit length");
    }

    Ok(())
}
