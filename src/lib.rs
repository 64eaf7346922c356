//! Voronoi-pole medial axis estimation for sampled surfaces
//!
//! Given surface samples with outward normals (for example a scanned cave
//! wall), this crate finds for every sample its *negative pole*: the vertex
//! of the 3D Voronoi diagram of the samples that lies deepest behind the
//! surface along the sample's normal. Poles approximate the medial axis and
//! are the raw material for centerline extraction.
//!
//! Each pole is characterized by its spokes (vectors to the samples that
//! generate it): their length is the local medial radius and the widest angle
//! between them, the aperture, tells well-supported poles from spurious ones.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use medial_poles::*;
//! use glam::DVec3;
//!
//! let (points, normals) = sampling::tube_samples(20.0, 2.0, 40, 24, 42);
//!
//! let config = MedialConfigBuilder::new()
//!     .bounds_padding(0.05).unwrap()
//!     .build().unwrap();
//!
//! let medial = MedialAxis::compute(points, normals, config).unwrap();
//!
//! for (point, pole) in medial.assignments().iter().enumerate() {
//!     if let Some(locus) = pole.locus() {
//!         let metrics = &medial.metrics()[locus];
//!         println!("sample {point}: radius {:?}, aperture {:?}", metrics.radius, metrics.aperture);
//!     }
//! }
//! ```
//!
//! The Voronoi diagram comes from a [`VoronoiDual`] backend. [`DelaunayDual`]
//! wraps the tetrahedralization of the `delaunay` crate; diagrams computed by
//! other libraries can be passed in through [`PrecomputedDual`] and
//! [`MedialAxis::compute_with_dual`].
//!
//! # Features
//!
//! - `spatial-index` (default): nearest-sample lookups using a KD-tree
//! - `parallel`: per-point and per-locus phases run on rayon
//! - `serde`: serialization support for configuration and result tables

// Modules
pub mod error;
pub mod config;
pub mod bounds;
pub mod dual;
pub mod poles;
pub mod spokes;
pub mod medial;
pub mod sampling;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MedialError, Result};
pub use config::{BoundsMode, MedialConfig, MedialConfigBuilder};
pub use bounds::Bounds;
pub use dual::{DelaunayDual, PrecomputedDual, RawDual, RawVertex, VoronoiDiagram, VoronoiDual};
pub use poles::{select_poles, Pole, PoleSelection, SpokeSources};
pub use spokes::{analyze_poles, PoleMetrics, SpokeAnomaly, SpokeOptions};
pub use medial::{medial_point, MedialAxis, MedialSummary};

#[cfg(feature = "spatial-index")]
pub use spatial::SampleIndex;

// Re-export glam::DVec3 for convenience
pub use glam::DVec3;
