//! Estimate the centerline of a synthetic cave passage

use medial_poles::*;

fn main() -> Result<()> {
    println!("Sampling passage wall...");

    let (points, normals) = sampling::tube_samples(30.0, 2.5, 60, 24, 42);

    let config = MedialConfigBuilder::new()
        .bounds_padding(0.02)?
        .spoke_length_tolerance(1e-6)?
        .build()?;

    let medial = MedialAxis::compute(points, normals, config)?;
    let summary = medial.summary();

    println!("Samples: {}", summary.points);
    println!("Loci inside bounds: {}", summary.loci);
    println!("Resolved poles: {} ({} unresolved)", summary.resolved, summary.unresolved);
    println!("Loci with too few spoke sources: {}", summary.insufficient_sources);

    // Wide-aperture poles are the reliable ones
    let mut reliable: Vec<DVec3> = medial
        .assignments()
        .iter()
        .filter_map(|pole| pole.locus())
        .filter(|&locus| {
            medial.metrics()[locus]
                .aperture
                .is_some_and(|a| a > 0.75 * std::f64::consts::PI)
        })
        .map(|locus| medial.loci()[locus])
        .collect();
    reliable.sort_by(|a, b| a.z.total_cmp(&b.z));
    reliable.dedup();

    println!("\nReliable poles along the passage:");
    for pole in reliable.iter().step_by((reliable.len() / 10).max(1)) {
        let offset = DVec3::new(pole.x, pole.y, 0.0).length();
        println!("  z = {:6.2}  axis offset = {:.3}", pole.z, offset);
    }

    #[cfg(feature = "spatial-index")]
    {
        let probe = DVec3::new(2.5, 0.0, 15.0);
        match medial.medial_point_near(probe) {
            Ok(center) => println!("\nWall point near {:?} projects to {:?}", probe, center),
            Err(e) => println!("\nWall point near {:?}: {}", probe, e),
        }
    }

    Ok(())
}
