use medial_poles::{
    Bounds, DVec3, MedialAxis, MedialConfig, MedialConfigBuilder, MedialError, Pole,
    PrecomputedDual, RawDual, RawVertex, SpokeAnomaly,
};

fn regular_tetrahedron() -> Vec<DVec3> {
    vec![
        DVec3::new(1.0, 1.0, 1.0),
        DVec3::new(1.0, -1.0, -1.0),
        DVec3::new(-1.0, 1.0, -1.0),
        DVec3::new(-1.0, -1.0, 1.0),
    ]
}

fn outward_from_origin(points: &[DVec3]) -> Vec<DVec3> {
    points.iter().map(|p| p.normalize()).collect()
}

fn raw_vertex(position: DVec3, generators: &[usize]) -> RawVertex {
    RawVertex {
        position,
        generators: generators.to_vec(),
        unbounded: false,
    }
}

#[test]
fn test_tetrahedron_circumcenter_is_every_pole() {
    let points = regular_tetrahedron();
    let normals = outward_from_origin(&points);
    let medial = MedialAxis::compute(points, normals, MedialConfig::default()).unwrap();

    assert_eq!(medial.locus_count(), 1);
    assert!(medial.loci()[0].length() < 1e-9, "circumcenter should be the origin");

    for p in 0..4 {
        match medial.pole_of(p) {
            Some(Pole::Resolved { locus, depth }) => {
                assert_eq!(locus, 0);
                assert!((depth + 3f64.sqrt()).abs() < 1e-9, "depth {} should be -sqrt(3)", depth);
            }
            other => panic!("point {} should have a resolved pole, got {:?}", p, other),
        }
    }

    let mut sources = medial.spoke_sources()[0].points.to_vec();
    sources.sort_unstable();
    assert_eq!(sources, vec![0, 1, 2, 3]);

    let metrics = &medial.metrics()[0];
    assert!((metrics.radius.unwrap() - 3f64.sqrt()).abs() < 1e-9);
    let expected_aperture = (-1.0f64 / 3.0).acos();
    assert!(
        (metrics.aperture.unwrap() - expected_aperture).abs() < 1e-9,
        "aperture {:?} should be acos(-1/3)",
        metrics.aperture
    );
    assert!(metrics.is_clean(), "unexpected anomalies: {:?}", metrics.anomalies);
}

#[test]
fn test_outlier_with_inverted_normal_is_unresolved() {
    let mut points = regular_tetrahedron();
    points.push(DVec3::new(0.0, 0.0, 5.0));
    let mut normals = outward_from_origin(&points[..4]);
    // Points back at the cloud; every locus in the bounds has z <= 5
    normals.push(DVec3::NEG_Z);

    let medial = MedialAxis::compute(points, normals, MedialConfig::default()).unwrap();

    assert_eq!(medial.pole_of(4), Some(Pole::Unresolved));
    assert_eq!(medial.medial_point(4), Err(MedialError::UnresolvedPole(4)));
    assert_eq!(medial.medial_points()[4], None);
    assert!(medial.summary().unresolved >= 1);
}

#[test]
fn test_unresolved_with_precomputed_dual() {
    let mut points = regular_tetrahedron();
    let outlier = DVec3::new(0.2, 0.2, 0.9);
    points.push(outlier);
    let mut normals = outward_from_origin(&points[..4]);
    normals.push(-outlier.normalize());

    let dual = PrecomputedDual::new(RawDual {
        vertices: vec![
            raw_vertex(DVec3::ZERO, &[0, 1, 2, 3]),
            raw_vertex(outlier * 0.5, &[4]),
            raw_vertex(outlier * 0.25, &[4]),
        ],
    });

    let medial = MedialAxis::compute_with_dual(points, normals, MedialConfig::default(), &dual).unwrap();

    assert_eq!(medial.pole_of(4), Some(Pole::Unresolved));
    for p in 0..4 {
        assert_eq!(medial.pole_of(p).and_then(|pole| pole.locus()), Some(0));
    }
}

#[test]
fn test_three_sources_are_insufficient() {
    let points = vec![
        DVec3::X,
        DVec3::Y,
        DVec3::Z,
        DVec3::splat(-1.0 / 3f64.sqrt()),
    ];
    let normals = outward_from_origin(&points);
    let dual = PrecomputedDual::new(RawDual {
        vertices: vec![raw_vertex(DVec3::ZERO, &[0, 1, 2])],
    });

    let medial = MedialAxis::compute_with_dual(points, normals, MedialConfig::default(), &dual).unwrap();
    let metrics = &medial.metrics()[0];

    assert_eq!(metrics.insufficient_sources(), Some(3));
    assert!(metrics
        .anomalies
        .contains(&SpokeAnomaly::InsufficientSources { found: 3 }));
    assert!((metrics.radius.unwrap() - 1.0).abs() < 1e-12);
    assert!((metrics.aperture.unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

    // The fourth point has no locus at all
    assert_eq!(medial.pole_of(3), Some(Pole::Unresolved));
    assert_eq!(medial.summary().insufficient_sources, 1);
}

#[test]
fn test_vertices_outside_bounds_never_become_poles() {
    let points = regular_tetrahedron();
    let normals = outward_from_origin(&points);
    let far_inside = DVec3::new(-10.0, -10.0, -10.0);
    let unbounded = DVec3::new(-0.5, -0.5, -0.5);

    let dual = PrecomputedDual::new(RawDual {
        vertices: vec![
            raw_vertex(far_inside, &[0]),
            RawVertex {
                position: unbounded,
                generators: vec![0, 1],
                unbounded: true,
            },
            raw_vertex(DVec3::ZERO, &[0, 1, 2, 3]),
        ],
    });

    let medial = MedialAxis::compute_with_dual(points, normals, MedialConfig::default(), &dual).unwrap();

    assert_eq!(medial.loci(), &[DVec3::ZERO]);
    assert_eq!(medial.diagram().discarded_outside, 1);
    assert_eq!(medial.diagram().discarded_unbounded, 1);
    for p in 0..4 {
        let center = medial.medial_point(p).unwrap();
        assert_ne!(center, far_inside);
        assert_ne!(center, unbounded);
    }
}

#[test]
fn test_explicit_bounds_filter_delaunay_loci() {
    let (points, normals) = medial_poles::sampling::tube_samples(8.0, 1.0, 12, 10, 3);
    let bounds = Bounds::new(DVec3::new(-0.5, -0.5, 2.0), DVec3::new(0.5, 0.5, 6.0));
    let config = MedialConfigBuilder::new()
        .explicit_bounds(bounds)
        .unwrap()
        .build()
        .unwrap();

    let medial = MedialAxis::compute(points, normals, config).unwrap();

    assert!(medial.locus_count() > 0);
    for locus in medial.loci() {
        assert!(bounds.contains(*locus), "locus {:?} escaped the bounds", locus);
    }
    for center in medial.medial_points().into_iter().flatten() {
        assert!(bounds.contains(center));
    }
}

#[test]
fn test_overflow_is_reported_not_fatal() {
    let mut points = regular_tetrahedron();
    points.push(DVec3::new(0.0, 0.0, 1.5));
    let normals = outward_from_origin(&points);

    // Co-spherical-style vertex shared by five cells
    let dual = PrecomputedDual::new(RawDual {
        vertices: vec![raw_vertex(DVec3::ZERO, &[0, 1, 2, 3, 4])],
    });

    let medial = MedialAxis::compute_with_dual(points, normals, MedialConfig::default(), &dual).unwrap();
    let sources = &medial.spoke_sources()[0];

    assert_eq!(sources.points.as_slice(), &[0, 1, 2, 3]);
    assert_eq!(sources.dropped, 1);
    assert_eq!(medial.metrics()[0].dropped_sources(), 1);
    assert_eq!(medial.summary().overflowing_loci, 1);
    // The fifth point still gets its pole
    assert_eq!(medial.pole_of(4).and_then(|p| p.locus()), Some(0));
}

#[test]
fn test_degenerate_inputs_abort() {
    let coplanar: Vec<DVec3> = (0..8)
        .map(|i| DVec3::new((i % 4) as f64, (i / 4) as f64, 0.0))
        .collect();
    let normals = vec![DVec3::Z; 8];
    let result = MedialAxis::compute(coplanar, normals, MedialConfig::default());
    assert!(matches!(result, Err(MedialError::DegenerateInput(_))));

    let coincident = vec![DVec3::ONE; 5];
    let normals = vec![DVec3::X; 5];
    let result = MedialAxis::compute(coincident, normals, MedialConfig::default());
    assert!(matches!(result, Err(MedialError::DegenerateInput(_))));
}

#[test]
fn test_runs_are_deterministic() {
    let (points, normals) = medial_poles::sampling::fibonacci_sphere_samples(300, 3.0, DVec3::ZERO, 11);

    let first = MedialAxis::compute(points.clone(), normals.clone(), MedialConfig::default()).unwrap();
    let second = MedialAxis::compute(points, normals, MedialConfig::default()).unwrap();

    assert_eq!(first.assignments(), second.assignments());
    assert_eq!(first.spoke_sources(), second.spoke_sources());
    assert_eq!(first.metrics(), second.metrics());
    assert_eq!(first.loci(), second.loci());
}
