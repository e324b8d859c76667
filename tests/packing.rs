use spherepack::{Distribution, PackingConfig, SpherePacking};

fn base_config() -> PackingConfig {
    PackingConfig {
        width: 60,
        height: 60,
        depth: 20,
        min_radius: 3.0,
        max_radius: 5.0,
        eps: 0.1,
        target_porosity: 0.3,
        seed: Some(7),
        ..PackingConfig::default()
    }
}

#[test]
fn test_seeded_layer_stays_in_footprint() {
    let mut packing = SpherePacking::new(base_config()).unwrap();
    let placed = packing.fill_bottom_layer().unwrap();
    assert_eq!(placed, packing.spheres().len());
    for s in packing.spheres() {
        let c = s.center();
        assert!(c.x >= -0.5 && c.x <= 60.5, "x = {}", c.x);
        assert!(c.y >= -0.5 && c.y <= 60.5, "y = {}", c.y);
        assert!(c.z > 2.0 && c.z < 6.0, "z = {}", c.z);
    }
}

#[test]
fn test_beta_radii_follow_bounds() {
    for (p, q) in [(2.0, 2.0), (0.5, 3.0), (5.0, 1.0)] {
        let config = PackingConfig {
            distribution: Distribution::Beta,
            beta_p: p,
            beta_q: q,
            ..base_config()
        };
        let mut packing = SpherePacking::new(config).unwrap();
        packing.fill_bottom_layer().unwrap();
        assert!(packing
            .spheres()
            .iter()
            .all(|s| (3.0..=5.0).contains(&s.inner_radius())));
    }
}

#[test]
fn test_porosity_never_increases_while_tuning() {
    let config = PackingConfig {
        max_iterations: 1,
        ..base_config()
    };
    let mut packing = SpherePacking::new(config).unwrap();
    packing.fill_bottom_layer().unwrap();
    packing.rasterize_cross_sections().unwrap();

    let mut previous = packing.porosity();
    for pass in 0..15 {
        let report = packing.reach_target_porosity().unwrap();
        println!("pass {}: porosity {:.5}", pass, report.porosity);
        assert!(report.porosity <= previous);
        assert!(report.iterations <= 1);
        for s in packing.spheres() {
            assert!(s.outer_radius() >= s.inner_radius());
        }
        previous = report.porosity;
        if report.converged {
            break;
        }
    }
}

#[test]
fn test_specific_surface_is_reproducible() {
    let run = || {
        let mut packing = SpherePacking::new(base_config()).unwrap();
        packing.fill_bottom_layer().unwrap();
        packing.specific_surface(200).unwrap()
    };
    let a = run();
    let b = run();
    assert!(a > 0.0);
    assert_eq!(a, b);
}

#[test]
fn test_specific_surface_rejects_single_test_point() {
    let mut packing = SpherePacking::new(base_config()).unwrap();
    packing.fill_bottom_layer().unwrap();
    assert!(packing.specific_surface(1).is_err());
}

#[test]
fn test_neighbors_are_symmetric() {
    let mut packing = SpherePacking::new(base_config()).unwrap();
    packing.fill_bottom_layer().unwrap();
    packing.connect_neighbors();
    let graph = packing.neighbors();
    assert_eq!(graph.len(), packing.spheres().len());
    assert!(graph.edge_count() > 0);
    for a in 0..graph.len() {
        for b in graph.neighbors(a) {
            assert!(graph.contains(b, a), "edge {} -> {} is one-sided", a, b);
        }
    }
}
