use spherepack::{Error, Layer, PackingConfig, Point3D, Sphere, SpherePacking, Voxel};

fn config(width: usize, height: usize, depth: usize) -> PackingConfig {
    PackingConfig {
        width,
        height,
        depth,
        min_radius: 1.0,
        max_radius: 6.0,
        seed: Some(1),
        ..PackingConfig::default()
    }
}

fn disk(width: usize, height: usize, cx: f64, cy: f64, r: f64) -> Layer {
    let mut layer = Layer::new(width, height);
    layer.fill_circle(cx, cy, r);
    layer
}

#[test]
fn test_single_sphere_cross_sections() {
    let mut packing = SpherePacking::new(config(10, 10, 5)).unwrap();
    packing.push_sphere(Sphere::new(Point3D::new(5.0, 5.0, 2.0), 3.0));
    packing.rasterize_cross_sections().unwrap();
    let space = packing.space();
    assert_eq!(space.layer_count(), 6);

    for i in 0..6 {
        let h = (2.0 - i as f64).abs();
        let expected = disk(10, 10, 5.0, 5.0, (9.0 - h * h).sqrt());
        assert_eq!(space.layer(i), Some(&expected), "layer {}", i);
    }

    // Equator: the radius 3 disk around a lattice point covers 32 pixel centers.
    assert_eq!(space.layer(2).unwrap().count(Voxel::Occupied), 32);
    assert!(space.layer(0).unwrap().count(Voxel::Occupied) > 0);
    // Tangent plane: zero radius, no pixel center hit.
    assert_eq!(space.layer(5).unwrap().count(Voxel::Occupied), 0);
}

#[test]
fn test_rasterizing_twice_is_stable() {
    let mut packing = SpherePacking::new(config(10, 10, 5)).unwrap();
    packing.push_sphere(Sphere::new(Point3D::new(5.0, 5.0, 2.0), 3.0));
    packing.rasterize_cross_sections().unwrap();
    let first = packing.space().clone();
    packing.rasterize_cross_sections().unwrap();
    assert_eq!(packing.space(), &first);
}

#[test]
fn test_empty_list_is_rejected_without_mutation() {
    let mut packing = SpherePacking::new(config(10, 10, 5)).unwrap();
    let before = packing.space().clone();
    let result = packing.rasterize_cross_sections();
    assert!(matches!(result, Err(Error::EmptySphereList)));
    assert_eq!(packing.space(), &before);
    assert_eq!(packing.porosity(), 1.0);
}

#[test]
fn test_voxel_porosity_matches_analytic() {
    let mut packing = SpherePacking::new(config(40, 20, 20)).unwrap();
    packing.push_sphere(Sphere::new(Point3D::new(10.0, 10.0, 10.0), 6.0));
    packing.push_sphere(Sphere::new(Point3D::new(30.0, 10.0, 10.0), 6.0));
    packing.rasterize_cross_sections().unwrap();

    let space = packing.space();
    let voxel = space.porosity();
    let analytic = space.analytic_porosity(2, 6.0);
    println!("voxel porosity {:.5}, analytic {:.5}", voxel, analytic);
    assert!((voxel - analytic).abs() < 0.01);
    assert_eq!(
        space.count_voxels(Voxel::Free) + space.count_voxels(Voxel::Occupied),
        space.total_voxels()
    );
}
