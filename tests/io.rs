use spherepack::export::{self, load_sphere_csv};
use spherepack::{pipeline, ContactField, Error, PackingConfig, SpherePacking};
use std::fs;

fn batch_config(dir: &std::path::Path) -> PackingConfig {
    PackingConfig {
        count: 2,
        width: 40,
        height: 40,
        depth: 12,
        min_radius: 3.0,
        max_radius: 4.0,
        test_points: 50,
        target_porosity: 0.5,
        max_iterations: 5,
        seed: Some(3),
        output_dir: dir.to_path_buf(),
        ..PackingConfig::default()
    }
}

#[test]
fn test_batch_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = batch_config(dir.path());

    let results = pipeline::run_batch(&config);
    assert_eq!(results.len(), 2);
    for (i, result) in results.iter().enumerate() {
        let report = result.as_ref().unwrap();
        let case = i + 1;
        let stem = export::file_stem(&config, case);
        assert_eq!(report.case, case);
        assert_eq!(report.stem, stem);
        assert_eq!(report.layer_images, 13);
        assert!(report.tuning.is_some());
        assert!(report.metrics.specific_surface > 0.0);

        for tail in ["_seed.csv", "_tuned.csv", "_spheres.vtk", "_metrics.txt", "_report.json"] {
            let path = dir.path().join(format!("{stem}{tail}"));
            assert!(path.exists(), "missing {}", path.display());
        }
        let layers = dir.path().join(format!("{stem}_layers"));
        assert_eq!(fs::read_dir(&layers).unwrap().count(), 13);

        let tuned = load_sphere_csv(dir.path().join(format!("{stem}_tuned.csv"))).unwrap();
        assert_eq!(tuned.len(), report.metrics.sphere_count);

        let json = fs::read_to_string(dir.path().join(format!("{stem}_report.json"))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["case"], case);
        assert!(value["metrics"]["porosity"].is_number());
    }
}

#[test]
fn test_seed_list_round_trips_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = batch_config(dir.path());
    let seed = pipeline::initialize_case(&config, 1).unwrap();
    let spheres = load_sphere_csv(&seed.csv).unwrap();
    assert_eq!(spheres.len(), seed.sphere_count);
    assert!(spheres.iter().all(|s| s.inner_radius() == s.outer_radius()));
}

#[test]
fn test_contact_series_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = PackingConfig {
        reach_porosity: false,
        ..batch_config(dir.path())
    };
    pipeline::initialize_case(&config, 1).unwrap();
    pipeline::postprocess_case(&config, 1).unwrap();
    let stem = export::file_stem(&config, 1);
    assert!(!dir.path().join(format!("{stem}_tuned.csv")).exists());

    let report = pipeline::analyze_contacts(&config, 1).unwrap();
    assert_eq!(report.directory, dir.path().join(format!("{stem}_contact")));
    let pockets = fs::read_to_string(report.directory.join("pockets.txt")).unwrap();
    let mut lines = pockets.lines();
    assert_eq!(lines.next(), Some("pockets"));
    assert_eq!(lines.next(), Some(format!("count: {}", report.pockets.len()).as_str()));
    assert!(report.directory.join("layer_0.png").exists());
    assert!(report.directory.join("layer_12.png").exists());
}

#[test]
fn test_rerun_without_tuning_ignores_old_tuned_list() {
    let dir = tempfile::tempdir().unwrap();
    let tuned_config = batch_config(dir.path());
    pipeline::initialize_case(&tuned_config, 1).unwrap();
    pipeline::postprocess_case(&tuned_config, 1).unwrap();
    let stem = export::file_stem(&tuned_config, 1);
    let tuned = dir.path().join(format!("{stem}_tuned.csv"));
    let seed = dir.path().join(format!("{stem}_seed.csv"));
    assert!(tuned.exists());

    let config = PackingConfig {
        seed: Some(99),
        reach_porosity: false,
        ..batch_config(dir.path())
    };
    pipeline::initialize_case(&config, 1).unwrap();
    assert!(!tuned.exists());
    pipeline::postprocess_case(&config, 1).unwrap();
    assert!(!tuned.exists());

    let report = pipeline::analyze_contacts(&config, 1).unwrap();
    assert_eq!(report.source, seed);

    let spheres = load_sphere_csv(&seed).unwrap();
    let mut packing = SpherePacking::from_spheres(config.clone(), spheres).unwrap();
    packing.rasterize_cross_sections().unwrap();
    let expected = ContactField::analyze(packing.space());
    println!("{} pockets from {}", report.pockets.len(), report.source.display());
    assert_eq!(report.pockets, expected.pockets());
}

#[test]
fn test_contacts_read_tuned_list_when_tuning() {
    let dir = tempfile::tempdir().unwrap();
    let config = batch_config(dir.path());
    pipeline::initialize_case(&config, 1).unwrap();
    pipeline::postprocess_case(&config, 1).unwrap();
    let report = pipeline::analyze_contacts(&config, 1).unwrap();
    let stem = export::file_stem(&config, 1);
    assert_eq!(report.source, dir.path().join(format!("{stem}_tuned.csv")));
}

#[test]
fn test_postprocess_without_seed_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = batch_config(dir.path());
    let result = pipeline::postprocess_case(&config, 1);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_config_file_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.txt");
    fs::write(&path, "width: 64\ndistribution: beta\ntarget_porosity: 2\n").unwrap();
    let config = PackingConfig::load(&path);
    assert_eq!(config.width, 64);
    assert_eq!(config.target_porosity, 0.25);
    config.validate().unwrap();

    let json = dir.path().join("input.json");
    fs::write(&json, r#"{"depth": 33, "test_points": 80}"#).unwrap();
    let config = PackingConfig::load_json(&json).unwrap();
    assert_eq!((config.depth, config.test_points), (33, 80));
}
