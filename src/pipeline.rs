//! Batch pipeline: seeding, post-processing and contact analysis per test case.
//!
//! Each stage reads what the previous one wrote under `config.output_dir`, so
//! the stages can be run separately or chained with [`run_batch`].

use crate::config::PackingConfig;
use crate::contact::ContactField;
use crate::error::Result;
use crate::export::{self, Metrics};
use crate::packing::{SpherePacking, TuningReport};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize)]
pub struct SeedReport {
    pub case: usize,
    pub sphere_count: usize,
    pub csv: PathBuf,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub case: usize,
    pub stem: String,
    pub metrics: Metrics,
    /// Present when porosity tuning ran.
    pub tuning: Option<TuningReport>,
    pub layer_images: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContactReport {
    pub case: usize,
    pub passes: usize,
    pub pockets: Vec<[usize; 3]>,
    /// Sphere list the analysis was run on.
    pub source: PathBuf,
    pub directory: PathBuf,
}

/// Output locations of one test case.
struct CasePaths {
    stem: String,
    dir: PathBuf,
}

impl CasePaths {
    fn new(config: &PackingConfig, case: usize) -> Self {
        Self {
            stem: export::file_stem(config, case),
            dir: config.output_dir.clone(),
        }
    }

    fn file(&self, tail: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.stem, tail))
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
        info!("removed stale {}", path.display());
    }
    Ok(())
}

/// The configuration of case `case`: a fixed seed is offset by the case number
/// so the cases of one batch differ but stay reproducible.
fn case_config(config: &PackingConfig, case: usize) -> PackingConfig {
    let mut cfg = config.clone();
    cfg.seed = config.seed.map(|s| s.wrapping_add(case as u64));
    cfg
}

/// Seeds the bottom layer of case `case` and writes `<stem>_seed.csv`. A tuned
/// list left by an earlier run of the case is removed.
pub fn initialize_case(config: &PackingConfig, case: usize) -> Result<SeedReport> {
    let paths = CasePaths::new(config, case);
    remove_stale(&paths.file("_tuned.csv"))?;
    let mut packing = SpherePacking::new(case_config(config, case))?;
    let sphere_count = packing.fill_bottom_layer()?;
    let csv = paths.file("_seed.csv");
    export::save_sphere_csv(packing.spheres(), &csv)?;
    info!("case {}: seeded {} spheres into {}", case, sphere_count, csv.display());
    Ok(SeedReport {
        case,
        sphere_count,
        csv,
    })
}

/// Rasterizes the seeded packing of case `case`, tunes its porosity when enabled,
/// estimates the specific surface and writes layer images, VTK, metrics and report.
pub fn postprocess_case(config: &PackingConfig, case: usize) -> Result<RunReport> {
    let paths = CasePaths::new(config, case);
    let spheres = export::load_sphere_csv(paths.file("_seed.csv"))?;
    let mut packing = SpherePacking::from_spheres(case_config(config, case), spheres)?;
    packing.rasterize_cross_sections()?;

    let tuning = if config.reach_porosity {
        Some(packing.reach_target_porosity()?)
    } else {
        None
    };
    let specific_surface = packing.specific_surface(config.test_points)?;

    let metrics = Metrics {
        width: config.width,
        height: config.height,
        depth: config.depth,
        sphere_count: packing.spheres().len(),
        initial_porosity: tuning.as_ref().map(|t| t.initial_porosity),
        porosity: packing.porosity(),
        specific_surface,
    };
    let layer_images = export::save_layer_images(packing.space(), paths.file("_layers"))?;
    export::save_vtk(packing.spheres(), paths.file("_spheres.vtk"))?;
    export::save_metrics(&metrics, paths.file("_metrics.txt"))?;
    let tuned = paths.file("_tuned.csv");
    if tuning.is_some() {
        export::save_sphere_csv(packing.spheres(), &tuned)?;
    } else {
        remove_stale(&tuned)?;
    }

    let report = RunReport {
        case,
        stem: paths.stem.clone(),
        metrics,
        tuning,
        layer_images,
    };
    export::save_json(&report, paths.file("_report.json"))?;
    info!(
        "case {}: porosity {:.4}, specific surface {:.6}",
        case, report.metrics.porosity, report.metrics.specific_surface
    );
    Ok(report)
}

/// Runs the contact analysis on case `case` and writes the colored layer series
/// plus `pockets.txt`. The tuned list is read when `reach_porosity` is set, the
/// seeded one otherwise.
pub fn analyze_contacts(config: &PackingConfig, case: usize) -> Result<ContactReport> {
    let paths = CasePaths::new(config, case);
    let source = if config.reach_porosity {
        paths.file("_tuned.csv")
    } else {
        paths.file("_seed.csv")
    };
    let spheres = export::load_sphere_csv(&source)?;
    let mut packing = SpherePacking::from_spheres(case_config(config, case), spheres)?;
    packing.rasterize_cross_sections()?;

    let contact = ContactField::analyze(packing.space());
    let directory = paths.file("_contact");
    export::save_contact_images(contact.field(), &directory)?;
    export::save_pockets(contact.pockets(), directory.join("pockets.txt"))?;
    info!(
        "case {}: {} pockets from {}",
        case,
        contact.pockets().len(),
        source.display()
    );
    Ok(ContactReport {
        case,
        passes: contact.field().passes(),
        pockets: contact.into_pockets(),
        source,
        directory,
    })
}

/// Seeds and post-processes every case of the batch. A failing case does not
/// stop the others.
pub fn run_batch(config: &PackingConfig) -> Vec<Result<RunReport>> {
    (1..=config.count)
        .map(|case| {
            let result = initialize_case(config, case).and_then(|_| postprocess_case(config, case));
            if let Err(err) = &result {
                warn!("case {} of {} failed: {}", case, config.count, err);
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_seeds_differ() {
        let cfg = PackingConfig {
            seed: Some(10),
            ..PackingConfig::default()
        };
        assert_eq!(case_config(&cfg, 1).seed, Some(11));
        assert_eq!(case_config(&cfg, 2).seed, Some(12));
        assert_eq!(case_config(&PackingConfig::default(), 3).seed, None);
    }

    #[test]
    fn test_case_paths() {
        let cfg = PackingConfig {
            width: 10,
            height: 10,
            depth: 5,
            min_radius: 2.0,
            max_radius: 2.0,
            output_dir: PathBuf::from("out"),
            ..PackingConfig::default()
        };
        let paths = CasePaths::new(&cfg, 4);
        assert_eq!(paths.file("_seed.csv"), PathBuf::from("out/10x10x5_2_2_TC04_seed.csv"));
    }
}
