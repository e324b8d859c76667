//! File output: sphere lists (CSV, VTK), layer images, metrics and pocket lists.
//!
//! Every `write_*` function targets any [`Write`] sink; the matching `save_*`
//! function opens a buffered file, creating parent directories as needed.

use crate::config::PackingConfig;
use crate::contact::{band_color, DistanceField};
use crate::error::{Error, Result};
use crate::point::Point3D;
use crate::sphere::Sphere;
use crate::voxel::VoxelSpace;
use image::{ImageBuffer, Luma, Rgb};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Scalar results of one post-processed packing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub sphere_count: usize,
    /// Voxel porosity before radius growth; absent when growth is disabled.
    pub initial_porosity: Option<f64>,
    pub porosity: f64,
    pub specific_surface: f64,
}

/// Common name of every output of test case `case`:
/// `{X}x{Y}x{Z}_{dist}_{min}_{max}{suffix}`, without `_{dist}` for equal radii.
pub fn file_stem(config: &PackingConfig, case: usize) -> String {
    let dims = format!("{}x{}x{}", config.width, config.height, config.depth);
    let (min, max) = (config.min_radius as i64, config.max_radius as i64);
    let suffix = config.case_suffix(case);
    if config.min_radius != config.max_radius {
        format!("{dims}_{}_{min}_{max}{suffix}", config.distribution)
    } else {
        format!("{dims}_{min}_{max}{suffix}")
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Writes `x, y, z, r` rows with the outer radius.
pub fn write_sphere_csv<W: Write>(spheres: &[Sphere], writer: &mut W) -> Result<()> {
    writeln!(writer, "x, y, z, r")?;
    for s in spheres {
        let c = s.center();
        writeln!(writer, "{}, {}, {}, {}", c.x, c.y, c.z, s.outer_radius())?;
    }
    Ok(())
}

pub fn save_sphere_csv<P: AsRef<Path>>(spheres: &[Sphere], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_file(path)?;
    write_sphere_csv(spheres, &mut writer)?;
    writer.flush()?;
    debug!("wrote {} spheres to {}", spheres.len(), path.display());
    Ok(())
}

/// Reads a sphere list written by [`write_sphere_csv`].
///
/// A leading header row is skipped and blank lines are ignored. Every sphere is
/// restored with inner and outer radius equal to the stored radius.
pub fn read_sphere_csv<R: BufRead>(reader: R) -> Result<Vec<Sphere>> {
    let mut spheres = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let number = i + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if number == 1 && fields.first().is_some_and(|f| f.parse::<f64>().is_err()) {
            continue;
        }
        if fields.len() != 4 {
            return Err(Error::parse(number, format!("expected 4 fields, found {}", fields.len())));
        }
        let mut values = [0.0f64; 4];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field
                .parse()
                .map_err(|_| Error::parse(number, format!("'{field}' is not a number")))?;
        }
        let [x, y, z, r] = values;
        if r.is_nan() || r <= 0.0 {
            return Err(Error::parse(number, format!("radius {r} is not positive")));
        }
        spheres.push(Sphere::new(Point3D::new(x, y, z), r));
    }
    Ok(spheres)
}

pub fn load_sphere_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Sphere>> {
    let file = File::open(path)?;
    read_sphere_csv(BufReader::new(file))
}

/// Legacy VTK polydata: sphere centers as points, diameters as point scalars.
pub fn write_vtk<W: Write>(spheres: &[Sphere], writer: &mut W) -> Result<()> {
    let n = spheres.len();
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "3D sphere packing")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;
    writeln!(writer, "POINTS {n} double")?;
    for s in spheres {
        let c = s.center();
        writeln!(writer, "{} {} {}", c.x, c.y, c.z)?;
    }
    writeln!(writer)?;
    writeln!(writer, "POINT_DATA {n}")?;
    writeln!(writer, "SCALARS diameters double")?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for s in spheres {
        writeln!(writer, "{}", 2.0 * s.outer_radius())?;
    }
    Ok(())
}

pub fn save_vtk<P: AsRef<Path>>(spheres: &[Sphere], path: P) -> Result<()> {
    let mut writer = create_file(path.as_ref())?;
    write_vtk(spheres, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_metrics<W: Write>(metrics: &Metrics, writer: &mut W) -> Result<()> {
    writeln!(writer, "sphere packing")?;
    writeln!(writer, "domain size: {}x{}x{}", metrics.width, metrics.height, metrics.depth)?;
    writeln!(writer, "sphere count: {}", metrics.sphere_count)?;
    if let Some(p) = metrics.initial_porosity {
        writeln!(writer, "porosity before growth: {p}")?;
    }
    writeln!(writer, "porosity (voxel count): {}", metrics.porosity)?;
    writeln!(writer, "specific surface (Monte-Carlo): {}", metrics.specific_surface)?;
    Ok(())
}

pub fn save_metrics<P: AsRef<Path>>(metrics: &Metrics, path: P) -> Result<()> {
    let mut writer = create_file(path.as_ref())?;
    write_metrics(metrics, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Pocket list: a title line, the count, then one `x, y, z` row per pocket.
pub fn write_pockets<W: Write>(pockets: &[[usize; 3]], writer: &mut W) -> Result<()> {
    writeln!(writer, "pockets")?;
    writeln!(writer, "count: {}", pockets.len())?;
    for [x, y, z] in pockets {
        writeln!(writer, "{x}, {y}, {z}")?;
    }
    Ok(())
}

pub fn save_pockets<P: AsRef<Path>>(pockets: &[[usize; 3]], path: P) -> Result<()> {
    let mut writer = create_file(path.as_ref())?;
    write_pockets(pockets, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON of any serializable report.
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let mut writer = create_file(path.as_ref())?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn layer_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("layer_{index}.png"))
}

/// Writes one grayscale PNG per layer into `dir`: free black, occupied white.
/// Returns the number of images written.
pub fn save_layer_images<P: AsRef<Path>>(space: &VoxelSpace, dir: P) -> Result<usize> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let (w, h) = (space.width(), space.height());
    space.layers().par_iter().enumerate().try_for_each(|(i, layer)| -> Result<()> {
        let pixels = layer.pixels();
        let img = ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
            Luma([pixels[x as usize + y as usize * w] as u8])
        });
        img.save(layer_path(dir, i))?;
        Ok(())
    })?;
    debug!("wrote {} layer images to {}", space.layer_count(), dir.display());
    Ok(space.layer_count())
}

/// Writes one RGB PNG per layer of `field` into `dir`, colored by [`band_color`].
pub fn save_contact_images<P: AsRef<Path>>(field: &DistanceField, dir: P) -> Result<usize> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let (w, h) = (field.width(), field.height());
    (0..field.layer_count()).into_par_iter().try_for_each(|i| -> Result<()> {
        let Some(bands) = field.layer(i) else {
            return Ok(());
        };
        let img = ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
            Rgb(band_color(bands[x as usize + y as usize * w]))
        });
        img.save(layer_path(dir, i))?;
        Ok(())
    })?;
    Ok(field.layer_count())
}
