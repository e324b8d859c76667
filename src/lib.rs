//! # spherepack
//!
//! `spherepack` is a Rust library for random sphere packings and the voxelized
//! microstructures they describe, designed to be used in Rust as well as compiled to
//! WebAssembly (WASM). It generates a seeded layer of spheres in a box, rasterizes the
//! packing into planar layers and derives structural metrics from the voxels.
//!
//! ## Features
//!
//! - **Packing generation**: Hexagonally offset bottom layer with uniform or beta distributed radii.
//! - **Voxelization**: Parallel per-layer rasterization of the sphere cross sections.
//! - **Porosity tuning**: Random outer radius growth until a target porosity is reached.
//! - **Specific surface**: Monte-Carlo estimate over sphere surface samples and a neighbor graph.
//! - **Contact analysis**: Discrete distance bands in the pore space and pocket detection.
//! - **WASM-first**: Built with `wasm-bindgen` for use from JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```no_run
//! use spherepack::{ContactField, PackingConfig, SpherePacking};
//!
//! let config = PackingConfig { width: 200, height: 200, depth: 60, ..PackingConfig::default() };
//! let mut packing = SpherePacking::new(config)?;
//! packing.fill_bottom_layer()?;
//! packing.rasterize_cross_sections()?;
//! let report = packing.reach_target_porosity()?;
//! let sv = packing.specific_surface(500)?;
//! let contact = ContactField::analyze(packing.space());
//! println!("porosity {}, Sv {}, {} pockets", report.porosity, sv, contact.pockets().len());
//! # Ok::<(), spherepack::Error>(())
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`SpherePacking`] struct, which owns the spheres, their
//! neighbor graph and the [`VoxelSpace`]. Batch runs with file output go through [`pipeline`].

mod bounds;
mod config;
mod contact;
mod error;
pub mod export;
mod neighbors;
mod packing;
pub mod pipeline;
mod point;
mod spatial;
mod sphere;
mod voxel;
pub mod wasm;

pub use bounds::BoundingBox;
pub use config::Distribution;
pub use config::PackingConfig;
pub use contact::band_color;
pub use contact::detect_pockets;
pub use contact::ContactField;
pub use contact::DistanceField;
pub use error::Error;
pub use error::Result;
pub use neighbors::NeighborGraph;
pub use packing::RadiusSampler;
pub use packing::SpherePacking;
pub use packing::TuningReport;
pub use point::Point3D;
pub use spatial::SphereGrid;
pub use sphere::Sphere;
pub use voxel::Layer;
pub use voxel::Voxel;
pub use voxel::VoxelSpace;
