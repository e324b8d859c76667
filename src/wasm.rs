use crate::config::PackingConfig;
use crate::contact::ContactField;
use crate::packing::SpherePacking;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}

fn to_js(err: crate::error::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// --- Sphere packing ---

/// WASM wrapper around a sphere packing and its last contact analysis.
#[wasm_bindgen(js_name = SpherePacking)]
pub struct PackingWasm {
    inner: SpherePacking,
    pockets: Vec<[usize; 3]>,
}

#[wasm_bindgen(js_class = SpherePacking)]
impl PackingWasm {
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: usize,
        height: usize,
        depth: usize,
        min_radius: f64,
        max_radius: f64,
        eps: f64,
        seed: Option<u32>,
    ) -> Result<PackingWasm, JsValue> {
        let config = PackingConfig {
            width,
            height,
            depth,
            min_radius,
            max_radius,
            eps,
            seed: Some(seed.map_or_else(get_seed, u64::from)),
            ..PackingConfig::default()
        };
        Self::with_config(config)
    }

    /// Builds a packing from a JSON configuration; absent fields take their defaults.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<PackingWasm, JsValue> {
        let mut config = PackingConfig::from_json_str(json).map_err(to_js)?;
        config.seed = config.seed.or_else(|| Some(get_seed()));
        Self::with_config(config)
    }

    pub fn fill_bottom_layer(&mut self) -> Result<usize, JsValue> {
        self.inner.fill_bottom_layer().map_err(to_js)
    }

    pub fn rasterize(&mut self) -> Result<(), JsValue> {
        self.inner.rasterize_cross_sections().map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn porosity(&self) -> f64 {
        self.inner.porosity()
    }

    /// Grows radii toward the configured target and returns the reached porosity.
    pub fn reach_target_porosity(&mut self) -> Result<f64, JsValue> {
        self.inner
            .reach_target_porosity()
            .map(|report| report.porosity)
            .map_err(to_js)
    }

    pub fn specific_surface(&mut self, test_points: usize) -> Result<f64, JsValue> {
        self.inner.specific_surface(test_points).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn count_spheres(&self) -> usize {
        self.inner.spheres().len()
    }

    /// Flat `[x, y, z, r, ...]` with the outer radius.
    #[wasm_bindgen(getter)]
    pub fn spheres(&self) -> Vec<f64> {
        self.inner
            .spheres()
            .iter()
            .flat_map(|s| {
                let c = s.center();
                [c.x, c.y, c.z, s.outer_radius()]
            })
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn layer_count(&self) -> usize {
        self.inner.space().layer_count()
    }

    /// Row-major bytes of layer `index`: 0 free, 255 occupied.
    pub fn layer(&self, index: usize) -> Option<Vec<u8>> {
        let layer = self.inner.space().layer(index)?;
        Some(layer.pixels().iter().map(|&v| v as u8).collect())
    }

    /// Runs the contact analysis on the current raster and returns the pocket count.
    pub fn analyze_contacts(&mut self) -> usize {
        self.pockets = ContactField::analyze(self.inner.space()).into_pockets();
        self.pockets.len()
    }

    /// Flat `[x, y, z, ...]` of the pockets found by the last analysis.
    #[wasm_bindgen(getter)]
    pub fn pockets(&self) -> Vec<u32> {
        self.pockets
            .iter()
            .flat_map(|p| p.map(|c| c as u32))
            .collect()
    }
}

impl PackingWasm {
    fn with_config(config: PackingConfig) -> Result<PackingWasm, JsValue> {
        let inner = SpherePacking::new(config).map_err(to_js)?;
        Ok(PackingWasm {
            inner,
            pockets: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_flattens_outputs() {
        let mut packing = PackingWasm::new(30, 30, 12, 3.0, 4.0, 0.1, Some(5)).unwrap();
        let placed = packing.fill_bottom_layer().unwrap();
        assert!(placed > 0);
        assert_eq!(packing.spheres().len(), 4 * placed);

        packing.rasterize().unwrap();
        assert!(packing.porosity() < 1.0);
        assert_eq!(packing.layer_count(), 13);
        assert_eq!(packing.layer(0).map(|l| l.len()), Some(900));
        assert!(packing.layer(13).is_none());

        let pockets = packing.analyze_contacts();
        assert_eq!(packing.pockets().len(), 3 * pockets);
    }
}
