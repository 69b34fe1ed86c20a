//! A set of published banners, loaded from JSON.
//!
//! Each `.json` file holds either one banner config or an array of them.
//! Every config is validated on the way in; a directory with one bad banner
//! fails to load as a whole.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::banner::{Banner, BannerConfig};
use crate::error::{GachaError, GachaResult};
use crate::ids::BannerId;
use crate::store::BannerRepository;

#[derive(Deserialize)]
#[serde(untagged)]
enum BannerFile {
    Many(Vec<BannerConfig>),
    One(Box<BannerConfig>),
}

impl BannerFile {
    fn into_configs(self) -> Vec<BannerConfig> {
        match self {
            Self::Many(configs) => configs,
            Self::One(config) => vec![*config],
        }
    }
}

/// Validated banners keyed by ID.
#[derive(Debug, Default, Clone)]
pub struct BannerCatalog {
    banners: HashMap<BannerId, Arc<Banner>>,
}

impl BannerCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a banner. IDs are never reused, so a duplicate is rejected.
    pub fn insert(&mut self, banner: Banner) -> GachaResult<()> {
        let id = banner.id().clone();
        if self.banners.contains_key(&id) {
            return Err(GachaError::InvalidBannerConfig {
                banner: id,
                reason: "duplicate banner id".into(),
            });
        }
        self.banners.insert(id, Arc::new(banner));
        Ok(())
    }

    /// Validate and publish a config.
    pub fn publish(&mut self, config: BannerConfig) -> GachaResult<()> {
        self.insert(Banner::new(config)?)
    }

    /// Parse one banner or an array of banners from JSON.
    pub fn from_json_str(json: &str) -> GachaResult<Self> {
        let mut catalog = Self::new();
        catalog.add_json_str(json)?;
        Ok(catalog)
    }

    /// Load a single JSON file.
    pub fn load_file(path: &Path) -> GachaResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Load every `.json` file in a directory, in file name order.
    pub fn load_dir(dir: &Path) -> GachaResult<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in &paths {
            log::debug!("loading banners from {}", path.display());
            catalog.add_json_str(&std::fs::read_to_string(path)?)?;
        }
        Ok(catalog)
    }

    fn add_json_str(&mut self, json: &str) -> GachaResult<()> {
        let file: BannerFile = serde_json::from_str(json)?;
        for config in file.into_configs() {
            self.publish(config)?;
        }
        Ok(())
    }

    /// Look up a banner.
    pub fn get(&self, id: &BannerId) -> Option<&Arc<Banner>> {
        self.banners.get(id)
    }

    /// All banners, sorted by ID.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Banner>> {
        let mut banners: Vec<_> = self.banners.values().collect();
        banners.sort_by(|a, b| a.id().cmp(b.id()));
        banners.into_iter()
    }

    /// Number of banners.
    pub fn len(&self) -> usize {
        self.banners.len()
    }

    /// True when no banner is published.
    pub fn is_empty(&self) -> bool {
        self.banners.is_empty()
    }
}

impl BannerRepository for BannerCatalog {
    fn load(&self, id: &BannerId) -> GachaResult<Arc<Banner>> {
        self.banners
            .get(id)
            .cloned()
            .ok_or_else(|| GachaError::BannerNotFound(id.clone()))
    }
}
