pub mod check;
pub mod odds;
pub mod pull;
pub mod simulate;

use std::path::Path;
use std::sync::Arc;

use colored::{ColoredString, Colorize};
use gacha_core::{Banner, BannerCatalog, BannerId, BannerRepository, Tier};

/// Load and validate every banner in a directory.
fn load_catalog(dir: &Path) -> Result<BannerCatalog, String> {
    let catalog = BannerCatalog::load_dir(dir)
        .map_err(|e| format!("cannot load banners from {}: {e}", dir.display()))?;
    log::debug!("loaded {} banners from {}", catalog.len(), dir.display());
    Ok(catalog)
}

/// Load the catalog and look up one banner in it.
fn load_banner(dir: &Path, id: &str) -> Result<(BannerCatalog, Arc<Banner>), String> {
    let catalog = load_catalog(dir)?;
    let banner = catalog
        .load(&BannerId::new(id))
        .map_err(|e| e.to_string())?;
    Ok((catalog, banner))
}

fn kind_label(banner: &Banner) -> &'static str {
    if banner.limited().is_some() {
        "limited"
    } else {
        "standard"
    }
}

fn tier_label(tier: Tier) -> ColoredString {
    let label = tier.to_string();
    match tier {
        Tier::Ssr => label.yellow().bold(),
        Tier::Sr => label.magenta(),
        Tier::R => label.normal(),
    }
}
