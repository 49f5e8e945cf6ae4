//! Shared plumbing for the headless host binaries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wyrmvale_core::{ContentBundle, ContentPaths, ParsedMap, load_map};

/// Where the content bundle and the map come from.
#[derive(Args, Debug, Clone)]
pub struct WorldArgs {
    /// Directory holding the YAML documents and tuning.toml
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,
    /// Map file; relative paths resolve against `<assets>/maps`
    #[arg(long, default_value = "training_yard.map")]
    pub map: PathBuf,
    /// Biome used to decode shared tile letters
    #[arg(long, default_value = "forest")]
    pub biome: String,
}

impl WorldArgs {
    pub fn map_path(&self) -> PathBuf {
        if self.map.is_absolute() || self.map.exists() {
            self.map.clone()
        } else {
            self.assets.join("maps").join(&self.map)
        }
    }

    pub fn load(&self) -> Result<(Arc<ContentBundle>, ParsedMap)> {
        let content = load_content(&self.assets)?;
        let map_path = self.map_path();
        let map = load_map(&map_path, &content, &self.biome)
            .with_context(|| format!("failed to load map {}", map_path.display()))?;
        info!(
            map = %map_path.display(),
            width = map.grid.width(),
            height = map.grid.height(),
            monsters = map.monster_spawns.len(),
            npcs = map.npc_spawns.len(),
            "map loaded"
        );
        Ok((content, map))
    }
}

pub fn load_content(assets: &Path) -> Result<Arc<ContentBundle>> {
    let content = ContentBundle::load(&ContentPaths::in_dir(assets))
        .with_context(|| format!("failed to load content bundle from {}", assets.display()))?;
    info!(fingerprint = format!("{:#018x}", content.fingerprint()), "content loaded");
    Ok(Arc::new(content))
}

/// `RUST_LOG` when set, `info` otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
