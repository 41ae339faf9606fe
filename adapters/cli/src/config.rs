//! Run configuration loaded from an optional TOML manifest.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use typer_drive_core::mob::{REGENERATION_DELAY, STEALTH_TOGGLE_PERIOD};
use typer_drive_system_wave_scheduler::SchedulerConfig;
use typer_drive_world::{self as world, DEFAULT_BOUNDARY_X};

/// Manifest version understood by this binary.
pub(crate) const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// World tuning exposed to manifests.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct WorldSettings {
    pub(crate) boundary_x: f32,
    pub(crate) regeneration_delay_ms: u64,
    pub(crate) stealth_period_ms: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            boundary_x: DEFAULT_BOUNDARY_X,
            regeneration_delay_ms: REGENERATION_DELAY.as_millis() as u64,
            stealth_period_ms: STEALTH_TOGGLE_PERIOD.as_millis() as u64,
        }
    }
}

impl WorldSettings {
    pub(crate) fn to_config(self) -> world::Config {
        world::Config::new(
            self.boundary_x,
            Duration::from_millis(self.regeneration_delay_ms),
            Duration::from_millis(self.stealth_period_ms),
        )
    }
}

/// Complete configuration of a headless run.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) world: WorldSettings,
    pub(crate) scheduler: SchedulerConfig,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    world: WorldSettings,
    #[serde(default)]
    scheduler: SchedulerConfig,
}

impl RunConfig {
    /// Loads the manifest at `path`.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run manifest at {}", path.display()))?;
        parse_manifest(&contents)
            .with_context(|| format!("invalid run manifest at {}", path.display()))
    }

    /// Rejects configurations that could never spawn a mob.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.scheduler.total_waves == 0 {
            bail!("total_waves must be at least 1");
        }
        self.scheduler
            .validate()
            .context("scheduler configuration rejected")
    }
}

fn parse_manifest(contents: &str) -> Result<RunConfig> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse run manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported run manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    Ok(RunConfig {
        world: manifest.world,
        scheduler: manifest.scheduler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_overrides_selected_fields() {
        let parsed = parse_manifest(
            r#"
                version = 1

                [world]
                boundary_x = 80.0

                [scheduler]
                total_waves = 4
                letters = ["f", "j"]
                auto_advance_ms = 1500
            "#,
        )
        .expect("manifest should parse");

        assert_eq!(parsed.world.boundary_x, 80.0);
        assert_eq!(parsed.world.regeneration_delay_ms, 1_000);
        assert_eq!(parsed.scheduler.total_waves, 4);
        assert_eq!(parsed.scheduler.letters, vec!['f', 'j']);
        assert_eq!(parsed.scheduler.auto_advance(), Some(Duration::from_millis(1_500)));
        assert_eq!(parsed.scheduler.base_mob_count, 5);
    }

    #[test]
    fn manifest_requires_supported_version() {
        let result = parse_manifest("version = 2");
        assert!(result.is_err(), "version 2 must be rejected");
    }

    #[test]
    fn manifest_requires_version_field() {
        assert!(parse_manifest("[world]\nboundary_x = 10.0").is_err());
    }

    #[test]
    fn validation_rejects_empty_unlock_table() {
        let mut config = RunConfig::default();
        config.scheduler.unlocks.clear();
        assert!(config.validate().is_err());
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn world_settings_convert_to_world_config() {
        let config = WorldSettings::default().to_config();
        assert_eq!(config, world::Config::default());
    }
}
