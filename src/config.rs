use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub hospital: HospitalConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HospitalConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl HospitalConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Marker advance period. 200 ms reads as believable vehicle speed;
    /// anything much faster looks like teleporting.
    pub tick_interval_ms: u64,
    pub heading_blend: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            tick_interval_ms: 200,
            heading_blend: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Road snapping tolerance: a routed start farther than this from the
    /// hospital gets the hospital prepended.
    pub anchor_gap_meters: f64,
    pub viewport_padding_px: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            anchor_gap_meters: 50.0,
            viewport_padding_px: 50,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
            },
            hospital: HospitalConfig {
                name: "IITB Hospital".to_string(),
                latitude: 19.1309507,
                longitude: 72.9146062,
            },
            animation: AnimationConfig::default(),
            map: MapConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [backend]
            base_url = "http://localhost:8000"

            [hospital]
            name = "Test Hospital"
            latitude = 1.0
            longitude = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.animation.tick_interval_ms, 200);
        assert_eq!(config.map.anchor_gap_meters, 50.0);
    }
}
