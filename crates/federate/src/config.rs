use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use emsn_dis::{
    Appearance, CONTAINER_SHIP_SMALL, CodecOptions, EntityCatalog, EntityTypeCode, Identity,
    SessionOptions, TransportConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FederateConfig {
    pub transport: TransportConfig,
    pub identity: Identity,
    pub tick_interval_secs: f64,
    /// Unix seconds the exercise's simulation clock starts from. Start/Resume
    /// announces the current time when unset.
    pub simulation_start_secs: Option<u64>,
    pub codec: CodecOptions,
    /// Extra named entity types on top of the EMSN ones.
    pub entity_types: BTreeMap<String, EntityTypeCode>,
    pub ship: ShipConfig,
}

impl Default for FederateConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            identity: Identity::default(),
            tick_interval_secs: 1.0,
            simulation_start_secs: None,
            codec: CodecOptions::default(),
            entity_types: BTreeMap::new(),
            ship: ShipConfig::default(),
        }
    }
}

impl FederateConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.transport.group.is_multicast(),
            "{} is not a multicast group",
            self.transport.group
        );
        anyhow::ensure!(
            self.tick_interval_secs.is_finite() && self.tick_interval_secs > 0.0,
            "tick interval must be positive, got {}",
            self.tick_interval_secs
        );
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.tick_interval_secs)
    }

    pub fn catalog(&self) -> EntityCatalog {
        let mut catalog = EntityCatalog::emsn();
        for (name, code) in &self.entity_types {
            catalog.insert(name.clone(), *code);
        }
        catalog
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            codec: self.codec.clone(),
            catalog: self.catalog(),
            simulation_start: self
                .simulation_start_secs
                .map(|secs| UNIX_EPOCH + Duration::from_secs(secs)),
        }
    }
}

/// The single ship this federate sails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub entity_id: u16,
    pub entity_type: String,
    pub marking: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub heading_deg: f64,
    pub speed_mps: f64,
    pub turn_rate_deg_s: f64,
    pub appearance: Appearance,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            entity_id: 1,
            entity_type: CONTAINER_SHIP_SMALL.to_string(),
            marking: "Hi Reto".to_string(),
            latitude_deg: 57.66,
            longitude_deg: 12.44,
            heading_deg: 0.3f64.to_degrees(),
            speed_mps: 2.0,
            turn_rate_deg_s: 0.0,
            appearance: Appearance::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn defaults_match_the_exercise() {
        let config = FederateConfig::default();
        assert_eq!(config.transport.group, Ipv4Addr::new(239, 239, 239, 239));
        assert_eq!(config.transport.port, 20000);
        assert_eq!(config.identity, Identity::new(2, 1, 1));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.session_options().simulation_start, None::<SystemTime>);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FederateConfig::parse(
            r#"
            tick_interval_secs = 0.5
            simulation_start_secs = 1700000000

            [transport]
            multicast_address = "239.1.2.3"
            port = 3000

            [identity]
            site_id = 7
            application_id = 3
            exercise_id = 9

            [codec]
            truncate_marking = false
            timestamp_kind = "absolute"

            [entity_types.tug]
            kind = 1
            domain = 3
            country = 0
            category = 84
            subcategory = 1
            specific = 0
            extra = 0

            [ship]
            marking = "TUG 1"
            entity_type = "tug"
            "#,
        )
        .unwrap();

        assert_eq!(config.transport.group, Ipv4Addr::new(239, 1, 2, 3));
        assert_eq!(config.transport.ttl, 1);
        assert_eq!(config.identity, Identity::new(7, 3, 9));
        assert!(!config.codec.truncate_marking);
        assert_eq!(config.codec.force_id, 1);
        assert_eq!(config.ship.latitude_deg, 57.66);
        assert_eq!(
            config.session_options().simulation_start,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );

        let catalog = config.catalog();
        assert!(catalog.resolve("tug").is_some());
        assert!(catalog.resolve(CONTAINER_SHIP_SMALL).is_some());
    }

    #[test]
    fn unicast_group_is_rejected() {
        let err = FederateConfig::parse("[transport]\ngroup = \"10.0.0.1\"\n").unwrap_err();
        assert!(err.to_string().contains("not a multicast group"));
    }
}
