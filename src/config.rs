use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::identity::DeviceIdentity;

/// Locally persisted device state. The MAC and PIN are generated on
/// first launch and reused on every subsequent one so the pairing key
/// stays stable across restarts.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LocalState {
    pub mac: Option<String>,
    pub pin: Option<String>,
    #[serde(default)]
    pub store_url: Option<String>,
}

impl LocalState {
    pub fn load() -> Result<Self, anyhow::Error> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "houseplayer", "house-player") {
            let path = proj_dirs.config_dir().join("state.json");
            if path.exists() {
                let content = fs::read_to_string(path)?;
                let state: LocalState = serde_json::from_str(&content)?;
                return Ok(state);
            }
        }
        Ok(LocalState::default())
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "houseplayer", "house-player") {
            let config_dir = proj_dirs.config_dir();
            fs::create_dir_all(config_dir)?;
            let path = config_dir.join("state.json");
            let content = serde_json::to_string_pretty(self)?;
            fs::write(path, content)?;
        }
        Ok(())
    }

    /// Return the stored identity, generating one on first use. The
    /// caller persists the state once startup wiring is done.
    pub fn device_identity(&mut self) -> DeviceIdentity {
        match (&self.mac, &self.pin) {
            (Some(mac), Some(pin)) => DeviceIdentity {
                mac: mac.clone(),
                pin: pin.clone(),
            },
            _ => {
                let identity = DeviceIdentity::generate();
                self.mac = Some(identity.mac.clone());
                self.pin = Some(identity.pin.clone());
                identity
            }
        }
    }

    /// Replace the PIN after a regeneration. The caller persists, same
    /// as with `device_identity`.
    pub fn set_pin(&mut self, pin: String) {
        self.pin = Some(pin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_identity_is_stable() {
        let mut state = LocalState {
            mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
            pin: Some("12345".to_string()),
            store_url: None,
        };
        let id = state.device_identity();
        assert_eq!(id.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(id.pin, "12345");
    }

    #[test]
    fn test_set_pin_replaces_only_the_pin() {
        let mut state = LocalState {
            mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
            pin: Some("12345".to_string()),
            store_url: Some("http://db.example".to_string()),
        };
        state.set_pin("54321".to_string());
        assert_eq!(state.pin.as_deref(), Some("54321"));
        assert_eq!(state.mac.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(state.store_url.as_deref(), Some("http://db.example"));
    }

    #[test]
    fn test_missing_identity_is_generated() {
        let mut state = LocalState::default();
        let id = state.device_identity();
        assert_eq!(state.mac.as_deref(), Some(id.mac.as_str()));
        assert_eq!(state.pin.as_deref(), Some(id.pin.as_str()));
    }
}
