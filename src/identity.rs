use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::PlayerError;

static MAC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-F0-9]{2}:){5}[A-F0-9]{2}$").unwrap());
static PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());

/// Identity of one device installation: a random MAC-style address shown
/// on screen and a 5-digit PIN used as the activation secret. Generated
/// once and persisted locally; mirrored to the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub mac: String,
    pub pin: String,
}

impl DeviceIdentity {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let octets: Vec<String> = (0..6)
            .map(|_| format!("{:02X}", rng.gen_range(0..=255u8)))
            .collect();
        Self {
            mac: octets.join(":"),
            pin: generate_pin(),
        }
    }

    /// Store record key: MAC with separators replaced
    pub fn mac_key(&self) -> String {
        mac_key(&self.mac)
    }
}

pub fn generate_pin() -> String {
    let mut rng = rand::thread_rng();
    (0..5)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub fn mac_key(mac: &str) -> String {
    mac.replace(':', "_")
}

/// Uppercase and validate a user-entered MAC address
pub fn normalize_mac(input: &str) -> Result<String, PlayerError> {
    let mac = input.trim().to_uppercase();
    if !MAC_RE.is_match(&mac) {
        return Err(PlayerError::Validation(
            "Invalid MAC format. Use XX:XX:XX:XX:XX:XX".to_string(),
        ));
    }
    Ok(mac)
}

pub fn validate_pin(input: &str) -> Result<(), PlayerError> {
    if !PIN_RE.is_match(input) {
        return Err(PlayerError::Validation(
            "PIN must be exactly 5 digits".to_string(),
        ));
    }
    Ok(())
}
