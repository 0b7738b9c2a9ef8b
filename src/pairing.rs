use std::sync::Arc;

use crate::errors::PlayerError;
use crate::identity;
use crate::store::{PlaylistKind, PlaylistRef, PlaylistStore};

/// Pairing session from the management side: the user enters the MAC
/// and PIN shown on the TV, and on success manages that device's
/// playlist collection.
pub struct PairingSession {
    store: Arc<dyn PlaylistStore>,
    pub mac: String,
    mac_key: String,
}

impl std::fmt::Debug for PairingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairingSession")
            .field("mac", &self.mac)
            .field("mac_key", &self.mac_key)
            .finish_non_exhaustive()
    }
}

impl PairingSession {
    /// Validate the entered MAC/PIN and check them against the store.
    /// Malformed input is a validation error; an unknown device or a
    /// wrong PIN is a pairing error. No state changes on failure.
    pub async fn connect(
        store: Arc<dyn PlaylistStore>,
        mac_input: &str,
        pin_input: &str,
    ) -> Result<Self, PlayerError> {
        let mac = identity::normalize_mac(mac_input)?;
        identity::validate_pin(pin_input)?;

        let mac_key = identity::mac_key(&mac);
        let device = store.get_device(&mac_key).await?.ok_or_else(|| {
            PlayerError::Pairing("Device not found. Launch the app on your TV first.".to_string())
        })?;
        if device.pin != pin_input {
            return Err(PlayerError::Pairing("Incorrect PIN code".to_string()));
        }

        tracing::info!(mac = %mac, "paired with device");
        Ok(Self {
            store,
            mac,
            mac_key,
        })
    }

    pub async fn playlists(&self) -> Result<Vec<PlaylistRef>, PlayerError> {
        self.store.playlists(&self.mac_key).await
    }

    /// Append an M3U URL playlist; returns the generated id
    pub async fn add_m3u(&self, name: &str, url: &str) -> Result<String, PlayerError> {
        let playlist = PlaylistRef {
            id: String::new(),
            name: name.to_string(),
            kind: PlaylistKind::Url,
            url: Some(url.to_string()),
            server: None,
            username: None,
            password: None,
            added_at: chrono::Utc::now().timestamp_millis(),
        };
        self.store.add_playlist(&self.mac_key, &playlist).await
    }

    /// Append an Xtream Codes playlist; returns the generated id
    pub async fn add_xtream(
        &self,
        name: &str,
        server: &str,
        username: &str,
        password: &str,
    ) -> Result<String, PlayerError> {
        let playlist = PlaylistRef {
            id: String::new(),
            name: name.to_string(),
            kind: PlaylistKind::Xtream,
            url: None,
            server: Some(server.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            added_at: chrono::Utc::now().timestamp_millis(),
        };
        self.store.add_playlist(&self.mac_key, &playlist).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), PlayerError> {
        self.store.remove_playlist(&self.mac_key, id).await
    }
}
