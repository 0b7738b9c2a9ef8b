use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::errors::PlayerError;

/// Device record at `devices/{macKey}` in the external store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub mac: String,
    pub pin: String,
    #[serde(default)]
    pub last_seen: i64,
    #[serde(default)]
    pub device_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistKind {
    Url,
    Xtream,
}

/// Playlist record pushed by the pairing web UI under
/// `devices/{macKey}/playlists/{id}`. The id is the push key, not part
/// of the stored body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRef {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PlaylistKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "addedAt", default)]
    pub added_at: i64,
}

/// Turn a `{id: record}` snapshot into a deterministic list. The
/// original UI relied on object insertion order; snapshots here sort by
/// (`addedAt`, id) instead.
fn snapshot_to_list(map: HashMap<String, PlaylistRef>) -> Vec<PlaylistRef> {
    let mut list: Vec<PlaylistRef> = map
        .into_iter()
        .map(|(id, mut p)| {
            p.id = id;
            p
        })
        .collect();
    list.sort_by(|a, b| (a.added_at, &a.id).cmp(&(b.added_at, &b.id)));
    list
}

/// Repository interface over the external realtime key-value store.
/// The core depends only on this trait, never on a concrete backend.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Point read of a device record; `None` when the device is unknown
    async fn get_device(&self, mac_key: &str) -> Result<Option<DeviceRecord>, PlayerError>;

    /// Field-merging update of the device record (creates it if absent)
    async fn register_device(
        &self,
        mac_key: &str,
        record: &DeviceRecord,
    ) -> Result<(), PlayerError>;

    /// Overwrite just the activation PIN field
    async fn set_pin(&self, mac_key: &str, pin: &str) -> Result<(), PlayerError>;

    /// All playlists stored for the device, in (`addedAt`, id) order
    async fn playlists(&self, mac_key: &str) -> Result<Vec<PlaylistRef>, PlayerError>;

    /// Push-append a playlist; returns the generated id
    async fn add_playlist(
        &self,
        mac_key: &str,
        playlist: &PlaylistRef,
    ) -> Result<String, PlayerError>;

    async fn remove_playlist(&self, mac_key: &str, id: &str) -> Result<(), PlayerError>;
}

/// Live view of a device's playlist collection. The store's native push
/// feed is not reachable over plain REST, so this polls on an interval
/// and publishes snapshots through a watch channel; a failed poll keeps
/// the last good snapshot.
pub fn subscribe_playlists(
    store: Arc<dyn PlaylistStore>,
    mac_key: String,
    interval: Duration,
) -> watch::Receiver<Vec<PlaylistRef>> {
    let (tx, rx) = watch::channel(Vec::new());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            match store.playlists(&mac_key).await {
                Ok(list) => {
                    tx.send_if_modified(|current| {
                        if *current != list {
                            *current = list;
                            true
                        } else {
                            false
                        }
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "playlist poll failed");
                }
            }
        }
    });
    rx
}

/// REST client for the hosted realtime database. Paths follow the
/// `{base}/devices/{macKey}[...].json` dialect; pushing to a collection
/// returns `{"name": "<generated id>"}`.
#[derive(Debug, Clone)]
pub struct RtdbStore {
    base_url: String,
    client: reqwest::Client,
}

impl RtdbStore {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn device_url(&self, mac_key: &str) -> String {
        format!("{}/devices/{}.json", self.base_url, mac_key)
    }

    fn playlists_url(&self, mac_key: &str) -> String {
        format!("{}/devices/{}/playlists.json", self.base_url, mac_key)
    }
}

#[async_trait]
impl PlaylistStore for RtdbStore {
    async fn get_device(&self, mac_key: &str) -> Result<Option<DeviceRecord>, PlayerError> {
        let resp = self
            .client
            .get(self.device_url(mac_key))
            .send()
            .await?
            .error_for_status()?;
        // An absent path reads back as JSON null
        let record: Option<DeviceRecord> = resp.json().await?;
        Ok(record)
    }

    async fn register_device(
        &self,
        mac_key: &str,
        record: &DeviceRecord,
    ) -> Result<(), PlayerError> {
        self.client
            .patch(self.device_url(mac_key))
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn set_pin(&self, mac_key: &str, pin: &str) -> Result<(), PlayerError> {
        let url = format!("{}/devices/{}/pin.json", self.base_url, mac_key);
        self.client
            .put(url)
            .json(&pin)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn playlists(&self, mac_key: &str) -> Result<Vec<PlaylistRef>, PlayerError> {
        let resp = self
            .client
            .get(self.playlists_url(mac_key))
            .send()
            .await?
            .error_for_status()?;
        let snapshot: Option<HashMap<String, PlaylistRef>> = resp.json().await?;
        Ok(snapshot_to_list(snapshot.unwrap_or_default()))
    }

    async fn add_playlist(
        &self,
        mac_key: &str,
        playlist: &PlaylistRef,
    ) -> Result<String, PlayerError> {
        #[derive(Deserialize)]
        struct PushResponse {
            name: String,
        }
        let resp = self
            .client
            .post(self.playlists_url(mac_key))
            .json(playlist)
            .send()
            .await?
            .error_for_status()?;
        let push: PushResponse = resp.json().await?;
        Ok(push.name)
    }

    async fn remove_playlist(&self, mac_key: &str, id: &str) -> Result<(), PlayerError> {
        let url = format!("{}/devices/{}/playlists/{}.json", self.base_url, mac_key, id);
        self.client.delete(url).send().await?.error_for_status()?;
        Ok(())
    }
}

#[derive(Default)]
struct StoredDevice {
    record: DeviceRecord,
    playlists: BTreeMap<String, PlaylistRef>,
}

/// In-memory store used by the test suite (and by offline runs)
#[derive(Default, Clone)]
pub struct MemoryStore {
    devices: Arc<Mutex<HashMap<String, StoredDevice>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn get_device(&self, mac_key: &str) -> Result<Option<DeviceRecord>, PlayerError> {
        let devices = self.devices.lock().expect("memory store poisoned");
        Ok(devices.get(mac_key).map(|d| d.record.clone()))
    }

    async fn register_device(
        &self,
        mac_key: &str,
        record: &DeviceRecord,
    ) -> Result<(), PlayerError> {
        let mut devices = self.devices.lock().expect("memory store poisoned");
        devices.entry(mac_key.to_string()).or_default().record = record.clone();
        Ok(())
    }

    async fn set_pin(&self, mac_key: &str, pin: &str) -> Result<(), PlayerError> {
        let mut devices = self.devices.lock().expect("memory store poisoned");
        devices.entry(mac_key.to_string()).or_default().record.pin = pin.to_string();
        Ok(())
    }

    async fn playlists(&self, mac_key: &str) -> Result<Vec<PlaylistRef>, PlayerError> {
        let devices = self.devices.lock().expect("memory store poisoned");
        let map = devices
            .get(mac_key)
            .map(|d| d.playlists.clone().into_iter().collect())
            .unwrap_or_default();
        Ok(snapshot_to_list(map))
    }

    async fn add_playlist(
        &self,
        mac_key: &str,
        playlist: &PlaylistRef,
    ) -> Result<String, PlayerError> {
        let id = format!("pl{:04}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut devices = self.devices.lock().expect("memory store poisoned");
        let mut stored = playlist.clone();
        stored.id = id.clone();
        devices
            .entry(mac_key.to_string())
            .or_default()
            .playlists
            .insert(id.clone(), stored);
        Ok(id)
    }

    async fn remove_playlist(&self, mac_key: &str, id: &str) -> Result<(), PlayerError> {
        let mut devices = self.devices.lock().expect("memory store poisoned");
        if let Some(device) = devices.get_mut(mac_key) {
            device.playlists.remove(id);
        }
        Ok(())
    }
}
