use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::api::XtreamClient;
use crate::app::{AsyncAction, Command};
use crate::catalog::ChannelCatalog;
use crate::errors::PlayerError;
use crate::identity;
use crate::m3u;
use crate::player::{mode_for, Player};
use crate::store::{PlaylistKind, PlaylistRef, PlaylistStore};

/// Upper bound on one playlist load. A fetch that never resolves would
/// otherwise leave the UI in the loading state forever.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Handles the runtime hands to command execution
#[derive(Clone)]
pub struct Runtime {
    pub store: Arc<dyn PlaylistStore>,
    pub http: reqwest::Client,
    pub player: Player,
    pub tx: mpsc::Sender<AsyncAction>,
    pub mac_key: String,
}

/// Execute one controller command. Store and network work is spawned;
/// results come back to the controller as `AsyncAction`s.
pub async fn run_command(runtime: &Runtime, command: Command) {
    match command {
        Command::CheckPlaylists => {
            let store = runtime.store.clone();
            let mac_key = runtime.mac_key.clone();
            let tx = runtime.tx.clone();
            tokio::spawn(async move {
                let action = match store.playlists(&mac_key).await {
                    Ok(list) => AsyncAction::PlaylistsChanged(list),
                    Err(err) => {
                        tracing::warn!(error = %err, "playlist check failed");
                        AsyncAction::LoadFailed(err.user_message())
                    }
                };
                let _ = tx.send(action).await;
            });
        }
        Command::LoadPlaylist(playlist) => {
            let http = runtime.http.clone();
            let tx = runtime.tx.clone();
            tokio::spawn(async move {
                let action = match tokio::time::timeout(
                    LOAD_TIMEOUT,
                    load_catalog(&http, &playlist),
                )
                .await
                {
                    Ok(Ok(catalog)) => AsyncAction::CatalogLoaded(catalog),
                    Ok(Err(err)) => {
                        tracing::warn!(playlist = %playlist.name, error = %err, "playlist load failed");
                        AsyncAction::LoadFailed(err.user_message())
                    }
                    Err(_) => {
                        tracing::warn!(playlist = %playlist.name, "playlist load timed out");
                        AsyncAction::LoadFailed(
                            PlayerError::Network("playlist load timed out".to_string())
                                .user_message(),
                        )
                    }
                };
                let _ = tx.send(action).await;
            });
        }
        Command::Play { url, name } => {
            if let Err(err) = runtime.player.play(&url, mode_for(&url)) {
                tracing::error!(channel = %name, error = %err, "playback start failed");
                let _ = runtime
                    .tx
                    .send(AsyncAction::LoadFailed(format!("Playback failed: {}", err)))
                    .await;
            }
        }
        Command::StopPlayback => {
            runtime.player.stop();
        }
        Command::RegeneratePin => {
            let store = runtime.store.clone();
            let mac_key = runtime.mac_key.clone();
            let tx = runtime.tx.clone();
            tokio::spawn(async move {
                let pin = identity::generate_pin();
                let action = match store.set_pin(&mac_key, &pin).await {
                    Ok(()) => AsyncAction::PinRegenerated(pin),
                    Err(err) => AsyncAction::LoadFailed(err.user_message()),
                };
                let _ = tx.send(action).await;
            });
        }
        Command::Quit => {}
    }
}

/// Resolve a playlist record to a catalog. Both sources build the whole
/// catalog before returning, so a failure never leaves partial state.
async fn load_catalog(
    http: &reqwest::Client,
    playlist: &PlaylistRef,
) -> Result<ChannelCatalog, PlayerError> {
    match playlist.kind {
        PlaylistKind::Url => {
            let url = playlist
                .url
                .as_deref()
                .ok_or_else(|| PlayerError::Format("playlist record has no URL".to_string()))?;
            m3u::fetch(http, url).await
        }
        PlaylistKind::Xtream => {
            let server = playlist
                .server
                .clone()
                .ok_or_else(|| PlayerError::Format("playlist record has no server".to_string()))?;
            let username = playlist.username.clone().unwrap_or_default();
            let password = playlist.password.clone().unwrap_or_default();
            XtreamClient::new(server, username, password)
                .load_catalog()
                .await
        }
    }
}
