use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Channel, ChannelCatalog, UNCATEGORIZED};
use crate::errors::PlayerError;
use crate::flex_id::FlexId;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LiveCategory {
    pub category_id: FlexId,
    pub category_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LiveStream {
    pub stream_id: FlexId,
    pub name: String,
    #[serde(default)]
    pub stream_icon: Option<String>,
    #[serde(default)]
    pub category_id: FlexId,
}

/// Client for the Xtream Codes `player_api.php` endpoints
#[derive(Debug, Clone)]
pub struct XtreamClient {
    pub base_url: String,
    pub username: String,
    pub password: String,
    client: reqwest::Client,
}

impl XtreamClient {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .user_agent("HousePlayer/1.0")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url,
            username,
            password,
            client,
        }
    }

    pub async fn get_live_categories(&self) -> Result<Vec<LiveCategory>, PlayerError> {
        let url = format!(
            "{}/player_api.php?username={}&password={}&action=get_live_categories",
            self.base_url, self.username, self.password
        );
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let categories: Vec<LiveCategory> = resp.json().await?;
        Ok(categories)
    }

    pub async fn get_live_streams(&self) -> Result<Vec<LiveStream>, PlayerError> {
        let url = format!(
            "{}/player_api.php?username={}&password={}&action=get_live_streams",
            self.base_url, self.username, self.password
        );
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let streams: Vec<LiveStream> = resp.json().await?;
        Ok(streams)
    }

    /// Playable HLS URL for a live stream
    pub fn live_stream_url(&self, stream_id: &FlexId) -> String {
        format!(
            "{}/live/{}/{}/{}.m3u8",
            self.base_url, self.username, self.password, stream_id
        )
    }

    /// Fetch categories and streams and normalize them into a catalog.
    /// Both requests must succeed; a failure in either leaves no partial
    /// catalog behind.
    pub async fn load_catalog(&self) -> Result<ChannelCatalog, PlayerError> {
        let categories = self.get_live_categories().await?;
        let streams = self.get_live_streams().await?;
        tracing::debug!(
            categories = categories.len(),
            streams = streams.len(),
            "xtream listings fetched"
        );
        Ok(build_catalog(self, categories, streams))
    }
}

/// Normalize Xtream listings into the common channel model. Stream order
/// is preserved; a stream whose `category_id` matches no category entry
/// falls back to the "Uncategorized" group.
pub fn build_catalog(
    client: &XtreamClient,
    categories: Vec<LiveCategory>,
    streams: Vec<LiveStream>,
) -> ChannelCatalog {
    let names_by_id: HashMap<String, String> = categories
        .iter()
        .filter_map(|c| c.category_id.key().map(|id| (id, c.category_name.clone())))
        .collect();

    let listing: Vec<String> = categories.into_iter().map(|c| c.category_name).collect();

    let channels: Vec<Channel> = streams
        .into_iter()
        .map(|stream| {
            let group = stream
                .category_id
                .key()
                .and_then(|id| names_by_id.get(&id).cloned())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            Channel {
                stream_url: client.live_stream_url(&stream.stream_id),
                name: stream.name,
                logo_url: stream.stream_icon.filter(|s| !s.is_empty()),
                group,
            }
        })
        .collect();

    ChannelCatalog::from_parts(listing, channels)
}
