use serde::{Deserialize, Serialize};

/// Fallback group for channels that carry no category information
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single playable channel. Immutable once parsed; identity is its
/// position in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub logo_url: Option<String>,
    pub group: String,
    pub stream_url: String,
}

/// Read-only view of one loaded playlist: channels in source order plus
/// the distinct category labels in order of first appearance.
///
/// A catalog is always constructed whole and swapped into the session in
/// one assignment, so consumers never observe categories without their
/// channels or vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelCatalog {
    categories: Vec<String>,
    channels: Vec<Channel>,
}

impl ChannelCatalog {
    /// Build a catalog from an ordered category listing and the parsed
    /// channels. Duplicate category names are dropped (first occurrence
    /// wins) and any channel group absent from the listing is appended
    /// after it, so every channel's group resolves to exactly one entry.
    ///
    /// M3U parsing passes an empty listing and gets purely
    /// first-occurrence ordering; Xtream passes the server's category
    /// response order.
    pub fn from_parts(category_listing: Vec<String>, channels: Vec<Channel>) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for name in category_listing {
            if !categories.contains(&name) {
                categories.push(name);
            }
        }
        for channel in &channels {
            if !categories.contains(&channel.group) {
                categories.push(channel.group.clone());
            }
        }
        Self {
            categories,
            channels,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channels whose group equals `category`, preserving source order
    pub fn channels_in(&self, category: &str) -> Vec<&Channel> {
        self.channels
            .iter()
            .filter(|c| c.group == category)
            .collect()
    }

    /// Channel count for the category cards on the home screen
    pub fn channel_count(&self, category: &str) -> usize {
        self.channels.iter().filter(|c| c.group == category).count()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
