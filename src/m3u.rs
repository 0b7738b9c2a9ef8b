use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::{Channel, ChannelCatalog, UNCATEGORIZED};
use crate::errors::PlayerError;

static TVG_LOGO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"tvg-logo="([^"]+)""#).unwrap());
static GROUP_TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"group-title="([^"]+)""#).unwrap());

/// Parse M3U playlist text into a catalog.
///
/// Line scan with a single pending-channel slot: `#EXTINF:` opens a
/// channel (name after the last comma, `tvg-logo`/`group-title`
/// attributes when present), the next non-comment line closes it as the
/// stream URL. Comments, blanks, unknown directives, and URL lines with
/// no open channel are ignored. An `#EXTINF` line without a comma still
/// opens a channel with an empty name.
pub fn parse(content: &str) -> Result<ChannelCatalog, PlayerError> {
    let mut channels: Vec<Channel> = Vec::new();
    let mut pending: Option<Channel> = None;
    let mut saw_extinf = false;

    for raw in content.lines() {
        let line = raw.trim();

        if line.starts_with("#EXTINF:") {
            saw_extinf = true;
            let name = line
                .rsplit_once(',')
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or_default();
            let logo_url = TVG_LOGO_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            let group = GROUP_TITLE_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            pending = Some(Channel {
                name,
                logo_url,
                group,
                stream_url: String::new(),
            });
        } else if !line.is_empty() && !line.starts_with('#') {
            if let Some(mut channel) = pending.take() {
                channel.stream_url = line.to_string();
                channels.push(channel);
            }
        }
    }

    if !saw_extinf {
        return Err(PlayerError::Format(
            "no #EXTINF entries found in playlist".to_string(),
        ));
    }

    Ok(ChannelCatalog::from_parts(Vec::new(), channels))
}

/// Fetch an M3U playlist over HTTP and parse it
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<ChannelCatalog, PlayerError> {
    tracing::debug!(url, "fetching m3u playlist");
    let resp = client.get(url).send().await?.error_for_status()?;
    let text = resp.text().await?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_channel_with_attributes() {
        let input = "#EXTINF:-1 tvg-logo=\"a.png\" group-title=\"News\",CNN\nhttp://x/cnn.m3u8\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.categories(), &["News"]);
        assert_eq!(catalog.channels().len(), 1);
        let ch = &catalog.channels()[0];
        assert_eq!(ch.name, "CNN");
        assert_eq!(ch.logo_url.as_deref(), Some("a.png"));
        assert_eq!(ch.group, "News");
        assert_eq!(ch.stream_url, "http://x/cnn.m3u8");
    }

    #[test]
    fn test_crlf_and_header_lines() {
        let input = "#EXTM3U\r\n#EXTINF:-1,BBC One\r\nhttp://x/bbc1\r\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.channels().len(), 1);
        assert_eq!(catalog.channels()[0].name, "BBC One");
        assert_eq!(catalog.channels()[0].group, UNCATEGORIZED);
        assert_eq!(catalog.categories(), &[UNCATEGORIZED]);
    }

    #[test]
    fn test_extinf_without_comma_yields_empty_name() {
        let input = "#EXTINF:-1 tvg-logo=\"x.png\"\nhttp://x/stream\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.channels().len(), 1);
        assert_eq!(catalog.channels()[0].name, "");
        assert_eq!(catalog.channels()[0].stream_url, "http://x/stream");
    }

    #[test]
    fn test_name_after_last_comma() {
        let input = "#EXTINF:-1 tvg-id=\"a,b\",First, Second\nhttp://x/s\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.channels()[0].name, "Second");
    }

    #[test]
    fn test_url_without_pending_channel_ignored() {
        let input = "http://orphan/stream\n#EXTINF:-1,Real\nhttp://x/real\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.channels().len(), 1);
        assert_eq!(catalog.channels()[0].name, "Real");
    }

    #[test]
    fn test_empty_group_title_keeps_default() {
        let input = "#EXTINF:-1 group-title=\"\",NoGroup\nhttp://x/s\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.channels()[0].group, UNCATEGORIZED);
    }

    #[test]
    fn test_input_without_extinf_is_format_error() {
        let err = parse("just some text\nnothing here\n").unwrap_err();
        assert!(matches!(err, PlayerError::Format(_)));
    }

    #[test]
    fn test_every_channel_has_url_and_known_group() {
        let input = concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 group-title=\"News\",CNN\nhttp://x/1\n",
            "#EXTINF:-1 group-title=\"Sports\",ESPN\nhttp://x/2\n",
            "#EXTINF:-1,Misc\nhttp://x/3\n",
            "#EXTINF:-1 group-title=\"News\",BBC\nhttp://x/4\n",
        );
        let catalog = parse(input).unwrap();
        for channel in catalog.channels() {
            assert!(!channel.stream_url.is_empty());
            assert_eq!(
                catalog
                    .categories()
                    .iter()
                    .filter(|c| **c == channel.group)
                    .count(),
                1
            );
        }
        assert_eq!(catalog.categories(), &["News", "Sports", UNCATEGORIZED]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = "#EXTINF:-1 group-title=\"News\",CNN\nhttp://x/cnn\n#EXTINF:-1,Other\nhttp://x/other\n";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }
}
