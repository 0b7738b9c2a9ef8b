use house_player_lib::api::{build_catalog, LiveCategory, LiveStream, XtreamClient};
use house_player_lib::catalog::UNCATEGORIZED;
use house_player_lib::errors::PlayerError;
use house_player_lib::m3u;

fn xtream_client() -> XtreamClient {
    XtreamClient::new(
        "http://iptv.example".to_string(),
        "alice".to_string(),
        "secret".to_string(),
    )
}

const M3U_FIXTURE: &str = concat!(
    "#EXTM3U\n",
    "#EXTINF:-1 tvg-id=\"cnn.us\" tvg-logo=\"http://logos/cnn.png\" group-title=\"News\",CNN\n",
    "http://iptv.example/live/alice/secret/1.m3u8\n",
    "#EXTINF:-1 group-title=\"Sports\",ESPN\n",
    "http://iptv.example/live/alice/secret/2.m3u8\n",
    "#EXTINF:-1,Local Channel\n",
    "http://iptv.example/live/alice/secret/3.m3u8\n",
    "#EXTINF:-1 group-title=\"News\",BBC World\n",
    "http://iptv.example/live/alice/secret/4.m3u8\n",
);

#[test]
fn test_m3u_fixture_walkthrough() {
    let catalog = m3u::parse(M3U_FIXTURE).unwrap();

    assert_eq!(catalog.categories(), &["News", "Sports", UNCATEGORIZED]);
    assert_eq!(catalog.channels().len(), 4);

    let cnn = &catalog.channels()[0];
    assert_eq!(cnn.name, "CNN");
    assert_eq!(cnn.group, "News");
    assert_eq!(cnn.logo_url.as_deref(), Some("http://logos/cnn.png"));
    assert_eq!(cnn.stream_url, "http://iptv.example/live/alice/secret/1.m3u8");

    let news: Vec<&str> = catalog
        .channels_in("News")
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(news, vec!["CNN", "BBC World"]);
    assert_eq!(catalog.channel_count(UNCATEGORIZED), 1);
}

#[test]
fn test_both_sources_normalize_to_the_same_model() {
    let from_m3u = m3u::parse(M3U_FIXTURE).unwrap();

    let categories: Vec<LiveCategory> = serde_json::from_str(
        r#"[{"category_id":"7","category_name":"News"},
            {"category_id":8,"category_name":"Sports"}]"#,
    )
    .unwrap();
    let streams: Vec<LiveStream> = serde_json::from_str(
        r#"[{"stream_id":1,"name":"CNN","stream_icon":"http://logos/cnn.png","category_id":"7"},
            {"stream_id":2,"name":"ESPN","category_id":8},
            {"stream_id":3,"name":"Local Channel","category_id":99},
            {"stream_id":4,"name":"BBC World","category_id":7}]"#,
    )
    .unwrap();
    let from_xtream = build_catalog(&xtream_client(), categories, streams);

    // Same channels, same groups, same category ordering, regardless of
    // which playlist source produced the catalog
    assert_eq!(from_m3u.categories(), from_xtream.categories());
    let names = |catalog: &house_player_lib::catalog::ChannelCatalog| -> Vec<(String, String)> {
        catalog
            .channels()
            .iter()
            .map(|c| (c.name.clone(), c.group.clone()))
            .collect()
    };
    assert_eq!(names(&from_m3u), names(&from_xtream));
    assert_eq!(
        from_xtream.channels()[0].stream_url,
        "http://iptv.example/live/alice/secret/1.m3u8"
    );
}

#[test]
fn test_every_group_resolves_to_one_category_entry() {
    let catalog = m3u::parse(M3U_FIXTURE).unwrap();
    for channel in catalog.channels() {
        let hits = catalog
            .categories()
            .iter()
            .filter(|c| **c == channel.group)
            .count();
        assert_eq!(hits, 1, "group {} listed {} times", channel.group, hits);
    }
}

#[test]
fn test_xtream_without_categories_still_builds() {
    let streams: Vec<LiveStream> = serde_json::from_str(
        r#"[{"stream_id":1,"name":"Solo","category_id":5}]"#,
    )
    .unwrap();
    let catalog = build_catalog(&xtream_client(), Vec::new(), streams);
    assert_eq!(catalog.categories(), &[UNCATEGORIZED]);
    assert_eq!(catalog.channels()[0].group, UNCATEGORIZED);
}

#[test]
fn test_non_playlist_text_is_a_format_error() {
    let err = m3u::parse("<html><body>Not Found</body></html>").unwrap_err();
    assert!(matches!(err, PlayerError::Format(_)));
}
