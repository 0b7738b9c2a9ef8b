use crate::catalog::ChannelCatalog;
use crate::identity::DeviceIdentity;
use crate::navigator::{Direction, FocusRing};
use crate::remote::RemoteKey;
use crate::store::PlaylistRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentScreen {
    /// Pairing instructions; shown until the device has playlists
    Activation,
    /// Sidebar + active section, with an optional channel-list overlay
    Home,
    /// External engine is playing; back returns to Home
    Player,
}

/// Sidebar sections of the Home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Playlists,
    Live,
    Settings,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Playlists, Section::Live, Section::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Playlists => "Playlists",
            Section::Live => "Live TV",
            Section::Settings => "Settings",
        }
    }
}

/// One focusable UI item. Indices refer to the current playlist
/// collection, the catalog's category list, or the open overlay's
/// channel list respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Nav(Section),
    Playlist(usize),
    Category(usize),
    Channel(usize),
    CheckActivation,
    RefreshPlaylists,
    RegeneratePin,
}

/// Results of background work, routed back into the controller through
/// the runtime's mpsc channel
#[derive(Debug, Clone)]
pub enum AsyncAction {
    /// Snapshot from the store subscription or an explicit check;
    /// unconditionally overwrites the in-memory collection
    PlaylistsChanged(Vec<PlaylistRef>),
    CatalogLoaded(ChannelCatalog),
    LoadFailed(String),
    PinRegenerated(String),
}

/// Side effects the runtime must execute for the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Re-read the device's playlist collection from the store
    CheckPlaylists,
    LoadPlaylist(PlaylistRef),
    Play { url: String, name: String },
    StopPlayback,
    RegeneratePin,
    Quit,
}

/// Session controller: owns the screen state machine, the loaded
/// catalog, and the focus ring, and turns remote-control signals into
/// commands for the runtime. Pure state — no IO happens here, which is
/// what keeps the whole flow testable without a rendering surface.
pub struct App {
    pub identity: DeviceIdentity,
    pub current_screen: CurrentScreen,
    pub active_section: Section,
    /// Open channel-list overlay: index into `catalog.categories()`.
    /// Only meaningful while on Home.
    pub channel_overlay: Option<usize>,
    pub playlists: Vec<PlaylistRef>,
    pub catalog: ChannelCatalog,
    pub focus: FocusRing<FocusTarget>,
    /// Single-flight guard: activate input is dropped while a playlist
    /// load is in flight
    pub loading: bool,
    pub loading_message: Option<String>,
    /// Last user-visible error, cleared by the next successful load
    pub status: Option<String>,
    pub now_playing: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(identity: DeviceIdentity) -> Self {
        let mut app = Self {
            identity,
            current_screen: CurrentScreen::Activation,
            active_section: Section::Playlists,
            channel_overlay: None,
            playlists: Vec::new(),
            catalog: ChannelCatalog::default(),
            focus: FocusRing::new(),
            loading: false,
            loading_message: None,
            status: None,
            now_playing: None,
            should_quit: false,
        };
        app.rebuild_focus();
        app
    }

    /// The focusable items for the current screen/section/overlay, in
    /// visual order: sidebar entries first, then the active section's
    /// cards. An open overlay is modal and exposes only its channels.
    pub fn focus_targets(&self) -> Vec<FocusTarget> {
        match self.current_screen {
            CurrentScreen::Activation => vec![FocusTarget::CheckActivation],
            CurrentScreen::Player => Vec::new(),
            CurrentScreen::Home => {
                if let Some(cat_idx) = self.channel_overlay {
                    let count = self
                        .catalog
                        .categories()
                        .get(cat_idx)
                        .map(|c| self.catalog.channel_count(c))
                        .unwrap_or(0);
                    return (0..count).map(FocusTarget::Channel).collect();
                }
                let mut targets: Vec<FocusTarget> =
                    Section::ALL.iter().copied().map(FocusTarget::Nav).collect();
                match self.active_section {
                    Section::Playlists => {
                        targets.extend((0..self.playlists.len()).map(FocusTarget::Playlist));
                    }
                    Section::Live => {
                        targets
                            .extend((0..self.catalog.categories().len()).map(FocusTarget::Category));
                    }
                    Section::Settings => {
                        targets.push(FocusTarget::RefreshPlaylists);
                        targets.push(FocusTarget::RegeneratePin);
                    }
                }
                targets
            }
        }
    }

    pub fn rebuild_focus(&mut self) {
        let targets = self.focus_targets();
        self.focus.rebuild(targets);
    }

    pub fn switch_section(&mut self, section: Section) {
        self.active_section = section;
        self.channel_overlay = None;
        self.rebuild_focus();
    }

    /// One remote signal in, zero or more runtime commands out
    pub fn handle_key(&mut self, key: RemoteKey) -> Vec<Command> {
        match key {
            RemoteKey::Direction(direction) => {
                self.focus.step(direction);
                Vec::new()
            }
            RemoteKey::Ok => self.activate(),
            RemoteKey::Back => self.back(),
        }
    }

    fn activate(&mut self) -> Vec<Command> {
        if self.loading {
            return Vec::new();
        }
        if self.current_screen == CurrentScreen::Activation {
            // Poll-like retry of the pairing check, driven by the user
            return vec![Command::CheckPlaylists];
        }
        let Some(target) = self.focus.focused().copied() else {
            return Vec::new();
        };
        match target {
            FocusTarget::Nav(section) => {
                self.switch_section(section);
                Vec::new()
            }
            FocusTarget::Playlist(index) => match self.playlists.get(index) {
                Some(playlist) => {
                    self.loading = true;
                    self.loading_message = Some(format!("Loading {}...", playlist.name));
                    vec![Command::LoadPlaylist(playlist.clone())]
                }
                None => Vec::new(),
            },
            FocusTarget::Category(index) => {
                if index < self.catalog.categories().len() {
                    self.channel_overlay = Some(index);
                    self.rebuild_focus();
                }
                Vec::new()
            }
            FocusTarget::Channel(index) => self.play_channel(index),
            FocusTarget::CheckActivation | FocusTarget::RefreshPlaylists => {
                vec![Command::CheckPlaylists]
            }
            FocusTarget::RegeneratePin => vec![Command::RegeneratePin],
        }
    }

    fn play_channel(&mut self, index: usize) -> Vec<Command> {
        let Some(cat_idx) = self.channel_overlay else {
            return Vec::new();
        };
        let Some(category) = self.catalog.categories().get(cat_idx) else {
            return Vec::new();
        };
        let Some(channel) = self.catalog.channels_in(category).get(index).copied() else {
            return Vec::new();
        };
        let (url, name) = (channel.stream_url.clone(), channel.name.clone());
        tracing::info!(channel = %name, "starting playback");
        self.channel_overlay = None;
        self.current_screen = CurrentScreen::Player;
        self.now_playing = Some(name.clone());
        self.rebuild_focus();
        vec![Command::Play { url, name }]
    }

    /// Contextual back: leave the player, close the overlay, or fall
    /// back to the playlist section. On Activation there is nothing to
    /// go back to, so the app quits.
    fn back(&mut self) -> Vec<Command> {
        match self.current_screen {
            CurrentScreen::Player => {
                self.current_screen = CurrentScreen::Home;
                self.now_playing = None;
                self.rebuild_focus();
                vec![Command::StopPlayback]
            }
            CurrentScreen::Home => {
                if self.channel_overlay.is_some() {
                    self.channel_overlay = None;
                    self.rebuild_focus();
                } else {
                    self.switch_section(Section::Playlists);
                }
                Vec::new()
            }
            CurrentScreen::Activation => {
                self.should_quit = true;
                vec![Command::Quit]
            }
        }
    }

    /// Apply the result of background work. Events are applied in
    /// arrival order; playlist snapshots are last-write-wins.
    pub fn handle_async(&mut self, action: AsyncAction) {
        match action {
            AsyncAction::PlaylistsChanged(list) => {
                self.playlists = list;
                if self.current_screen == CurrentScreen::Activation && !self.playlists.is_empty() {
                    tracing::info!("device activated, entering home screen");
                    self.current_screen = CurrentScreen::Home;
                    self.active_section = Section::Playlists;
                }
                self.rebuild_focus();
            }
            AsyncAction::CatalogLoaded(catalog) => {
                tracing::info!(
                    channels = catalog.channels().len(),
                    categories = catalog.categories().len(),
                    "catalog loaded"
                );
                self.loading = false;
                self.loading_message = None;
                self.status = None;
                // Whole-catalog swap: never categories without channels
                self.catalog = catalog;
                self.switch_section(Section::Live);
            }
            AsyncAction::LoadFailed(message) => {
                tracing::warn!(message, "load failed");
                // Previous catalog and screen stay intact
                self.loading = false;
                self.loading_message = None;
                self.status = Some(message);
            }
            AsyncAction::PinRegenerated(pin) => {
                self.status = Some(format!("New PIN generated: {}", pin));
                self.identity.pin = pin;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PlaylistKind, PlaylistRef};

    fn test_app() -> App {
        App::new(DeviceIdentity {
            mac: "AA:BB:CC:DD:EE:FF".to_string(),
            pin: "12345".to_string(),
        })
    }

    fn url_playlist(name: &str) -> PlaylistRef {
        PlaylistRef {
            id: format!("id-{}", name),
            name: name.to_string(),
            kind: PlaylistKind::Url,
            url: Some(format!("http://example.com/{}.m3u", name)),
            server: None,
            username: None,
            password: None,
            added_at: 0,
        }
    }

    #[test]
    fn test_starts_on_activation() {
        let app = test_app();
        assert_eq!(app.current_screen, CurrentScreen::Activation);
        assert_eq!(app.focus.items(), &[FocusTarget::CheckActivation]);
    }

    #[test]
    fn test_ok_on_activation_rechecks_store() {
        let mut app = test_app();
        assert_eq!(app.handle_key(RemoteKey::Ok), vec![Command::CheckPlaylists]);
        assert_eq!(app.current_screen, CurrentScreen::Activation);
    }

    #[test]
    fn test_playlists_arriving_moves_to_home() {
        let mut app = test_app();
        app.handle_async(AsyncAction::PlaylistsChanged(vec![url_playlist("a")]));
        assert_eq!(app.current_screen, CurrentScreen::Home);
        assert_eq!(app.active_section, Section::Playlists);
        // Sidebar entries plus one playlist card
        assert_eq!(app.focus.len(), Section::ALL.len() + 1);
    }

    #[test]
    fn test_empty_snapshot_stays_on_activation() {
        let mut app = test_app();
        app.handle_async(AsyncAction::PlaylistsChanged(Vec::new()));
        assert_eq!(app.current_screen, CurrentScreen::Activation);
    }

    #[test]
    fn test_load_is_single_flight() {
        let mut app = test_app();
        app.handle_async(AsyncAction::PlaylistsChanged(vec![url_playlist("a")]));

        // Focus the playlist card (after the three sidebar entries)
        for _ in 0..Section::ALL.len() {
            app.handle_key(RemoteKey::Direction(Direction::Right));
        }
        let commands = app.handle_key(RemoteKey::Ok);
        assert!(matches!(commands[..], [Command::LoadPlaylist(_)]));
        assert!(app.loading);

        // Second activation is dropped until the load resolves
        assert!(app.handle_key(RemoteKey::Ok).is_empty());

        app.handle_async(AsyncAction::LoadFailed("network error".to_string()));
        assert!(!app.loading);
        assert_eq!(app.status.as_deref(), Some("network error"));
        assert_eq!(app.active_section, Section::Playlists);
    }

    #[test]
    fn test_back_on_activation_quits() {
        let mut app = test_app();
        assert_eq!(app.handle_key(RemoteKey::Back), vec![Command::Quit]);
        assert!(app.should_quit);
    }
}
