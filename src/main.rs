use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use house_player_lib::app::{App, AsyncAction, Command, CurrentScreen, FocusTarget};
use house_player_lib::config::LocalState;
use house_player_lib::handlers::actions::{run_command, Runtime};
use house_player_lib::identity::DeviceIdentity;
use house_player_lib::pairing::PairingSession;
use house_player_lib::player::Player;
use house_player_lib::remote;
use house_player_lib::store::{
    subscribe_playlists, DeviceRecord, PlaylistKind, PlaylistStore, RtdbStore,
};

#[derive(Parser, Debug)]
#[command(version, about = "Paired IPTV player for the living room")]
struct Args {
    /// Base URL of the hosted realtime database
    #[arg(long)]
    store_url: Option<String>,

    /// Seconds between playlist subscription polls
    #[arg(long, default_value_t = 5)]
    poll_secs: u64,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Manage a paired device's playlists (the web form's job, from the CLI)
    Pair {
        /// Device MAC as shown on the TV screen
        mac: String,
        /// 5-digit PIN as shown on the TV screen
        pin: String,
        #[command(subcommand)]
        action: PairCmd,
    },
}

#[derive(Subcommand, Debug)]
enum PairCmd {
    /// List the device's playlists
    List,
    /// Add an M3U URL playlist
    AddUrl { name: String, url: String },
    /// Add an Xtream Codes playlist
    AddXtream {
        name: String,
        server: String,
        username: String,
        password: String,
    },
    /// Delete a playlist by id
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut local = LocalState::load()?;

    let store_url = args
        .store_url
        .clone()
        .or_else(|| std::env::var("HOUSE_PLAYER_STORE_URL").ok())
        .or_else(|| local.store_url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no store URL; pass --store-url or set HOUSE_PLAYER_STORE_URL")
        })?;
    local.store_url = Some(store_url.clone());
    let store: Arc<dyn PlaylistStore> = Arc::new(RtdbStore::new(store_url));

    if let Some(Cmd::Pair { mac, pin, action }) = args.command {
        local.save()?;
        return run_pair(store, &mac, &pin, action).await;
    }

    let identity = local.device_identity();
    local.save()?;
    run_tv(store, identity, local, args.poll_secs).await
}

async fn run_pair(
    store: Arc<dyn PlaylistStore>,
    mac: &str,
    pin: &str,
    action: PairCmd,
) -> Result<(), anyhow::Error> {
    let session = PairingSession::connect(store, mac, pin).await?;
    match action {
        PairCmd::List => {
            let playlists = session.playlists().await?;
            if playlists.is_empty() {
                println!("No playlists.");
            }
            for p in playlists {
                let kind = match p.kind {
                    PlaylistKind::Url => "M3U URL",
                    PlaylistKind::Xtream => "Xtream Codes",
                };
                println!("{}  {}  ({})", p.id, p.name, kind);
            }
        }
        PairCmd::AddUrl { name, url } => {
            let id = session.add_m3u(&name, &url).await?;
            println!("Added playlist {}", id);
        }
        PairCmd::AddXtream {
            name,
            server,
            username,
            password,
        } => {
            let id = session.add_xtream(&name, &server, &username, &password).await?;
            println!("Added playlist {}", id);
        }
        PairCmd::Remove { id } => {
            session.remove(&id).await?;
            println!("Removed playlist {}", id);
        }
    }
    Ok(())
}

async fn run_tv(
    store: Arc<dyn PlaylistStore>,
    identity: DeviceIdentity,
    mut local: LocalState,
    poll_secs: u64,
) -> Result<(), anyhow::Error> {
    let mac_key = identity.mac_key();

    // Mirror this installation into the store so the web form can find it
    let record = DeviceRecord {
        mac: identity.mac.clone(),
        pin: identity.pin.clone(),
        last_seen: chrono::Utc::now().timestamp_millis(),
        device_type: "Terminal".to_string(),
    };
    if let Err(err) = store.register_device(&mac_key, &record).await {
        tracing::warn!(error = %err, "device registration failed");
    }

    let (tx, mut rx) = mpsc::channel::<AsyncAction>(32);
    let runtime = Runtime {
        store: store.clone(),
        http: reqwest::Client::new(),
        player: Player::new(),
        tx: tx.clone(),
        mac_key: mac_key.clone(),
    };

    let mut app = App::new(identity);

    // Startup pairing check, then the live subscription
    run_command(&runtime, Command::CheckPlaylists).await;
    let mut sub = subscribe_playlists(store, mac_key, Duration::from_secs(poll_secs.max(1)));
    let sub_tx = tx.clone();
    tokio::spawn(async move {
        while sub.changed().await.is_ok() {
            let list = sub.borrow_and_update().clone();
            if sub_tx.send(AsyncAction::PlaylistsChanged(list)).await.is_err() {
                break;
            }
        }
    });

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let result = event_loop(&mut app, &runtime, &mut rx, &mut local).await;
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    runtime.player.stop();
    result
}

async fn event_loop(
    app: &mut App,
    runtime: &Runtime,
    rx: &mut mpsc::Receiver<AsyncAction>,
    local: &mut LocalState,
) -> Result<(), anyhow::Error> {
    let mut dirty = true;
    loop {
        if dirty {
            draw(app)?;
            dirty = false;
        }

        while let Ok(action) = rx.try_recv() {
            // A regenerated PIN is persisted as soon as it arrives
            if let AsyncAction::PinRegenerated(pin) = &action {
                local.set_pin(pin.clone());
                if let Err(err) = local.save() {
                    tracing::warn!(error = %err, "failed to persist regenerated PIN");
                }
            }
            app.handle_async(action);
            dirty = true;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(signal) = remote::from_key_event(&key) {
                    for command in app.handle_key(signal) {
                        run_command(runtime, command).await;
                    }
                    dirty = true;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Minimal text rendering: one line per focusable item, a marker on the
/// focused one. Layout and styling are not this program's business.
fn draw(app: &App) -> Result<(), anyhow::Error> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    match app.current_screen {
        CurrentScreen::Activation => {
            write!(out, "HOUSE PLAYER - not activated\r\n\r\n")?;
            write!(out, "  MAC: {}\r\n", app.identity.mac)?;
            write!(out, "  PIN: {}\r\n\r\n", app.identity.pin)?;
            write!(
                out,
                "  Add a playlist from the web site, then press OK to check again.\r\n"
            )?;
        }
        CurrentScreen::Player => {
            let name = app.now_playing.as_deref().unwrap_or("(unknown)");
            write!(out, "PLAYING  {}\r\n\r\n", name)?;
            write!(out, "  Back stops playback and returns home.\r\n")?;
        }
        CurrentScreen::Home => {
            write!(out, "HOUSE PLAYER - {}\r\n\r\n", app.active_section.title())?;
            let focused = app.focus.focused_index();
            for (i, target) in app.focus.items().iter().enumerate() {
                let marker = if focused == Some(i) { '>' } else { ' ' };
                write!(out, " {} {}\r\n", marker, target_label(app, target))?;
            }
        }
    }

    if let Some(message) = &app.loading_message {
        write!(out, "\r\n  {}\r\n", message)?;
    }
    if let Some(status) = &app.status {
        write!(out, "\r\n  {}\r\n", status)?;
    }
    out.flush()?;
    Ok(())
}

fn target_label(app: &App, target: &FocusTarget) -> String {
    match target {
        FocusTarget::Nav(section) => format!("[{}]", section.title()),
        FocusTarget::Playlist(i) => match app.playlists.get(*i) {
            Some(p) => {
                let kind = match p.kind {
                    PlaylistKind::Url => "M3U URL",
                    PlaylistKind::Xtream => "Xtream Codes",
                };
                format!("{}  ({})", p.name, kind)
            }
            None => String::new(),
        },
        FocusTarget::Category(i) => match app.catalog.categories().get(*i) {
            Some(category) => {
                format!("{}  ({} channels)", category, app.catalog.channel_count(category))
            }
            None => String::new(),
        },
        FocusTarget::Channel(i) => app
            .channel_overlay
            .and_then(|cat| app.catalog.categories().get(cat))
            .and_then(|category| {
                app.catalog
                    .channels_in(category)
                    .get(*i)
                    .map(|c| c.name.clone())
            })
            .unwrap_or_default(),
        FocusTarget::CheckActivation => "Check activation".to_string(),
        FocusTarget::RefreshPlaylists => "Refresh playlists".to_string(),
        FocusTarget::RegeneratePin => "Generate new PIN".to_string(),
    }
}
