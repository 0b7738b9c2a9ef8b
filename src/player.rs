use std::process::{Child, Command};
use std::sync::{Arc, Mutex};

/// How a stream URL should be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// HTTP-segmented (HLS) delivery
    Adaptive,
    /// Plain progressive/transport stream
    Direct,
}

/// Dispatch rule from the session controller: HLS manifests are
/// recognized by the `.m3u8` marker anywhere in the URL.
pub fn mode_for(url: &str) -> PlaybackMode {
    if url.contains(".m3u8") {
        PlaybackMode::Adaptive
    } else {
        PlaybackMode::Direct
    }
}

/// Handle to the external media engine (mpv as a child process).
/// Playback state lives entirely in the engine; this only starts and
/// stops it.
#[derive(Clone, Default)]
pub struct Player {
    process: Arc<Mutex<Option<Child>>>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&self, url: &str, mode: PlaybackMode) -> Result<(), anyhow::Error> {
        self.stop();

        let mut command = Command::new("mpv");
        command
            .arg(url)
            .arg("--fs")
            .arg("--force-window")
            .arg("--cache=yes")
            .arg("--msg-level=all=no")
            .arg("--term-status-msg=no")
            .arg("--hwdec=auto");
        if mode == PlaybackMode::Adaptive {
            command.arg("--demuxer-lavf-format=hls").arg("--hls-bitrate=max");
        }

        match command.spawn() {
            Ok(child) => {
                let mut guard = self
                    .process
                    .lock()
                    .map_err(|e| anyhow::anyhow!("failed to lock player process: {}", e))?;
                *guard = Some(child);
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to start mpv: {}. Make sure mpv is installed and in PATH.",
                e
            )),
        }
    }

    pub fn is_running(&self) -> bool {
        if let Ok(mut guard) = self.process.lock() {
            if let Some(ref mut child) = *guard {
                // Ok(None) means still running
                return matches!(child.try_wait(), Ok(None));
            }
        }
        false
    }

    /// Stop playback and clear the engine's source
    pub fn stop(&self) {
        if let Ok(mut guard) = self.process.lock() {
            if let Some(mut child) = guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_m3u8_routes_to_adaptive() {
        assert_eq!(mode_for("http://x/live/u/p/42.m3u8"), PlaybackMode::Adaptive);
        assert_eq!(mode_for("http://x/stream.m3u8?token=1"), PlaybackMode::Adaptive);
    }

    #[test]
    fn test_other_urls_route_to_direct() {
        assert_eq!(mode_for("http://x/stream.ts"), PlaybackMode::Direct);
        assert_eq!(mode_for("http://x/stream"), PlaybackMode::Direct);
    }
}
