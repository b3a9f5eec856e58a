//! The external gnuplot process.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use super::{FrameSink, RenderFrame};

/// Default renderer executable.
pub const GNUPLOT: &str = "/usr/bin/gnuplot";

#[derive(Debug, thiserror::Error)]
#[error("failed to launch renderer {path}: {source}")]
pub struct SpawnError {
    path: String,
    #[source]
    source: std::io::Error,
}

/// Owns the renderer subprocess and its input pipe.
///
/// Liveness is polled before every write; frames submitted after the
/// process has exited are dropped so the pipeline keeps accepting
/// samples either way.
#[derive(Debug)]
pub struct GnuplotProcess {
    child: Child,
}

impl GnuplotProcess {
    /// Spawn the renderer with its input pipe attached.
    pub fn spawn(path: &str) -> Result<Self, SpawnError> {
        let child = Command::new(path)
            .arg("-noraise")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| SpawnError {
                path: path.to_string(),
                source,
            })?;
        log::info!("renderer started: {} -noraise", path);
        Ok(Self { child })
    }

    /// True while the renderer has not exited. Does not block.
    fn alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(err) => {
                log::warn!("renderer liveness check failed: {}", err);
                false
            }
        }
    }
}

impl FrameSink for GnuplotProcess {
    fn submit(&mut self, frame: &RenderFrame) {
        if !self.alive() {
            log::debug!("renderer gone, dropping frame");
            return;
        }
        if let Some(stdin) = self.child.stdin.as_mut() {
            // One payload per frame. This write blocks if the renderer
            // stalls; bounding it is left to a production port.
            if let Err(err) = stdin.write_all(frame.to_protocol().as_bytes()) {
                log::warn!("writing frame to renderer failed: {}", err);
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut stdin) = self.child.stdin.take() {
            let _ = stdin.write_all(b"quit\n");
        }
        // Dropping stdin above closes the pipe, so a renderer that
        // ignores quit still sees end of input.
        match self.child.wait() {
            Ok(status) => log::info!("renderer exited ({})", status),
            Err(err) => log::warn!("waiting for renderer failed: {}", err),
        }
    }
}
