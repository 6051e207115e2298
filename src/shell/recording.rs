//! Frame capture
//!
//! Recording is a shell concern: the session hands each rendered frame to a
//! [`FrameSink`]. Sinks must never stall the frame loop; when they cannot keep
//! up they drop frames.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::JoinHandle;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Ball, GameMode, SimulationState};

/// One captured frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub mode: GameMode,
    pub bounce_count: u64,
    pub boundary_center: Vec2,
    pub boundary_radius: f32,
    pub balls: Vec<Ball>,
}

impl FrameSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        Self {
            frame: state.frame,
            mode: state.mode(),
            bounce_count: state.bounce_count,
            boundary_center: state.boundary.center,
            boundary_radius: state.boundary.radius,
            balls: state.balls.clone(),
        }
    }
}

/// Totals reported when a recording ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingSummary {
    pub written: u64,
    pub dropped: u64,
}

/// Destination for captured frames
pub trait FrameSink {
    /// Queue a frame. Returns `false` if it was dropped.
    fn submit(&mut self, frame: FrameSnapshot) -> bool;

    /// Flush and close the sink
    fn finish(self: Box<Self>) -> anyhow::Result<RecordingSummary>;
}

/// Writes frames as JSON lines from a background thread
pub struct JsonlRecorder {
    path: PathBuf,
    tx: Option<SyncSender<FrameSnapshot>>,
    writer: Option<JoinHandle<std::io::Result<u64>>>,
    dropped: u64,
}

impl JsonlRecorder {
    /// Create (truncate) `path` and start the writer thread.
    /// At most `capacity` frames wait in memory.
    pub fn create(path: &Path, capacity: usize) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let (tx, rx) = mpsc::sync_channel::<FrameSnapshot>(capacity.max(1));

        let writer = std::thread::Builder::new()
            .name("frame-recorder".to_string())
            .spawn(move || -> std::io::Result<u64> {
                let mut out = BufWriter::new(file);
                let mut written = 0;
                for frame in rx {
                    serde_json::to_writer(&mut out, &frame)?;
                    out.write_all(b"\n")?;
                    written += 1;
                }
                out.flush()?;
                Ok(written)
            })?;

        log::info!("Recording to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            tx: Some(tx),
            writer: Some(writer),
            dropped: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn close(&mut self) -> anyhow::Result<RecordingSummary> {
        // Dropping the sender ends the writer's receive loop
        self.tx.take();
        let written = match self.writer.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("frame recorder thread panicked"))??,
            None => 0,
        };
        Ok(RecordingSummary {
            written,
            dropped: self.dropped,
        })
    }
}

impl FrameSink for JsonlRecorder {
    fn submit(&mut self, frame: FrameSnapshot) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                if self.dropped.is_power_of_two() {
                    log::warn!("Recorder falling behind, {} frames dropped", self.dropped);
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Recorder stopped unexpectedly, disabling capture");
                self.tx = None;
                false
            }
        }
    }

    fn finish(mut self: Box<Self>) -> anyhow::Result<RecordingSummary> {
        let summary = self.close()?;
        log::info!(
            "Recording saved to {} ({} frames, {} dropped)",
            self.path.display(),
            summary.written,
            summary.dropped
        );
        Ok(summary)
    }
}

impl Drop for JsonlRecorder {
    fn drop(&mut self) {
        if self.writer.is_some() {
            if let Err(e) = self.close() {
                log::warn!("Recording not finished cleanly: {e}");
            }
        }
    }
}
