//! Async driver running an engine against a pose source.
//!
//! The engine lives inside a single tokio task; commands from the host are
//! applied strictly between frames so the engine itself needs no locking.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::engine::{FrameReport, PostureEngine};
use crate::source::PoseSource;

/// Host request applied between two frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    StartCalibration,
    AbortCalibration,
    SelectProfile(String),
    CreateProfile(String),
    ResetPatterns,
    Reset,
}

impl PostureEngine {
    /// Apply a host command; failures are logged and the stream continues
    pub fn apply(&mut self, command: EngineCommand) {
        let result = match command {
            EngineCommand::StartCalibration => self.start_calibration(),
            EngineCommand::AbortCalibration => {
                self.abort_calibration();
                Ok(())
            }
            EngineCommand::SelectProfile(name) => self.select(&name),
            EngineCommand::CreateProfile(name) => self.create(&name),
            EngineCommand::ResetPatterns => {
                self.reset_patterns();
                Ok(())
            }
            EngineCommand::Reset => {
                self.reset();
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!("Engine command rejected: {}", e);
        }
    }
}

/// Spawn the engine loop.
///
/// Returns the report receiver and a handle resolving to the engine once
/// the source is exhausted, the source fails, or the receiver is dropped.
pub fn spawn_engine<S>(
    mut engine: PostureEngine,
    mut source: S,
    mut commands: mpsc::UnboundedReceiver<EngineCommand>,
    queue_size: usize,
) -> (mpsc::Receiver<FrameReport>, JoinHandle<PostureEngine>)
where
    S: PoseSource + 'static,
{
    let (tx, rx) = mpsc::channel(queue_size.max(1));

    let handle = tokio::spawn(async move {
        loop {
            while let Ok(command) = commands.try_recv() {
                engine.apply(command);
            }

            match source.next_frame().await {
                Ok(Some(frame)) => {
                    let report = engine.process_frame(&frame);
                    if tx.send(report).await.is_err() {
                        break; // Receiver dropped
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Pose source error: {}", e);
                    break;
                }
            }
        }

        engine
    });

    (rx, handle)
}
