//! Pose sources feeding joint frames into the engine.
//!
//! The pose-estimation model itself lives outside this crate; a source only
//! has to hand over one [`JointFrame`] per video frame.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use stance_core::{Error, JointFrame, Result};

/// Trait for pose-estimation backends
#[async_trait]
pub trait PoseSource: Send {
    /// Next frame, or `Ok(None)` at the end of the stream
    async fn next_frame(&mut self) -> Result<Option<JointFrame>>;
}

/// Replays a fixed sequence of frames
#[derive(Debug, Default)]
pub struct VecSource {
    frames: VecDeque<JointFrame>,
}

impl VecSource {
    pub fn new(frames: impl IntoIterator<Item = JointFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl PoseSource for VecSource {
    async fn next_frame(&mut self) -> Result<Option<JointFrame>> {
        Ok(self.frames.pop_front())
    }
}

/// Reads one JSON-encoded [`JointFrame`] per line.
///
/// Blank lines are skipped. A malformed line fails with
/// [`Error::Serialization`] and carries its line number.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> PoseSource for JsonLinesSource<R> {
    async fn next_frame(&mut self) -> Result<Option<JointFrame>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| Error::Source(e.to_string()))?;

            let Some(line) = line else {
                return Ok(None);
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            return serde_json::from_str(&line)
                .map(Some)
                .map_err(|e| Error::Serialization(format!("line {}: {}", self.line_number, e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::{Joint, Keypoint, Timestamp};

    fn frame(t: i64) -> JointFrame {
        JointFrame::new(
            Timestamp::from_millis(t),
            vec![Joint::new(1.0, 2.0, 0.5); Keypoint::COUNT],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_vec_source_in_order() {
        let mut source = VecSource::new([frame(1), JointFrame::empty(Timestamp::from_millis(2))]);
        assert_eq!(source.remaining(), 2);

        assert_eq!(source.next_frame().await.unwrap().unwrap().timestamp, Timestamp::from_millis(1));
        assert!(source.next_frame().await.unwrap().unwrap().is_empty());
        assert!(source.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_lines_source() {
        let text = format!(
            "{}\n\n   \n{}\n",
            serde_json::to_string(&frame(10)).unwrap(),
            serde_json::to_string(&JointFrame::empty(Timestamp::from_millis(20))).unwrap(),
        );
        let mut source = JsonLinesSource::new(text.as_bytes());

        let first = source.next_frame().await.unwrap().unwrap();
        assert_eq!(first, frame(10));

        let second = source.next_frame().await.unwrap().unwrap();
        assert!(second.is_empty());
        assert_eq!(second.timestamp, Timestamp::from_millis(20));

        assert!(source.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_lines_malformed() {
        let text = format!("{}\nnot json\n", serde_json::to_string(&frame(0)).unwrap());
        let mut source = JsonLinesSource::new(text.as_bytes());

        assert!(source.next_frame().await.unwrap().is_some());
        match source.next_frame().await {
            Err(Error::Serialization(msg)) => assert!(msg.starts_with("line 2")),
            other => panic!("expected serialization error, got {other:?}"),
        }
    }
}
