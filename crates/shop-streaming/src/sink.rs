//! Shell-first streaming sink.

use std::fmt::Display;

use futures::{Sink, SinkExt};
use shop_core::{LifecyclePhase, PageError, TimingContext};

use crate::section::SectionOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Initial,
    ShellSent,
    Completed,
}

/// Streaming sink that enforces shell-first ordering.
///
/// Generic over any `Sink<Vec<u8>>`, including Spin's `OutgoingBody` and a
/// plain `Vec<Vec<u8>>` in tests.
pub struct StreamingSink<S>
where
    S: Sink<Vec<u8>> + Unpin,
    S::Error: Display,
{
    inner: S,
    state: SinkState,
    timing: TimingContext,
    sections_sent: Vec<String>,
    bytes_sent: usize,
}

impl<S> StreamingSink<S>
where
    S: Sink<Vec<u8>> + Unpin,
    S::Error: Display,
{
    pub fn new(sink: S, timing: TimingContext) -> Self {
        Self {
            inner: sink,
            state: SinkState::Initial,
            timing,
            sections_sent: Vec::new(),
            bytes_sent: 0,
        }
    }

    async fn write(&mut self, bytes: Vec<u8>) -> Result<(), PageError> {
        let len = bytes.len();
        self.inner
            .send(bytes)
            .await
            .map_err(|e| PageError::StreamError(e.to_string()))?;
        self.bytes_sent += len;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), PageError> {
        match self.state {
            SinkState::Initial => Err(PageError::ShellNotSent),
            SinkState::Completed => Err(PageError::StreamError(
                "Sink already completed".to_string(),
            )),
            SinkState::ShellSent => Ok(()),
        }
    }

    /// Send the shell HTML. Must be called before any sections.
    pub async fn send_shell(&mut self, html: &str) -> Result<(), PageError> {
        if self.state != SinkState::Initial {
            return Err(PageError::StreamError(
                "Shell already sent or sink completed".to_string(),
            ));
        }

        self.timing.mark("shell_start");
        self.write(html.as_bytes().to_vec()).await?;
        self.timing.mark("shell_sent");
        self.state = SinkState::ShellSent;

        Ok(())
    }

    /// Send a named section. Shell must be sent first.
    pub async fn send_section(&mut self, name: &str, html: &str) -> Result<(), PageError> {
        self.ensure_open()?;

        self.timing.mark_section_start(name);
        self.write(html.as_bytes().to_vec()).await?;
        self.timing.mark_section_sent(name);
        self.sections_sent.push(name.to_string());

        Ok(())
    }

    pub async fn send_output(&mut self, output: &SectionOutput) -> Result<(), PageError> {
        self.send_section(&output.name, &output.html).await
    }

    /// Send raw bytes. Shell must be sent first.
    pub async fn send_raw(&mut self, bytes: Vec<u8>) -> Result<(), PageError> {
        self.ensure_open()?;
        self.write(bytes).await
    }

    /// Complete the response, flushing the underlying sink.
    pub async fn complete(&mut self) -> Result<(), PageError> {
        if self.state == SinkState::Completed {
            return Ok(());
        }
        self.inner
            .flush()
            .await
            .map_err(|e| PageError::StreamError(e.to_string()))?;
        self.state = SinkState::Completed;
        self.timing.mark("complete");
        Ok(())
    }

    pub fn sections_sent(&self) -> &[String] {
        &self.sections_sent
    }

    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.state {
            SinkState::Initial => LifecyclePhase::Start,
            SinkState::ShellSent => match self.sections_sent.last() {
                Some(name) => LifecyclePhase::SectionSent(name.clone()),
                None => LifecyclePhase::ShellSent,
            },
            SinkState::Completed => LifecyclePhase::Completion,
        }
    }

    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn sink() -> StreamingSink<Vec<Vec<u8>>> {
        StreamingSink::new(Vec::new(), TimingContext::new())
    }

    #[test]
    fn test_shell_then_sections() {
        let mut s = sink();
        block_on(async {
            s.send_shell("<html>").await.unwrap();
            s.send_section("hero", "<section>hero</section>").await.unwrap();
            s.send_raw(b"</html>".to_vec()).await.unwrap();
            s.complete().await.unwrap();
        });

        assert_eq!(s.sections_sent(), ["hero".to_string()]);
        assert_eq!(s.phase(), LifecyclePhase::Completion);
        assert!(s.timing().time_to_shell().is_some());
        assert_eq!(s.bytes_sent(), 6 + 23 + 7);

        let chunks = s.into_inner();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], b"<html>".to_vec());
    }

    #[test]
    fn test_section_before_shell_fails() {
        let mut s = sink();
        let err = block_on(s.send_section("hero", "x")).unwrap_err();
        assert!(matches!(err, PageError::ShellNotSent));
        assert_eq!(s.phase(), LifecyclePhase::Start);
    }

    #[test]
    fn test_shell_twice_fails() {
        let mut s = sink();
        block_on(s.send_shell("a")).unwrap();
        assert_eq!(s.phase(), LifecyclePhase::ShellSent);
        assert!(matches!(
            block_on(s.send_shell("b")),
            Err(PageError::StreamError(_))
        ));
    }

    #[test]
    fn test_no_writes_after_complete() {
        let mut s = sink();
        block_on(async {
            s.send_shell("a").await.unwrap();
            s.complete().await.unwrap();
        });
        assert!(block_on(s.send_raw(b"x".to_vec())).is_err());
        assert!(block_on(s.send_section("late", "x")).is_err());
    }
}
