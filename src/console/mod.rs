//! Console channel management
//!
//! A [`ConsoleSink`] owns one named pane of the host's output window. The
//! pane is looked up by identity and created on first use; every later
//! write goes to that same pane for as long as the sink lives.

pub mod terminal;

pub use terminal::TerminalOutputWindow;

use crate::error::ConsoleError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identity the packager asks the host to file its pane under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// A process-unique identity
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ChannelId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque handle to a pane, as issued by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneHandle(pub usize);

/// Host output window service
pub trait OutputWindow {
    fn get_pane(&self, id: ChannelId) -> Option<PaneHandle>;

    fn create_pane(&self, id: ChannelId, name: &str) -> Result<(), ConsoleError>;

    /// Bring the pane to the front
    fn activate(&self, pane: PaneHandle) -> Result<(), ConsoleError>;

    fn output_string(&self, pane: PaneHandle, text: &str) -> Result<(), ConsoleError>;
}

impl<T: OutputWindow + ?Sized> OutputWindow for &T {
    fn get_pane(&self, id: ChannelId) -> Option<PaneHandle> {
        (**self).get_pane(id)
    }

    fn create_pane(&self, id: ChannelId, name: &str) -> Result<(), ConsoleError> {
        (**self).create_pane(id, name)
    }

    fn activate(&self, pane: PaneHandle) -> Result<(), ConsoleError> {
        (**self).activate(pane)
    }

    fn output_string(&self, pane: PaneHandle, text: &str) -> Result<(), ConsoleError> {
        (**self).output_string(pane, text)
    }
}

impl<T: OutputWindow + ?Sized> OutputWindow for Arc<T> {
    fn get_pane(&self, id: ChannelId) -> Option<PaneHandle> {
        (**self).get_pane(id)
    }

    fn create_pane(&self, id: ChannelId, name: &str) -> Result<(), ConsoleError> {
        (**self).create_pane(id, name)
    }

    fn activate(&self, pane: PaneHandle) -> Result<(), ConsoleError> {
        (**self).activate(pane)
    }

    fn output_string(&self, pane: PaneHandle, text: &str) -> Result<(), ConsoleError> {
        (**self).output_string(pane, text)
    }
}

/// A created output channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleChannel {
    pub id: ChannelId,
    pub pane: PaneHandle,
    pub name: String,
}

/// Anything that accepts whole lines of subprocess output
pub trait LineSink {
    fn write_line(&self, line: &str) -> Result<(), ConsoleError>;
}

impl<T: LineSink + ?Sized> LineSink for &T {
    fn write_line(&self, line: &str) -> Result<(), ConsoleError> {
        (**self).write_line(line)
    }
}

/// Owner of the packager's output channel
pub struct ConsoleSink<W: OutputWindow> {
    window: W,
    id: ChannelId,
    name: String,
    // Guards creation and keeps activate + append of one line together.
    channel: Mutex<Option<ConsoleChannel>>,
}

impl<W: OutputWindow> ConsoleSink<W> {
    pub fn new(window: W, name: impl Into<String>) -> Self {
        Self {
            window,
            id: ChannelId::unique(),
            name: name.into(),
            channel: Mutex::new(None),
        }
    }

    /// Name the pane is created under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the channel, creating it on first call
    pub fn ensure_channel(&self) -> Result<ConsoleChannel, ConsoleError> {
        let mut slot = self.channel.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let channel = self.get_or_create(&mut slot)?.clone();
        Ok(channel)
    }

    /// Activate the channel and append `line` followed by a newline
    pub fn write(&self, line: &str) -> Result<(), ConsoleError> {
        let mut slot = self.channel.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let pane = self.get_or_create(&mut slot)?.pane;

        self.window.activate(pane)?;
        self.window.output_string(pane, &format!("{}\n", line))
    }

    fn get_or_create<'a>(&self, slot: &'a mut Option<ConsoleChannel>) -> Result<&'a ConsoleChannel, ConsoleError> {
        if slot.is_none() {
            let pane = match self.window.get_pane(self.id) {
                Some(pane) => pane,
                None => {
                    tracing::debug!(pane = %self.name, "creating output pane");
                    self.window.create_pane(self.id, &self.name)?;
                    self.window.get_pane(self.id).ok_or_else(|| ConsoleError::ChannelCreation {
                        name: self.name.clone(),
                        reason: "pane missing after creation".to_string(),
                    })?
                }
            };

            *slot = Some(ConsoleChannel {
                id: self.id,
                pane,
                name: self.name.clone(),
            });
        }

        slot.as_ref().ok_or_else(|| ConsoleError::ChannelCreation {
            name: self.name.clone(),
            reason: "channel slot empty".to_string(),
        })
    }
}

impl<W: OutputWindow> LineSink for ConsoleSink<W> {
    fn write_line(&self, line: &str) -> Result<(), ConsoleError> {
        self.write(line)
    }
}
