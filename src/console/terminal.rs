//! Output window that prints panes to a terminal stream

use super::{ChannelId, OutputWindow, PaneHandle};
use crate::error::ConsoleError;
use colored::*;
use std::io::{self, Write};
use std::sync::Mutex;

/// Terminal stand-in for the host output window
///
/// Every pane shares one stream. Switching to a pane that is not already
/// in front prints a banner with its name, so interleaved output from
/// different panes stays attributable.
pub struct TerminalOutputWindow {
    out: Mutex<Box<dyn Write + Send>>,
    panes: Mutex<Vec<(ChannelId, String)>>,
    active: Mutex<Option<PaneHandle>>,
}

impl TerminalOutputWindow {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            panes: Mutex::new(Vec::new()),
            active: Mutex::new(None),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn pane_name(&self, pane: PaneHandle) -> Result<String, ConsoleError> {
        let panes = self.panes.lock().unwrap_or_else(|p| p.into_inner());
        panes
            .get(pane.0)
            .map(|(_, name)| name.clone())
            .ok_or_else(|| ConsoleError::Write {
                reason: format!("unknown pane {}", pane.0),
            })
    }

    fn emit(&self, text: &str) -> Result<(), ConsoleError> {
        let mut out = self.out.lock().unwrap_or_else(|p| p.into_inner());
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| ConsoleError::Write { reason: e.to_string() })
    }
}

impl OutputWindow for TerminalOutputWindow {
    fn get_pane(&self, id: ChannelId) -> Option<PaneHandle> {
        let panes = self.panes.lock().unwrap_or_else(|p| p.into_inner());
        panes.iter().position(|(pane_id, _)| *pane_id == id).map(PaneHandle)
    }

    fn create_pane(&self, id: ChannelId, name: &str) -> Result<(), ConsoleError> {
        let mut panes = self.panes.lock().unwrap_or_else(|p| p.into_inner());
        if !panes.iter().any(|(pane_id, _)| *pane_id == id) {
            panes.push((id, name.to_string()));
        }
        Ok(())
    }

    fn activate(&self, pane: PaneHandle) -> Result<(), ConsoleError> {
        let name = self.pane_name(pane)?;
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        if *active != Some(pane) {
            self.emit(&format!("{}\n", format!("------ {} ------", name).bold()))?;
            *active = Some(pane);
        }
        Ok(())
    }

    fn output_string(&self, pane: PaneHandle, text: &str) -> Result<(), ConsoleError> {
        self.pane_name(pane)?;
        self.emit(text)
    }
}
