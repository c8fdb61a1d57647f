//! Running a packaging action end to end

use super::{PackagingAction, ProjectContext, ProjectContextResolver};
use crate::config::ScriptsConfig;
use crate::console::LineSink;
use crate::error::{ConsoleError, PackagingError};
use crate::host::{InstallLocation, SelectionProvider};
use crate::process::{ProcessRunner, RunOutcome};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of one packaging invocation
#[derive(Debug, Clone)]
pub struct InvocationReport {
    pub action: PackagingAction,
    pub script: PathBuf,
    pub context: ProjectContext,
    pub outcome: RunOutcome,
    /// Set when the console could not take the output
    pub console_error: Option<ConsoleError>,
}

impl InvocationReport {
    /// Exit code of the script, not interpreted
    pub fn exit_code(&self) -> Option<i32> {
        self.outcome.exit_code
    }

    pub fn degraded(&self) -> bool {
        self.console_error.is_some() || self.outcome.sink_failed
    }
}

/// Resolves the context for an action and runs its script
pub struct PackagingInvoker<S, L, R, C> {
    resolver: ProjectContextResolver<S, L>,
    runner: R,
    console: C,
    scripts: ScriptsConfig,
}

impl<S, L, R, C> PackagingInvoker<S, L, R, C>
where
    S: SelectionProvider,
    L: InstallLocation,
    R: ProcessRunner,
    C: LineSink,
{
    pub fn new(resolver: ProjectContextResolver<S, L>, runner: R, console: C, scripts: ScriptsConfig) -> Self {
        Self {
            resolver,
            runner,
            console,
            scripts,
        }
    }

    /// Run the script for `action` against the currently selected project
    ///
    /// Nothing is written to the console unless the context resolves and
    /// the script has been launched. Exactly one subprocess is started per
    /// call.
    pub fn invoke(&self, action: PackagingAction) -> Result<InvocationReport, PackagingError> {
        let context = self.resolver.resolve()?;

        let script = context.script_directory().join(self.scripts.script_for(action));
        let args: Vec<OsString> = vec![
            context.project_directory().as_os_str().to_os_string(),
            context.script_directory().as_os_str().to_os_string(),
        ];

        info!(%action, script = %script.display(), project = %context.project_directory().display(), "running packaging script");

        let mut console_error = None;
        let mut announce = || {
            if let Err(e) = self.console.write_line(action.started_message()) {
                warn!(%action, error = %e, "console unavailable; running without streamed output");
                console_error = Some(e);
            }
        };
        let outcome = self.runner.run(&script, &args, &self.console, &mut announce)?;

        Ok(InvocationReport {
            action,
            script,
            context,
            outcome,
            console_error,
        })
    }
}
