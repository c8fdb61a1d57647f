//! Command-line interface for the packager
//!
//! This module provides the CLI commands and argument parsing, the
//! user-facing message context, and the dispatcher that binds commands to
//! the packaging invoker and the property tree builder.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::PackagerConfig;
use crate::console::{ConsoleSink, TerminalOutputWindow};
use crate::error::{PackagerError, PackagerResult};
use crate::host::{ExecutableLocation, FixedLocation, InstallLocation, Notifier, WorkspaceHost};
use crate::packaging::{PackagingAction, PackagingInvoker, ProjectContextResolver};
use crate::process::{ProcessRunner, SubprocessRunner};
use crate::tree::{render_nodes, DisplayNode, PropertyTreeBuilder};

/// NuGet manifest and package generator
#[derive(Parser)]
#[command(name = "nuget-packager")]
#[command(about = "Generate NuGet manifests and packages for the selected project")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Set the working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file, relative to the working directory (default: packager.toml next to the scripts)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the .nuspec manifest for the selected project
    Manifest {
        /// Project file or directory (default: nearest project above the working directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Directory holding the packaging scripts
        #[arg(long)]
        script_dir: Option<PathBuf>,
    },

    /// Create the .nupkg package for the selected project
    Archive {
        /// Project file or directory (default: nearest project above the working directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Directory holding the packaging scripts
        #[arg(long)]
        script_dir: Option<PathBuf>,
    },

    /// Show the declared properties of the selected project
    Properties {
        /// Project file or directory (default: nearest project above the working directory)
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Directory holding the packaging scripts
        #[arg(long)]
        script_dir: Option<PathBuf>,
    },
}

/// CLI execution context
#[derive(Clone)]
pub struct CliContext {
    pub verbose: bool,
    pub quiet: bool,
    pub start_time: Instant,
}

impl CliContext {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            start_time: Instant::now(),
        }
    }

    /// Print info message if not quiet
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    /// Print verbose message if verbose mode enabled
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", "verbose:".dimmed(), message.dimmed());
        }
    }

    /// Print warning message
    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "success:".green().bold(), message);
        }
    }

    /// Get elapsed time since CLI started
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Notifier for CliContext {
    fn notify(&self, title: &str, message: &str) {
        self.success(&format!("{} {}", title.bold(), message));
    }
}

/// Binds commands to the packaging and property-tree operations
///
/// Keeps one console sink per pane name for the whole run, so every action
/// configured with the same pane writes to the same output pane.
pub struct CommandDispatcher {
    context: CliContext,
    working_dir: PathBuf,
    explicit_config: Option<PathBuf>,
    window: Arc<TerminalOutputWindow>,
    consoles: Mutex<Vec<Arc<ConsoleSink<Arc<TerminalOutputWindow>>>>>,
    runner: Box<dyn ProcessRunner>,
    notifier: Box<dyn Notifier>,
}

impl CommandDispatcher {
    pub fn new(context: CliContext, working_dir: PathBuf, explicit_config: Option<PathBuf>) -> Self {
        Self::with_parts(
            context.clone(),
            working_dir,
            explicit_config,
            TerminalOutputWindow::stdout(),
            Box::new(SubprocessRunner::new()),
            Box::new(context),
        )
    }

    /// Assemble a dispatcher from explicit collaborators
    ///
    /// A relative `explicit_config` is taken relative to `working_dir`.
    pub fn with_parts(
        context: CliContext,
        working_dir: PathBuf,
        explicit_config: Option<PathBuf>,
        window: TerminalOutputWindow,
        runner: Box<dyn ProcessRunner>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let explicit_config = explicit_config.map(|path| {
            if path.is_absolute() {
                path
            } else {
                working_dir.join(path)
            }
        });

        Self {
            context,
            working_dir,
            explicit_config,
            window: Arc::new(window),
            consoles: Mutex::new(Vec::new()),
            runner,
            notifier,
        }
    }

    pub fn dispatch(&self, command: &Commands) -> PackagerResult<()> {
        match command {
            Commands::Manifest { project, script_dir } => {
                self.package(PackagingAction::BuildManifest, project.as_deref(), script_dir.as_deref())
            }
            Commands::Archive { project, script_dir } => {
                self.package(PackagingAction::BuildArchive, project.as_deref(), script_dir.as_deref())
            }
            Commands::Properties { project } => self.properties(project.as_deref()).map(|_| ()),
            Commands::Config { script_dir } => self.show_config(script_dir.as_deref()),
        }
    }

    /// Directory holding the scripts: flag, then configuration, then the binary's own directory
    fn script_dir(&self, flag: Option<&Path>, config: &PackagerConfig) -> PackagerResult<PathBuf> {
        if let Some(dir) = flag.or(config.scripts.directory.as_deref()) {
            return Ok(self.absolute(dir));
        }
        Ok(ExecutableLocation.install_dir()?)
    }

    fn load_config(&self, script_dir: Option<&Path>) -> PackagerResult<PackagerConfig> {
        let script_dir = match script_dir {
            Some(dir) => Some(self.absolute(dir)),
            None => ExecutableLocation.install_dir().ok(),
        };
        Ok(PackagerConfig::discover(self.explicit_config.as_deref(), script_dir.as_deref())?)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// The sink for `pane_name`, created on first use
    fn console(&self, pane_name: &str) -> Arc<ConsoleSink<Arc<TerminalOutputWindow>>> {
        let mut consoles = self.consoles.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(sink) = consoles.iter().find(|sink| sink.name() == pane_name) {
            return Arc::clone(sink);
        }
        let sink = Arc::new(ConsoleSink::new(Arc::clone(&self.window), pane_name));
        consoles.push(Arc::clone(&sink));
        sink
    }

    fn host(&self, config: &PackagerConfig, project: Option<&Path>) -> WorkspaceHost {
        WorkspaceHost::new(config.project.clone(), self.working_dir.clone())
            .with_selection(project.map(Path::to_path_buf))
    }

    /// Run one packaging action and acknowledge it to the user
    pub fn package(&self, action: PackagingAction, project: Option<&Path>, script_dir: Option<&Path>) -> PackagerResult<()> {
        let config = self.load_config(script_dir)?;
        let scripts_at = self.script_dir(script_dir, &config)?;
        self.context.verbose(&format!("Scripts directory: {}", scripts_at.display()));

        let host = self.host(&config, project);
        let console = self.console(&config.console.pane_name);
        let resolver = ProjectContextResolver::new(&host, FixedLocation(scripts_at));
        let invoker = PackagingInvoker::new(resolver, &*self.runner, &*console, config.scripts.clone());

        let report = invoker.invoke(action)?;

        if let Some(error) = &report.console_error {
            self.context.warn(&format!("output pane unavailable, script output was not shown: {}", error));
        } else if report.outcome.sink_failed {
            self.context.warn("output pane failed part way through; some script output was not shown");
        }

        match report.exit_code() {
            Some(0) => {}
            Some(code) => self.context.warn(&format!("{} exited with code {}", report.script.display(), code)),
            None => self.context.warn(&format!("{} was terminated by a signal", report.script.display())),
        }

        self.notifier.notify(&config.notification.title, action.success_message());
        self.context.verbose(&format!("Finished in {:.2}s", self.context.elapsed().as_secs_f64()));
        Ok(())
    }

    /// Print the property tree of the selected project and return its nodes
    pub fn properties(&self, project: Option<&Path>) -> PackagerResult<Vec<DisplayNode>> {
        let config = self.load_config(None)?;
        let host = self.host(&config, project);
        let builder = PropertyTreeBuilder::new(&host);

        let mut nodes: Vec<DisplayNode> = Vec::new();
        builder.populate(&mut nodes)?;

        self.context.info(render_nodes(&nodes).trim_end());
        Ok(nodes)
    }

    fn show_config(&self, script_dir: Option<&Path>) -> PackagerResult<()> {
        let config = self.load_config(script_dir)?;
        let mut out = std::io::stdout();
        out.write_all(config.to_toml()?.as_bytes())
            .map_err(|e| PackagerError::Cli(e.to_string()))?;
        Ok(())
    }
}
