//! Tests for packaging invocation

use nuget_packager::config::ScriptsConfig;
use nuget_packager::console::LineSink;
use nuget_packager::error::*;
use nuget_packager::host::*;
use nuget_packager::packaging::*;
use nuget_packager::process::{ProcessRunner, RunOutcome};
use std::cell::RefCell;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Write(String),
    Run { program: PathBuf, args: Vec<OsString> },
}

#[derive(Default)]
struct Log(RefCell<Vec<Event>>);

impl Log {
    fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }
}

struct RecordingConsole<'a> {
    log: &'a Log,
    broken: bool,
}

impl LineSink for RecordingConsole<'_> {
    fn write_line(&self, line: &str) -> Result<(), ConsoleError> {
        if self.broken {
            return Err(ConsoleError::ChannelCreation {
                name: "NugetPackager".to_string(),
                reason: "no output window".to_string(),
            });
        }
        self.log.0.borrow_mut().push(Event::Write(line.to_string()));
        Ok(())
    }
}

struct FakeRunner<'a> {
    log: &'a Log,
    output: Vec<&'static str>,
    exit_code: i32,
    missing: bool,
}

impl<'a> FakeRunner<'a> {
    fn new(log: &'a Log) -> Self {
        Self {
            log,
            output: vec![],
            exit_code: 0,
            missing: false,
        }
    }
}

impl ProcessRunner for FakeRunner<'_> {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        sink: &dyn LineSink,
        on_spawn: &mut dyn FnMut(),
    ) -> Result<RunOutcome, LaunchError> {
        if self.missing {
            return Err(LaunchError::new(program, io::Error::from(io::ErrorKind::NotFound)));
        }
        on_spawn();
        self.log.0.borrow_mut().push(Event::Run {
            program: program.to_path_buf(),
            args: args.to_vec(),
        });
        let mut outcome = RunOutcome {
            exit_code: Some(self.exit_code),
            ..Default::default()
        };
        for line in &self.output {
            outcome.stdout_lines += 1;
            if sink.write_line(line).is_err() {
                outcome.sink_failed = true;
            }
        }
        Ok(outcome)
    }
}

struct Selection(Vec<SelectedItem>);

impl SelectionProvider for Selection {
    fn selected_items(&self) -> Vec<SelectedItem> {
        self.0.clone()
    }
}

fn my_lib() -> Selection {
    Selection(vec![SelectedItem::Project(ProjectRef::new("MyLib", "/repo/MyLib/MyLib.csproj"))])
}

fn invoker<'a>(
    selection: Selection,
    runner: FakeRunner<'a>,
    console: RecordingConsole<'a>,
) -> PackagingInvoker<Selection, FixedLocation, FakeRunner<'a>, RecordingConsole<'a>> {
    let resolver = ProjectContextResolver::new(selection, FixedLocation(PathBuf::from("/ext/bin")));
    PackagingInvoker::new(resolver, runner, console, ScriptsConfig::default())
}

/// Selecting /repo/MyLib/MyLib.csproj runs the manifest script from the install dir
#[cfg(unix)]
#[test]
fn test_build_manifest_scenario() {
    let log = Log::default();
    let invoker = invoker(my_lib(), FakeRunner::new(&log), RecordingConsole { log: &log, broken: false });

    let report = invoker.invoke(PackagingAction::BuildManifest).unwrap();

    assert_eq!(
        log.events(),
        vec![
            Event::Write(".....CREATING NUSPEC FILE STARTED.....".to_string()),
            Event::Run {
                program: PathBuf::from("/ext/bin/CNuspec.bat"),
                args: vec![OsString::from("/repo/MyLib"), OsString::from("/ext/bin")],
            },
        ]
    );
    assert_eq!(report.exit_code(), Some(0));
    assert!(!report.degraded());
    assert_eq!(report.context.project_directory(), Path::new("/repo/MyLib"));
}

/// Every action writes exactly one start message, then runs exactly one script
#[test]
fn test_each_action_writes_start_then_runs_once() {
    for action in PackagingAction::ALL {
        let log = Log::default();
        let invoker = invoker(my_lib(), FakeRunner::new(&log), RecordingConsole { log: &log, broken: false });

        invoker.invoke(action).unwrap();

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Write(action.started_message().to_string()));
        match &events[1] {
            Event::Run { program, args } => {
                assert!(program.ends_with(action.default_script()));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected a run, got {:?}", other),
        }
    }
}

/// Script output follows the start message in order
#[test]
fn test_output_follows_start_message() {
    let log = Log::default();
    let mut runner = FakeRunner::new(&log);
    runner.output = vec!["Packing MyLib", "Done"];
    let invoker = invoker(my_lib(), runner, RecordingConsole { log: &log, broken: false });

    let report = invoker.invoke(PackagingAction::BuildArchive).unwrap();

    let writes: Vec<String> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Write(line) => Some(line),
            Event::Run { .. } => None,
        })
        .collect();
    assert_eq!(writes, vec![".....CREATING NUPKG FILE STARTED.....", "Packing MyLib", "Done"]);
    assert_eq!(report.outcome.stdout_lines, 2);
}

#[test]
fn test_no_selection_aborts_before_any_output() {
    let log = Log::default();
    let invoker = invoker(Selection(vec![]), FakeRunner::new(&log), RecordingConsole { log: &log, broken: false });

    let err = invoker.invoke(PackagingAction::BuildManifest).unwrap_err();

    match err {
        PackagingError::ContextUnavailable(inner) => assert!(inner.is_no_selection()),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(log.events().is_empty());
}

#[test]
fn test_non_project_selection_aborts_before_any_output() {
    let log = Log::default();
    let selection = Selection(vec![SelectedItem::Other {
        label: "Solution Items".to_string(),
    }]);
    let invoker = invoker(selection, FakeRunner::new(&log), RecordingConsole { log: &log, broken: false });

    assert!(matches!(
        invoker.invoke(PackagingAction::BuildArchive),
        Err(PackagingError::ContextUnavailable(ContextError::NoSelection(_)))
    ));
    assert!(log.events().is_empty());
}

#[test]
fn test_missing_script_fails_without_start_message() {
    let log = Log::default();
    let mut runner = FakeRunner::new(&log);
    runner.missing = true;
    let invoker = invoker(my_lib(), runner, RecordingConsole { log: &log, broken: false });

    match invoker.invoke(PackagingAction::BuildManifest) {
        Err(PackagingError::Launch(e)) => assert!(e.is_not_found()),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(log.events().is_empty());
}

/// A script that exists but cannot be executed never gets a start message
#[cfg(unix)]
#[test]
fn test_unexecutable_script_fails_without_start_message() {
    use nuget_packager::process::SubprocessRunner;
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::TempDir::new().unwrap();
    let script = temp_dir.path().join("CNuspec.bat");
    std::fs::write(&script, "#!/bin/sh\necho never\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

    let log = Log::default();
    let resolver = ProjectContextResolver::new(my_lib(), FixedLocation(temp_dir.path().to_path_buf()));
    let invoker = PackagingInvoker::new(
        resolver,
        SubprocessRunner::new(),
        RecordingConsole { log: &log, broken: false },
        ScriptsConfig::default(),
    );

    match invoker.invoke(PackagingAction::BuildManifest) {
        Err(PackagingError::Launch(e)) => assert_eq!(e.program, script),
        other => panic!("unexpected result: {:?}", other.map(|r| r.outcome)),
    }
    assert!(log.events().is_empty());
}

/// A shebang naming a missing interpreter fails at launch, before the start message
#[cfg(unix)]
#[test]
fn test_missing_interpreter_fails_without_start_message() {
    use nuget_packager::process::SubprocessRunner;
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::TempDir::new().unwrap();
    let script = temp_dir.path().join("CNupkg.bat");
    std::fs::write(&script, "#!/nonexistent/interpreter\necho never\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let log = Log::default();
    let resolver = ProjectContextResolver::new(my_lib(), FixedLocation(temp_dir.path().to_path_buf()));
    let invoker = PackagingInvoker::new(
        resolver,
        SubprocessRunner::new(),
        RecordingConsole { log: &log, broken: false },
        ScriptsConfig::default(),
    );

    assert!(matches!(invoker.invoke(PackagingAction::BuildArchive), Err(PackagingError::Launch(_))));
    assert!(log.events().is_empty());
}

/// A broken console still runs the script, and the report says output was lost
#[test]
fn test_broken_console_degrades_but_runs() {
    let log = Log::default();
    let mut runner = FakeRunner::new(&log);
    runner.output = vec!["line"];
    let invoker = invoker(my_lib(), runner, RecordingConsole { log: &log, broken: true });

    let report = invoker.invoke(PackagingAction::BuildManifest).unwrap();

    assert!(report.degraded());
    assert!(matches!(report.console_error, Some(ConsoleError::ChannelCreation { .. })));
    assert_eq!(log.events().len(), 1);
    assert!(matches!(log.events()[0], Event::Run { .. }));
}

/// Non-zero exit codes are reported, not raised
#[test]
fn test_nonzero_exit_is_not_an_error() {
    let log = Log::default();
    let mut runner = FakeRunner::new(&log);
    runner.exit_code = 3;
    let invoker = invoker(my_lib(), runner, RecordingConsole { log: &log, broken: false });

    let report = invoker.invoke(PackagingAction::BuildArchive).unwrap();
    assert_eq!(report.exit_code(), Some(3));
    assert!(!report.outcome.succeeded());
}

/// Paths with spaces are passed as single arguments
#[cfg(unix)]
#[test]
fn test_paths_with_spaces_stay_whole() {
    let log = Log::default();
    let selection = Selection(vec![SelectedItem::Project(ProjectRef::from_file(
        "/home/me/My Projects/Lib One/Lib One.csproj",
    ))]);
    let resolver = ProjectContextResolver::new(selection, FixedLocation(PathBuf::from("/opt/my ext/bin")));
    let invoker = PackagingInvoker::new(
        resolver,
        FakeRunner::new(&log),
        RecordingConsole { log: &log, broken: false },
        ScriptsConfig::default(),
    );

    invoker.invoke(PackagingAction::BuildManifest).unwrap();

    assert!(log.events().contains(&Event::Run {
        program: PathBuf::from("/opt/my ext/bin/CNuspec.bat"),
        args: vec![
            OsString::from("/home/me/My Projects/Lib One"),
            OsString::from("/opt/my ext/bin"),
        ],
    }));
}

/// Selection is read again on every call
#[cfg(unix)]
#[test]
fn test_context_is_resolved_per_invocation() {
    struct Switching(RefCell<Vec<&'static str>>);

    impl SelectionProvider for Switching {
        fn selected_items(&self) -> Vec<SelectedItem> {
            let next = self.0.borrow_mut().remove(0);
            vec![SelectedItem::Project(ProjectRef::from_file(next))]
        }
    }

    let log = Log::default();
    let selection = Switching(RefCell::new(vec!["/repo/A/A.csproj", "/repo/B/B.csproj"]));
    let resolver = ProjectContextResolver::new(selection, FixedLocation(PathBuf::from("/ext/bin")));
    let invoker = PackagingInvoker::new(
        resolver,
        FakeRunner::new(&log),
        RecordingConsole { log: &log, broken: false },
        ScriptsConfig::default(),
    );

    let first = invoker.invoke(PackagingAction::BuildManifest).unwrap();
    let second = invoker.invoke(PackagingAction::BuildManifest).unwrap();

    assert_eq!(first.context.project_directory(), Path::new("/repo/A"));
    assert_eq!(second.context.project_directory(), Path::new("/repo/B"));
}

/// Configured script names replace the defaults
#[cfg(unix)]
#[test]
fn test_configured_script_names() {
    let log = Log::default();
    let scripts = ScriptsConfig {
        manifest: "nuspec.sh".to_string(),
        archive: "nupkg.sh".to_string(),
        directory: None,
    };
    let resolver = ProjectContextResolver::new(my_lib(), FixedLocation(PathBuf::from("/ext/bin")));
    let invoker = PackagingInvoker::new(
        resolver,
        FakeRunner::new(&log),
        RecordingConsole { log: &log, broken: false },
        scripts,
    );

    let report = invoker.invoke(PackagingAction::BuildArchive).unwrap();
    assert_eq!(report.script, PathBuf::from("/ext/bin/nupkg.sh"));
}
