//! Shared utilities for integration tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use warboot::error::LaunchError;
use warboot::script::{EnvPrelude, LookupRequest, ScriptInvocation, ScriptRuntime};

/// Write a zip archive at `dir/name` holding `entries`. Names ending in `/` become directories.
pub fn build_archive<C: AsRef<[u8]>>(dir: &Path, name: &str, entries: &[(&str, C)]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    for (entry, contents) in entries {
        if entry.ends_with('/') {
            writer.add_directory(*entry, options).unwrap();
        } else {
            writer.start_file(*entry, options).unwrap();
            writer.write_all(contents.as_ref()).unwrap();
        }
    }
    writer.finish().unwrap();
    path
}

/// A shared library present on the host that is safe to load a second copy of.
#[allow(dead_code)]
pub fn system_library() -> Option<PathBuf> {
    const DIRS: &[&str] = &[
        "/lib/x86_64-linux-gnu",
        "/usr/lib/x86_64-linux-gnu",
        "/lib/aarch64-linux-gnu",
        "/usr/lib/aarch64-linux-gnu",
        "/lib64",
        "/usr/lib64",
        "/usr/lib",
        "/lib",
    ];
    const NAMES: &[&str] = &["libz.so.1", "libm.so.6"];

    NAMES
        .iter()
        .flat_map(|name| DIRS.iter().map(move |dir| Path::new(dir).join(name)))
        .find(|path| path.is_file())
}

/// Write an executable shell script.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Number of entries directly inside `dir`.
#[allow(dead_code)]
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// A recorded call to [`ScriptRuntime::run`].
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub root: PathBuf,
    pub script: PathBuf,
    pub script_existed: bool,
    pub arguments: Vec<String>,
    pub argv: Vec<String>,
    pub classpath: Vec<PathBuf>,
    pub prelude: String,
}

/// Script runtime that records what it was asked to do.
#[derive(Default)]
pub struct FakeRuntime {
    pub lookup_result: Option<PathBuf>,
    pub exit_code: i32,
    pub lookups: Mutex<Vec<String>>,
    pub runs: Mutex<Vec<RecordedRun>>,
}

#[allow(dead_code)]
impl FakeRuntime {
    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    pub fn finding(path: impl Into<PathBuf>) -> Self {
        Self {
            lookup_result: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn last_run(&self) -> Option<RecordedRun> {
        self.runs.lock().unwrap().last().cloned()
    }
}

impl ScriptRuntime for FakeRuntime {
    fn name(&self) -> &str {
        "fake"
    }

    fn render_prelude(&self, prelude: &EnvPrelude) -> String {
        prelude.to_ruby()
    }

    fn lookup_executable(&self, request: &LookupRequest<'_>) -> Result<Option<PathBuf>, LaunchError> {
        self.lookups.lock().unwrap().push(request.executable.to_string());
        Ok(self.lookup_result.clone())
    }

    fn run(&self, invocation: &ScriptInvocation<'_>) -> Result<i32, LaunchError> {
        let prelude = std::fs::read_to_string(invocation.prelude_file).unwrap_or_default();
        self.runs.lock().unwrap().push(RecordedRun {
            root: invocation.root.to_path_buf(),
            script: invocation.script.to_path_buf(),
            script_existed: invocation.script.is_file(),
            arguments: invocation.arguments.to_vec(),
            argv: invocation.argv.to_vec(),
            classpath: invocation.classpath.to_vec(),
            prelude,
        });
        Ok(self.exit_code)
    }
}
