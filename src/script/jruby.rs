//! JRuby as the script runtime, driven as a child process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::archive::layout::RUNTIME_HOME;
use crate::config::schema::RuntimeConfig;
use crate::error::LaunchError;
use crate::script::prelude::ruby_quote;
use crate::script::{EnvPrelude, LookupRequest, ScriptInvocation, ScriptRuntime};

/// Prefix of the stdout line carrying a lookup result.
const LOOKUP_MARKER: &str = "__WARBOOT_EXECUTABLE__=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JRubyRuntime {
    program: PathBuf,
    home: Option<PathBuf>,
}

impl JRubyRuntime {
    pub fn new(program: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            home,
        }
    }

    /// Pick the interpreter for an extracted root.
    ///
    /// Configured program, then the packaged runtime home, then `jruby` on `PATH`.
    pub fn discover(root: &Path, config: &RuntimeConfig) -> Self {
        let home = Some(root.join(RUNTIME_HOME)).filter(|home| home.is_dir());
        let packaged = home
            .as_ref()
            .map(|home| home.join("bin").join("jruby"))
            .filter(|bin| bin.is_file());

        let program = config
            .program
            .clone()
            .or(packaged)
            .unwrap_or_else(|| PathBuf::from("jruby"));

        tracing::debug!(program = %program.display(), home = ?home, "Script runtime selected");
        Self { program, home }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Base command: working directory, classpath and runtime home.
    fn command(&self, root: &Path, classpath: &[PathBuf]) -> Result<Command, LaunchError> {
        let mut command = Command::new(&self.program);
        command.current_dir(root);

        if !classpath.is_empty() {
            let inherited = std::env::var_os("CLASSPATH");
            let entries = classpath
                .iter()
                .cloned()
                .chain(inherited.iter().flat_map(|cp| std::env::split_paths(cp)));
            let joined = std::env::join_paths(entries)
                .map_err(|e| LaunchError::InvalidInvocation(format!("classpath: {e}")))?;
            command.env("CLASSPATH", joined);
        }
        if let Some(home) = &self.home {
            command.env("JRUBY_HOME", home);
        }
        Ok(command)
    }

    fn spawn_failure(&self, source: std::io::Error) -> LaunchError {
        if source.kind() == std::io::ErrorKind::Interrupted {
            return LaunchError::Interrupted;
        }
        LaunchError::ScriptExecution {
            message: format!("cannot start {}: {source}", self.program.display()),
            status: None,
        }
    }
}

/// Ruby source that prints the launch script of the gem providing `executable`.
///
/// A `SystemExit` raised while activating the Gemfile means "not found".
pub fn lookup_script(executable: &str, prelude: &str, bundler_setup: bool) -> String {
    let mut script = String::from(prelude);
    script.push_str("begin\n");
    script.push_str("  require 'rubygems' unless defined?(Gem)\n");
    if bundler_setup {
        script.push_str(
            "  if File.exist?(ENV['BUNDLE_GEMFILE'].to_s)\n\
             \x20   begin\n\
             \x20     require 'bundler'\n\
             \x20   rescue LoadError\n\
             \x20   else\n\
             \x20     env = ENV['RAILS_ENV'] || ENV['RACK_ENV']\n\
             \x20     env ? Bundler.setup(:default, env.to_sym) : Bundler.setup(:default)\n\
             \x20   end\n\
             \x20 end\n",
        );
    }
    script.push_str(&format!("  exe = {}\n", ruby_quote(executable)));
    script.push_str("  spec = Gem::Specification.find { |s| s.executables.include?(exe) }\n");
    script.push_str(&format!(
        "  puts \"{LOOKUP_MARKER}#{{spec.bin_file(exe)}}\" if spec\n"
    ));
    script.push_str("rescue SystemExit\n  nil\nend\n");
    script
}

/// Last marker line of the lookup output.
fn parse_lookup_output(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix(LOOKUP_MARKER))
        .filter(|path| !path.is_empty())
        .last()
        .map(PathBuf::from)
}

impl ScriptRuntime for JRubyRuntime {
    fn name(&self) -> &str {
        "jruby"
    }

    fn render_prelude(&self, prelude: &EnvPrelude) -> String {
        prelude.to_ruby()
    }

    fn lookup_executable(&self, request: &LookupRequest<'_>) -> Result<Option<PathBuf>, LaunchError> {
        let script = lookup_script(request.executable, request.prelude, request.bundler_setup);
        let mut command = self.command(request.root, request.classpath)?;
        command
            .arg("-e")
            .arg(&script)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());
        let output = request
            .supervisor
            .output(&mut command)
            .map_err(|e| self.spawn_failure(e))?;
        if request.supervisor.is_terminating() {
            return Err(LaunchError::Interrupted);
        }

        if !output.status.success() {
            tracing::debug!(
                executable = request.executable,
                status = ?output.status.code(),
                "Executable lookup exited unsuccessfully"
            );
            return Ok(None);
        }
        Ok(parse_lookup_output(&String::from_utf8_lossy(&output.stdout)))
    }

    fn run(&self, invocation: &ScriptInvocation<'_>) -> Result<i32, LaunchError> {
        let mut require = OsString::from("-r");
        require.push(invocation.prelude_file);

        let mut command = self.command(invocation.root, invocation.classpath)?;
        command
            .args(invocation.arguments)
            .arg(require)
            .arg(invocation.script)
            .args(invocation.argv);
        tracing::debug!(?command, "Running script");

        let status = invocation
            .supervisor
            .run(&mut command)
            .map_err(|e| self.spawn_failure(e))?;
        if status.code().is_none() && invocation.supervisor.is_terminating() {
            return Err(LaunchError::Interrupted);
        }
        status.code().ok_or_else(|| LaunchError::ScriptExecution {
            message: format!(
                "{} {}",
                invocation.script.display(),
                describe_signal_exit(status)
            ),
            status: None,
        })
    }
}

#[cfg(unix)]
fn describe_signal_exit(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt as _;

    match status.signal() {
        Some(signal) => format!("terminated by signal {signal}"),
        None => format!("ended without an exit code ({status})"),
    }
}

#[cfg(not(unix))]
fn describe_signal_exit(status: ExitStatus) -> String {
    format!("ended without an exit code ({status})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ChildSupervisor;
    use std::fs;

    #[test]
    fn test_discover_prefers_configured_program() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("META-INF/jruby.home/bin")).unwrap();
        fs::write(root.path().join("META-INF/jruby.home/bin/jruby"), "").unwrap();

        let packaged = JRubyRuntime::discover(root.path(), &RuntimeConfig::default());
        assert_eq!(
            packaged.program(),
            root.path().join("META-INF/jruby.home/bin/jruby")
        );
        assert_eq!(packaged.home(), Some(root.path().join("META-INF/jruby.home").as_path()));

        let config = RuntimeConfig {
            program: Some(PathBuf::from("/opt/jruby/bin/jruby")),
            ..Default::default()
        };
        let configured = JRubyRuntime::discover(root.path(), &config);
        assert_eq!(configured.program(), Path::new("/opt/jruby/bin/jruby"));
    }

    #[test]
    fn test_discover_falls_back_to_path() {
        let root = tempfile::tempdir().unwrap();
        let runtime = JRubyRuntime::discover(root.path(), &RuntimeConfig::default());
        assert_eq!(runtime.program(), Path::new("jruby"));
        assert_eq!(runtime.home(), None);
    }

    #[test]
    fn test_lookup_script_bundler_block() {
        let with = lookup_script("rake", "# prelude\n", true);
        assert!(with.starts_with("# prelude\n"));
        assert!(with.contains("Bundler.setup"));
        assert!(with.contains("exe = 'rake'"));
        assert!(with.contains("rescue SystemExit"));

        let without = lookup_script("rake", "", false);
        assert!(!without.contains("Bundler"));
    }

    #[test]
    fn test_parse_lookup_output() {
        let out = "loading\n__WARBOOT_EXECUTABLE__=/gems/rake/exe/rake\n";
        assert_eq!(
            parse_lookup_output(out),
            Some(PathBuf::from("/gems/rake/exe/rake"))
        );
        assert_eq!(parse_lookup_output("nothing here\n"), None);
        assert_eq!(parse_lookup_output("__WARBOOT_EXECUTABLE__=\n"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_line_and_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let fake = root.path().join("fake-jruby");
        fs::write(
            &fake,
            "#!/bin/sh\nprintf '%s\\n' \"$PWD\" \"$@\" > args.txt\nprintf '%s' \"$CLASSPATH\" > cp.txt\nexit 7\n",
        )
        .unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        let runtime = JRubyRuntime::new(&fake, None);
        let supervisor = ChildSupervisor::new();
        let classpath = vec![root.path().join("lib/a.jar")];
        let invocation = ScriptInvocation {
            root: root.path(),
            script: Path::new("/w/bin/rake"),
            prelude_file: Path::new("/w/prelude.rb"),
            arguments: &["--1.9".to_string()],
            argv: &["db:migrate".to_string()],
            classpath: &classpath,
            supervisor: &supervisor,
        };
        assert_eq!(runtime.run(&invocation).unwrap(), 7);

        let recorded = fs::read_to_string(root.path().join("args.txt")).unwrap();
        let lines: Vec<&str> = recorded.lines().collect();
        assert_eq!(&lines[1..], ["--1.9", "-r/w/prelude.rb", "/w/bin/rake", "db:migrate"]);
        let cp = fs::read_to_string(root.path().join("cp.txt")).unwrap();
        assert!(cp.starts_with(&root.path().join("lib/a.jar").to_string_lossy().to_string()));
    }
}
