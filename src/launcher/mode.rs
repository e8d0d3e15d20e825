//! Launch mode selection from the argument vector.

use std::ffi::OsString;

use serde::Serialize;

use crate::archive::layout::RAILS_SCRIPT;
use crate::error::LaunchError;

/// Token that switches the launcher into script mode.
pub const SCRIPT_SENTINEL: &str = "-S";

/// Executables replaced by a packaged script before location.
///
/// `rails` does not run under the script runtime bridge, so the archive ships
/// the script `rake rails:update:bin` would have generated.
pub const EXECUTABLE_REWRITES: &[(&str, &str)] = &[("rails", RAILS_SCRIPT)];

/// What the launcher was asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LaunchMode {
    /// Start the embedded webserver.
    Server,
    /// Run a packaged executable script.
    Script(ScriptRequest),
}

/// Script mode arguments.
///
/// For `warboot --1.9 -S rake db:migrate`:
/// `arguments == ["--1.9"]`, `executable == "rake"`, `executable_argv == ["db:migrate"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRequest {
    /// Tokens before `-S`, handed to the runtime's option parser.
    pub arguments: Vec<String>,
    /// Executable to locate, after rewrites.
    pub executable: String,
    /// Tokens after the executable, the script's own argv.
    pub executable_argv: Vec<String>,
}

impl LaunchMode {
    /// Derive the mode from the full argument vector. Has no side effects.
    pub fn parse(args: &[String]) -> Result<Self, LaunchError> {
        let Some(index) = args.iter().position(|arg| arg == SCRIPT_SENTINEL) else {
            return Ok(LaunchMode::Server);
        };

        let executable = match args.get(index + 1) {
            Some(exec) if !exec.is_empty() => exec.as_str(),
            _ => {
                return Err(LaunchError::Argument(
                    "missing executable after -S".to_string(),
                ))
            }
        };

        let executable = EXECUTABLE_REWRITES
            .iter()
            .find(|(name, _)| *name == executable)
            .map(|(_, replacement)| *replacement)
            .unwrap_or(executable);

        Ok(LaunchMode::Script(ScriptRequest {
            arguments: args[..index].to_vec(),
            executable: executable.to_string(),
            executable_argv: args[index + 2..].to_vec(),
        }))
    }
}

/// Convert raw process arguments. Arguments that are not UTF-8 are an [`LaunchError::Argument`].
pub fn collect_args<I>(args: I) -> Result<Vec<String>, LaunchError>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            arg.into_string().map_err(|raw| {
                LaunchError::Argument(format!("argument is not valid UTF-8: {raw:?}"))
            })
        })
        .collect()
}

impl ScriptRequest {
    /// Non-fatal warning for requests that may leave the packaged environment.
    pub fn advisory(&self) -> Option<&'static str> {
        let bundle_exec = self.executable == "bundle"
            && self.executable_argv.first().map(String::as_str) == Some("exec");
        bundle_exec.then_some(
            "`bundle exec' may drop out of the packaged environment and into the system environment",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_sentinel_is_server_mode() {
        assert_eq!(LaunchMode::parse(&[]).unwrap(), LaunchMode::Server);
        assert_eq!(
            LaunchMode::parse(&args(&["--port", "9000", "-s"])).unwrap(),
            LaunchMode::Server
        );
    }

    #[test]
    fn test_script_mode_split() {
        let mode = LaunchMode::parse(&args(&["--1.9", "-S", "foo", "a", "b", "c"])).unwrap();
        assert_eq!(
            mode,
            LaunchMode::Script(ScriptRequest {
                arguments: args(&["--1.9"]),
                executable: "foo".into(),
                executable_argv: args(&["a", "b", "c"]),
            })
        );
    }

    #[test]
    fn test_later_sentinels_belong_to_the_script() {
        let LaunchMode::Script(request) = LaunchMode::parse(&args(&["-S", "rake", "-S", "x"])).unwrap() else {
            panic!("expected script mode");
        };
        assert!(request.arguments.is_empty());
        assert_eq!(request.executable, "rake");
        assert_eq!(request.executable_argv, args(&["-S", "x"]));
    }

    #[test]
    fn test_missing_executable_is_argument_error() {
        assert!(matches!(
            LaunchMode::parse(&args(&["-S"])),
            Err(LaunchError::Argument(_))
        ));
        assert!(matches!(
            LaunchMode::parse(&args(&["--1.9", "-S", ""])),
            Err(LaunchError::Argument(_))
        ));
    }

    #[test]
    fn test_rails_is_rewritten() {
        let LaunchMode::Script(request) = LaunchMode::parse(&args(&["-S", "rails", "console"])).unwrap() else {
            panic!("expected script mode");
        };
        assert_eq!(request.executable, "./META-INF/rails.rb");
        assert_eq!(request.executable_argv, args(&["console"]));
    }

    #[test]
    fn test_collect_args() {
        let collected = collect_args(vec![OsString::from("-S"), OsString::from("rake")]).unwrap();
        assert_eq!(collected, args(&["-S", "rake"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_argument_is_argument_error() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'-', b'S', 0xff]);
        let err = collect_args(vec![OsString::from("--1.9"), raw]).unwrap_err();
        assert!(matches!(err, LaunchError::Argument(ref msg) if msg.contains("UTF-8")));
    }

    #[test]
    fn test_bundle_exec_advisory() {
        let LaunchMode::Script(request) = LaunchMode::parse(&args(&["-S", "bundle", "exec", "rake"])).unwrap() else {
            panic!("expected script mode");
        };
        assert!(request.advisory().is_some());

        let LaunchMode::Script(request) = LaunchMode::parse(&args(&["-S", "bundle", "install"])).unwrap() else {
            panic!("expected script mode");
        };
        assert!(request.advisory().is_none());
    }
}
