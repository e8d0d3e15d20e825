//! Environment prelude evaluated before any packaged script.

use std::path::{Path, PathBuf};

use crate::archive::layout::INIT_SCRIPT;

/// Paths the script runtime is pointed at inside the extraction root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPrelude {
    /// Gem installation directory (`GEM_HOME` / `GEM_PATH`).
    pub gem_home: PathBuf,
    /// Packaged Gemfile (`BUNDLE_GEMFILE`).
    pub gemfile: PathBuf,
    /// Packaged initialization script, loaded when present.
    pub init_script: PathBuf,
}

impl EnvPrelude {
    pub fn for_root(root: &Path) -> Self {
        Self {
            gem_home: root.join("gems"),
            gemfile: root.join("Gemfile"),
            init_script: root.join(INIT_SCRIPT),
        }
    }

    /// Ruby source for the prelude. Existing environment values are kept.
    pub fn to_ruby(&self) -> String {
        let gem_home = ruby_quote(&self.gem_home.to_string_lossy());
        let gemfile = ruby_quote(&self.gemfile.to_string_lossy());
        let init = ruby_quote(&self.init_script.to_string_lossy());

        format!(
            "ENV['GEM_HOME'] ||= {gem_home}\n\
             ENV['GEM_PATH'] ||= {gem_home}\n\
             ENV['BUNDLE_GEMFILE'] ||= {gemfile}\n\
             require {init} if File.exist?({init})\n"
        )
    }
}

/// Single-quoted Ruby string literal.
pub fn ruby_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruby_quote_escapes() {
        assert_eq!(ruby_quote("plain"), "'plain'");
        assert_eq!(ruby_quote("it's"), "'it\\'s'");
        assert_eq!(ruby_quote("C:\\gems"), "'C:\\\\gems'");
    }

    #[test]
    fn test_prelude_points_at_root() {
        let prelude = EnvPrelude::for_root(Path::new("/tmp/warblerXwebroot"));
        let ruby = prelude.to_ruby();
        assert!(ruby.contains("ENV['GEM_HOME'] ||= '/tmp/warblerXwebroot/gems'"));
        assert!(ruby.contains("ENV['GEM_PATH'] ||= '/tmp/warblerXwebroot/gems'"));
        assert!(ruby.contains("ENV['BUNDLE_GEMFILE'] ||= '/tmp/warblerXwebroot/Gemfile'"));
        assert!(ruby.contains("require '/tmp/warblerXwebroot/META-INF/init.rb' if File.exist?"));
    }
}
