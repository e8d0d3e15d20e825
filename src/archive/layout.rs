//! Fixed entry names the launcher looks up inside the archive.

/// Private prefix: application payload, re-rooted on extraction.
pub const WEB_INF: &str = "WEB-INF";

/// Metadata prefix: runtime bootstrap assets, extracted verbatim.
pub const META_INF: &str = "META-INF";

pub const WEBSERVER_PROPERTIES: &str = "WEB-INF/webserver.properties";
pub const WEBSERVER_LIBRARY: &str = "WEB-INF/webserver.so";
pub const LOGGER_LIBRARY: &str = "WEB-INF/logger.so";
pub const WEBSERVER_CONFIG: &str = "WEB-INF/webserver.xml";

pub const INIT_SCRIPT: &str = "META-INF/init.rb";
pub const RUNTIME_HOME: &str = "META-INF/jruby.home";

/// Packaged replacement for the `rails` executable.
pub const RAILS_SCRIPT: &str = "./META-INF/rails.rb";

/// Everything outside the private and metadata prefixes lands here.
pub const PUBLIC_DIR: &str = "/public/";

/// Directory and extension that mark an extracted file as a loadable unit.
pub const LIB_DIR: &str = "/lib/";
pub const LOADABLE_EXTENSION: &str = ".jar";
