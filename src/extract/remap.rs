//! Entry path remapping.
//!
//! # Rules
//! - `WEB-INF/app/x.rb` → `/app/x.rb` (private payload, re-rooted)
//! - `META-INF/init.rb` → `META-INF/init.rb` (kept where it is)
//! - `404.html` → `/public/404.html` (static content)
//!
//! A remapped path under `/lib/` ending in `.jar` is a loadable unit.

use crate::archive::layout::{LIB_DIR, LOADABLE_EXTENSION, META_INF, PUBLIC_DIR, WEB_INF};

/// Destination of an entry relative to the extraction root.
pub fn remap_entry_path(name: &str) -> String {
    if let Some(rest) = strip_dir_prefix(name, WEB_INF) {
        if rest.is_empty() {
            "/".to_string()
        } else {
            rest.to_string()
        }
    } else if strip_dir_prefix(name, META_INF).is_some() {
        name.to_string()
    } else {
        format!("{PUBLIC_DIR}{name}")
    }
}

/// Whether a remapped path should be reported as a loadable unit.
pub fn is_loadable(remapped: &str) -> bool {
    remapped.starts_with(LIB_DIR) && remapped.ends_with(LOADABLE_EXTENSION)
}

/// `Some(rest)` when `name` is `prefix` itself or lies below it; `rest` keeps its leading slash.
fn strip_dir_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
