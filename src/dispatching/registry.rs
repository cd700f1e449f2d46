//! Compiled-in policy modules.
//!
//! Stands in for loading a policy from a shared object: each module exports
//! a zero-argument factory returning its [`PolicyDescriptor`], and
//! [`load`] resolves an identifier to that factory. Identifiers may be bare
//! names (`rr`) or module paths (`scheduler/rr/rr.so`), which resolve by
//! file stem.

use std::path::Path;

use log::{debug, warn};

use super::policies::{fcfs, odd_even, priority_rr, round_robin, srtn};
use super::PolicyDescriptor;
use crate::error::{Result, SchedError};

/// Zero-argument factory exported by a policy module.
pub type PolicyFactory = fn() -> PolicyDescriptor;

/// Every built-in module, in a stable order.
pub const BUILTIN: &[(&str, PolicyFactory)] = &[
    (fcfs::NAME, fcfs::descriptor),
    (round_robin::NAME, round_robin::descriptor),
    (priority_rr::NAME, priority_rr::descriptor),
    (srtn::NAME, srtn::descriptor),
    (odd_even::NAME, odd_even::descriptor),
];

/// Names of every built-in policy.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(name, _)| *name).collect()
}

/// Resolves a policy identifier to its descriptor.
///
/// Fails with `NotFound` for unknown identifiers.
pub fn load(identifier: &str) -> Result<PolicyDescriptor> {
    let name = module_name(identifier);
    match BUILTIN.iter().find(|(builtin, _)| *builtin == name) {
        Some((_, factory)) => {
            debug!("Loaded policy module '{name}' from '{identifier}'");
            Ok(factory())
        }
        None => {
            warn!("No policy module named '{identifier}'");
            Err(SchedError::NotFound(identifier.to_string()))
        }
    }
}

/// Strips directories, extensions and a `lib` prefix from a module path.
fn module_name(identifier: &str) -> String {
    let stem = Path::new(identifier)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(identifier);
    stem.strip_prefix("lib")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(stem)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_every_builtin() {
        for name in builtin_names() {
            let descriptor = load(name).unwrap();
            assert_eq!(descriptor.name, name);
        }
    }

    #[test]
    fn test_load_by_module_path() {
        assert_eq!(load("scheduler/rr/rr.so").unwrap().name, "rr");
        assert_eq!(load("./libsrtn.so").unwrap().name, "srtn");
        assert_eq!(load("PRR").unwrap().name, "prr");
    }

    #[test]
    fn test_load_unknown() {
        assert!(matches!(load("lottery"), Err(SchedError::NotFound(_))));
        assert!(matches!(load(""), Err(SchedError::NotFound(_))));
    }

    #[test]
    fn test_builtin_names_unique() {
        let mut names = builtin_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN.len());
    }
}
