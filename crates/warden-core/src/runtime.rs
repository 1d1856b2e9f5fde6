//! Hosting runtime environment probe.

use semver::Version;

/// How the hosting process is being supervised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Standalone process; the agent owns fault exit policy.
    Standalone,
    /// Running under cluster supervision; restarts are handled outside.
    Cluster,
}

/// Snapshot of the environment signals the capability detector consumes.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// Hosting runtime version. Unknown versions collapse to `0.0.0`, which
    /// always lands in fallback mode.
    pub version: Version,
    /// Force the fallback implementation for every capability.
    pub force_fallback: bool,
    /// Allow enhanced mode on runtimes older than the default gate.
    pub force_enhanced: bool,
    /// Request error-context capture for the notify capability.
    pub catch_context: bool,
    /// Force the fallback implementation for profiling only.
    pub profiling_force_fallback: bool,
    /// Execution mode reported by the supervisor.
    pub exec_mode: ExecMode,
}

impl RuntimeInfo {
    /// Probe the process environment.
    ///
    /// The force overrides accept any non-empty value other than `0` or
    /// `false`; the catch-context flag must be exactly `true`.
    pub fn from_env() -> Self {
        Self {
            version: std::env::var("WARDEN_RUNTIME_VERSION")
                .ok()
                .and_then(|v| Version::parse(v.trim()).ok())
                .unwrap_or_else(|| Version::new(0, 0, 0)),
            force_fallback: flag_set("WARDEN_FORCE_FALLBACK"),
            force_enhanced: flag_set("WARDEN_FORCE_INSPECTOR"),
            catch_context: std::env::var("WARDEN_CATCH_CONTEXT_ON_ERROR")
                .map(|v| v == "true")
                .unwrap_or(false),
            profiling_force_fallback: flag_set("WARDEN_PROFILING_FORCE_FALLBACK"),
            exec_mode: match std::env::var("WARDEN_EXEC_MODE").as_deref() {
                Ok("cluster") => ExecMode::Cluster,
                _ => ExecMode::Standalone,
            },
        }
    }

    /// Replace the version, for tests and embedding hosts.
    ///
    /// Unparseable versions collapse to `0.0.0`.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Version::parse(version).unwrap_or_else(|_| Version::new(0, 0, 0));
        self
    }
}

impl Default for RuntimeInfo {
    fn default() -> Self {
        Self {
            version: Version::new(0, 0, 0),
            force_fallback: false,
            force_enhanced: false,
            catch_context: false,
            profiling_force_fallback: false,
            exec_mode: ExecMode::Standalone,
        }
    }
}

fn flag_set(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => !v.is_empty() && v != "0" && v != "false",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fallback_shaped() {
        let runtime = RuntimeInfo::default();
        assert_eq!(runtime.version, Version::new(0, 0, 0));
        assert!(!runtime.force_fallback);
        assert!(!runtime.force_enhanced);
        assert_eq!(runtime.exec_mode, ExecMode::Standalone);
    }

    #[test]
    fn test_with_version_parses() {
        let runtime = RuntimeInfo::default().with_version("10.1.0");
        assert_eq!(runtime.version, Version::new(10, 1, 0));
    }

    #[test]
    fn test_with_version_collapses_garbage() {
        let runtime = RuntimeInfo::default().with_version("not-a-version");
        assert_eq!(runtime.version, Version::new(0, 0, 0));
    }
}
