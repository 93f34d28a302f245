//! Configuration options - the parsed, immutable input to resolution.
//!
//! `Options` is the structured form of the CLI surface. It is produced once
//! per invocation and never mutated afterwards; the resolution engine in
//! [`crate::resolve`] is a pure function over it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostic::InvalidOptionError;

/// The mutually exclusive build modes.
///
/// Exactly one mode is active per run. An invalid mode name is a fatal
/// parse error; there is no lenient fallback for this option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Optimized build with `-DNDEBUG`.
    Release,
    /// Unoptimized build with sanitizers and debug info (the default).
    Debug,
    /// Cross-compile for Windows with the MinGW-w64 toolchain.
    Cross,
}

impl BuildMode {
    /// The accepted CLI spellings, in help order.
    pub const VALUES: [&'static str; 3] = ["release", "debug", "cross"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Release => "release",
            BuildMode::Debug => "debug",
            BuildMode::Cross => "cross",
        }
    }

    /// Whether this mode targets Windows (affects executable suffixes and
    /// the canonical toolchain pair).
    pub fn is_cross(&self) -> bool {
        matches!(self, BuildMode::Cross)
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        BuildMode::Debug
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(BuildMode::Release),
            "debug" => Ok(BuildMode::Debug),
            "cross" => Ok(BuildMode::Cross),
            _ => Err(InvalidOptionError::new("build", s, &Self::VALUES)),
        }
    }
}

/// The full option set for one generator run.
///
/// Every field has a default, so `Options::default()` describes a plain
/// debug build. `build_native` stays a free-form string on purpose: an
/// unrecognized tuning value must degrade to a warning during resolution
/// instead of failing the run (unlike `build`, which is strictly parsed).
#[derive(Debug, Clone, Serialize)]
pub struct Options {
    /// Replacement compiler flags (`--cflags`), applied after everything else.
    pub cflags: Option<String>,

    /// Compiler executable override (`--cc`).
    pub cc: Option<String>,

    /// Archiver executable override (`--ar`).
    pub ar: Option<String>,

    /// Replacement linker flags (`--ldflags`), applied after everything else.
    pub ldflags: Option<String>,

    /// Active build mode (`--build`).
    pub build: BuildMode,

    /// Native architecture tuning (`--build-native`):
    /// none, mtune, march, or both.
    pub build_native: String,

    /// Build releases with `-O3` instead of `-O2` (`--O3`).
    pub o3: bool,

    /// Skip the static library target (`--disable-static-library`).
    pub disable_static_library: bool,

    /// Targets to skip, by logical name (`--disable-tool`, repeatable).
    pub disable_tool: Vec<String>,

    /// Compile with `-DHASH_STATISTICS` (`--enable-hash-statistics`).
    pub enable_hash_statistics: bool,

    /// Compile with `-DHASH_NO_WARNINGS` (`--disable-hash-warnings`).
    pub disable_hash_warnings: bool,

    /// Leave the sanitizer out of debug builds (`--disable-sanitize`).
    pub disable_sanitize: bool,

    /// Use this version string verbatim instead of asking git
    /// (`--force-version`).
    pub force_version: Option<String>,

    /// Literal suffix appended to whichever version value is active
    /// (`--add-version-suffix`). Independent of `force_version`.
    pub add_version_suffix: Option<String>,

    /// Whether the advisory `CC` environment variable was set when the
    /// generator ran. Only ever produces a warning; resolution ignores it.
    pub cc_env_present: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            cflags: None,
            cc: None,
            ar: None,
            ldflags: None,
            build: BuildMode::default(),
            build_native: "none".to_string(),
            o3: false,
            disable_static_library: false,
            disable_tool: Vec::new(),
            enable_hash_statistics: false,
            disable_hash_warnings: false,
            disable_sanitize: false,
            force_version: None,
            add_version_suffix: None,
            cc_env_present: false,
        }
    }
}

impl Options {
    /// Whether a tool was named in `--disable-tool`.
    pub fn tool_disabled(&self, name: &str) -> bool {
        self.disable_tool.iter().any(|t| t == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mode_round_trip() {
        for value in BuildMode::VALUES {
            let mode: BuildMode = value.parse().unwrap();
            assert_eq!(mode.as_str(), value);
        }
    }

    #[test]
    fn test_build_mode_invalid_value() {
        let err = "w64".parse::<BuildMode>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("w64"));
        assert!(message.contains("release"));
    }

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.build, BuildMode::Debug);
        assert_eq!(opts.build_native, "none");
        assert!(!opts.o3);
        assert!(opts.disable_tool.is_empty());
    }

    #[test]
    fn test_tool_disabled() {
        let opts = Options {
            disable_tool: vec!["test".to_string()],
            ..Options::default()
        };
        assert!(opts.tool_disabled("test"));
        assert!(!opts.tool_disabled("reuse_test"));
    }
}
