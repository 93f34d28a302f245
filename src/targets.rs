//! Target registry - the buildable outputs and their disablement rules.
//!
//! Targets are declared as data. Each one carries a uniform list of
//! (predicate, justification) pairs; the emitter renders every true
//! justification, so adding a new disablement rule never touches the
//! emitter. Suffix policy is applied here too: cross builds append `.exe`
//! to every target name, the static library included, and the suffixed
//! names are what flow into the phony aggregate lists.

use serde::Serialize;

use crate::config::{BuildMode, Options};
use crate::diagnostic::Advisory;

/// Translation units known to the build, as (source, object) pairs.
/// Object paths live under `$builddir`.
pub const SOURCES: &[(&str, &str)] = &[
    ("src/hash.c", "$builddir/hash.o"),
    ("src/test/test.c", "$builddir/test/test.o"),
    ("src/test/reuse_test.c", "$builddir/test/reuse_test.o"),
];

/// Rule names referenced by target build edges.
pub const RULE_COMPILE: &str = "cc";
pub const RULE_BIN: &str = "bin";
pub const RULE_ARCHIVE: &str = "static-library";

/// A declared buildable output.
struct TargetSpec {
    name: &'static str,
    rule: &'static str,
    inputs: &'static [&'static str],
    variables: &'static [(&'static str, &'static str)],
    /// Member of the `tools` aggregate (everything is a member of `all`).
    tool: bool,
}

const TARGETS: &[TargetSpec] = &[
    TargetSpec {
        name: "test",
        rule: RULE_BIN,
        inputs: &["$builddir/hash.o", "$builddir/test/test.o"],
        variables: &[("libs", "")],
        tool: true,
    },
    TargetSpec {
        name: "reuse_test",
        rule: RULE_BIN,
        inputs: &["$builddir/hash.o", "$builddir/test/reuse_test.o"],
        variables: &[("libs", "")],
        tool: true,
    },
    TargetSpec {
        name: "hash.a",
        rule: RULE_ARCHIVE,
        inputs: &["$builddir/hash.o"],
        variables: &[],
        tool: false,
    },
];

/// A target after suffixing and disablement evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTarget {
    /// Final output name, `.exe`-suffixed in cross builds.
    pub name: String,
    pub rule: String,
    pub inputs: Vec<String>,
    pub variables: Vec<(String, String)>,
    /// Member of the `tools` phony aggregate when enabled.
    pub tool: bool,
    /// Justification for every true disablement predicate. Empty means
    /// the target gets a build edge.
    pub disabled_because: Vec<String>,
}

impl ResolvedTarget {
    pub fn enabled(&self) -> bool {
        self.disabled_because.is_empty()
    }
}

/// The registry output: ordered targets plus any advisories raised while
/// evaluating the disable requests.
#[derive(Debug, Clone, Serialize)]
pub struct TargetSet {
    pub targets: Vec<ResolvedTarget>,
    pub advisories: Vec<Advisory>,
}

impl TargetSet {
    /// Names of enabled tool targets, for the `tools` aggregate.
    pub fn enabled_tools(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| t.tool && t.enabled())
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Names of every enabled target, for the `all` aggregate.
    pub fn enabled_all(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| t.enabled())
            .map(|t| t.name.as_str())
            .collect()
    }
}

/// Executable suffix for the platform the mode targets.
pub fn exe_suffix(mode: BuildMode) -> &'static str {
    if mode.is_cross() {
        ".exe"
    } else {
        ""
    }
}

/// Evaluate the registry against the options and the active mode.
///
/// Disablement predicates are independent; a target named in
/// `--disable-tool` while also hit by `--disable-static-library` reports
/// both reasons.
pub fn resolve_targets(opts: &Options, mode: BuildMode) -> TargetSet {
    let suffix = exe_suffix(mode);

    let targets: Vec<ResolvedTarget> = TARGETS
        .iter()
        .map(|spec| {
            let mut disabled_because = Vec::new();

            if opts.tool_disabled(spec.name) {
                disabled_because
                    .push(format!("we were generated with --disable-tool={}", spec.name));
            }
            if spec.rule == RULE_ARCHIVE && opts.disable_static_library {
                disabled_because
                    .push("we were generated with --disable-static-library".to_string());
            }

            ResolvedTarget {
                name: format!("{}{}", spec.name, suffix),
                rule: spec.rule.to_string(),
                inputs: spec.inputs.iter().map(|i| i.to_string()).collect(),
                variables: spec
                    .variables
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                tool: spec.tool,
                disabled_because,
            }
        })
        .collect();

    let advisories = opts
        .disable_tool
        .iter()
        .filter(|name| !TARGETS.iter().any(|spec| spec.name == name.as_str()))
        .map(|name| {
            Advisory::new(format!(
                "ignoring --disable-tool={}: no such target (known targets: {})",
                name,
                TARGETS
                    .iter()
                    .map(|spec| spec.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
        .collect();

    TargetSet {
        targets,
        advisories,
    }
}
