//! Configuration resolution - options in, one coherent build configuration out.
//!
//! This is the decision logic of the generator. Each step below is a pure
//! function over the immutable [`Options`]; nothing here touches the
//! filesystem, the environment, or the output stream. The resulting
//! [`BuildConfig`] carries its own human-readable annotations (toolchain
//! deviation notes, mode notes, warnings) so the emitter can surface every
//! non-default decision without re-deriving it.
//!
//! Step order is load-bearing: version, toolchain, build mode, sanitizer,
//! native tuning, final flag overrides, feature defines. The override pass
//! replaces the computed cflags/ldflags values outright and touches nothing
//! else.

use serde::Serialize;

use crate::config::{BuildMode, Options};
use crate::diagnostic::Advisory;

/// Output directory variable value.
pub const BUILD_DIR: &str = "out";

/// Include search path shared by every compile edge.
pub const INCLUDES: &str = "-Iinclude";

/// Base compiler flags before any mode or override mutation.
pub const BASE_CFLAGS: &str = "-Wall -Wextra -Werror -fdiagnostics-color -flto";

/// Sanitizer instrumentation used by debug builds.
pub const SANITIZE_FLAGS: &str = "-fsanitize=address,undefined";

/// Deferred version expression, evaluated by the shell at build time.
/// The doubled `$$` survives ninja's own variable expansion.
pub const DESCRIBE_EXPR: &str = "$$(git describe --always --dirty)";

/// Canonical host toolchain pair.
pub const HOST_CC: &str = "gcc";
pub const HOST_AR: &str = "gcc-ar";

/// Canonical MinGW-w64 cross toolchain pair.
pub const CROSS_CC: &str = "x86_64-w64-mingw32-gcc";
pub const CROSS_AR: &str = "x86_64-w64-mingw32-gcc-ar";

pub const STATISTICS_DEFINE: &str = "-DHASH_STATISTICS";
pub const NO_WARNINGS_DEFINE: &str = "-DHASH_NO_WARNINGS";

const STD_GNU23: &str = "-std=gnu23";
const STD_GNU2X: &str = "-std=gnu2x";
const CROSS_CFLAGS: &str = "-O2 -static -I/usr/x86_64-w64-mingw32/include";
const CROSS_LDFLAGS: &str = "-L/usr/x86_64-w64-mingw32/lib";

/// How the `version` variable gets its base value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionSpec {
    /// `--force-version` was given: use the value verbatim and suppress
    /// the `-debug` decoration (but not `--add-version-suffix`).
    Forced { value: String },
    /// Left for the build executor: a shell git-describe call.
    Deferred,
}

/// A resolved executable name plus the justification for any deviation
/// from the canonical choice of the active mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSetting {
    pub value: String,
    pub note: Option<String>,
}

/// Native architecture tuning flags, or the warning explaining why there
/// are none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeTuning {
    pub flags: Option<String>,
    pub note: Option<String>,
}

/// Sanitizer flags. Empty when disabled, with the reason attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizerSetting {
    pub flags: String,
    pub note: Option<String>,
}

/// Everything the active build mode contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeSettings {
    pub mode: BuildMode,
    /// Language standard flag (`$std`).
    pub std_flag: String,
    /// Appended to `$cflags` inside the mode block.
    pub cflags_append: Option<String>,
    /// Appended to `$ldflags` inside the mode block.
    pub ldflags_append: Option<String>,
    /// Whether the mode adds `-DNDEBUG`.
    pub ndebug: bool,
    /// Whether the mode tags the version string with `-debug`.
    /// The tag is dropped when the version was forced.
    pub decorate_version: bool,
    /// Comments to embed in the mode block (e.g. why -O3 was applied
    /// or ignored).
    pub notes: Vec<String>,
}

/// One preprocessor define contributed by a feature toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDefine {
    pub define: String,
    pub note: String,
}

/// The resolved, internally consistent build configuration.
///
/// Constructed once by [`resolve`] and read-only afterwards. Every field
/// reflects exactly one build mode; mutually exclusive settings (say,
/// sanitizer flags and `-DNDEBUG`) never coexist.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    pub version: VersionSpec,
    pub version_suffix: Option<String>,
    pub build_dir: String,
    pub cc: ToolSetting,
    pub ar: ToolSetting,
    /// Warning comment about the ignored `CC` environment variable.
    pub cc_env_note: Option<String>,
    pub base_cflags: String,
    pub base_ldflags: String,
    pub native: NativeTuning,
    pub sanitizer: SanitizerSetting,
    pub includes: String,
    pub mode: ModeSettings,
    /// Cross builds force argp argument parsing off in the configured
    /// sources, independent of any user request.
    pub argp_enabled: bool,
    pub feature_defines: Vec<FeatureDefine>,
    /// Replaces the computed compiler flags when present.
    pub cflags_override: Option<String>,
    /// Replaces the computed linker flags when present.
    pub ldflags_override: Option<String>,
    /// Every non-fatal conflict found during resolution, in order.
    pub advisories: Vec<Advisory>,
}

/// Resolve an option set into a build configuration.
pub fn resolve(opts: &Options) -> BuildConfig {
    let mut advisories = Vec::new();

    let version = resolve_version(opts);
    let (cc, ar) = resolve_toolchain(opts);
    let mode = resolve_mode(opts, &mut advisories);
    let sanitizer = resolve_sanitizer(opts);
    let native = resolve_native(opts, &mut advisories);

    let cc_env_note = if opts.cc_env_present {
        let advisory =
            Advisory::new("CC environment variable is set but will be ignored (did you mean --cc=?)");
        let note = advisory.comment();
        advisories.push(advisory);
        Some(note)
    } else {
        None
    };

    let mut feature_defines = Vec::new();
    if opts.enable_hash_statistics {
        feature_defines.push(FeatureDefine {
            define: STATISTICS_DEFINE.to_string(),
            note: format!(
                "adding {} because we were generated with --enable-hash-statistics",
                STATISTICS_DEFINE
            ),
        });
    }
    if opts.disable_hash_warnings {
        feature_defines.push(FeatureDefine {
            define: NO_WARNINGS_DEFINE.to_string(),
            note: format!(
                "adding {} because we were generated with --disable-hash-warnings",
                NO_WARNINGS_DEFINE
            ),
        });
    }

    BuildConfig {
        version,
        version_suffix: opts.add_version_suffix.clone(),
        build_dir: BUILD_DIR.to_string(),
        cc,
        ar,
        cc_env_note,
        base_cflags: BASE_CFLAGS.to_string(),
        base_ldflags: String::new(),
        native,
        sanitizer,
        includes: INCLUDES.to_string(),
        argp_enabled: !mode.mode.is_cross(),
        mode,
        feature_defines,
        cflags_override: opts.cflags.clone(),
        ldflags_override: opts.ldflags.clone(),
        advisories,
    }
}

fn resolve_version(opts: &Options) -> VersionSpec {
    match &opts.force_version {
        Some(value) => VersionSpec::Forced {
            value: value.clone(),
        },
        None => VersionSpec::Deferred,
    }
}

fn resolve_toolchain(opts: &Options) -> (ToolSetting, ToolSetting) {
    let (canonical_cc, canonical_ar) = if opts.build.is_cross() {
        (CROSS_CC, CROSS_AR)
    } else {
        (HOST_CC, HOST_AR)
    };

    (
        resolve_tool(opts.cc.as_deref(), canonical_cc, "cc"),
        resolve_tool(opts.ar.as_deref(), canonical_ar, "ar"),
    )
}

/// An override equal to the canonical choice of the active mode needs no
/// explanation; anything else gets a justification for the emitter.
fn resolve_tool(requested: Option<&str>, canonical: &str, option: &str) -> ToolSetting {
    match requested {
        Some(value) if value != canonical => ToolSetting {
            value: value.to_string(),
            note: Some(format!(
                "using this {} because we were generated with --{}={}",
                option, option, value
            )),
        },
        Some(value) => ToolSetting {
            value: value.to_string(),
            note: None,
        },
        None => ToolSetting {
            value: canonical.to_string(),
            note: None,
        },
    }
}

fn resolve_mode(opts: &Options, advisories: &mut Vec<Advisory>) -> ModeSettings {
    let mut notes = Vec::new();

    // --O3 only means something for release builds
    if opts.o3 && opts.build != BuildMode::Release {
        let advisory = Advisory::new(format!("ignoring option --O3 for {} build", opts.build));
        notes.push(advisory.comment());
        advisories.push(advisory);
    }

    match opts.build {
        BuildMode::Debug => ModeSettings {
            mode: BuildMode::Debug,
            std_flag: STD_GNU23.to_string(),
            cflags_append: Some("$sanflags -g -Og".to_string()),
            ldflags_append: None,
            ndebug: false,
            decorate_version: true,
            notes,
        },
        BuildMode::Release => {
            let optimization = if opts.o3 {
                notes.push("setting -O3 because we were generated with --O3".to_string());
                "-O3"
            } else {
                "-O2"
            };
            ModeSettings {
                mode: BuildMode::Release,
                std_flag: STD_GNU23.to_string(),
                cflags_append: Some(optimization.to_string()),
                ldflags_append: None,
                ndebug: true,
                decorate_version: false,
                notes,
            }
        }
        BuildMode::Cross => ModeSettings {
            mode: BuildMode::Cross,
            std_flag: STD_GNU2X.to_string(),
            cflags_append: Some(CROSS_CFLAGS.to_string()),
            ldflags_append: Some(CROSS_LDFLAGS.to_string()),
            ndebug: true,
            decorate_version: false,
            notes,
        },
    }
}

/// Sanitizer instrumentation is on by default. Cross builds force it off
/// no matter what `--disable-sanitize` says; the MinGW runtime has no
/// sanitizer support.
fn resolve_sanitizer(opts: &Options) -> SanitizerSetting {
    if opts.build.is_cross() {
        SanitizerSetting {
            flags: String::new(),
            note: Some("-fsanitize disabled for cross builds".to_string()),
        }
    } else if opts.disable_sanitize {
        SanitizerSetting {
            flags: String::new(),
            note: Some(
                "-fsanitize disabled because we were generated with --disable-sanitize"
                    .to_string(),
            ),
        }
    } else {
        SanitizerSetting {
            flags: SANITIZE_FLAGS.to_string(),
            note: None,
        }
    }
}

/// `--build-native` is validated here rather than at parse time so an
/// unrecognized value degrades to a warning instead of failing the run.
fn resolve_native(opts: &Options, advisories: &mut Vec<Advisory>) -> NativeTuning {
    let tuning = |flags: &str| NativeTuning {
        flags: Some(flags.to_string()),
        note: Some(format!(
            "adding cflags for --build-native={}",
            opts.build_native
        )),
    };

    match opts.build_native.as_str() {
        "none" => NativeTuning {
            flags: None,
            note: None,
        },
        "mtune" => tuning("-mtune=native"),
        "march" => tuning("-march=native"),
        "both" => tuning("-march=native -mtune=native"),
        other => {
            let advisory = Advisory::new(format!(
                "unrecognized --build-native value \"{}\", not adding any tuning flags",
                other
            ));
            let note = advisory.comment();
            advisories.push(advisory);
            NativeTuning {
                flags: None,
                note: Some(note),
            }
        }
    }
}
