//! Build graph emission.
//!
//! Serializes a resolved [`BuildConfig`] plus the evaluated [`TargetSet`]
//! into ninja syntax in a single pass. Ordering is the whole contract
//! here: every variable and rule is declared before anything references
//! it, mode and feature mutations appear between the base defaults and
//! the final overrides, and the version define is always the last
//! mutation of `$defines`.

use std::io::{self, Write};

use crate::generate::GenerateMeta;
use crate::ninja::{NinjaWriter, Rule};
use crate::resolve::{BuildConfig, VersionSpec, DESCRIBE_EXPR};
use crate::targets::{TargetSet, RULE_ARCHIVE, RULE_BIN, RULE_COMPILE, SOURCES};

const COMPILE_COMMAND: &str =
    "$cc $std $includes -MMD -MF $out.d $defines $cflags $in -c -o $out";
const LINK_COMMAND: &str =
    "$cc $std $includes -MMD -MF $out.d $defines $cflags $in -o $out $ldflags $libs";
const ARCHIVE_COMMAND: &str = "$ar rcs $out $in $arflags";

/// Write the complete build graph to `out`.
pub fn emit<W: Write>(
    out: W,
    config: &BuildConfig,
    targets: &TargetSet,
    meta: &GenerateMeta,
) -> io::Result<()> {
    let mut w = NinjaWriter::new(out);

    // preamble: when and how this file came to be
    w.comment(&format!(
        "we were generated by configure on {}",
        meta.timestamp
    ))?;
    w.comment(&format!("arguments: {:?}", meta.argv))?;
    w.newline()?;

    // base version and output directory
    match &config.version {
        VersionSpec::Forced { value } => {
            w.comment(&format!(
                "the following version was set at generation by --force-version={}",
                value
            ))?;
            w.variable("version", value)?;
        }
        VersionSpec::Deferred => {
            w.variable("version", DESCRIBE_EXPR)?;
        }
    }
    w.variable("builddir", &config.build_dir)?;
    w.newline()?;

    // toolchain executables
    if let Some(note) = &config.cc_env_note {
        w.comment(note)?;
    }
    if let Some(note) = &config.cc.note {
        w.comment(note)?;
    }
    w.variable("cc", &config.cc.value)?;
    if let Some(note) = &config.ar.note {
        w.comment(note)?;
    }
    w.variable("ar", &config.ar.value)?;
    w.newline()?;

    // flag defaults; the override pass near the end replaces these
    if let Some(cflags) = &config.cflags_override {
        w.comment(&format!(
            "these are overridden below because we were generated with --cflags={}",
            cflags
        ))?;
    }
    w.variable("cflags", &config.base_cflags)?;
    if let Some(ldflags) = &config.ldflags_override {
        w.comment(&format!(
            "these are overridden below because we were generated with --ldflags={}",
            ldflags
        ))?;
    }
    w.variable("ldflags", &config.base_ldflags)?;
    w.variable("defines", "")?;
    w.variable("arflags", "")?;
    w.newline()?;

    // native architecture tuning
    if let Some(note) = &config.native.note {
        w.comment(note)?;
    }
    if let Some(flags) = &config.native.flags {
        w.variable("cflags", &format!("$cflags {}", flags))?;
    }
    if config.native.note.is_some() || config.native.flags.is_some() {
        w.newline()?;
    }

    // sanitizer; referenced by the debug mode block below
    if let Some(note) = &config.sanitizer.note {
        w.comment(note)?;
    }
    w.variable("sanflags", &config.sanitizer.flags)?;
    w.newline()?;

    w.variable("includes", &config.includes)?;
    w.newline()?;

    // build mode block
    w.comment(&format!("build mode: {}", config.mode.mode))?;
    if !config.argp_enabled {
        w.comment("(cross builds disable argp argument parsing)")?;
    }
    w.variable("std", &config.mode.std_flag)?;
    for note in &config.mode.notes {
        w.comment(note)?;
    }
    if let Some(append) = &config.mode.cflags_append {
        w.variable("cflags", &format!("$cflags {}", append))?;
    }
    if let Some(append) = &config.mode.ldflags_append {
        w.variable("ldflags", &format!("$ldflags {}", append))?;
    }
    if config.mode.ndebug {
        w.variable("defines", "$defines -DNDEBUG")?;
    }
    if config.mode.decorate_version {
        match &config.version {
            VersionSpec::Deferred => {
                w.variable("version", "\"$version\"-debug")?;
            }
            VersionSpec::Forced { .. } => {
                w.comment("not appending -debug because we were generated with --force-version=")?;
            }
        }
    }
    w.newline()?;

    // feature toggle defines
    for feature in &config.feature_defines {
        w.comment(&feature.note)?;
        w.variable("defines", &format!("$defines {}", feature.define))?;
        w.newline()?;
    }

    // final override pass and the optional version suffix
    let mut overrides_written = false;
    if let Some(cflags) = &config.cflags_override {
        w.variable("cflags", cflags)?;
        overrides_written = true;
    }
    if let Some(ldflags) = &config.ldflags_override {
        w.variable("ldflags", ldflags)?;
        overrides_written = true;
    }
    if let Some(suffix) = &config.version_suffix {
        w.variable("version", &format!("\"$version\"-{}", suffix))?;
        overrides_written = true;
    }
    if overrides_written {
        w.newline()?;
    }

    // the version define, always present and always last
    w.variable("defines", "$defines -DVERSION=\"\\\"$version\\\"\"")?;
    w.newline()?;

    // rules
    w.rule(&Rule::new(RULE_COMPILE, COMPILE_COMMAND).deps("gcc").depfile("$out.d"))?;
    w.newline()?;
    w.rule(&Rule::new(RULE_BIN, LINK_COMMAND).deps("gcc").depfile("$out.d"))?;
    w.newline()?;
    w.rule(&Rule::new(RULE_ARCHIVE, ARCHIVE_COMMAND))?;
    w.newline()?;

    // one compile edge per translation unit
    for &(source, object) in SOURCES {
        w.build(&[object], RULE_COMPILE, &[source], &[])?;
    }
    w.newline()?;

    // disable requests that matched nothing
    for advisory in &targets.advisories {
        w.comment(&advisory.comment())?;
        w.newline()?;
    }

    // target edges, or the reasons there is none
    for target in &targets.targets {
        if target.enabled() {
            let inputs: Vec<&str> = target.inputs.iter().map(String::as_str).collect();
            let variables: Vec<(&str, &str)> = target
                .variables
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            w.build(&[target.name.as_str()], &target.rule, &inputs, &variables)?;
        } else if let [reason] = target.disabled_because.as_slice() {
            w.comment(&format!("{} is disabled because {}", target.name, reason))?;
        } else {
            w.comment(&format!("{} is disabled because:", target.name))?;
            for reason in &target.disabled_because {
                w.comment(&format!(" - {}", reason))?;
            }
        }
        w.newline()?;
    }

    // aggregates and the default target
    let tools = targets.enabled_tools();
    if tools.is_empty() {
        w.comment("NOTE: no tools target because there are no enabled tools")?;
    } else {
        w.phony("tools", &tools)?;
    }
    w.newline()?;

    w.phony("all", &targets.enabled_all())?;
    w.newline()?;

    w.default("all")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildMode, Options};
    use crate::resolve::resolve;
    use crate::targets::resolve_targets;

    fn render(opts: &Options) -> String {
        let config = resolve(opts);
        let targets = resolve_targets(opts, config.mode.mode);
        let meta = GenerateMeta {
            argv: vec!["--rendered".to_string(), "--for=tests".to_string()],
            timestamp: "2026-01-01 00:00:00 UTC".to_string(),
        };
        let mut buf = Vec::new();
        emit(&mut buf, &config, &targets, &meta).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn line_index(output: &str, needle: &str) -> usize {
        output
            .lines()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("missing line containing `{}`:\n{}", needle, output))
    }

    #[test]
    fn test_default_debug_output() {
        let output = render(&Options::default());

        assert!(output.contains("version = $$(git describe --always --dirty)"));
        assert!(output.contains("builddir = out"));
        assert!(output.contains("cc = gcc\n"));
        assert!(output.contains("ar = gcc-ar\n"));
        assert!(output.contains("# build mode: debug"));
        assert!(output.contains("cflags = $cflags $sanflags -g -Og"));
        assert!(output.contains("version = \"$version\"-debug"));
        assert!(output.contains("sanflags = -fsanitize=address,undefined"));
        assert!(output.contains("defines = $defines -DVERSION=\"\\\"$version\\\"\""));
        assert!(!output.contains("-DNDEBUG"));
        assert!(output.ends_with("default all\n"));
    }

    #[test]
    fn test_definition_before_use_ordering() {
        let output = render(&Options::default());

        // variables land before the mode block that references them
        assert!(line_index(&output, "sanflags =") < line_index(&output, "$sanflags"));
        assert!(line_index(&output, "cflags = -Wall") < line_index(&output, "$cflags"));
        assert!(line_index(&output, "version = $$(git") < line_index(&output, "\"$version\"-debug"));

        // rules land before the edges that invoke them, edges before phonies
        assert!(line_index(&output, "rule cc") < line_index(&output, "build $builddir/hash.o: cc"));
        assert!(line_index(&output, "rule bin") < line_index(&output, "build test: bin"));
        assert!(
            line_index(&output, "rule static-library")
                < line_index(&output, "build hash.a: static-library")
        );
        assert!(line_index(&output, "build test: bin") < line_index(&output, "build tools: phony"));

        // the version define is the last defines mutation
        let last_defines = output
            .lines()
            .enumerate()
            .filter(|(_, l)| l.starts_with("defines = "))
            .map(|(i, _)| i)
            .max()
            .unwrap();
        assert_eq!(last_defines, line_index(&output, "-DVERSION="));

        // the default declaration closes the file
        assert_eq!(output.lines().last().unwrap(), "default all");
    }

    #[test]
    fn test_release_with_o3() {
        let opts = Options {
            build: BuildMode::Release,
            o3: true,
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# setting -O3 because we were generated with --O3"));
        assert!(output.contains("cflags = $cflags -O3"));
        assert!(!output.contains("cflags = $cflags -O2"));
        assert!(output.contains("defines = $defines -DNDEBUG"));
    }

    #[test]
    fn test_o3_in_debug_is_commented_and_ignored() {
        let opts = Options {
            o3: true,
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# WARNING: ignoring option --O3 for debug build"));
        assert!(output.contains("cflags = $cflags $sanflags -g -Og"));
        assert!(!output.contains("-O3\n"));
    }

    #[test]
    fn test_cross_output() {
        let opts = Options {
            build: BuildMode::Cross,
            disable_sanitize: true,
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("cc = x86_64-w64-mingw32-gcc\n"));
        assert!(output.contains("ar = x86_64-w64-mingw32-gcc-ar\n"));
        assert!(output.contains("# -fsanitize disabled for cross builds"));
        assert!(output.contains("sanflags =\n"));
        assert!(output.contains("# (cross builds disable argp argument parsing)"));
        assert!(output.contains("build test.exe: bin"));
        assert!(output.contains("build hash.a.exe: static-library"));
        assert!(output.contains("build tools: phony test.exe reuse_test.exe"));
    }

    #[test]
    fn test_forced_version_with_suffix() {
        let opts = Options {
            force_version: Some("2.0".to_string()),
            add_version_suffix: Some("rc1".to_string()),
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# the following version was set at generation by --force-version=2.0"));
        assert!(output.contains("version = 2.0\n"));
        assert!(output.contains("# not appending -debug because we were generated with --force-version="));
        assert!(output.contains("version = \"$version\"-rc1"));
        assert!(!output.contains("git describe"));
    }

    #[test]
    fn test_flag_overrides_replace_at_the_end() {
        let opts = Options {
            cflags: Some("-Os".to_string()),
            ldflags: Some("-s".to_string()),
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output
            .contains("# these are overridden below because we were generated with --cflags=-Os"));
        assert!(output
            .contains("# these are overridden below because we were generated with --ldflags=-s"));

        // the last assignments win and come after every computed mutation
        assert!(line_index(&output, "cflags = $cflags $sanflags") < line_index(&output, "cflags = -Os"));
        assert!(line_index(&output, "cflags = -Os") < line_index(&output, "-DVERSION="));
        assert!(output.contains("ldflags = -s\n"));
    }

    #[test]
    fn test_disabled_target_single_reason() {
        let opts = Options {
            disable_tool: vec!["test".to_string()],
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# test is disabled because we were generated with --disable-tool=test"));
        assert!(!output.contains("build test: bin"));
        assert!(output.contains("build reuse_test: bin"));
        assert!(output.contains("build tools: phony reuse_test\n"));
    }

    #[test]
    fn test_disabled_target_lists_every_reason() {
        let opts = Options {
            disable_static_library: true,
            disable_tool: vec!["hash.a".to_string()],
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# hash.a is disabled because:"));
        assert!(output.contains("#  - we were generated with --disable-tool=hash.a"));
        assert!(output.contains("#  - we were generated with --disable-static-library"));
        assert!(!output.contains("build hash.a: static-library"));
    }

    #[test]
    fn test_no_tools_comment_when_all_tools_disabled() {
        let opts = Options {
            disable_tool: vec!["test".to_string(), "reuse_test".to_string()],
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# NOTE: no tools target because there are no enabled tools"));
        assert!(!output.contains("build tools: phony"));
        assert!(output.contains("build all: phony hash.a\n"));
    }

    #[test]
    fn test_feature_defines_between_mode_and_overrides() {
        let opts = Options {
            enable_hash_statistics: true,
            disable_hash_warnings: true,
            cflags: Some("-Os".to_string()),
            ..Options::default()
        };
        let output = render(&opts);

        let statistics = line_index(&output, "defines = $defines -DHASH_STATISTICS");
        let warnings = line_index(&output, "defines = $defines -DHASH_NO_WARNINGS");
        assert!(line_index(&output, "# build mode: debug") < statistics);
        assert!(statistics < warnings);
        assert!(warnings < line_index(&output, "cflags = -Os"));
    }

    #[test]
    fn test_unknown_disable_tool_comment() {
        let opts = Options {
            disable_tool: vec!["frobnicate".to_string()],
            ..Options::default()
        };
        let output = render(&opts);

        assert!(output.contains("# WARNING: ignoring --disable-tool=frobnicate"));
        assert!(output.contains("build test: bin"));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let opts = Options {
            build: BuildMode::Release,
            enable_hash_statistics: true,
            ..Options::default()
        };
        assert_eq!(render(&opts), render(&opts));
    }
}
