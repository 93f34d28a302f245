//! CLI definitions using clap.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use hash_configure::config::{BuildMode, Options};

/// Generate the build.ninja file for the hash library
#[derive(Parser)]
#[command(name = "configure")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Override compiler flags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cflags: Option<String>,

    /// Override cc
    #[arg(long, value_name = "CC")]
    pub cc: Option<String>,

    /// Override ar
    #[arg(long, value_name = "AR")]
    pub ar: Option<String>,

    /// Override compiler flags when linking
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Set the build type
    #[arg(long, value_name = "MODE", default_value_t = BuildMode::Debug,
          value_parser = BuildMode::from_str)]
    pub build: BuildMode,

    /// Build with mtune=native or march=native (none, mtune, march, both)
    #[arg(long, value_name = "MODE", default_value = "none")]
    pub build_native: String,

    /// Build releases with -O3
    #[arg(long = "O3", alias = "o3")]
    pub o3: bool,

    /// Don't build hash.a
    #[arg(long)]
    pub disable_static_library: bool,

    /// Don't build a specific target
    #[arg(long, value_name = "TOOL")]
    pub disable_tool: Vec<String>,

    /// Compile with -DHASH_STATISTICS
    #[arg(long)]
    pub enable_hash_statistics: bool,

    /// Compile with -DHASH_NO_WARNINGS
    #[arg(long)]
    pub disable_hash_warnings: bool,

    /// Don't enable the sanitizer in debug mode
    #[arg(long)]
    pub disable_sanitize: bool,

    /// Override the version string
    #[arg(long, value_name = "STRING")]
    pub force_version: Option<String>,

    /// Append a suffix to the version string
    #[arg(long, value_name = "SUFFIX")]
    pub add_version_suffix: Option<String>,

    /// Where to write the generated build file
    #[arg(short, long, default_value = "build.ninja")]
    pub output: PathBuf,

    /// Print the resolved configuration as JSON instead of writing a file
    #[arg(long)]
    pub dump_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Convert the parsed arguments into the immutable library option set.
    pub fn into_options(self) -> (Options, PathBuf, bool) {
        let options = Options {
            cflags: self.cflags,
            cc: self.cc,
            ar: self.ar,
            ldflags: self.ldflags,
            build: self.build,
            build_native: self.build_native,
            o3: self.o3,
            disable_static_library: self.disable_static_library,
            disable_tool: self.disable_tool,
            enable_hash_statistics: self.enable_hash_statistics,
            disable_hash_warnings: self.disable_hash_warnings,
            disable_sanitize: self.disable_sanitize,
            force_version: self.force_version,
            add_version_suffix: self.add_version_suffix,
            cc_env_present: std::env::var_os("CC").is_some(),
        };

        (options, self.output, self.dump_config)
    }
}
