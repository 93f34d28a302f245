//! Generation entry point - resolve, evaluate targets, emit, write.
//!
//! The library stays pure up to this point; this module owns the side
//! effects (logging, timestamps, the output file) so everything under it
//! can be tested without touching the filesystem.

use std::env;
use std::io::Write as _;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::Options;
use crate::emit::emit;
use crate::resolve::{resolve, BuildConfig};
use crate::targets::{resolve_targets, TargetSet};

/// Reproducibility metadata embedded in the output header.
#[derive(Debug, Clone)]
pub struct GenerateMeta {
    /// The argument vector the generator ran with (program name excluded).
    pub argv: Vec<String>,
    /// Human-readable generation time.
    pub timestamp: String,
}

impl GenerateMeta {
    /// Capture the real argv and the current wall-clock time.
    pub fn capture() -> Self {
        GenerateMeta {
            argv: env::args().skip(1).collect(),
            timestamp: utc_timestamp(SystemTime::now()),
        }
    }
}

/// Run the full pipeline and write the build graph to `output`.
///
/// Advisories are logged here, once, in resolution order; the emitter
/// mirrors each one as a comment near the decision it belongs to.
pub fn generate(opts: &Options, output: &Path, meta: &GenerateMeta) -> Result<()> {
    let config = resolve(opts);
    let targets = resolve_targets(opts, config.mode.mode);

    for advisory in config.advisories.iter().chain(&targets.advisories) {
        warn!("{}", advisory);
    }

    let mut buf = Vec::new();
    emit(&mut buf, &config, &targets, meta).context("failed to serialize the build graph")?;
    write_atomic(output, &buf)?;

    info!("wrote {}", output.display());
    Ok(())
}

#[derive(Serialize)]
struct ConfigDump<'a> {
    config: &'a BuildConfig,
    targets: &'a TargetSet,
}

/// Resolve and render the configuration as pretty JSON, without writing
/// any build file. Backs `configure --dump-config`.
pub fn dump_config(opts: &Options) -> Result<String> {
    let config = resolve(opts);
    let targets = resolve_targets(opts, config.mode.mode);

    for advisory in config.advisories.iter().chain(&targets.advisories) {
        warn!("{}", advisory);
    }

    serde_json::to_string_pretty(&ConfigDump {
        config: &config,
        targets: &targets,
    })
    .context("failed to serialize the resolved configuration")
}

/// Write the whole graph in one step so a failed run never leaves a
/// partial file referencing undefined identifiers.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    tmp.write_all(bytes).context("failed to write the build graph")?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

/// Format a time as `YYYY-MM-DD HH:MM:SS UTC`.
fn utc_timestamp(now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let days = secs.div_euclid(86_400);
    let tod = secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year,
        month,
        day,
        tod / 3_600,
        (tod % 3_600) / 60,
        tod % 60
    )
}

/// Gregorian date from days since the Unix epoch.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);

    (year, month, day)
}
