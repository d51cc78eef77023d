//! Check or fix rundata across a featureprofiles test tree.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, error, info};

use addrundata::{Exclusions, NON_TEST_READMES, TestSuite, WriteOutcome};
use fpkit_common::{LogFormat, LoggingConfig, init_tracing};

/// Rundata checker and fixer
#[derive(Parser, Debug)]
#[command(name = "addrundata")]
#[command(about = "Check or fix test rundata (README heading and metadata.textproto)")]
struct Args {
    /// Root of the feature tree
    #[arg(long, default_value = "feature")]
    feature_root: PathBuf,

    /// Rewrite metadata.textproto files with fixed rundata instead of checking
    #[arg(long)]
    fix: bool,

    /// Exclusion list, relative to the parent of the feature root
    #[arg(long, default_value = NON_TEST_READMES)]
    non_test_readmes: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: LogFormat,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&LoggingConfig {
        level: args.log_level.clone(),
        format: args.log_format,
    })?;

    let base = args.feature_root.parent().unwrap_or(Path::new(""));
    let exclusions = Exclusions::load(base, &args.non_test_readmes)?;
    if !exclusions.is_empty() {
        debug!("Skipping {} non-test READMEs", exclusions.len());
    }

    let mut suite = TestSuite::new();
    let mut ok = suite.read(&args.feature_root, &exclusions)?.is_ok();
    info!("Found {} tests under {}", suite.len(), args.feature_root.display());

    if args.fix {
        if suite.fix().is_ok() {
            match suite.write() {
                WriteOutcome::Unchanged => info!("All rundata is up to date"),
                WriteOutcome::Updated(dirs) => info!("Updated rundata of {} tests", dirs.len()),
                WriteOutcome::Failed(e) => {
                    error!("Could not write rundata: {}", e);
                    ok = false;
                }
            }
        } else {
            ok = false;
        }
    } else {
        ok &= suite.check().is_ok();
    }

    if !ok {
        anyhow::bail!("rundata problems found under {}", args.feature_root.display());
    }
    Ok(())
}
