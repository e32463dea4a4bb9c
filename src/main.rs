//! Multi-call launcher for the bundled demo entry points.
//!
//! `entrypoint-demo <entry-name> [args...]` runs one entry point with the
//! remaining arguments; without a known name it lists what is available.

use entrypoint::demos::Demos;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Usage errors use the same status entry points do
const USAGE_ERROR: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    // e.g. RUST_LOG=entrypoint=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let demos = Demos::build()?;
    let mut args = std::env::args().skip(1);
    let requested = args.next();

    match requested.as_deref().and_then(|name| demos.get(name)) {
        Some(entrypoint) => entrypoint.invoke(Some(args.collect())),
        None => {
            let mut err = std::io::stderr().lock();
            writeln!(err, "usage: entrypoint-demo <entry-name> [args...]")?;
            if let Some(name) = requested {
                writeln!(err, "entrypoint-demo: error: unknown entry point `{}`", name)?;
            }
            writeln!(err, "\navailable entry points:")?;
            for name in demos.names() {
                writeln!(err, "  {}", name)?;
            }
            Ok(ExitCode::from(USAGE_ERROR))
        }
    }
}
