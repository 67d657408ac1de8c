use segfit::{Heap, HeapConfig, Trace};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

// Replays each trace file on a fresh heap and prints how well it was packed.
//
//     replay [--no-check] <trace>...
//
// Set RUST_LOG=segfit=trace to see every heap operation.
fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).compact().init();

    let mut config = HeapConfig::default();
    let mut paths = vec![];

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-check" => config.check_on_replay = false,
            _ => paths.push(arg),
        }
    }

    if paths.is_empty() {
        eprintln!("usage: replay [--no-check] <trace>...");
        return ExitCode::FAILURE;
    }

    let mut failed = false;

    for path in &paths {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                error!(%path, %err, "could not read trace");
                failed = true;
                continue;
            }
        };

        let mut heap = match Heap::with_config(config) {
            Ok(heap) => heap,
            Err(err) => {
                error!(%err, "could not set up the heap");
                return ExitCode::FAILURE;
            }
        };

        let result = Trace::parse(&text).and_then(|trace| trace.replay(&mut heap));

        match result {
            Ok(stats) => {
                info!(%path, ops = stats.ops, heap_size = stats.heap_size, "replayed");
                println!(
                    "{:<32} {:>6} ops  {:>10} bytes  {:>5.1}% util",
                    path,
                    stats.ops,
                    stats.heap_size,
                    stats.utilization * 100.0
                );
            }
            Err(err) => {
                error!(%path, line = err.line(), %err, "replay failed");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
