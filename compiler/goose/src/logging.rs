//! Tracing subscriber setup.
//!
//! The filter comes from `GOOSE_LOG`, then `RUST_LOG`. With `--trace` the
//! output is an indented tree of evaluator spans instead of flat lines.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Filter used when neither variable is set.
fn default_directives(trace: bool) -> &'static str {
    if trace {
        "goose_eval=trace"
    } else {
        "warn"
    }
}

fn filter(trace: bool) -> EnvFilter {
    let directives = std::env::var("GOOSE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_directives(trace).to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|err| {
        eprintln!("warning: ignoring invalid log filter {directives:?}: {err}");
        EnvFilter::new(default_directives(trace))
    })
}

pub fn init(trace: bool) {
    let registry = tracing_subscriber::registry().with(filter(trace));
    let result = if trace {
        registry
            .with(
                HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_indent_lines(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("warning: logging disabled: {err}");
    }
}
