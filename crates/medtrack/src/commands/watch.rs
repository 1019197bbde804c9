//! `watch`: follow a collection through a realtime binding.

use std::time::Duration;

use owo_colors::OwoColorize;
use tracing::debug;

use medtrack_core::{ClientConfig, CollectionBinding, CollectionClient, PollingManager, ViewState};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: CollectionClient,
    config: &ClientConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = args
        .interval_ms
        .map_or(config.poll_interval, Duration::from_millis);
    if interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval-ms".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!(
            "Watching '{}' every {} (Ctrl-C to stop)",
            args.collection,
            humantime::format_duration(interval)
        );
    }

    let mut binding = CollectionBinding::new(PollingManager::new(client), args.collection, true)
        .with_interval(interval);
    let mut view = binding.watch();
    binding.mount().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut shown = 0usize;
    loop {
        tokio::select! {
            changed = view.changed() => {
                let Some(state) = changed else { break };
                if state.loading {
                    continue;
                }
                shown += 1;
                print_snapshot(&state, shown, color, global)?;
                if args.count.is_some_and(|n| shown >= n) {
                    break;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    if let Some(sub) = binding.subscription() {
        let stats = sub.stats();
        debug!(
            issued = stats.issued,
            delivered = stats.delivered,
            failed = stats.failed,
            "watch finished"
        );
    }
    binding.unmount();
    Ok(())
}

fn print_snapshot(
    state: &ViewState,
    seq: usize,
    color: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !global.quiet {
        let header = format!(
            "── #{seq} at {} · {} document(s) ──",
            chrono::Local::now().format("%H:%M:%S"),
            state.data.len()
        );
        if color {
            eprintln!("{}", header.bold().cyan());
        } else {
            eprintln!("{header}");
        }
    }
    let out = output::render_documents(&global.output, &state.data)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
