//! `check`: startup connectivity probe.

use std::time::{Duration, Instant};

use owo_colors::OwoColorize;

use medtrack_core::{CollectionClient, CoreError};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &CollectionClient, global: &GlobalOpts) -> Result<(), CliError> {
    let started = Instant::now();
    client.ping().await.map_err(CoreError::from)?;
    let millis = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let elapsed = Duration::from_millis(millis);

    if !global.quiet {
        let mark = if output::should_color(&global.color) {
            "✓".green().to_string()
        } else {
            "✓".to_owned()
        };
        println!(
            "{mark} API reachable at {} ({})",
            client.base_url(),
            humantime::format_duration(elapsed)
        );
    }
    Ok(())
}
