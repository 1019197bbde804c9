//! Config subcommand handlers.

use dialoguer::Input;

use medtrack_core::DEFAULT_API_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let text = toml::to_string_pretty(&cfg).map_err(medtrack_config::ConfigError::from)?;
            output::print_output(text.trim_end(), global.quiet);

            let resolved = config::resolve_client_config(global)?;
            if !global.quiet {
                eprintln!();
                eprintln!("# resolved for this invocation");
                eprintln!("api_url = \"{}\"", resolved.base_url);
                match resolved.timeout {
                    Some(t) => eprintln!("timeout = \"{}\"", humantime::format_duration(t)),
                    None => eprintln!("timeout = none"),
                }
                eprintln!(
                    "poll_interval = \"{}\"",
                    humantime::format_duration(resolved.poll_interval)
                );
            }
            Ok(())
        }

        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let api_url = match (&global.api_url, global.yes) {
                (Some(url), _) => url.clone(),
                (None, true) => DEFAULT_API_URL.to_owned(),
                (None, false) => Input::new()
                    .with_prompt("API URL")
                    .default(DEFAULT_API_URL.to_owned())
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            config::parse_api_url(&api_url)?;

            let mut cfg = Config::starter();
            if let Some(profile) = cfg.profiles.get_mut("default") {
                profile.api_url = api_url;
                profile.timeout = global.timeout;
            }
            let written = config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Config written to {}", written.display());
            }
            Ok(())
        }
    }
}
