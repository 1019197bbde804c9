//! Command dispatch: bridges CLI args -> core client / bindings -> output formatting.

pub mod check;
pub mod collections;
pub mod config_cmd;
pub mod util;
pub mod watch;

use medtrack_core::ClientConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: &ClientConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = config.build_client()?;
    match cmd {
        Command::List { collection } => collections::list(&client, &collection, global).await,
        Command::Get { collection, id } => {
            collections::get(&client, &collection, &id, global).await
        }
        Command::Create {
            collection,
            payload,
        } => collections::create(&client, &collection, &payload, global).await,
        Command::Update {
            collection,
            id,
            payload,
        } => collections::update(&client, &collection, &id, &payload, global).await,
        Command::Delete { collection, id } => {
            collections::delete(&client, &collection, &id, global).await
        }
        Command::Watch(args) => watch::handle(client, config, args, global).await,
        Command::Check => check::handle(&client, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to API dispatch".into(),
        )),
    }
}
