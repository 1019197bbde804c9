//! Collection CRUD command handlers.

use medtrack_core::{CREATED_WITHOUT_ID, CollectionClient, CoreError};

use crate::cli::{GlobalOpts, PayloadArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn list(
    client: &CollectionClient,
    collection: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let docs = client.list(collection).await.map_err(CoreError::from)?;
    if docs.is_empty() && !global.quiet {
        eprintln!("No documents in '{collection}'");
    }
    let out = output::render_documents(&global.output, &docs)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn get(
    client: &CollectionClient,
    collection: &str,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let doc = client
        .get(collection, id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CliError::NotFound {
            collection: collection.into(),
            id: id.into(),
        })?;
    let out = output::render_document(&global.output, &doc)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn create(
    client: &CollectionClient,
    collection: &str,
    payload: &PayloadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let fields = util::read_payload(payload)?;
    let id = client
        .create(collection, &fields)
        .await
        .map_err(CoreError::from)?;

    if id == CREATED_WITHOUT_ID {
        if !global.quiet {
            eprintln!("Created in '{collection}' (server returned no id)");
        }
        return Ok(());
    }
    let out = output::render_created(&global.output, &id)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn update(
    client: &CollectionClient,
    collection: &str,
    id: &str,
    payload: &PayloadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let fields = util::read_payload(payload)?;
    client
        .update(collection, id, &fields)
        .await
        .map_err(|e| not_found_or(e, collection, id))?;
    if !global.quiet {
        eprintln!("Updated {collection}/{id}");
    }
    Ok(())
}

pub async fn delete(
    client: &CollectionClient,
    collection: &str,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm(
        &format!("Delete '{id}' from '{collection}'?"),
        "delete",
        global.yes,
    )? {
        return Ok(());
    }
    client
        .delete(collection, id)
        .await
        .map_err(|e| not_found_or(e, collection, id))?;
    if !global.quiet {
        eprintln!("Deleted {collection}/{id}");
    }
    Ok(())
}

fn not_found_or(err: medtrack_core::ApiError, collection: &str, id: &str) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    } else {
        CoreError::from(err).into()
    }
}
