use marquee_client::{Editable, load_entity};
use serde::Serialize;

use crate::cli::{EntityUpdateArgs, IdArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_entity;

pub(crate) async fn handle_entity_get<T>(
    ctx: &AppContext,
    args: IdArgs,
    format: OutputFormat,
) -> CliResult<()>
where
    T: Editable + Serialize,
{
    let entity: T = load_entity(&ctx.client, &args.id).await?;
    render_entity(&entity, format)
}

/// Load the entity, apply `--set` assignments to its form, submit, and render
/// the copy the server stored.
pub(crate) async fn handle_entity_update<T>(
    ctx: &AppContext,
    args: EntityUpdateArgs,
    format: OutputFormat,
) -> CliResult<()>
where
    T: Editable + Serialize,
{
    if args.assignments.is_empty() {
        return Err(CliError::validation(
            "nothing to update (pass at least one --set field=value)",
        ));
    }
    let entity: T = load_entity(&ctx.client, &args.id).await?;
    let mut form = entity.update_form();
    for (field, value) in args.assignments {
        form.set(&field, value)?;
    }
    let (saved, notice) = form.submit::<T>(&ctx.client).await?;
    println!("{notice}");
    render_entity(&saved, format)
}
