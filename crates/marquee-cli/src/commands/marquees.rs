use anyhow::anyhow;
use marquee_api_models::Marquee;
use marquee_client::{
    DeleteAction, EntityKind, FetchOutcome, MarqueeBoard, MarqueeForm, Review, UnauthorizedPolicy,
    load_entity, review_marquee, update_marquee,
};

use crate::cli::{IdArgs, MarqueeListArgs, MarqueeUpdateArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_marquee_detail, render_marquee_list, status_label};

pub(crate) async fn handle_marquee_list(
    ctx: &AppContext,
    args: MarqueeListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let mut board = MarqueeBoard::new(ctx.client.clone());
    board.set_filter(args.status);
    match board.refresh().await {
        FetchOutcome::Applied => render_marquee_list(&board.visible(), format),
        outcome => Err(board.snapshot().error.map_or_else(
            || CliError::failure(anyhow!("marquee list not loaded ({outcome:?})")),
            CliError::from,
        )),
    }
}

pub(crate) async fn handle_marquee_get(
    ctx: &AppContext,
    args: IdArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let marquee: Marquee = load_entity(&ctx.client, &args.id).await?;
    render_marquee_detail(&marquee, format)
}

pub(crate) async fn handle_marquee_update(
    ctx: &AppContext,
    args: MarqueeUpdateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let current: Marquee = load_entity(&ctx.client, &args.id).await?;
    let mut form = MarqueeForm::from_marquee(&current);
    apply_overrides(&mut form, args);

    let updated = update_marquee(&ctx.client, &form, UnauthorizedPolicy::Expire).await?;
    println!("Marquee updated successfully");
    render_marquee_detail(&updated, format)
}

pub(crate) async fn handle_marquee_delete(ctx: &AppContext, args: IdArgs) -> CliResult<()> {
    let notice = DeleteAction::new(EntityKind::Marquee)
        .run(&ctx.client, &args.id, |_| {})
        .await?;
    println!("{notice}");
    Ok(())
}

pub(crate) async fn handle_marquee_review(
    ctx: &AppContext,
    args: IdArgs,
    review: Review,
) -> CliResult<()> {
    let marquee =
        review_marquee(&ctx.client, &args.id, review, UnauthorizedPolicy::Expire).await?;
    println!("Marquee {} is now {}", marquee.id, status_label(&marquee));
    Ok(())
}

fn apply_overrides(form: &mut MarqueeForm, args: MarqueeUpdateArgs) {
    let text_fields = [
        (&mut form.name, args.name),
        (&mut form.description, args.description),
        (&mut form.address, args.address),
        (&mut form.city, args.city),
        (&mut form.state, args.state),
        (&mut form.country, args.country),
        (&mut form.capacity, args.capacity),
        (&mut form.per_hour, args.per_hour),
        (&mut form.per_day, args.per_day),
    ];
    for (slot, value) in text_fields {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(status) = args.status {
        form.booking_status = status;
    }
}
