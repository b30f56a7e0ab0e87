//! `wafguard retention` - record retention for a set-mutation notification.

use anyhow::Result;
use wafguard::RetentionHandler;
use wafguard_core::MutationEnvelope;

use super::{read_event, Context};
use crate::cli::args::EventArgs;
use crate::output;

pub async fn execute(ctx: Context, args: EventArgs) -> Result<()> {
    let envelope: MutationEnvelope = read_event(&args.event).await?;
    let handler = RetentionHandler::from_config(&ctx.config)?;

    let outcome = handler.handle(&envelope).await?;
    println!("{}", output::retention(ctx.output_format, &outcome)?);
    Ok(())
}
