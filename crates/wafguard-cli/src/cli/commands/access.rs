//! `wafguard access` - admit the source of a request event.

use anyhow::Result;
use wafguard::AccessHandler;
use wafguard_core::AccessEvent;

use super::{read_event, Context};
use crate::cli::args::EventArgs;
use crate::output;

pub async fn execute(ctx: Context, args: EventArgs) -> Result<()> {
    let event: AccessEvent = read_event(&args.event).await?;
    let handler = AccessHandler::from_config(&ctx.config)?;

    let response = handler.handle(&event).await?;
    println!("{}", output::access(ctx.output_format, &response)?);
    Ok(())
}
