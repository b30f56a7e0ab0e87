//! wafguard - run the admission and retention handlers from the command line.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    wafguard_cli::run().await
}
