//! Logout command implementation.

use anyhow::{Context as _, Result};

use crate::context::Context;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    let outcome = ctx
        .session
        .logout()
        .await
        .context("Failed to clear stored session")?;

    if let Some(reason) = outcome.non_fatal_error() {
        output::warning(&format!("Server was not notified: {}", reason));
    }
    output::success("Logged out");

    Ok(())
}
