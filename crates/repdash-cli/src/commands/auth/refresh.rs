//! Refresh command implementation.

use anyhow::{Context as _, Result, bail};

use crate::context::Context;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    let before = ctx.session.access_token();

    ctx.session
        .refresh()
        .await
        .context("Failed to refresh session")?
        .context("No refresh token stored. Run 'repdash auth login' first.")?;

    let after = ctx.session.access_token();
    if after.as_ref().map(|t| t.as_str()) == before.as_ref().map(|t| t.as_str()) {
        bail!("The server did not issue a new access token");
    }

    output::success("Session refreshed");
    if let Some(claims) = ctx.session.claims() {
        output::field("Expires", &output::timestamp(claims.exp));
    }

    Ok(())
}
