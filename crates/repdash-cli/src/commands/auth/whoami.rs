//! Whoami command implementation.

use anyhow::{Result, bail};

use crate::cli::Cli;
use crate::context::Context;
use crate::output;

pub fn run(ctx: &Context, cli: &Cli) -> Result<()> {
    if !ctx.session.is_authenticated() {
        bail!("No active session. Run 'repdash auth login' first.");
    }

    output::field("API", &cli.api_url);
    match ctx.session.claims() {
        Some(claims) => output::field("Expires", &output::timestamp(claims.exp)),
        None => output::field("Expires", "unknown"),
    }
    let refresh = if ctx.session.refresh_token().is_some() {
        "stored"
    } else {
        "none"
    };
    output::field("Refresh token", refresh);

    Ok(())
}
