//! Login command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use colored::Colorize;

use repdash_core::Credentials;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "REPDASH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(ctx: &Context, args: &LoginArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    ctx.session
        .login(&credentials)
        .await
        .context("Failed to login")?;

    if !ctx.session.is_authenticated() {
        bail!("Login response did not contain an access token");
    }

    output::success("Logged in successfully");
    println!();
    output::field("Email", &args.email);
    if let Some(claims) = ctx.session.claims() {
        output::field("Expires", &output::timestamp(claims.exp));
    }

    Ok(())
}
