//! Signup command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use repdash_core::{SignupRequest, User, UserRole};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "REPDASH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Account role (user, admin)
    #[arg(long, default_value = "user")]
    pub role: UserRole,
}

pub async fn run(ctx: &Context, args: &SignupArgs) -> Result<()> {
    let request = SignupRequest::new(&args.email, &args.password, args.role);

    let body = ctx
        .session
        .signup(&request)
        .await
        .context("Failed to create account")?;
    let user: User = serde_json::from_value(body).context("Unexpected signup response")?;

    output::field("ID", &user.id.to_string());
    output::field("Email", &user.email);
    output::field("Role", user.role.as_str());
    output::success("Account created successfully");

    Ok(())
}
