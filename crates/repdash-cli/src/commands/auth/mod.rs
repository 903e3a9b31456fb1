//! Auth subcommand implementations.

mod login;
mod logout;
mod refresh;
mod signup;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Cli;
use crate::context::Context;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Log in and store the session
    Login(login::LoginArgs),

    /// Register a new account
    Signup(signup::SignupArgs),

    /// Revoke the refresh token and forget the session
    Logout,

    /// Renew the access token now
    Refresh,

    /// Display the stored session
    Whoami,
}

pub async fn handle(cli: &Cli, cmd: &AuthCommand) -> Result<()> {
    let ctx = Context::load(cli)?;
    match &cmd.command {
        AuthSubcommand::Login(args) => login::run(&ctx, args).await,
        AuthSubcommand::Signup(args) => signup::run(&ctx, args).await,
        AuthSubcommand::Logout => logout::run(&ctx).await,
        AuthSubcommand::Refresh => refresh::run(&ctx).await,
        AuthSubcommand::Whoami => whoami::run(&ctx, cli),
    }
}
