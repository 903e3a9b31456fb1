//! Column subcommand implementations.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use repdash_core::ReportService;
use repdash_core::report::{ColumnPatch, NewColumn, ReportStatus};

use crate::cli::Cli;
use crate::commands::reports::PageArgs;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct ColumnsCommand {
    #[command(subcommand)]
    pub command: ColumnsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ColumnsSubcommand {
    /// List the columns of a report
    List(ListArgs),

    /// Fetch a single column
    Get(ColumnRef),

    /// Add a column to a report
    Create(CreateArgs),

    /// Update some fields of a column
    Update(UpdateArgs),

    /// Delete a column
    Delete(ColumnRef),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Report ID
    pub report: i64,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ColumnRef {
    /// Report ID
    pub report: i64,

    /// Column ID
    pub column: i64,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Report ID
    pub report: i64,

    /// Column name
    #[arg(long)]
    pub name: String,

    /// Data source connection ID
    #[arg(long)]
    pub connection: String,

    /// Column status (active, inactive)
    #[arg(long, default_value = "active")]
    pub status: ReportStatus,

    #[arg(long)]
    pub description: Option<String>,

    /// SQL query producing the column
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Report ID
    pub report: i64,

    /// Column ID
    pub column: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub connection: Option<String>,

    #[arg(long)]
    pub status: Option<ReportStatus>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub query: Option<String>,
}

pub async fn handle(cli: &Cli, cmd: &ColumnsCommand) -> Result<()> {
    let ctx = Context::load(cli)?;
    match &cmd.command {
        ColumnsSubcommand::List(args) => list(&ctx, args).await,
        ColumnsSubcommand::Get(args) => get(&ctx, args).await,
        ColumnsSubcommand::Create(args) => create(&ctx, args).await,
        ColumnsSubcommand::Update(args) => update(&ctx, args).await,
        ColumnsSubcommand::Delete(args) => delete(&ctx, args).await,
    }
}

async fn list(ctx: &Context, args: &ListArgs) -> Result<()> {
    let columns = ctx
        .reports
        .list_columns(args.report, args.page.page()?)
        .await
        .context("Failed to list columns")?;

    if columns.is_empty() {
        eprintln!("{}", "No columns found.".dimmed());
        return Ok(());
    }

    for column in &columns {
        output::emit(column, args.page.pretty)?;
    }

    Ok(())
}

async fn get(ctx: &Context, args: &ColumnRef) -> Result<()> {
    let column = ctx
        .reports
        .get_column(args.report, args.column)
        .await
        .context("Failed to fetch column")?;
    output::json(&column)
}

async fn create(ctx: &Context, args: &CreateArgs) -> Result<()> {
    let mut new = NewColumn::new(&args.name, args.status, &args.connection);
    if let Some(description) = &args.description {
        new = new.with_description(description);
    }
    if let Some(query) = &args.query {
        new = new.with_query(query);
    }

    let column = ctx
        .reports
        .create_column(args.report, &new)
        .await
        .context("Failed to create column")?;
    output::json(&column)
}

async fn update(ctx: &Context, args: &UpdateArgs) -> Result<()> {
    let patch = ColumnPatch {
        name: args.name.clone(),
        description: args.description.clone(),
        status: args.status,
        query: args.query.clone(),
        connection_id: args.connection.clone(),
    };

    let column = ctx
        .reports
        .update_column(args.report, args.column, &patch)
        .await
        .context("Failed to update column")?;
    output::json(&column)
}

async fn delete(ctx: &Context, args: &ColumnRef) -> Result<()> {
    ctx.reports
        .delete_column(args.report, args.column)
        .await
        .context("Failed to delete column")?;
    output::success(&format!("Deleted column {} of report {}", args.column, args.report));
    Ok(())
}
