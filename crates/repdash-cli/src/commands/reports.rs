//! Report subcommand implementations.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};

use repdash_core::ReportService;
use repdash_core::report::{NewReport, Page, ReportInterval, ReportPatch, ReportStatus, ReportType};

use crate::cli::Cli;
use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct ReportsCommand {
    #[command(subcommand)]
    pub command: ReportsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportsSubcommand {
    /// List reports
    List(ListArgs),

    /// Fetch a single report
    Get(GetArgs),

    /// Create a report
    Create(CreateArgs),

    /// Update some fields of a report
    Update(UpdateArgs),

    /// Delete a report and its columns
    Delete(DeleteArgs),
}

/// Pagination options shared by list commands.
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Maximum number of items to return (1-100)
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Number of items to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl PageArgs {
    pub fn page(&self) -> Result<Page> {
        Page::new(self.limit, self.offset).context("Invalid pagination")
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// List every user's reports (admin accounts only)
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Report ID
    pub id: i64,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Report title
    #[arg(long)]
    pub title: String,

    /// Report type (realtime, cached)
    #[arg(long = "type")]
    pub report_type: ReportType,

    /// Refresh interval (hourly, daily, monthly, annually)
    #[arg(long)]
    pub interval: ReportInterval,

    /// Report status (active, inactive)
    #[arg(long, default_value = "active")]
    pub status: ReportStatus,

    #[arg(long)]
    pub description: Option<String>,

    /// Report parameters as a JSON object
    #[arg(long)]
    pub params: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Report ID
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long = "type")]
    pub report_type: Option<ReportType>,

    #[arg(long)]
    pub interval: Option<ReportInterval>,

    #[arg(long)]
    pub status: Option<ReportStatus>,

    #[arg(long)]
    pub description: Option<String>,

    /// Report parameters as a JSON object
    #[arg(long)]
    pub params: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Report ID
    pub id: i64,
}

pub async fn handle(cli: &Cli, cmd: &ReportsCommand) -> Result<()> {
    let ctx = Context::load(cli)?;
    match &cmd.command {
        ReportsSubcommand::List(args) => list(&ctx, args).await,
        ReportsSubcommand::Get(args) => get(&ctx, args).await,
        ReportsSubcommand::Create(args) => create(&ctx, args).await,
        ReportsSubcommand::Update(args) => update(&ctx, args).await,
        ReportsSubcommand::Delete(args) => delete(&ctx, args).await,
    }
}

fn parse_params(raw: Option<&str>) -> Result<Option<Map<String, Value>>> {
    raw.map(|raw| serde_json::from_str(raw).context("--params must be a JSON object"))
        .transpose()
}

async fn list(ctx: &Context, args: &ListArgs) -> Result<()> {
    let page = args.page.page()?;
    let reports = if args.all {
        ctx.reports.list_all_reports(page).await
    } else {
        ctx.reports.list_reports(page).await
    }
    .context("Failed to list reports")?;

    if reports.is_empty() {
        eprintln!("{}", "No reports found.".dimmed());
        return Ok(());
    }

    for report in &reports {
        output::emit(report, args.page.pretty)?;
    }

    Ok(())
}

async fn get(ctx: &Context, args: &GetArgs) -> Result<()> {
    let report = ctx
        .reports
        .get_report(args.id)
        .await
        .context("Failed to fetch report")?;
    output::emit(&report, args.pretty)
}

async fn create(ctx: &Context, args: &CreateArgs) -> Result<()> {
    let mut new = NewReport::new(&args.title, args.report_type, args.interval, args.status);
    if let Some(description) = &args.description {
        new = new.with_description(description);
    }
    if let Some(params) = parse_params(args.params.as_deref())? {
        new = new.with_params(params);
    }

    let report = ctx
        .reports
        .create_report(&new)
        .await
        .context("Failed to create report")?;
    output::json(&report)
}

async fn update(ctx: &Context, args: &UpdateArgs) -> Result<()> {
    let patch = ReportPatch {
        title: args.title.clone(),
        description: args.description.clone(),
        report_type: args.report_type,
        interval: args.interval,
        status: args.status,
        params: parse_params(args.params.as_deref())?,
    };

    let report = ctx
        .reports
        .update_report(args.id, &patch)
        .await
        .context("Failed to update report")?;
    output::json(&report)
}

async fn delete(ctx: &Context, args: &DeleteArgs) -> Result<()> {
    ctx.reports
        .delete_report(args.id)
        .await
        .context("Failed to delete report")?;
    output::success(&format!("Deleted report {}", args.id));
    Ok(())
}
