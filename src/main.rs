use anyhow::Context;
use clap::{Parser, Subcommand};
use dynamodb_migration::config::{ExportConfig, ImportConfig};
use dynamodb_migration::dispatch::DispatchReport;
use dynamodb_migration::runner::{RunOptions, run_export, run_import};
use dynamodb_migration::telemetry::init_tracing;

/// Dispatch DynamoDB migration workers onto ECS Fargate.
///
/// All settings are read from the environment (TASK_DEFINITION_ARN,
/// CONTAINER_NAME, CLUSTER_ARN, SUBNETS, SECURITY_GROUP, BUCKET_NAME,
/// TABLE_NAME, REGION, plus TOTAL_SEGMENTS for export or S3_PREFIX for import).
#[derive(Parser, Clone)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Start one export task per scan segment of the source table
    Export {
        /// Print the launch requests without starting any task
        #[arg(long)]
        dry_run: bool,

        /// Quiet mode - only warnings and the summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Start one import task per batch of exported artifacts
    Import {
        /// Print the launch requests without starting any task (the listing still runs)
        #[arg(long)]
        dry_run: bool,

        /// Quiet mode - only warnings and the summary
        #[arg(short, long)]
        quiet: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let report = match args.command {
        Command::Export { dry_run, quiet } => {
            init_tracing(quiet);
            let config = ExportConfig::from_env().context("Invalid export configuration")?;
            run_export(config, RunOptions { dry_run })
                .await
                .context("Export dispatch failed")?
        }
        Command::Import { dry_run, quiet } => {
            init_tracing(quiet);
            let config = ImportConfig::from_env().context("Invalid import configuration")?;
            run_import(config, RunOptions { dry_run })
                .await
                .context("Import dispatch failed")?
        }
    };

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &DispatchReport) {
    println!();
    println!("Dispatch Summary");
    println!("================");
    println!("Stage: {}", report.stage);
    println!("Tasks launched: {}", report.launched);
    for arn in &report.task_arns {
        println!("  {}", arn);
    }
}
