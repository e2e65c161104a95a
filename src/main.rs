use anyhow::{Context, Result};
use iam_audit::{
    audit_account,
    cli::{commands::audit::AuditArgs, CommandLineArgs, GlobalArgs},
    credentials, iam, report, AwsIamDirectory,
};
use tokio::runtime::Builder;
use tracing::info;
use tracing_core::metadata::LevelFilter;
use tracing_subscriber::{
    self, fmt, prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
};

fn main() -> Result<()> {
    color_backtrace::install();
    let args = CommandLineArgs::parse_args();
    setup_logging(&args.global_args);

    // One user at a time; nothing here benefits from worker threads.
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(async_main(args.audit_args))
}

fn setup_logging(global_args: &GlobalArgs) {
    let filter = if global_args.all_targets() {
        tracing_subscriber::filter::Targets::new().with_default(LevelFilter::TRACE)
    } else {
        tracing_subscriber::filter::Targets::new()
            .with_default(LevelFilter::ERROR)
            .with_target("iam_audit", global_args.log_level())
    };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .without_time();
    registry().with(fmt_layer).with(filter).init();
}

async fn async_main(args: AuditArgs) -> Result<()> {
    // Fail before prompting or touching AWS if the report has nowhere to go.
    report::ensure_output_dir(&args.output_dir)?;

    let credentials = credentials::resolve(&args)?;
    let config = iam::load_config(credentials, args.profile.as_deref()).await;
    let directory = AwsIamDirectory::new(&config);

    let path = audit_account(&directory, &args.output_dir, args.json_out.as_deref()).await?;
    info!("IAM audit report written to {}", path.display());
    Ok(())
}
