use std::process::ExitCode;

use clap::Parser;
use stalemake::parser::{self, Args};
use stalemake::Pipeline;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Args = Parser::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> stalemake::Result<()> {
    let buildfile = parser::parse_buildfile(&args.directory.join(&args.file))?;
    let pipeline = Pipeline::new(buildfile, &args.directory);

    if args.dry_run {
        pipeline.dry_run(&args.targets)?;
    } else {
        pipeline.execute(&args.targets).await?;
    }

    Ok(())
}
