use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hal_image_builder::preflight::check_host_tools;
use hal_image_builder::telemetry::init_tracing;
use hal_image_builder::{
    plan_build, CliEngine, ContainerEngine, Manifest, RepoLayout, RepositoryMetadata,
};
use tracing::{info, Level};

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    check_host_tools(&cli.engine)?;

    let layout = RepoLayout::discover(&cli.path)?;
    let metadata = RepositoryMetadata::query(layout.root())
        .with_context(|| format!("reading git metadata in '{}'", layout.root().display()))?;
    let manifest = Manifest::load(&layout.manifest_path())?;

    let request = cli.build_request()?;
    let engine = CliEngine::new(&cli.engine);
    let invocation = plan_build(
        &manifest,
        &metadata,
        layout.context_dir(),
        &request,
        &engine,
    )?;

    if cli.dry_run {
        println!("{}", engine.render(&invocation));
        return Ok(());
    }

    info!(tag = %invocation.tag, "building container image");
    engine
        .build(&invocation)
        .with_context(|| format!("building '{}'", invocation.tag))?;
    println!("Container image build ran successfully to completion!");
    Ok(())
}
