//! Clone, build, containerise and roll out services described in `~/.dpcfg`.
use std::path::PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, warn};
use thiserror::Error;
use crate::process::System;

mod config;
mod deploy;
mod docker;
mod environment;
mod git;
mod helm;
mod image;
mod listing;
mod pom;
mod presenter;
mod process;

/// Build, push and roll out services listed in the service registry.
#[derive(Parser, Debug)]
#[command(name = "dp", version, about, long_about = None)]
struct Cli {
    /// Configuration directory holding service.yaml and conf.yaml. Defaults to ~/.dpcfg.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all of services.
    #[command(visible_alias = "ls")]
    List,

    /// Deploy a microservice application.
    App {
        /// Service to deploy.
        #[arg(short, long)]
        service: String,

        /// Code branch to deploy.
        #[arg(short, long)]
        branch: String,

        /// Environment to deploy, available env is: [dev, test, stage, production].
        #[arg(short, long)]
        env: String,
    },

    /// Deploy a web application.
    Web {
        /// Service to deploy.
        #[arg(short, long)]
        service: Option<String>,

        /// Code branch to deploy.
        #[arg(short, long)]
        branch: Option<String>,

        /// Environment to deploy, available env is: [dev, test, stage, production].
        #[arg(short, long)]
        env: Option<String>,
    },

    /// List the code branches of a service.
    #[command(name = "lsbranch", visible_alias = "lsb")]
    LsBranch {
        /// Service to list branches of.
        #[arg(short, long)]
        service: String,
    },

    /// Upload a file or directory to a GCS bucket.
    #[command(name = "upload-cdn", visible_alias = "upcdn")]
    UploadCdn {
        /// One or more sources followed by the destination.
        #[arg(value_name = "PATH", num_args = 2.., required = true)]
        paths: Vec<String>,

        /// Whether the uploaded objects may be cached.
        #[arg(
            short,
            long,
            action = ArgAction::Set,
            num_args = 0..=1,
            require_equals = true,
            default_value_t = true,
            default_missing_value = "true"
        )]
        cache: bool,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] config::Error),

    #[error("deploy: {0}")]
    Deploy(#[from] deploy::Error),

    #[error("list: {0}")]
    Listing(#[from] listing::Error),
}

fn main() {
    match run() {
        Ok(_) => std::process::exit(0),
        Err(err) => {
            error!("fatal: {}", err.to_string());
            std::process::exit(1)
        }
    }
}

fn run() -> Result<(), Error> {
    env_logger::init();

    let args = Cli::parse();

    match args.command {
        Commands::List => {
            let registry = config_root(&args.config_dir)?.registry()?;
            println!("{}", presenter::table(listing::services(&registry)));
            Ok(())
        }
        Commands::App { service, branch, env } => {
            // Checked before anything is read or spawned.
            let request = deploy::Request::new(&service, &branch, &env)?;
            let root = config_root(&args.config_dir)?;
            let registry = root.registry()?;
            let global = root.global()?;

            let deployment = deploy::Pipeline {
                root: &root,
                registry: &registry,
                global: &global,
                runner: &System,
            }
            .deploy(&request)?;
            info!(
                "{} deployed as {} (tag {})",
                deployment.image, deployment.app_name, deployment.tag
            );
            Ok(())
        }
        Commands::Web { service, branch, env } => {
            warn!("web deploy requested (service {service:?}, branch {branch:?}, env {env:?})");
            println!("Web application deploys are not implemented yet.");
            Ok(())
        }
        Commands::LsBranch { service } => {
            let registry = config_root(&args.config_dir)?.registry()?;
            let rows = listing::branches(&registry, &System, &service)?;
            println!("{}", presenter::table(rows));
            Ok(())
        }
        Commands::UploadCdn { paths, cache } => {
            let (destination, sources) = paths
                .split_last()
                .map(|(destination, sources)| (destination.clone(), sources.to_vec()))
                .unwrap_or_default();
            println!("src:{sources:?}\ndst:{destination}\nisCache:{cache}");
            Ok(())
        }
    }
}

/// The configuration directory, from `--config-dir` or the user's home directory.
fn config_root(config_dir: &Option<PathBuf>) -> Result<config::Root, config::Error> {
    match config_dir {
        Some(dir) => Ok(config::Root::new(dir)),
        None => config::Root::from_home(),
    }
}
