//! # Caffa CLI Entry Point
//!
//! The main executable for the Caffa client. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and sets up logging.
//! 2. **Connection**: Opens a [`Session`] on the server, checking its version.
//! 3. **Execution**: Runs the command against the session's documents and schemas.
//! 4. **Presentation**: Formats and prints the result, then closes the session.
//!
//! The session is closed whether or not the command succeeded.

mod cli;
mod formatter;
mod path;

use anyhow::Context;
use caffa_core::{MethodOutput, Session};
use clap::Parser;
use cli::{Cli, Commands};
use formatter::{Done, FormattedString, KeywordList, MethodList, SessionInfo};
use path::FieldPath;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args).await {
        eprintln!("{}", FormattedString::from(err));
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let config = args.client_config()?;
    debug!(address = %config.address(), protocol = ?config.protocol, "opening session");
    let mut session = Session::open(&config)
        .await
        .with_context(|| format!("Failed to open a session on {}", config.address()))?;

    let result = execute(&session, args.command).await;
    let closed = session.close().await;

    result?;
    closed.context("Failed to close the session")?;
    Ok(())
}

async fn execute(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Info => println!("{}", FormattedString::from(SessionInfo(session))),
        Commands::Schemas => {
            let keywords = session.schema_keywords().await?;
            println!("{}", FormattedString::from(KeywordList(keywords)));
        }
        Commands::Schema { keyword } => {
            let descriptor = session.factory().type_for(&keyword).await?;
            println!("{}", FormattedString::from(descriptor.as_ref()));
        }
        Commands::Document { id } => {
            let document = session.document(&id).await?;
            println!("{}", FormattedString::from(document.to_json().await?));
        }
        Commands::Get { path, document } => {
            let path: FieldPath = path.parse()?;
            let document = session.document(&document).await?;
            let value = path::read(&document, &path).await?;
            println!("{}", FormattedString::from(value));
        }
        Commands::Set {
            path: raw,
            value,
            document,
        } => {
            let path: FieldPath = raw.parse()?;
            let document = session.document(&document).await?;
            path::write(&document, &path, &value).await?;
            println!("{}", FormattedString::from(Done(format!("{raw} = {value}"))));
        }
        Commands::Methods {
            path,
            remote,
            document,
        } => {
            let path: FieldPath = path.parse()?;
            let document = session.document(&document).await?;
            let object = path::resolve_object(&document, &path).await?;

            let methods = if remote {
                object.list_methods().await?
            } else {
                object.methods().map(|m| m.descriptor().clone()).collect()
            };
            println!("{}", FormattedString::from(MethodList(methods)));
        }
        Commands::Call {
            path,
            method,
            args,
            document,
        } => {
            let path: FieldPath = path.parse()?;
            let document = session.document(&document).await?;
            let object = path::resolve_object(&document, &path).await?;

            let method = object.method(&method)?;
            let arguments = match args {
                Some(args) => method.arguments_from_json(&args).await?,
                None => Default::default(),
            };

            match method.call(arguments).await? {
                Some(output) => print_output(&output).await?,
                None => println!("{}", FormattedString::from(Done(method.name().to_string()))),
            }
        }
    }
    Ok(())
}

async fn print_output(output: &MethodOutput) -> anyhow::Result<()> {
    println!("{}", FormattedString::from(output.to_json().await?));
    Ok(())
}
