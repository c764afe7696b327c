mod courier;
mod session;
mod util;

use clap::{Parser, Subcommand};
use color_eyre::Report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Rope backed text buffers edited over a small binary protocol")]
struct Cli {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand)]
enum Role {
    /// Accept connections, each one editing its own private buffer
    Server {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Send typed commands (insert, delete, space, newline, print) to a server
    Client {
        host: String,

        port: u16,

        /// Read commands from this file instead of stdin
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // stdout carries printed documents, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().role {
        Role::Server { host, port } => session::server::serve(&host, port).await,
        Role::Client { host, port, file } => {
            session::client::run(&host, port, file.as_deref()).await
        }
    }
}
