use std::{fs::File, sync::Mutex};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use tracker::{
    app::App,
    client::ProxyClient,
    config::{Args, Command},
    headless::{self, ExportRequest},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = ProxyClient::new(&args.proxy_url)?;

    match &args.command {
        Some(Command::Export { query, select, top }) => {
            fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .init();

            let request = ExportRequest {
                query,
                select,
                top: *top,
                limits: args.limits(),
                output: &args.output,
            };

            headless::run(&client, request).await?;
        }
        Some(Command::Tui) | None => {
            // The terminal belongs to the interface, logs go to a file.
            let log = File::create(&args.log_file)?;
            fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(Mutex::new(log))
                .with_ansi(false)
                .init();

            info!(proxy = %client.search_url(), "Starting tracker");

            let mut app = App::new(client, args.limits(), args.output.clone());

            let mut terminal = ratatui::init();
            let result = app.run(&mut terminal).await;
            ratatui::restore();

            result?;
        }
    }

    Ok(())
}
