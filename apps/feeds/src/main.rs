use std::{num::NonZeroU32, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{HttpCollectionApi, PagedCollectionController};
use shared::domain::SavedSearch;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "feeds", about = "Browse and prune saved-search feeds")]
struct Args {
    /// TOML settings file (defaults to ./feeds.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    collection: Option<String>,
    /// Bearer token sent with every request
    #[arg(long, global = true)]
    token: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<NonZeroU32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of the collection
    List {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        #[arg(long)]
        json: bool,
    },
    /// Delete a record, then show the page it was listed on
    Delete {
        id: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
}

impl Args {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_url {
            settings.api_url = v.clone();
        }
        if let Some(v) = &self.collection {
            settings.collection = v.clone();
        }
        if let Some(v) = &self.token {
            settings.api_token = Some(v.clone());
        }
        if let Some(v) = self.page_size {
            settings.page_size = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply_to(&mut settings);

    let mut api = HttpCollectionApi::<SavedSearch>::with_timeout(
        &settings.api_url,
        &settings.collection,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    if let Some(token) = settings.api_token.clone() {
        api = api.with_bearer_token(token);
    }
    info!(url = %api.list_url(), page_size = settings.page_size.get(), "using collection");

    let controller =
        PagedCollectionController::<SavedSearch>::with_page_size(Arc::new(api), settings.page_size);
    let result = run(&controller, args.command).await;
    controller.dispose().await;
    result
}

async fn run(controller: &PagedCollectionController<SavedSearch>, command: Command) -> Result<()> {
    match command {
        Command::List { page, json } => {
            controller.try_go_to_page(page).await?;
            let records = controller.records().await;
            let state = controller.page_state().await;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&render::page_json(&records, &state))?
                );
            } else {
                print!("{}", render::render_page(&records, &state));
            }
        }
        Command::Delete { id, page } => {
            controller.try_go_to_page(page).await?;
            controller.try_remove(&id).await?;
            let records = controller.records().await;
            let state = controller.page_state().await;
            print!("{}", render::render_page(&records, &state));
        }
    }
    Ok(())
}
