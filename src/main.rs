use anyhow::{Context, Result};
use clap::Parser;
use cookflow::logging::init_logging;
use cookflow::notify::ChannelNotifier;
use cookflow::store::InMemoryRecipeStore;
use cookflow::{CookingService, PollOutcome, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "cookflow")]
#[command(about = "Walk through cooking sessions step by step, with timed steps")]
struct Cli {
    /// JSON recipe catalog (an array of recipes)
    #[arg(long)]
    recipes: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging, cli.debug).context("initializing logging")?;

    let store = InMemoryRecipeStore::load(&cli.recipes)
        .with_context(|| format!("loading recipes from {}", cli.recipes.display()))?;
    let dishes: Vec<String> = store.dish_names().into_iter().map(String::from).collect();

    let (notifier, mut notices) = ChannelNotifier::channel(config.notifier.buffer);
    let printer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("[{}] {}", notice.at.format("%H:%M:%S"), notice.message);
        }
    });

    let service = CookingService::new(&config, Arc::new(store), Arc::new(notifier));
    let session_id = uuid::Uuid::new_v4().to_string();
    println!("session {session_id}; dishes: {}", dishes.join(", "));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(c, a)| (c, a.trim()));

        match command {
            "" => {}
            "create" => {
                let names: Vec<&str> = argument
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect();
                if service.create(&session_id, &names).await {
                    println!("session ready with {} dish(es)", names.len());
                } else {
                    println!("unknown dish in: {argument}");
                }
            }
            "next" => match service.poll_next(&session_id).await {
                Some(PollOutcome::Step(view)) => println!("{}", view.to_json()),
                Some(_) => {}
                None => println!("no session; use: create <dish>[,<dish>...]"),
            },
            "start" => match service.start_blockable(&session_id).await {
                Ok(task) => println!("started {task}"),
                Err(err) => println!("cannot start: {err}"),
            },
            "finish" => match argument.parse::<usize>() {
                Ok(recipe_index) => service.finish_blockable(&session_id, recipe_index).await,
                Err(_) => println!("usage: finish <recipe-index>"),
            },
            "unbind" => {
                service.unbind(&session_id).await;
                println!("session removed");
            }
            "quit" | "exit" => break,
            other => println!(
                "unknown command '{other}'; try create, next, start, finish, unbind, quit"
            ),
        }
    }

    service.shutdown().await;
    drop(service);
    printer.await.context("notice printer failed")?;
    Ok(())
}
