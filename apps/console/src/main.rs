use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{entity_menu, load_settings, views::FormValues, Conference, Interaction, Location};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "conference", about = "Browse and edit conference rooms, timeslots and talks")]
struct Cli {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// TOML settings file (default: ./conference.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the entity routes.
    Menu,
    /// Open a route such as `/room?page=2&sort=name,desc` or `/talk/3/edit`.
    Visit {
        location: String,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        refresh: bool,
        /// Form input as `name=value`; repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        #[arg(long)]
        submit: bool,
        #[arg(long)]
        confirm: bool,
        #[arg(long)]
        cancel: bool,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got {raw:?}")),
    }
}

struct VisitArgs {
    sort: Option<String>,
    page: Option<u32>,
    refresh: bool,
    fields: Vec<(String, String)>,
    submit: bool,
    confirm: bool,
    cancel: bool,
}

fn interaction(args: VisitArgs) -> Result<Interaction> {
    if !args.fields.is_empty() && !args.submit {
        bail!("--field values are only sent with --submit");
    }
    let mut chosen = Vec::new();
    if let Some(field) = args.sort {
        chosen.push(Interaction::Sort(field));
    }
    if let Some(page) = args.page {
        chosen.push(Interaction::Page(page));
    }
    if args.refresh {
        chosen.push(Interaction::Refresh);
    }
    if args.submit {
        chosen.push(Interaction::Submit(args.fields.into_iter().collect::<FormValues>()));
    }
    if args.confirm {
        chosen.push(Interaction::ConfirmDelete);
    }
    if args.cancel {
        chosen.push(Interaction::Cancel);
    }
    match chosen.len() {
        0 => Ok(Interaction::None),
        1 => Ok(chosen.remove(0)),
        _ => bail!("only one of --sort, --page, --refresh, --submit, --confirm, --cancel may be given"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(token) = cli.token {
        settings.auth_token = Some(token);
    }

    match cli.command {
        Command::Menu => {
            for item in entity_menu() {
                println!("{:<10} {}", item.label, item.path);
            }
        }
        Command::Visit {
            location,
            sort,
            page,
            refresh,
            fields,
            submit,
            confirm,
            cancel,
        } => {
            let location: Location = location.parse()?;
            let interaction = interaction(VisitArgs {
                sort,
                page,
                refresh,
                fields,
                submit,
                confirm,
                cancel,
            })?;
            let mut conference = Conference::new(settings)?;

            let visit = conference
                .visit(&location, interaction)
                .await
                .with_context(|| format!("failed to open {location}"))?;
            match visit.redirect {
                Some(next) => {
                    info!(%next, "view closed");
                    let landed = conference.visit(&next, Interaction::None).await?;
                    println!("-> {}", landed.location);
                    print!("{}", landed.rendered);
                }
                None => {
                    if visit.location != location {
                        println!("-> {}", visit.location);
                    }
                    print!("{}", visit.rendered);
                }
            }
        }
    }

    Ok(())
}
