use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use dhadak_admin::backend::HttpBackend;
use dhadak_admin::config::Config;
use dhadak_admin::controller::{Notice, NoticeLevel, Notifier};
use dhadak_admin::editor::{EditorShell, Panel, Tab};
use dhadak_admin::public::PublicSite;
use dhadak_admin::session::{FileStore, Session};

/// Prints notices the way the web editor shows toasts
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice),
            NoticeLevel::Failure => eprintln!("✗ {}", notice),
        }
    }
}

#[derive(Parser)]
#[command(name = "dhadak-admin")]
#[command(about = "Manage the Dhadak site content from the command line")]
#[command(long_about = "\
Manage the Dhadak site content from the command line

The backend origin is read from BACKEND_URL (a .env file is honoured). The
operator session is kept in ADMIN_SESSION_PATH (default .admin-session.json)
so a login survives between invocations.

Tabs: gallery, achievements, team, workshop, about, contact")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in as an existing operator
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an operator account and log in
    Register {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Status,
    /// Print every item of a tab as JSON
    List { tab: Tab },
    /// Create an item from FIELD=VALUE pairs
    Add {
        tab: Tab,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Change fields of an existing item; unset fields keep their values
    Edit {
        tab: Tab,
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Delete an item; without --yes nothing is sent
    Delete {
        tab: Tab,
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Read or replace the about text
    About {
        #[command(subcommand)]
        action: AboutAction,
    },
    /// Visitor messages
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },
    /// Load the public site the way a visitor sees it
    Site,
}

#[derive(Subcommand)]
enum AboutAction {
    Show,
    Set { content: String },
}

#[derive(Subcommand)]
enum ContactAction {
    /// List received messages (operator only)
    List,
    /// Send a message as a visitor
    Submit {
        name: String,
        email: String,
        message: String,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let backend = Arc::new(HttpBackend::from_config(&config));
    let store = Arc::new(FileStore::new(config.session_path.clone()));
    let session = Arc::new(Session::load(store).context("Failed to read stored session")?);
    let notifier = Arc::new(ConsoleNotifier);

    tracing::debug!(backend = %config.backend_url, "Configuration loaded");

    let mut shell = EditorShell::new(backend.clone(), session.clone(), notifier);

    match cli.command {
        Command::Login { email, password } => shell.login(&email, &password).await?,
        Command::Register { email, password } => shell.register(&email, &password).await?,
        Command::Logout => shell.logout()?,
        Command::Status => match session.identity() {
            Some(identity) if shell.is_authenticated() => println!("Logged in as {}", identity),
            _ => println!("Not logged in"),
        },
        Command::List { tab } => {
            let panel = shell.select(tab).await?;
            print_items(panel)?;
        }
        Command::Add { tab, fields } => {
            let panel = shell.select(tab).await?;
            if tab == Tab::About {
                panel.open_singleton()?;
            } else {
                panel.open_for_create()?;
            }
            fill_and_submit(panel, &fields).await?;
        }
        Command::Edit { tab, id, fields } => {
            let panel = shell.select(tab).await?;
            panel.open_for_edit(&id)?;
            fill_and_submit(panel, &fields).await?;
        }
        Command::Delete { tab, id, yes } => {
            let panel = shell.select(tab).await?;
            panel.request_delete(&id)?;
            if yes {
                panel.confirm_delete().await?;
            } else {
                println!(
                    "Delete {} {}? Re-run with --yes to confirm",
                    panel.label().to_lowercase(),
                    id
                );
            }
        }
        Command::About { action } => {
            let panel = shell.select(Tab::About).await?;
            match action {
                AboutAction::Show => {
                    for item in panel.items()? {
                        println!("{}", item["content"].as_str().unwrap_or_default());
                    }
                }
                AboutAction::Set { content } => {
                    panel.open_singleton()?;
                    fill_and_submit(panel, &[("content".to_string(), content)]).await?;
                }
            }
        }
        Command::Contact { action } => match action {
            ContactAction::List => {
                let panel = shell.select(Tab::Contact).await?;
                print_items(panel)?;
            }
            ContactAction::Submit {
                name,
                email,
                message,
            } => {
                let ack = PublicSite::new(backend)
                    .submit_contact(&name, &email, &message)
                    .await?;
                println!("{}", ack);
            }
        },
        Command::Site => {
            let site = PublicSite::new(backend).load().await?;
            println!("{}", site.about.content);
            println!();
            println!("Photos:        {}", site.gallery.len());
            println!("Achievements:  {}", site.achievements.len());
            println!("Team members:  {}", site.team.len());
            println!(
                "Workshops:     {} ({} active)",
                site.workshops.len(),
                site.active_workshops().len()
            );
            for workshop in site.active_workshops() {
                println!("  - {} ({})", workshop.title, workshop.date);
            }
        }
    }

    Ok(())
}

fn print_items(panel: &dyn Panel) -> anyhow::Result<()> {
    let items = panel.items()?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

async fn fill_and_submit(panel: &dyn Panel, fields: &[(String, String)]) -> anyhow::Result<()> {
    for (field, value) in fields {
        panel
            .set_field(field, value)
            .with_context(|| format!("Cannot set '{}'", field))?;
    }
    panel.submit().await?;
    Ok(())
}
