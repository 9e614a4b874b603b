//! Flowline command-line host

mod config;
mod ops;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use flowline_workflow_service::{
    AuthService, EditorSession, FileCredentialStore, UserProvider, WorkflowCatalog,
    WorkflowRepository,
};

use crate::config::{load_pins, save_pins, FlowlineConfig};
use crate::ops::EditOp;

type Auth = AuthService<FileCredentialStore, FileCredentialStore>;

/// Flowline - build linear workflows from the terminal
#[derive(Parser)]
#[command(name = "flowline")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the data directory (default: ~/.flowline)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, registering the email on first use
    Login {
        email: String,
        #[arg(long)]
        password: String,
        /// Stay logged in across machine sessions
        #[arg(long)]
        remember: bool,
    },

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List workflows
    List {
        /// Filter by name or id
        #[arg(long)]
        search: Option<String>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Create a workflow
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Toggle a workflow's pin
    Pin { id: String },

    /// Delete a workflow
    Delete { id: String },

    /// Open a workflow, apply edits and print the chain
    Edit {
        id: String,
        /// add:<kind>[:label], insert:<anchor>:<kind>[:label], del:<id>,
        /// undo, redo, zoom-in, zoom-out, zoom:<value>
        ops: Vec<EditOp>,
        /// Save the chain after applying the edits
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("could not determine home directory")?
            .join(".flowline"),
    };
    let config = FlowlineConfig::load(&data_dir)?;

    let Some(command) = cli.command else {
        println!("flowline - use --help to see available commands");
        return Ok(());
    };

    let auth = open_auth(&config)?;
    match command {
        Commands::Login {
            email,
            password,
            remember,
        } => {
            let user = auth.login(&email, &password, remember)?;
            println!("Logged in as {}", user.email);
        }
        Commands::Logout => {
            auth.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => match auth.read_current_user()? {
            Some(user) => println!("{}", user.email),
            None => println!("Not logged in"),
        },
        Commands::List { search, page } => list(&config, search, page)?,
        Commands::Create { name, description } => {
            let mut repo = open_repository(&config)?;
            let mut catalog = WorkflowCatalog::load(&repo, config.page_size)?;
            let user = auth.current_user();
            let created = catalog.create(
                &mut repo,
                &name,
                &description,
                user.as_ref().map(|u| u.email.as_str()),
            )?;
            println!("Created {} {}", created.id, created.name);
        }
        Commands::Pin { id } => {
            let repo = open_repository(&config)?;
            let mut catalog = WorkflowCatalog::load(&repo, config.page_size)?;
            catalog.apply_pins(&load_pins(&config.pins_path())?);
            let Some(change) = catalog.toggle_pin(&id) else {
                bail!("workflow not found: {}", id);
            };
            save_pins(&config.pins_path(), &catalog.pinned_ids())?;
            println!("{}", change.message());
        }
        Commands::Delete { id } => {
            let mut repo = open_repository(&config)?;
            let mut catalog = WorkflowCatalog::load(&repo, config.page_size)?;
            if !catalog.delete(&mut repo, &id)? {
                bail!("workflow not found: {}", id);
            }
            let pins: Vec<String> = load_pins(&config.pins_path())?
                .into_iter()
                .filter(|pin| *pin != id)
                .collect();
            save_pins(&config.pins_path(), &pins)?;
            println!("Deleted {}", id);
        }
        Commands::Edit { id, ops, save } => edit(&config, &auth, &id, &ops, save)?,
    }

    Ok(())
}

fn open_auth(config: &FlowlineConfig) -> Result<Auth> {
    let persistent = FileCredentialStore::open(config.credentials_path())?;
    let session = FileCredentialStore::open(config.session_path())?;
    Ok(AuthService::new(persistent, session))
}

fn open_repository(config: &FlowlineConfig) -> Result<WorkflowRepository> {
    let mut repo = WorkflowRepository::with_persistence(config.workflows_dir());
    let count = repo
        .load_from_disk()
        .context("failed to load workflows")?;
    log::debug!("Loaded {} workflows from {:?}", count, config.workflows_dir());
    Ok(repo)
}

fn list(config: &FlowlineConfig, search: Option<String>, page: usize) -> Result<()> {
    let repo = open_repository(config)?;
    let mut catalog = WorkflowCatalog::load(&repo, config.page_size)?;
    catalog.apply_pins(&load_pins(&config.pins_path())?);
    if let Some(query) = search {
        catalog.set_search(query);
    }
    catalog.set_page(page);

    let rows = catalog.page_items();
    if rows.is_empty() {
        println!("No workflows");
        return Ok(());
    }
    for row in rows {
        println!(
            "{} {:<5} {:<30} {:<16} {}",
            if row.is_pinned { "*" } else { " " },
            row.id,
            row.name,
            row.last_edited_by,
            row.last_edited_label()
        );
    }
    println!(
        "Page {} of {}",
        catalog.current_page(),
        catalog.total_pages()
    );
    Ok(())
}

fn edit(config: &FlowlineConfig, auth: &Auth, id: &str, ops: &[EditOp], save: bool) -> Result<()> {
    let mut repo = open_repository(config)?;
    let mut session = EditorSession::open(&repo, auth, id, &config.editor)
        .with_context(|| format!("failed to open workflow {}", id))?;

    for op in ops {
        if !op.apply(&mut session) {
            eprintln!("No effect: {}", op);
        }
    }

    print!("{}", session.render());

    if save {
        let payload = session.save(&mut repo)?;
        println!("Saved {} ({} nodes)", id, payload.nodes.len());
    } else if !ops.is_empty() {
        eprintln!("Edits not saved; pass --save to keep them");
    }
    Ok(())
}
