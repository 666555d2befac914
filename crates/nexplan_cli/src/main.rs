//! `nexplan` command-line host.
//!
//! # Responsibility
//! - Resolve configuration, open persisted state and run one store command.
//! - Render the project grid as plain text.

mod cli;
mod render;

use clap::Parser;
use cli::{CliArgs, Command};
use log::info;
use nexplan_core::csv::{read_csv_file, write_csv_file};
use nexplan_core::db::open_db;
use nexplan_core::{init_logging, ProjectStore, SqliteDocumentStorage, StoreConfig};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    match run(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let storage = SqliteDocumentStorage::try_new(&conn)?;
    let mut store = ProjectStore::open(storage, config.storage_key.as_str());

    match args.command {
        Command::Show => print!("{}", render::render_project(store.project())),
        Command::Rename { name } => {
            store.update_project_name(name)?;
            println!("renamed to `{}`", store.project().name);
        }
        Command::Set { row, column, value } => {
            if store.update_cell(&row, &column, value)? {
                println!("updated {row}/{column}");
            } else {
                println!("ignored: no row `{row}` or column `{column}`");
            }
        }
        Command::AddRow => println!("added row {}", store.add_row()?),
        Command::DeleteRow { id } => report_delete("row", &id, store.delete_row(&id)?),
        Command::AddColumn { title } => {
            println!("added column {}", store.add_column(title.as_deref())?);
        }
        Command::DeleteColumn { id } => {
            report_delete("column", &id, store.delete_column(&id)?);
        }
        Command::Save => {
            store.save_manual()?;
            println!("saved at {}", store.last_saved());
        }
        Command::Import { file } => {
            let text = read_csv_file(&file)?;
            if store.import_data(&text)? {
                let project = store.project();
                println!(
                    "imported {} column(s) and {} row(s) from {}",
                    project.columns.len(),
                    project.rows.len(),
                    file.display()
                );
            } else {
                println!("nothing imported: {} has no header line", file.display());
            }
        }
        Command::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(store.export_file_name()));
            write_csv_file(&path, store.project())?;
            println!("exported to {}", path.display());
        }
        Command::Watch { interval_ms } => {
            store.subscribe(|project| {
                println!("synced `{}` ({} rows)", project.name, project.rows.len());
                print!("{}", render::render_project(project));
            });
            info!("event=watch_start module=cli status=ok interval_ms={interval_ms}");
            loop {
                std::thread::sleep(Duration::from_millis(interval_ms));
                store.sync_external()?;
            }
        }
    }

    Ok(())
}

fn resolve_config(args: &CliArgs) -> Result<StoreConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    config.validate()?;
    Ok(config)
}

fn report_delete(kind: &str, id: &str, deleted: bool) {
    if deleted {
        println!("deleted {kind} {id}");
    } else {
        println!("ignored: no {kind} `{id}`");
    }
}
