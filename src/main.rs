use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use csv::Trim;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::{fs::File, path::Path, path::PathBuf};

use penny_ledger::{ManagerError, TransactionManager};
use penny_ledger::engine::{InputRecord, TransactionId, TransactionSnapshot, TransactionType};
use penny_ledger::storage::JsonFileStore;

/// Records income and expenses and keeps a running balance.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file holding the transactions.
    #[arg(long, env = "PENNY_LEDGER_STORE", default_value = "ledger.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every transaction, most recent first, as CSV.
    List,
    /// Print the current balance.
    Balance,
    /// Record a new transaction.
    Add {
        amount: String,
        description: String,
        #[arg(long = "type", default_value = "income")]
        typ: TransactionType,
    },
    /// Change amount and description of a transaction, and its type when given.
    Update {
        id: String,
        amount: String,
        description: String,
        #[arg(long = "type")]
        typ: Option<TransactionType>,
    },
    /// Remove a transaction.
    Delete { id: String },
    /// Add every `type,amount,description` row of a CSV file.
    Import { file: PathBuf },
}

type Manager = TransactionManager<JsonFileStore>;

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    log::debug!("Application started");
    let args = Args::parse();
    log::debug!("Using store {:?}", args.store);

    let mut manager = TransactionManager::open(JsonFileStore::new(&args.store))?;

    match args.command {
        Command::List => write_to_std_out(&manager)?,
        Command::Balance => println!("{}", manager.balance()),
        Command::Add {
            amount,
            description,
            typ,
        } => {
            let id = manager.add(&amount, &description, typ)?;
            println!("{id}");
        }
        Command::Update {
            id,
            amount,
            description,
            typ,
        } => {
            let id = TransactionId::new(id);
            manager.begin_edit(&id)?;
            let form = manager.form_mut();
            form.amount = amount;
            form.description = description;
            if let Some(typ) = typ {
                form.typ = typ;
            }
            manager.submit()?;
        }
        Command::Delete { id } => manager.delete(&TransactionId::new(id))?,
        Command::Import { file } => import_transactions(&mut manager, &file)?,
    }

    log::debug!("Application finished");
    Ok(())
}

fn import_transactions(manager: &mut Manager, filepath: &Path) -> Result<()> {
    let file = File::open(filepath).with_context(|| format!("cannot open {filepath:?}"))?;
    let mut rdr = csv::ReaderBuilder::new().trim(Trim::All).from_reader(file);

    log::debug!("Started deserialising records");
    let (mut added, mut skipped) = (0, 0);
    for result in rdr.deserialize::<InputRecord>() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Error deserializing record: {e}");
                skipped += 1;
                continue;
            }
        };
        log::debug!("Adding record: {record:?}");
        // The manager already logged the reason
        match manager.add(&record.amount, &record.description, record.typ) {
            Ok(_) => added += 1,
            Err(e @ ManagerError::StorageFailure(_)) => {
                return Err(e)
                    .with_context(|| format!("import stopped after {added} transactions"));
            }
            Err(_) => skipped += 1,
        }
    }
    log::info!("Imported {added} transactions, skipped {skipped}");
    Ok(())
}

fn write_to_std_out(manager: &Manager) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());

    for tx in manager.transactions() {
        wtr.serialize(TransactionSnapshot::from(tx))?;
    }
    wtr.flush()?;

    Ok(())
}
