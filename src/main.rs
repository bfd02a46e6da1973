use clap::Parser;
use miette::{IntoDiagnostic, Result};
use nova_bank::application::engine::BankEngine;
use nova_bank::domain::account::NewAccount;
use nova_bank::domain::ports::BankStoreBox;
use nova_bank::error::BankError;
use nova_bank::infrastructure::clock::SystemClock;
use nova_bank::infrastructure::in_memory::{
    InMemoryBankStore, InMemoryChallengeStore, InMemoryTransferStore,
};
use nova_bank::infrastructure::notifier::ConsoleNotifier;
use nova_bank::interfaces::csv::account_writer::AccountWriter;
use nova_bank::interfaces::csv::op_reader::{OpKind, OperationReader, OperationRecord};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Shared secret required for admin-deposit rows
    #[arg(long, default_value = "changeme")]
    admin_secret: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let store: BankStoreBox = match cli.db_path {
        Some(db_path) => open_persistent_store(db_path)?,
        None => Box::new(InMemoryBankStore::new()),
    };
    let engine = BankEngine::new(
        store,
        Box::new(InMemoryChallengeStore::new()),
        Box::new(InMemoryTransferStore::new()),
        Box::new(ConsoleNotifier),
        Arc::new(SystemClock),
        cli.admin_secret.clone(),
    );

    // Process operations
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for record in reader.operations() {
        match record {
            Ok(op) => {
                if let Err(e) = apply_operation(&engine, &cli.admin_secret, op).await {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Output final account states
    let accounts = engine.list_accounts().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent_store(db_path: PathBuf) -> Result<BankStoreBox> {
    let store = nova_bank::infrastructure::rocksdb::RocksDbBankStore::open(db_path)
        .into_diagnostic()?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent_store(_db_path: PathBuf) -> Result<BankStoreBox> {
    miette::bail!("built without the storage-rocksdb feature; omit --db-path")
}

async fn apply_operation(
    engine: &BankEngine,
    admin_secret: &str,
    op: OperationRecord,
) -> nova_bank::error::Result<()> {
    match op.op {
        OpKind::Register => {
            engine
                .register(NewAccount {
                    name: required(op.name, "name")?,
                    email: required(op.email, "email")?,
                    phone: required(op.phone, "phone")?,
                    dob: required(op.dob, "dob")?,
                    address: op.address.unwrap_or_default(),
                    username: required(op.identifier, "identifier")?,
                    password: required(op.password, "password")?,
                    upi_pin: op.pin.unwrap_or_default(),
                })
                .await?;
        }
        OpKind::Deposit => {
            engine
                .deposit(
                    &required(op.identifier, "identifier")?,
                    required(op.amount, "amount")?,
                )
                .await?;
        }
        OpKind::Withdraw => {
            engine
                .withdraw(
                    &required(op.identifier, "identifier")?,
                    required(op.amount, "amount")?,
                    &required(op.pin, "pin")?,
                )
                .await?;
        }
        OpKind::AdminDeposit => {
            engine
                .admin_deposit(
                    admin_secret,
                    &required(op.account, "account")?,
                    required(op.amount, "amount")?,
                )
                .await?;
        }
    }
    Ok(())
}

fn required<T>(field: Option<T>, column: &str) -> nova_bank::error::Result<T> {
    field.ok_or_else(|| BankError::Validation(format!("missing required column: {column}")))
}

/// Logs go to stderr so stdout stays clean for the CSV output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
