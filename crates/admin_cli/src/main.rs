use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{AccountDefaults, Amount, Currency, EconomyConfig, Engine};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "vistier_admin")]
#[command(about = "Admin utilities for the vistier economy (bootstrap accounts, backfill)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./vistier.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    Treasury(Treasury),
    Backfill(Backfill),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Create an account with zeroed balances unless it already exists.
    Create(AccountCreateArgs),
    /// Credit (or with a negative amount, debit) one currency balance.
    Credit(AccountCreditArgs),
    Freeze(AccountIdArgs),
    Unfreeze(AccountIdArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct AccountCreditArgs {
    #[arg(long)]
    id: String,
    #[arg(long, default_value = "EURO", value_parser = parse_currency)]
    currency: Currency,
    /// Signed scale-4 amount, e.g. "250.0000" or "-10.5000".
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
}

#[derive(Args, Debug)]
struct AccountIdArgs {
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct Treasury {
    #[command(subcommand)]
    command: TreasuryCommand,
}

#[derive(Subcommand, Debug)]
enum TreasuryCommand {
    Show,
}

#[derive(Args, Debug)]
struct Backfill {
    #[command(subcommand)]
    command: BackfillCommand,
}

#[derive(Subcommand, Debug)]
enum BackfillCommand {
    /// Fill missing default fields on every account lacking them.
    ///
    /// Idempotent: a second run reports `modified = 0`.
    Run(BackfillRunArgs),
}

#[derive(Args, Debug)]
struct BackfillRunArgs {
    /// Default balance written into absent balance fields.
    #[arg(long, default_value = "0.0000")]
    balance: String,
    /// Default written into absent collected-tax fields.
    #[arg(long, default_value = "0.0000")]
    collected_tax: String,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let engine = Engine::builder()
        .database(db)
        .config(EconomyConfig::default())
        .build()
        .await?;

    match cli.command {
        Command::Account(account) => match account.command {
            AccountCommand::Create(args) => {
                let created = engine
                    .create_account_if_missing(&args.id, &AccountDefaults::default())
                    .await?;
                if created {
                    println!("account {} created", args.id);
                } else {
                    println!("account {} already exists", args.id);
                }
            }
            AccountCommand::Credit(args) => {
                let delta: Amount = args.amount.parse()?;
                let balance = engine.apply_delta(&args.id, args.currency, delta).await?;
                println!(
                    "account {}: {} balance is now {}",
                    args.id, args.currency, balance
                );
            }
            AccountCommand::Freeze(args) => {
                engine.set_frozen(&args.id, true).await?;
                println!("account {} frozen", args.id);
            }
            AccountCommand::Unfreeze(args) => {
                engine.set_frozen(&args.id, false).await?;
                println!("account {} unfrozen", args.id);
            }
        },
        Command::Treasury(treasury) => match treasury.command {
            TreasuryCommand::Show => {
                let snapshot = engine.treasury().await?;
                for currency in Currency::ALL {
                    println!(
                        "{}: funds {}, total tax collected {}",
                        currency,
                        snapshot.funds.get(currency),
                        snapshot.total_tax_collected.get(currency)
                    );
                }
            }
        },
        Command::Backfill(backfill) => match backfill.command {
            BackfillCommand::Run(args) => {
                let defaults = AccountDefaults {
                    balance: args.balance.parse()?,
                    collected_tax: args.collected_tax.parse()?,
                };
                let report = engine.run_backfill(&defaults).await?;
                println!(
                    "backfill: matched {}, modified {}, still missing {}",
                    report.matched, report.modified, report.remaining
                );
            }
        },
    }

    Ok(())
}
