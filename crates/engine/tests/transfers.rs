use std::time::Duration;

use sea_orm::{Database, DatabaseConnection};

use engine::{
    AccountDefaults, Amount, Currency, EconomyConfig, Engine, EngineError, RateLimits, TaxRate,
    TaxTable, TransferCmd, WindowLimit,
};
use migration::MigratorTrait;

async fn engine_with_config(config: EconomyConfig) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn taxed_config(bps: u32) -> EconomyConfig {
    EconomyConfig {
        tax: TaxTable::uniform(TaxRate::from_bps(bps).unwrap()),
        ..EconomyConfig::default()
    }
}

async fn funded_account(engine: &Engine, id: &str, balance: Amount) {
    engine
        .create_account_if_missing(id, &AccountDefaults::default())
        .await
        .unwrap();
    if balance.is_positive() {
        engine
            .apply_delta(id, Currency::Euro, balance)
            .await
            .unwrap();
    }
}

fn transfer_cmd(sender: &str, receiver: &str, amount: Amount) -> TransferCmd {
    TransferCmd {
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        currency: Currency::Euro,
        amount,
        description: None,
    }
}

#[tokio::test]
async fn transfer_applies_tax_and_conserves_money() {
    let (engine, _db) = engine_with_config(taxed_config(500)).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    let record = engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(10)))
        .await
        .unwrap();

    assert_eq!(record.gross.to_string(), "10.0000");
    assert_eq!(record.tax.to_string(), "0.5000");
    assert_eq!(record.net.to_string(), "9.5000");
    assert_eq!(record.gross, record.net + record.tax);

    assert_eq!(
        engine.balance("alice", Currency::Euro).await.unwrap(),
        "90.0000".parse().unwrap()
    );
    assert_eq!(
        engine.balance("bob", Currency::Euro).await.unwrap(),
        "9.5000".parse().unwrap()
    );

    let treasury = engine.treasury().await.unwrap();
    assert_eq!(treasury.funds.euro, "0.5000".parse().unwrap());
    assert_eq!(treasury.total_tax_collected.euro, "0.5000".parse().unwrap());
    assert_eq!(treasury.funds.gold, Amount::ZERO);
}

#[tokio::test]
async fn transfer_updates_counters_and_tax_audit() {
    let (engine, _db) = engine_with_config(taxed_config(500)).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(10)))
        .await
        .unwrap();

    let alice = engine.account("alice").await.unwrap();
    assert_eq!(alice.total_transactions, 1);
    assert_eq!(alice.total_volume, Amount::from_whole(10));
    assert_eq!(alice.collected_tax.transfer, "0.5000".parse().unwrap());
    assert!(alice.last_transaction_at.is_some());

    let bob = engine.account("bob").await.unwrap();
    assert_eq!(bob.total_transactions, 1);
    assert_eq!(bob.total_volume, "9.5000".parse().unwrap());
    assert_eq!(bob.collected_tax.transfer, Amount::ZERO);
}

#[tokio::test]
async fn insufficient_funds_leaves_every_balance_unchanged() {
    let (engine, _db) = engine_with_config(taxed_config(500)).await;
    funded_account(&engine, "alice", Amount::from_whole(5)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    let alice_before = engine.account("alice").await.unwrap();
    let bob_before = engine.account("bob").await.unwrap();
    let treasury_before = engine.treasury().await.unwrap();

    let err = engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(10)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("alice".to_string()));

    assert_eq!(engine.account("alice").await.unwrap(), alice_before);
    assert_eq!(engine.account("bob").await.unwrap(), bob_before);
    assert_eq!(engine.treasury().await.unwrap(), treasury_before);

    let (history, _) = engine.history("alice", None, None).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn unknown_receiver_rolls_back_the_sender_debit() {
    let (engine, _db) = engine_with_config(taxed_config(500)).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;

    let err = engine
        .transfer(transfer_cmd("alice", "ghost", Amount::from_whole(10)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownAccount("ghost".to_string()));

    // The debit ran first inside the transaction and must have been undone.
    assert_eq!(
        engine.balance("alice", Currency::Euro).await.unwrap(),
        Amount::from_whole(100)
    );
    let alice = engine.account("alice").await.unwrap();
    assert_eq!(alice.total_transactions, 0);
    assert_eq!(engine.treasury().await.unwrap().funds.euro, Amount::ZERO);
}

#[tokio::test]
async fn unknown_sender_is_rejected() {
    let (engine, _db) = engine_with_config(taxed_config(0)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    let err = engine
        .transfer(transfer_cmd("ghost", "bob", Amount::from_whole(1)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownAccount("ghost".to_string()));
}

#[tokio::test]
async fn frozen_sender_cannot_transfer_until_unfrozen() {
    let (engine, _db) = engine_with_config(taxed_config(500)).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;
    funded_account(&engine, "bob", Amount::from_whole(1)).await;

    engine.set_frozen("alice", true).await.unwrap();
    let err = engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(10)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AccountFrozen("alice".to_string()));
    assert_eq!(
        engine.balance("alice", Currency::Euro).await.unwrap(),
        Amount::from_whole(100)
    );

    // Only debits are blocked: a frozen account can still receive.
    engine
        .transfer(transfer_cmd("bob", "alice", Amount::from_whole(1)))
        .await
        .unwrap();

    engine.set_frozen("alice", false).await.unwrap();
    engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(10)))
        .await
        .unwrap();
}

#[tokio::test]
async fn same_account_transfer_is_rejected() {
    let (engine, _db) = engine_with_config(taxed_config(500)).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;

    let err = engine
        .transfer(transfer_cmd("alice", "alice", Amount::from_whole(10)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SameAccount("alice".to_string()));
}

#[tokio::test]
async fn non_positive_and_above_ceiling_amounts_are_rejected() {
    let config = EconomyConfig {
        transfer_ceiling: Amount::from_whole(50),
        ..taxed_config(500)
    };
    let (engine, _db) = engine_with_config(config).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    let err = engine
        .transfer(transfer_cmd("alice", "bob", Amount::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(51)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(
        engine.balance("alice", Currency::Euro).await.unwrap(),
        Amount::from_whole(100)
    );
}

#[tokio::test]
async fn rate_limit_rejects_after_configured_burst() {
    let config = EconomyConfig {
        limits: RateLimits {
            transfer: Some(WindowLimit {
                max_ops: 3,
                window: Duration::from_secs(60),
            }),
            query: None,
        },
        ..taxed_config(0)
    };
    let (engine, _db) = engine_with_config(config).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    for _ in 0..3 {
        engine
            .transfer(transfer_cmd("alice", "bob", Amount::from_whole(1)))
            .await
            .unwrap();
    }

    let err = engine
        .transfer(transfer_cmd("alice", "bob", Amount::from_whole(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RateLimitExceeded(_)));

    // The rejected request must not have touched any balance.
    assert_eq!(
        engine.balance("alice", Currency::Euro).await.unwrap(),
        Amount::from_whole(97)
    );
    assert_eq!(
        engine.balance("bob", Currency::Euro).await.unwrap(),
        Amount::from_whole(3)
    );

    // Other senders are unaffected.
    engine
        .transfer(transfer_cmd("bob", "alice", Amount::from_whole(1)))
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_transfers_never_overdraw_the_sender() {
    let (engine, _db) = engine_with_config(taxed_config(0)).await;
    funded_account(&engine, "alice", Amount::from_whole(10)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    // Four racing transfers of 6.0000 against a 10.0000 balance: exactly one
    // may pass the conditional debit.
    let results = tokio::join!(
        engine.transfer(transfer_cmd("alice", "bob", Amount::from_whole(6))),
        engine.transfer(transfer_cmd("alice", "bob", Amount::from_whole(6))),
        engine.transfer(transfer_cmd("alice", "bob", Amount::from_whole(6))),
        engine.transfer(transfer_cmd("alice", "bob", Amount::from_whole(6))),
    );
    let outcomes = [results.0, results.1, results.2, results.3];

    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert_eq!(*err, EngineError::InsufficientFunds("alice".to_string()));
        }
    }

    let alice = engine.balance("alice", Currency::Euro).await.unwrap();
    assert_eq!(alice, Amount::from_whole(4));
    assert!(!alice.is_negative());
    assert_eq!(
        engine.balance("bob", Currency::Euro).await.unwrap(),
        Amount::from_whole(6)
    );
}

#[tokio::test]
async fn history_pages_newest_first() {
    let (engine, _db) = engine_with_config(taxed_config(0)).await;
    funded_account(&engine, "alice", Amount::from_whole(100)).await;
    funded_account(&engine, "bob", Amount::ZERO).await;

    for amount in [1, 2, 3] {
        engine
            .transfer(transfer_cmd("alice", "bob", Amount::from_whole(amount)))
            .await
            .unwrap();
    }

    let (first_page, cursor) = engine.history("alice", Some(2), None).await.unwrap();
    assert_eq!(first_page.len(), 2);
    let cursor = cursor.expect("a third record exists");
    assert!(first_page[0].created_at >= first_page[1].created_at);
    assert_eq!(first_page[0].gross, Amount::from_whole(3));
    assert_eq!(first_page[1].gross, Amount::from_whole(2));

    let (second_page, cursor) = engine
        .history("alice", Some(2), Some(cursor.as_str()))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].gross, Amount::from_whole(1));
    assert!(cursor.is_none());

    // The receiver sees the same records.
    let (bob_history, _) = engine.history("bob", None, None).await.unwrap();
    assert_eq!(bob_history.len(), 3);

    let err = engine.history("alice", None, Some("garbage")).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn apply_delta_guards_overdraft_and_frozen_accounts() {
    let (engine, _db) = engine_with_config(taxed_config(0)).await;
    funded_account(&engine, "alice", Amount::from_whole(5)).await;

    let balance = engine
        .apply_delta("alice", Currency::Gold, Amount::from_whole(3))
        .await
        .unwrap();
    assert_eq!(balance, Amount::from_whole(3));

    let err = engine
        .apply_delta("alice", Currency::Gold, Amount::from_whole(-4))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("alice".to_string()));
    assert_eq!(
        engine.balance("alice", Currency::Gold).await.unwrap(),
        Amount::from_whole(3)
    );

    engine.set_frozen("alice", true).await.unwrap();
    let err = engine
        .apply_delta("alice", Currency::Gold, Amount::from_whole(-1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AccountFrozen("alice".to_string()));

    // Credits still land while frozen.
    engine
        .apply_delta("alice", Currency::Gold, Amount::from_whole(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_account_if_missing_is_idempotent() {
    let (engine, _db) = engine_with_config(taxed_config(0)).await;

    let created = engine
        .create_account_if_missing("alice", &AccountDefaults::default())
        .await
        .unwrap();
    assert!(created);

    engine
        .apply_delta("alice", Currency::Euro, Amount::from_whole(7))
        .await
        .unwrap();

    let created_again = engine
        .create_account_if_missing("alice", &AccountDefaults::default())
        .await
        .unwrap();
    assert!(!created_again);

    // The existing balance survived the second create.
    assert_eq!(
        engine.balance("alice", Currency::Euro).await.unwrap(),
        Amount::from_whole(7)
    );
}
