use pos_common::Money;
use pos_engine::{
    api::objects::PaymentRequest,
    db_types::{BankTxStatus, NewOrder, NewOrderLine, Order, OrderChannel, PaymentMethod},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::{seed_bank_transaction, seed_tables},
    },
    BankFeedApi,
    CashierApi,
    NewBankTransaction,
    OrderFlowApi,
    OrderFlowError,
    SqliteDatabase,
};
use tokio::runtime::Runtime;

async fn new_db() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

/// Opens an order whose bill (subtotal + 10% tax + 5% service charge) comes to 63,250.
async fn open_order_on(db: &SqliteDatabase, table_id: i64) -> Order {
    let order = NewOrder::new(
        OrderChannel::Staff { employee_id: 1, customer_id: None },
        vec![NewOrderLine::new(1, 1, Money::from_minor(55_000))],
    );
    OrderFlowApi::new(db.clone()).create_order(table_id, order).await.expect("Error opening order")
}

#[test]
fn verification_matches_within_the_tolerance() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        seed_bank_transaction(&db, "FT1001", 60_000).await;
        let bank = BankFeedApi::new(db);

        // 3,250 away from the expected amount is a match; 7,000 away is not.
        let tx = bank.verify("FT1001", Money::from_minor(63_250)).await.expect("verify failed");
        assert_eq!(tx.status, BankTxStatus::Pending);
        assert_eq!(tx.used_for_order_id, None);

        let err = bank.verify("FT1001", Money::from_minor(67_000)).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::AmountMismatch { .. }));

        let err = bank.verify("FT9999", Money::from_minor(63_250)).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::TransactionNotFound(txid) if txid == "FT9999"));
    });
}

#[test]
fn recording_the_same_txid_twice_fails() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let bank = BankFeedApi::new(db);
        let tx = NewBankTransaction::new("FT2001", Money::from_minor(10_000)).with_description("chuyen khoan ban 5");
        bank.record_transaction(tx.clone()).await.expect("record failed");
        let err = bank.record_transaction(tx).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::DatabaseError(_)));
    });
}

#[test]
fn a_transaction_pays_for_at_most_one_order() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 2).await;
        seed_bank_transaction(&db, "FT3001", 63_250).await;
        let first = open_order_on(&db, tables[0].id).await;
        let second = open_order_on(&db, tables[1].id).await;
        let cashier = CashierApi::new(db.clone());
        let bank = BankFeedApi::new(db);

        let request = PaymentRequest::new(first.id, PaymentMethod::BankTransfer, Money::from_minor(63_250))
            .with_bank_txid("FT3001");
        let receipt = cashier.process_payment(request).await.expect("transfer payment failed");
        assert_eq!(receipt.change, Money::zero());

        // The settlement consumed the transaction: VERIFIED and bound to the first order.
        let tx = bank.fetch_transaction("FT3001").await.unwrap();
        assert_eq!(tx.status, BankTxStatus::Verified);
        assert_eq!(tx.used_for_order_id, Some(first.id));

        let request = PaymentRequest::new(second.id, PaymentMethod::BankTransfer, Money::from_minor(63_250))
            .with_bank_txid("FT3001");
        let err = cashier.process_payment(request).await.unwrap_err();
        assert!(
            matches!(err, OrderFlowError::TransactionAlreadyUsed { order_id, .. } if order_id == first.id),
            "Expected TransactionAlreadyUsed, got {err}"
        );
    });
}

#[test]
fn transfer_payments_require_a_transaction_id() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 1).await;
        let order = open_order_on(&db, tables[0].id).await;
        let cashier = CashierApi::new(db);

        let request = PaymentRequest::new(order.id, PaymentMethod::QrCode, Money::from_minor(63_250));
        let err = cashier.process_payment(request).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::BankTransactionRequired(PaymentMethod::QrCode)));
    });
}

#[test]
fn mismatched_transfers_never_settle_the_order() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 1).await;
        seed_bank_transaction(&db, "FT4001", 50_000).await;
        let order = open_order_on(&db, tables[0].id).await;
        let cashier = CashierApi::new(db.clone());
        let bank = BankFeedApi::new(db.clone());

        let request = PaymentRequest::new(order.id, PaymentMethod::BankTransfer, Money::from_minor(63_250))
            .with_bank_txid("FT4001");
        let err = cashier.process_payment(request).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::AmountMismatch { .. }));

        // The failed attempt left both the order and the transaction untouched.
        let current = OrderFlowApi::new(db).fetch_order(order.id).await.unwrap();
        assert_eq!(current.status, order.status);
        let tx = bank.fetch_transaction("FT4001").await.unwrap();
        assert_eq!(tx.status, BankTxStatus::Pending);
        assert_eq!(tx.used_for_order_id, None);
    });
}
