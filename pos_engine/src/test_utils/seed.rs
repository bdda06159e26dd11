use pos_common::Money;

use crate::{
    db_types::DiningTable,
    sqlite::db::tables,
    traits::NewBankTransaction,
    PosDatabase,
    SqliteDatabase,
};

/// Inserts `count` dining tables numbered 1..=count, each seating four, and returns them in table-number order.
pub async fn seed_tables(db: &SqliteDatabase, count: i64) -> Vec<DiningTable> {
    let mut conn = db.pool().acquire().await.expect("Error acquiring connection");
    let mut result = Vec::with_capacity(count as usize);
    for n in 1..=count {
        let table = tables::insert_table(n, 4, &mut conn).await.expect("Error seeding dining table");
        result.push(table);
    }
    result
}

/// Records a PENDING bank transaction with the given txid and amount, dated now.
pub async fn seed_bank_transaction(db: &SqliteDatabase, txid: &str, amount: i64) {
    let tx = NewBankTransaction::new(txid, Money::from_minor(amount));
    db.record_bank_transaction(tx).await.expect("Error seeding bank transaction");
}
