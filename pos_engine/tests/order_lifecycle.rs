use log::*;
use pos_common::Money;
use pos_engine::{
    api::objects::PaymentRequest,
    db_types::{NewOrder, NewOrderLine, OrderChannel, OrderStatus, PaymentMethod, TableRef, TableStatus, TicketStatus},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        seed::seed_tables,
    },
    CashierApi,
    KitchenApi,
    OrderFlowApi,
    OrderFlowError,
    PosDatabase,
    SqliteDatabase,
};
use tokio::runtime::Runtime;

fn staff_order(lines: Vec<NewOrderLine>) -> NewOrder {
    NewOrder::new(OrderChannel::Staff { employee_id: 1, customer_id: None }, lines)
}

fn standard_lines() -> Vec<NewOrderLine> {
    vec![
        NewOrderLine::new(1, 2, Money::from_minor(20_000)),
        NewOrderLine::new(2, 1, Money::from_minor(15_000)),
    ]
}

async fn new_db() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

#[test]
fn full_dine_in_flow() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 5).await;
        let orders = OrderFlowApi::new(db.clone());
        let kitchen = KitchenApi::new(db.clone());
        let cashier = CashierApi::new(db.clone());

        let table = &tables[4];
        let order = orders.create_order(table.id, staff_order(standard_lines())).await.expect("create failed");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Money::from_minor(55_000));

        // Opening the order occupies the table and queues a kitchen ticket.
        let occupied = db.fetch_table(TableRef::Id(table.id)).await.unwrap().unwrap();
        assert_eq!(occupied.status, TableStatus::Occupied);
        let ticket = kitchen.ticket_for_order(order.id).await.expect("no ticket queued");
        assert_eq!(ticket.status, TicketStatus::Waiting);

        // Kitchen progress is mirrored onto the order.
        kitchen.start_preparing(ticket.id).await.expect("start failed");
        let current = orders.fetch_order(order.id).await.unwrap();
        assert_eq!(current.status, OrderStatus::Preparing);
        kitchen.mark_ready(ticket.id).await.expect("ready failed");
        let current = orders.fetch_order(order.id).await.unwrap();
        assert_eq!(current.status, OrderStatus::Ready);

        orders.update_order_status(order.id, "delivered").await.expect("deliver failed");

        // 55,000 subtotal plus 10% tax and 5% service charge is 63,250; 70,000 cash gives 6,750 change.
        let request = PaymentRequest::new(order.id, PaymentMethod::Cash, Money::from_minor(70_000)).with_cashier(9);
        let receipt = cashier.process_payment(request).await.expect("payment failed");
        assert_eq!(receipt.breakdown.subtotal, Money::from_minor(55_000));
        assert_eq!(receipt.breakdown.total, Money::from_minor(63_250));
        assert_eq!(receipt.change, Money::from_minor(6_750));
        assert_eq!(receipt.order.status, OrderStatus::Paid);

        // Settlement releases the table and completes the ticket.
        let table = db.fetch_table(TableRef::Id(table.id)).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available);
        let ticket = kitchen.fetch_ticket(ticket.id).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Completed);
        info!("🚀️ full dine-in flow complete");
    });
}

#[test]
fn table_side_orders_use_the_printed_number() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        seed_tables(&db, 3).await;
        let orders = OrderFlowApi::new(db.clone());

        let new_order = NewOrder::new(
            OrderChannel::TableSide { customer_name: "Lan".to_string() },
            vec![NewOrderLine::new(10, 1, Money::from_minor(45_000))],
        );
        let order = orders.create_public_order(2, new_order).await.expect("public order failed");
        assert_eq!(order.customer_name.as_deref(), Some("Lan"));
        assert_eq!(order.employee_id, None);

        let err = orders.create_public_order(99, staff_order(standard_lines())).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::TableNotFound(TableRef::Number(99))));
    });
}

#[test]
fn cancellation_is_guarded_by_status() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 2).await;
        let orders = OrderFlowApi::new(db.clone());
        let kitchen = KitchenApi::new(db.clone());

        // A delivered order can no longer be cancelled.
        let order = orders.create_order(tables[0].id, staff_order(standard_lines())).await.unwrap();
        orders.update_order_status(order.id, "DELIVERED").await.unwrap();
        let err = orders.cancel_order(order.id).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidStateTransition(_)));

        // A pending order can: the ticket is voided and the table freed.
        let order = orders.create_order(tables[1].id, staff_order(standard_lines())).await.unwrap();
        let change = orders.cancel_order(order.id).await.expect("cancel failed");
        assert_eq!(change.previous_status, OrderStatus::Pending);
        assert_eq!(change.new_status, OrderStatus::Cancelled);
        let ticket = kitchen.ticket_for_order(order.id).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Cancelled);
        let table = db.fetch_table(TableRef::Id(tables[1].id)).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available);

        let err = orders.cancel_order(9999).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::OrderNotFound(9999)));
    });
}

#[test]
fn the_kitchen_cannot_void_a_ticket_directly() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 1).await;
        let orders = OrderFlowApi::new(db.clone());
        let kitchen = KitchenApi::new(db);

        let order = orders.create_order(tables[0].id, staff_order(standard_lines())).await.unwrap();
        let ticket = kitchen.ticket_for_order(order.id).await.unwrap();

        // Voiding is reserved for the order-cancellation flow; the kitchen display cannot reach it.
        let err = kitchen.set_ticket_status(ticket.id, "cancelled").await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidStatus(_)));
        let ticket = kitchen.fetch_ticket(ticket.id).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Waiting);

        // Cancelling the order is still the one path that voids the ticket.
        orders.cancel_order(order.id).await.expect("cancel failed");
        let ticket = kitchen.fetch_ticket(ticket.id).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Cancelled);
    });
}

#[test]
fn unknown_status_values_are_rejected() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 1).await;
        let orders = OrderFlowApi::new(db.clone());
        let order = orders.create_order(tables[0].id, staff_order(standard_lines())).await.unwrap();
        let err = orders.update_order_status(order.id, "SHIPPED").await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InvalidStatus(_)));
    });
}

#[test]
fn table_stays_occupied_while_another_order_is_live() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let db = new_db().await;
        let tables = seed_tables(&db, 1).await;
        let orders = OrderFlowApi::new(db.clone());
        let cashier = CashierApi::new(db.clone());

        let first = orders.create_order(tables[0].id, staff_order(standard_lines())).await.unwrap();
        let second = orders
            .create_order(tables[0].id, staff_order(vec![NewOrderLine::new(3, 1, Money::from_minor(30_000))]))
            .await
            .unwrap();

        let request = PaymentRequest::new(first.id, PaymentMethod::Cash, Money::from_minor(100_000));
        cashier.process_payment(request).await.expect("payment failed");
        let table = db.fetch_table(TableRef::Id(tables[0].id)).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        orders.cancel_order(second.id).await.expect("cancel failed");
        let table = db.fetch_table(TableRef::Id(tables[0].id)).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available);
    });
}
