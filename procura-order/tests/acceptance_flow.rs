use procura_catalog::{CatalogRepository, Product, ProductSupplier, Supplier};
use procura_order::{
    AcceptanceError, FinancialReporter, MemoryStore, Order, OrderMaterializer, OrderRepository,
    OrderStatus, OrderStatusManager, PaymentLedger,
};
use procura_quote::request::RequestStatus;
use procura_quote::{
    QuoteBuilder, QuoteError, QuoteLine, QuoteRepository, QuoteStatus, RequestIntake, RequestLine,
    RequestRepository,
};
use procura_shared::Actor;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    store: Arc<MemoryStore>,
    intake: RequestIntake,
    builder: QuoteBuilder,
    materializer: Arc<OrderMaterializer>,
    ledger: PaymentLedger,
    manager: OrderStatusManager,
    reporter: FinancialReporter,
    monitor: Product,
    cable: Product,
    supplier_a: Supplier,
    supplier_b: Supplier,
    link_monitor_a: ProductSupplier,
    link_cable_b: ProductSupplier,
}

/// Two products sourced from two suppliers:
///   monitor via supplier A: cost 10, quoted at 15
///   cable via supplier B:   cost 5, quoted at 8
fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());

    let monitor = Product::new("27in monitor".to_string(), None, Some("display".to_string()));
    let cable = Product::new("HDMI cable".to_string(), None, Some("accessory".to_string()));
    let supplier_a = Supplier::new("Alpha Components".to_string());
    let supplier_b = Supplier::new("Bline Trading".to_string());
    let link_monitor_a = ProductSupplier::new(
        monitor.id,
        supplier_a.id,
        Decimal::from(10),
        Decimal::from(14),
    );
    let link_cable_b = ProductSupplier::new(
        cable.id,
        supplier_b.id,
        Decimal::from(5),
        Decimal::from(7),
    );

    store.insert_product(monitor.clone());
    store.insert_product(cable.clone());
    store.insert_supplier(supplier_a.clone());
    store.insert_supplier(supplier_b.clone());
    store.insert_link(link_monitor_a.clone());
    store.insert_link(link_cable_b.clone());

    Fixture {
        intake: RequestIntake::new(store.clone(), store.clone()),
        builder: QuoteBuilder::new(store.clone(), store.clone(), store.clone()),
        materializer: Arc::new(OrderMaterializer::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        ledger: PaymentLedger::new(store.clone(), store.clone()),
        manager: OrderStatusManager::new(store.clone()),
        reporter: FinancialReporter::new(store.clone(), store.clone()),
        store,
        monitor,
        cable,
        supplier_a,
        supplier_b,
        link_monitor_a,
        link_cable_b,
    }
}

async fn quoted_request(fx: &Fixture) -> (Uuid, Uuid) {
    let customer = Uuid::new_v4();
    let request = fx
        .intake
        .submit(
            customer,
            Some("office refresh".to_string()),
            vec![
                RequestLine {
                    product_id: fx.monitor.id,
                    quantity: 3,
                },
                RequestLine {
                    product_id: fx.cable.id,
                    quantity: 2,
                },
            ],
        )
        .await
        .unwrap();

    let draft = fx
        .builder
        .draft(
            request.id,
            &Actor::admin(Uuid::new_v4()),
            vec![
                QuoteLine {
                    product_id: fx.monitor.id,
                    product_supplier_id: fx.link_monitor_a.id,
                    quantity: 3,
                    quoted_price: Decimal::from(15),
                },
                QuoteLine {
                    product_id: fx.cable.id,
                    product_supplier_id: fx.link_cable_b.id,
                    quantity: 2,
                    quoted_price: Decimal::from(8),
                },
            ],
        )
        .await
        .unwrap();

    (request.id, draft.quote.id)
}

#[tokio::test]
async fn drafting_totals_and_request_transition() {
    let fx = fixture();
    let (request_id, quote_id) = quoted_request(&fx).await;

    let quote = fx.store.get_quote(quote_id).await.unwrap().unwrap();
    // 3 x 15 + 2 x 8
    assert_eq!(quote.total_amount, Decimal::from(61));
    assert_eq!(quote.status, QuoteStatus::Sent);

    let request = fx.store.get_request(request_id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Quoted);

    let request_items = fx.store.list_request_items(request_id).await.unwrap();
    assert_eq!(request_items.len(), 2);
    assert!(request_items
        .iter()
        .any(|item| item.product_id == fx.monitor.id && item.quantity == 3));
}

#[tokio::test]
async fn drafting_rejects_bad_lines() {
    let fx = fixture();
    let customer = Uuid::new_v4();
    let request = fx
        .intake
        .submit(
            customer,
            None,
            vec![RequestLine {
                product_id: fx.monitor.id,
                quantity: 1,
            }],
        )
        .await
        .unwrap();
    let admin = Actor::admin(Uuid::new_v4());

    // Unknown link.
    let err = fx
        .builder
        .draft(
            request.id,
            &admin,
            vec![QuoteLine {
                product_id: fx.monitor.id,
                product_supplier_id: Uuid::new_v4(),
                quantity: 1,
                quoted_price: Decimal::from(15),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuoteError::UnknownLink(_)));

    // Link pointing at a different product.
    let err = fx
        .builder
        .draft(
            request.id,
            &admin,
            vec![QuoteLine {
                product_id: fx.monitor.id,
                product_supplier_id: fx.link_cable_b.id,
                quantity: 1,
                quoted_price: Decimal::from(15),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuoteError::LinkMismatch { .. }));

    // Non-positive quantity and price.
    let err = fx
        .builder
        .draft(
            request.id,
            &admin,
            vec![QuoteLine {
                product_id: fx.monitor.id,
                product_supplier_id: fx.link_monitor_a.id,
                quantity: 0,
                quoted_price: Decimal::from(15),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuoteError::InvalidQuantity(_)));

    // Customers cannot quote.
    let err = fx
        .builder
        .draft(request.id, &Actor::customer(customer), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, QuoteError::Forbidden));
}

#[tokio::test]
async fn acceptance_materializes_one_order_per_supplier() {
    let fx = fixture();
    let (request_id, quote_id) = quoted_request(&fx).await;

    let orders = fx.materializer.accept_quote(quote_id).await.unwrap();
    assert_eq!(orders.len(), 2);

    let by_supplier = |id: Uuid| -> &Order {
        orders
            .iter()
            .find(|order| order.supplier_id == id)
            .expect("order for supplier")
    };

    let order_a = by_supplier(fx.supplier_a.id);
    assert_eq!(order_a.total_cost, Decimal::from(30));
    assert_eq!(order_a.total_sell, Decimal::from(45));
    assert_eq!(order_a.profit, Decimal::from(15));

    let order_b = by_supplier(fx.supplier_b.id);
    assert_eq!(order_b.total_cost, Decimal::from(10));
    assert_eq!(order_b.total_sell, Decimal::from(16));
    assert_eq!(order_b.profit, Decimal::from(6));

    for order in &orders {
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quote_id, quote_id);
        // Every order maps to a real supplier record.
        let supplier = fx.store.get_supplier(order.supplier_id).await.unwrap();
        assert!(supplier.is_some());

        // Item snapshots add up to the order totals.
        let items = fx.store.list_order_items(order.id).await.unwrap();
        let sell: Decimal = items.iter().map(|item| item.subtotal).sum();
        let cost: Decimal = items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.cost_price)
            .sum();
        assert_eq!(sell, order.total_sell);
        assert_eq!(cost, order.total_cost);
    }

    // Source quote and request both flipped.
    let quote = fx.store.get_quote(quote_id).await.unwrap().unwrap();
    assert_eq!(quote.status, QuoteStatus::Accepted);
    let request = fx.store.get_request(request_id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Accepted);
}

#[tokio::test]
async fn snapshots_survive_catalog_price_changes() {
    let fx = fixture();
    let (_, quote_id) = quoted_request(&fx).await;
    let orders = fx.materializer.accept_quote(quote_id).await.unwrap();

    // Repricing the link after acceptance must not touch the order.
    let mut repriced = fx.link_monitor_a.clone();
    repriced.cost_price = Decimal::from(99);
    fx.store.insert_link(repriced);

    let order_a = orders
        .iter()
        .find(|order| order.supplier_id == fx.supplier_a.id)
        .unwrap();
    let items = fx.store.list_order_items(order_a.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].cost_price, Decimal::from(10));
    assert_eq!(items[0].sell_price, Decimal::from(15));
}

#[tokio::test]
async fn re_acceptance_is_rejected() {
    let fx = fixture();
    let (_, quote_id) = quoted_request(&fx).await;

    fx.materializer.accept_quote(quote_id).await.unwrap();
    let err = fx.materializer.accept_quote(quote_id).await.unwrap_err();
    assert!(matches!(err, AcceptanceError::AlreadyAccepted(_)));
    assert_eq!(fx.store.order_count(), 2);
}

#[tokio::test]
async fn concurrent_acceptance_materializes_exactly_once() {
    let fx = fixture();
    let (_, quote_id) = quoted_request(&fx).await;

    let left = fx.materializer.clone();
    let right = fx.materializer.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { left.accept_quote(quote_id).await }),
        tokio::spawn(async move { right.accept_quote(quote_id).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let oks = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(oks, 1, "exactly one acceptance may win");
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(
                err,
                AcceptanceError::Conflict(_) | AcceptanceError::AlreadyAccepted(_)
            ));
        }
    }
    assert_eq!(fx.store.order_count(), 2);
}

#[tokio::test]
async fn unresolvable_item_blocks_every_order() {
    let fx = fixture();
    let (_, quote_id) = quoted_request(&fx).await;

    // One of the two links vanishes before acceptance.
    fx.store.remove_link(fx.link_cable_b.id);

    let err = fx.materializer.accept_quote(quote_id).await.unwrap_err();
    assert!(matches!(err, AcceptanceError::Resolution(_)));
    // All-or-nothing: not even the resolvable supplier's order exists.
    assert_eq!(fx.store.order_count(), 0);
    let quote = fx.store.get_quote(quote_id).await.unwrap().unwrap();
    assert_eq!(quote.status, QuoteStatus::Sent);
}

#[tokio::test]
async fn payments_then_completion_feed_the_summary() {
    let fx = fixture();
    let (_, quote_id) = quoted_request(&fx).await;
    let orders = fx.materializer.accept_quote(quote_id).await.unwrap();
    let admin = Actor::admin(Uuid::new_v4());

    let order_a = orders
        .iter()
        .find(|order| order.supplier_id == fx.supplier_a.id)
        .unwrap();
    let order_b = orders
        .iter()
        .find(|order| order.supplier_id == fx.supplier_b.id)
        .unwrap();

    fx.ledger
        .record_payment(order_a.id, Decimal::from(30), "bank_transfer", None, &admin)
        .await
        .unwrap();
    assert_eq!(
        fx.ledger.remaining_balance(order_a.id).await.unwrap(),
        Decimal::from(15)
    );

    fx.manager.set_tracking(order_a.id, "VTP-7781").await.unwrap();
    fx.manager
        .set_status(order_a.id, OrderStatus::Completed)
        .await
        .unwrap();

    let summary = fx.reporter.summarize().await.unwrap();
    // Only order A is completed: revenue 45, profit 15.
    assert_eq!(summary.completed_orders, 1);
    assert_eq!(summary.total_revenue, Decimal::from(45));
    assert_eq!(summary.total_profit, Decimal::from(15));
    // Outstanding spans both orders: (45 - 30) + (16 - 0).
    assert_eq!(summary.total_outstanding, Decimal::from(31));
    assert_eq!(
        fx.ledger.remaining_balance(order_b.id).await.unwrap(),
        Decimal::from(16)
    );
}
