//! 业务服务集成测试

use chrono::NaiveDate;
use pos_client::models::order::{CheckoutItem, CheckoutRequest, OrderStatus, PaymentMethod};
use pos_client::models::product::ProductInput;
use pos_client::models::report::ReportRange;
use pos_client::models::user::CreateUserRequest;
use pos_client::ClientError;
use reqwest::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_test_client, jwt_expiring_in, store_with, MockTransport, Reply};

fn signed_in_client(transport: std::sync::Arc<MockTransport>) -> pos_client::PosClient {
    create_test_client(store_with(&jwt_expiring_in(3600), "refresh-1"), transport)
}

fn order_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "items": [{ "product": 1, "product_name": "Masala Chai", "quantity": 2, "price": "20.00" }],
        "total": "40.00",
        "status": status,
        "payment_method": "upi",
        "created_at": "2026-10-16T08:15:00Z"
    })
}

#[tokio::test]
async fn test_products_list_parses_decimal_strings() {
    let transport = MockTransport::new(|_| {
        Reply::json(
            200,
            json!([
                { "id": 1, "name": "Masala Chai", "price": "20.00", "category": "Beverages" },
                { "id": 2, "name": "Samosa", "price": 15, "is_available": false }
            ]),
        )
    });
    let client = signed_in_client(transport.clone());

    let products = client.products().list().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].price, 20.0);
    assert_eq!(products[0].category.as_deref(), Some("Beverages"));
    assert!(products[0].is_available);
    assert_eq!(products[1].price, 15.0);
    assert!(!products[1].is_available);
    assert_eq!(transport.requests()[0].path, "/products/");
}

#[tokio::test]
async fn test_invalid_product_is_not_sent() {
    let transport = MockTransport::new(|_| Reply::status(201));
    let client = signed_in_client(transport.clone());

    let input = ProductInput {
        name: "Broken".to_string(),
        price: -1.0,
        category: None,
        is_available: true,
    };
    let err = client.products().create(&input).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn test_product_update_uses_put_on_detail_path() {
    let transport = MockTransport::new(|_| {
        Reply::json(200, json!({ "id": 3, "name": "Vada Pav", "price": "25.00" }))
    });
    let client = signed_in_client(transport.clone());

    let input = ProductInput {
        name: "Vada Pav".to_string(),
        price: 25.0,
        category: None,
        is_available: true,
    };
    let product = client.products().update(3, &input).await.unwrap();

    assert_eq!(product.id, 3);
    let req = &transport.requests()[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.path, "/products/3/");
    assert_eq!(
        req.body,
        Some(json!({ "name": "Vada Pav", "price": 25.0, "is_available": true }))
    );
}

#[tokio::test]
async fn test_product_delete_accepts_no_content() {
    let transport = MockTransport::new(|_| Reply::status(204));
    let client = signed_in_client(transport.clone());

    client.products().delete(9).await.unwrap();

    let req = &transport.requests()[0];
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.path, "/products/9/");
}

#[tokio::test]
async fn test_missing_product_maps_to_upstream_error() {
    let transport = MockTransport::new(|_| Reply::json(404, json!({ "detail": "Not found." })));
    let client = signed_in_client(transport);

    match client.products().get(404).await.unwrap_err() {
        ClientError::Upstream { status, detail } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(detail, "Not found.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_low_stock_filter() {
    let transport = MockTransport::new(|_| {
        Reply::json(
            200,
            json!([
                { "id": 1, "product": 1, "product_name": "Milk", "quantity": "2.500", "reorder_level": "5.000" },
                { "id": 2, "product": 2, "product_name": "Sugar", "quantity": "40.000", "reorder_level": "10.000" },
                { "id": 3, "product": 3, "product_name": "Tea leaves", "quantity": 3, "reorder_level": 3 }
            ]),
        )
    });
    let client = signed_in_client(transport);

    let low = client.stock().low_stock().await.unwrap();
    let names: Vec<_> = low.iter().filter_map(|i| i.product_name.as_deref()).collect();
    assert_eq!(names, vec!["Milk", "Tea leaves"]);
}

#[tokio::test]
async fn test_stock_update_rejects_negative_quantity() {
    let transport = MockTransport::new(|_| Reply::status(200));
    let client = signed_in_client(transport.clone());

    let err = client.stock().set_quantity(1, -5.0).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn test_stock_update_patches_quantity() {
    let transport = MockTransport::new(|_| {
        Reply::json(200, json!({ "id": 1, "product": 1, "quantity": "12.000" }))
    });
    let client = signed_in_client(transport.clone());

    let item = client.stock().set_quantity(1, 12.0).await.unwrap();
    assert_eq!(item.quantity, 12.0);

    let req = &transport.requests()[0];
    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.path, "/stock/1/");
    assert_eq!(req.body, Some(json!({ "quantity": 12.0 })));
}

#[tokio::test]
async fn test_checkout_posts_items() {
    let transport = MockTransport::new(|_| Reply::json(201, order_json(41, "pending")));
    let client = signed_in_client(transport.clone());

    let order = client
        .orders()
        .checkout(&CheckoutRequest {
            items: vec![CheckoutItem {
                product: 1,
                quantity: 2,
            }],
            payment_method: PaymentMethod::Upi,
        })
        .await
        .unwrap();

    assert_eq!(order.id, 41);
    assert_eq!(order.total, 40.0);
    assert_eq!(order.status, OrderStatus::Pending);

    let req = &transport.requests()[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/orders/");
    assert_eq!(
        req.body,
        Some(json!({ "items": [{ "product": 1, "quantity": 2 }], "payment_method": "upi" }))
    );
}

#[tokio::test]
async fn test_empty_checkout_is_rejected_locally() {
    let transport = MockTransport::new(|_| Reply::status(201));
    let client = signed_in_client(transport.clone());

    let err = client
        .orders()
        .checkout(&CheckoutRequest {
            items: vec![],
            payment_method: PaymentMethod::Cash,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn test_checkout_insufficient_stock_detail() {
    let transport = MockTransport::new(|_| {
        Reply::json(400, json!({ "detail": "Insufficient stock for Samosa" }))
    });
    let client = signed_in_client(transport);

    let err = client
        .orders()
        .checkout(&CheckoutRequest {
            items: vec![CheckoutItem {
                product: 2,
                quantity: 50,
            }],
            payment_method: PaymentMethod::Cash,
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Insufficient stock for Samosa");
}

#[tokio::test]
async fn test_orders_status_filter_query() {
    let transport = MockTransport::new(|_| Reply::json(200, json!([order_json(1, "ready")])));
    let client = signed_in_client(transport.clone());

    let orders = client.orders().list(Some(OrderStatus::Ready)).await.unwrap();

    assert_eq!(orders.len(), 1);
    let req = &transport.requests()[0];
    assert_eq!(req.path, "/orders/");
    assert_eq!(req.query.as_deref(), Some("status=ready"));
}

#[tokio::test]
async fn test_kitchen_board_hides_finished_orders() {
    let transport = MockTransport::new(|_| {
        Reply::json(
            200,
            json!([
                order_json(1, "pending"),
                order_json(2, "completed"),
                order_json(3, "preparing"),
                order_json(4, "cancelled"),
                order_json(5, "ready")
            ]),
        )
    });
    let client = signed_in_client(transport);

    let board = client.orders().kitchen_board().await.unwrap();
    let ids: Vec<_> = board.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_advance_order_patches_next_status() {
    let transport = MockTransport::new(|_| Reply::json(200, order_json(7, "preparing")));
    let client = signed_in_client(transport.clone());

    let current: pos_client::models::order::Order =
        serde_json::from_value(order_json(7, "pending")).unwrap();
    let updated = client.orders().advance(&current).await.unwrap();

    assert_eq!(updated.status, OrderStatus::Preparing);
    let req = &transport.requests()[0];
    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.path, "/orders/7/");
    assert_eq!(req.body, Some(json!({ "status": "preparing" })));
}

#[tokio::test]
async fn test_advance_terminal_order_fails_without_request() {
    let transport = MockTransport::new(|_| Reply::status(200));
    let client = signed_in_client(transport.clone());

    let done: pos_client::models::order::Order =
        serde_json::from_value(order_json(8, "completed")).unwrap();
    let err = client.orders().advance(&done).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(transport.total(), 0);
}

#[tokio::test]
async fn test_sales_report_query_and_parse() {
    let transport = MockTransport::new(|_| {
        Reply::json(
            200,
            json!({
                "total_sales": "1250.50",
                "total_orders": 25,
                "top_products": [{ "product_name": "Masala Chai", "quantity": 80, "revenue": "1600.00" }],
                "daily_sales": [{ "date": "2026-10-01", "total": "600.25", "orders": 12 }]
            }),
        )
    });
    let client = signed_in_client(transport.clone());

    let range = ReportRange::new(
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 10, 7).unwrap(),
    )
    .unwrap();
    let report = client.reports().sales(range).await.unwrap();

    assert_eq!(report.total_sales, 1250.5);
    assert_eq!(report.total_orders, 25);
    assert_eq!(report.top_products[0].revenue, 1600.0);
    assert_eq!(report.daily_sales[0].orders, 12);
    assert!((report.average_order_value() - 50.02).abs() < 1e-9);

    let req = &transport.requests()[0];
    assert_eq!(req.path, "/reports/sales/");
    assert_eq!(req.query.as_deref(), Some("start=2026-10-01&end=2026-10-07"));
}

#[tokio::test]
async fn test_create_user_validates_and_posts() {
    let transport = MockTransport::new(|_| {
        Reply::json(201, json!({ "id": 11, "username": "cashier2", "role": "cashier" }))
    });
    let client = signed_in_client(transport.clone());

    let short = CreateUserRequest {
        username: "cashier2".to_string(),
        password: "short".to_string(),
        role: "cashier".to_string(),
    };
    assert!(matches!(
        client.users().create(&short).await.unwrap_err(),
        ClientError::Validation(_)
    ));
    assert_eq!(transport.total(), 0);

    let valid = CreateUserRequest {
        password: "long-enough-pass".to_string(),
        ..short
    };
    let user = client.users().create(&valid).await.unwrap();
    assert_eq!(user.id, 11);
    assert_eq!(transport.requests()[0].path, "/users/");
}

#[tokio::test]
async fn test_services_require_session() {
    let store = std::sync::Arc::new(pos_client::session::MemorySessionStore::new());
    let transport = MockTransport::new(|_| Reply::json(200, json!([])));
    let client = create_test_client(store, transport.clone());

    let err = client.users().list().await.unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(transport.total(), 0);
}
