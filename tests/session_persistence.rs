//! Cart snapshot persistence across session restarts.

use std::sync::Arc;

use rust_decimal::Decimal;
use testresult::TestResult;

use vitrine::api::MockOrdersApi;
use vitrine::checkout::Session;
use vitrine::orders::{Customer, OrderReceipt};
use vitrine::products::{Product, ProductId};
use vitrine::storage::JsonFileStorage;

fn product(id: &str, stock: u32) -> Product {
    Product {
        id: ProductId::from(id),
        slug: format!("product-{id}"),
        title: format!("Product {id}"),
        price: Decimal::new(12_50, 2),
        compare_at_price: None,
        image: None,
        stock,
    }
}

fn customer() -> Customer {
    Customer {
        name: "Ada".to_owned(),
        phone: "0700000000".to_owned(),
        ..Customer::default()
    }
}

fn no_orders() -> Arc<MockOrdersApi> {
    let mut orders = MockOrdersApi::new();
    orders.expect_create_order().times(0);

    Arc::new(orders)
}

#[tokio::test]
async fn cart_survives_a_session_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(JsonFileStorage::new(dir.path()));
    let product = product("a", 10);

    {
        let session = Session::new(no_orders(), storage.clone());
        session.add_to_cart(&product, 3)?;
    }

    let restored = Session::restore(no_orders(), storage);

    assert_eq!(restored.cart().quantity_of(&product.id), 3);
    assert_eq!(
        restored.stock_delta(&product.id),
        -3,
        "restored lines must re-seed the ledger"
    );
    assert_eq!(restored.available(&product), 7);

    Ok(())
}

#[tokio::test]
async fn restore_without_a_snapshot_starts_empty() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(JsonFileStorage::new(dir.path()));

    let session = Session::restore(no_orders(), storage);

    assert!(session.cart().is_empty());

    Ok(())
}

#[tokio::test]
async fn corrupt_snapshot_degrades_to_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(JsonFileStorage::new(dir.path()));

    std::fs::write(storage.path(), "definitely not json")?;

    let session = Session::restore(no_orders(), storage);

    assert!(session.cart().is_empty());

    Ok(())
}

#[tokio::test]
async fn successful_buy_now_is_reflected_after_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(JsonFileStorage::new(dir.path()));
    let kept = product("kept", 10);
    let bought = product("bought", 10);

    {
        let mut orders = MockOrdersApi::new();
        orders.expect_create_order().times(1).returning(|_| {
            Ok(OrderReceipt {
                ok: true,
                order_id: Some("o-1".to_owned()),
                order_number: None,
            })
        });

        let session = Session::new(Arc::new(orders), storage.clone());
        session.add_to_cart(&kept, 1)?;
        session.buy_now(&bought, 2, customer()).await?;
    }

    let restored = Session::restore(no_orders(), storage);

    assert_eq!(restored.cart().quantity_of(&kept.id), 1);
    assert!(
        restored.cart().line(&bought.id).is_none(),
        "the settled line must not resurface after a restart"
    );

    Ok(())
}

#[tokio::test]
async fn clearing_the_cart_removes_the_snapshot() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(JsonFileStorage::new(dir.path()));
    let product = product("a", 10);

    {
        let session = Session::new(no_orders(), storage.clone());
        session.add_to_cart(&product, 1)?;
        session.clear_cart();
    }

    let restored = Session::restore(no_orders(), storage.clone());

    assert!(restored.cart().is_empty());
    assert!(!storage.path().exists());

    Ok(())
}
