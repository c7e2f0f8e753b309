//! Integration tests for cart reconciliation against a storefront

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;
use tokio::sync::oneshot;

use trolley::{
    alerts::{Alert, AlertLevel},
    engine::{CartEngine, MockConfirm, Resolution},
    error::ErrorKind,
    fixtures::CartFixture,
    gateway::{
        AddToCartResponse, CartGateway, GatewayError, MockCartGateway, RemoveResponse,
        UpdateResponse,
    },
    lines::{CartLine, LineId},
    products::ProductId,
    session::{CartSession, Presenter},
    snapshot::CartSnapshot,
};

#[derive(Debug, Default)]
struct Recorder {
    alerts: Vec<Alert>,
}

impl Presenter for Recorder {
    fn render(&mut self, snapshot: &CartSnapshot) {
        assert_eq!(
            snapshot.grand_total().to_minor_units(),
            snapshot.displayed_sum().to_minor_units(),
            "grand total must match the displayed lines"
        );
    }

    fn alert(&mut self, alert: &Alert) {
        self.alerts.push(alert.clone());
    }
}

type Reply = Result<UpdateResponse, GatewayError>;

/// Gateway whose update responses are released by the test, keyed by requested quantity.
#[derive(Debug, Default)]
struct ScriptedGateway {
    updates: Mutex<FxHashMap<u32, oneshot::Receiver<Reply>>>,
}

impl ScriptedGateway {
    fn expect_update(&self, quantity: u32) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();

        if let Ok(mut updates) = self.updates.lock() {
            updates.insert(quantity, receiver);
        }

        sender
    }
}

#[async_trait]
impl CartGateway for ScriptedGateway {
    async fn update_quantity(&self, _line: &LineId, quantity: u32) -> Reply {
        let receiver = self
            .updates
            .lock()
            .ok()
            .and_then(|mut updates| updates.remove(&quantity))
            .ok_or_else(|| GatewayError::UnexpectedResponse(format!("unscripted {quantity}")))?;

        receiver
            .await
            .map_err(|source| GatewayError::UnexpectedResponse(source.to_string()))?
    }

    async fn remove_line(&self, _line: &LineId) -> Result<RemoveResponse, GatewayError> {
        Err(GatewayError::UnexpectedResponse("unscripted removal".to_string()))
    }

    async fn add_to_cart(
        &self,
        _product: &ProductId,
        _quantity: u32,
    ) -> Result<AddToCartResponse, GatewayError> {
        Err(GatewayError::UnexpectedResponse("unscripted add".to_string()))
    }
}

fn mug_and_tee() -> TestResult<CartEngine> {
    let lines = [
        CartLine::new("1", "Mug", Money::from_minor(999, USD), 2),
        CartLine::new("2", "Tee", Money::from_minor(2997, USD), 1).with_max_stock(3),
    ];

    Ok(CartEngine::new(CartSnapshot::with_lines(lines, USD)?))
}

fn decimal(value: &str) -> TestResult<Option<Decimal>> {
    Ok(Some(Decimal::from_str(value)?))
}

#[track_caller]
fn assert_consistent(session: &CartSession<Recorder, MockConfirm>) {
    assert_eq!(
        session.snapshot().grand_total().to_minor_units(),
        session.snapshot().displayed_sum().to_minor_units(),
        "grand total must match the displayed lines"
    );
}

fn line_total(session: &CartSession<Recorder, MockConfirm>, id: &str) -> TestResult<i64> {
    Ok(session
        .snapshot()
        .get_line(&LineId::from(id))?
        .total()
        .to_minor_units())
}

#[tokio::test]
async fn successful_update_adopts_storefront_totals() -> TestResult {
    let item_total = decimal("29.97")?;
    let cart_total = decimal("59.94")?;

    let mut gateway = MockCartGateway::new();

    gateway
        .expect_update_quantity()
        .withf(|line, quantity| line.as_str() == "1" && *quantity == 3)
        .once()
        .returning(move |_, _| {
            Ok(UpdateResponse {
                success: true,
                item_total,
                cart_total,
                ..UpdateResponse::default()
            })
        });

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        MockConfirm::new(),
    );

    session.input(&LineId::from("1"), "3")?;

    assert_eq!(line_total(&session, "1")?, 2997);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 5994);

    session.commit(&LineId::from("1"), "3")?;
    session.settle().await;
    assert_consistent(&session);

    assert_eq!(line_total(&session, "1")?, 2997);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 5994);

    Ok(())
}

#[tokio::test]
async fn rejected_update_restores_committed_quantity() -> TestResult {
    let mut gateway = MockCartGateway::new();

    gateway
        .expect_update_quantity()
        .once()
        .returning(|_, _| Ok(UpdateResponse::default()));

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        MockConfirm::new(),
    );

    session.commit(&LineId::from("1"), "5")?;

    assert_eq!(line_total(&session, "1")?, 4995);

    let resolutions = session.settle().await;
    assert_consistent(&session);

    assert!(matches!(
        resolutions.first(),
        Some(Resolution::RolledBack { .. })
    ));
    assert_eq!(
        session.snapshot().get_line(&LineId::from("1"))?.quantity(),
        2
    );
    assert_eq!(line_total(&session, "1")?, 1998);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 4995);
    assert_eq!(
        session.presenter().alerts,
        vec![Alert::failure(ErrorKind::ServerRejected, "Error updating cart")]
    );

    Ok(())
}

#[tokio::test]
async fn network_failure_surfaces_danger_alert() -> TestResult {
    let mut gateway = MockCartGateway::new();

    gateway
        .expect_update_quantity()
        .once()
        .returning(|_, _| Err(GatewayError::UnexpectedResponse("timeout".to_string())));

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        MockConfirm::new(),
    );

    session.commit(&LineId::from("2"), "2")?;
    session.settle().await;
    assert_consistent(&session);

    let alert = session.presenter().alerts.first().cloned();

    assert_eq!(alert.as_ref().map(Alert::level), Some(AlertLevel::Danger));
    assert_eq!(
        alert.as_ref().and_then(Alert::kind),
        Some(ErrorKind::Network)
    );
    assert_eq!(line_total(&session, "2")?, 2997);

    Ok(())
}

#[tokio::test]
async fn over_stock_commit_clamps_without_request() -> TestResult {
    let mut gateway = MockCartGateway::new();
    gateway.expect_update_quantity().never();

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        MockConfirm::new(),
    );

    assert!(!session.commit(&LineId::from("2"), "10")?);
    assert_consistent(&session);

    assert_eq!(session.in_flight(), 0);
    assert_eq!(
        session.snapshot().get_line(&LineId::from("2"))?.quantity(),
        3
    );
    assert_eq!(
        session.presenter().alerts.first().map(Alert::message),
        Some("Maximum stock available: 3")
    );

    Ok(())
}

#[tokio::test]
async fn confirmed_removal_drops_line() -> TestResult {
    let cart_total = decimal("19.98")?;

    let mut gateway = MockCartGateway::new();

    gateway
        .expect_remove_line()
        .once()
        .returning(move |_| {
            Ok(RemoveResponse {
                success: true,
                cart_items_count: Some(1),
                cart_total,
                message: None,
            })
        });

    let mut confirm = MockConfirm::new();
    confirm.expect_confirm().once().return_const(true);

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        confirm,
    );

    session.remove(&LineId::from("2"))?;
    session.settle().await;
    assert_consistent(&session);

    assert!(session.snapshot().get_line(&LineId::from("2")).is_err());
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 1998);
    assert_eq!(session.snapshot().items_count(), 1);

    Ok(())
}

#[tokio::test]
async fn older_response_arriving_last_is_discarded() -> TestResult {
    let gateway = Arc::new(ScriptedGateway::default());
    let first = gateway.expect_update(3);
    let second = gateway.expect_update(5);

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::clone(&gateway) as Arc<dyn CartGateway>,
        Recorder::default(),
        MockConfirm::new(),
    );

    session.commit(&LineId::from("1"), "3")?;
    session.commit(&LineId::from("1"), "5")?;

    _ = second.send(Ok(UpdateResponse {
        success: true,
        item_total: decimal("49.95")?,
        cart_total: decimal("79.92")?,
        ..UpdateResponse::default()
    }));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::Reconciled { .. })
    ));
    assert_consistent(&session);

    _ = first.send(Ok(UpdateResponse {
        success: true,
        item_total: decimal("29.97")?,
        cart_total: decimal("59.94")?,
        ..UpdateResponse::default()
    }));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::Stale { generation: 1, .. })
    ));
    assert_consistent(&session);

    let line = session.snapshot().get_line(&LineId::from("1"))?;

    assert_eq!(line.quantity(), 5);
    assert_eq!(line.committed_quantity(), 5);
    assert_eq!(line.total().to_minor_units(), 4995);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 7992);

    Ok(())
}

#[tokio::test]
async fn stale_success_moves_rollback_target() -> TestResult {
    let gateway = Arc::new(ScriptedGateway::default());
    let first = gateway.expect_update(3);
    let second = gateway.expect_update(5);

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::clone(&gateway) as Arc<dyn CartGateway>,
        Recorder::default(),
        MockConfirm::new(),
    );

    session.commit(&LineId::from("1"), "3")?;
    session.commit(&LineId::from("1"), "5")?;

    _ = first.send(Ok(UpdateResponse {
        success: true,
        ..UpdateResponse::default()
    }));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::Stale { .. })
    ));
    assert_consistent(&session);
    assert_eq!(line_total(&session, "1")?, 4995);

    _ = second.send(Err(GatewayError::UnexpectedResponse("boom".to_string())));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::RolledBack { .. })
    ));
    assert_consistent(&session);

    assert_eq!(
        session.snapshot().get_line(&LineId::from("1"))?.quantity(),
        3
    );
    assert_eq!(line_total(&session, "1")?, 2997);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 5994);

    Ok(())
}

#[tokio::test]
async fn failed_update_then_older_success_resyncs_display() -> TestResult {
    let gateway = Arc::new(ScriptedGateway::default());
    let first = gateway.expect_update(3);
    let second = gateway.expect_update(5);

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::clone(&gateway) as Arc<dyn CartGateway>,
        Recorder::default(),
        MockConfirm::new(),
    );

    session.commit(&LineId::from("1"), "3")?;
    session.commit(&LineId::from("1"), "5")?;

    _ = second.send(Err(GatewayError::UnexpectedResponse("boom".to_string())));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::RolledBack { .. })
    ));
    assert_consistent(&session);
    assert_eq!(line_total(&session, "1")?, 1998);

    _ = first.send(Ok(UpdateResponse {
        success: true,
        item_total: decimal("29.97")?,
        cart_total: decimal("59.94")?,
        ..UpdateResponse::default()
    }));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::Resynced { quantity: 3, .. })
    ));
    assert_consistent(&session);

    let line = session.snapshot().get_line(&LineId::from("1"))?;

    assert_eq!(line.quantity(), 3);
    assert_eq!(line.committed_quantity(), 3);
    assert_eq!(line.total().to_minor_units(), 2997);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 5994);
    assert_eq!(
        session.presenter().alerts,
        vec![Alert::failure(ErrorKind::Network, "Error updating cart")]
    );

    Ok(())
}

#[tokio::test]
async fn clamp_while_update_in_flight_discards_its_response() -> TestResult {
    let gateway = Arc::new(ScriptedGateway::default());
    let first = gateway.expect_update(3);

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::clone(&gateway) as Arc<dyn CartGateway>,
        Recorder::default(),
        MockConfirm::new(),
    );

    assert!(session.commit(&LineId::from("1"), "3")?);
    assert!(!session.commit(&LineId::from("1"), "0")?);
    assert_consistent(&session);

    _ = first.send(Ok(UpdateResponse {
        success: true,
        item_total: decimal("29.97")?,
        cart_total: decimal("59.94")?,
        ..UpdateResponse::default()
    }));

    assert!(matches!(
        session.next_completion().await,
        Some(Resolution::Stale { generation: 1, .. })
    ));
    assert_consistent(&session);

    assert_eq!(
        session.snapshot().get_line(&LineId::from("1"))?.quantity(),
        1
    );
    assert_eq!(line_total(&session, "1")?, 999);
    assert_eq!(session.snapshot().grand_total().to_minor_units(), 999 + 2997);

    Ok(())
}

#[tokio::test]
async fn disagreeing_cart_total_is_not_displayed() -> TestResult {
    let item_total = decimal("29.97")?;
    let cart_total = decimal("99.99")?;

    let mut gateway = MockCartGateway::new();

    gateway
        .expect_update_quantity()
        .once()
        .returning(move |_, _| {
            Ok(UpdateResponse {
                success: true,
                item_total,
                cart_total,
                ..UpdateResponse::default()
            })
        });

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        MockConfirm::new(),
    );

    session.commit(&LineId::from("1"), "3")?;
    session.settle().await;
    assert_consistent(&session);

    assert_eq!(session.snapshot().grand_total().to_minor_units(), 5994);

    Ok(())
}

#[tokio::test]
async fn add_to_cart_updates_item_count() -> TestResult {
    let mut gateway = MockCartGateway::new();

    gateway
        .expect_add_to_cart()
        .withf(|product, quantity| product.as_str() == "42" && *quantity == 1)
        .once()
        .returning(|_, _| {
            Ok(AddToCartResponse {
                success: true,
                cart_items_count: Some(4),
                ..AddToCartResponse::default()
            })
        });

    let mut session = CartSession::new(
        mug_and_tee()?,
        Arc::new(gateway),
        Recorder::default(),
        MockConfirm::new(),
    );

    session.add_to_cart(ProductId::from("42"), "")?;
    session.settle().await;
    assert_consistent(&session);

    assert_eq!(session.snapshot().items_count(), 4);
    assert_eq!(
        session.presenter().alerts,
        vec![Alert::success("Product added to cart!")]
    );

    Ok(())
}

#[test]
fn sample_fixture_loads() -> TestResult {
    let snapshot =
        CartFixture::load(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/cart.yml"))?
            .into_snapshot()?;

    assert_eq!(snapshot.len(), 3);
    assert_eq!(
        snapshot.grand_total().to_minor_units(),
        snapshot.recompute_all().to_minor_units()
    );

    Ok(())
}
