use actix_web::{test, web, App};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use walletpay::processor::{ChargeRequest, ProcessorClient};
use walletpay::types::{PaymentIntent, PaymentStatus};
use walletpay::{sign_payload, PaymentError};
use walletpay_server::routes;
use walletpay_server::state::AppState;

const WEBHOOK_SECRET: &[u8] = b"whsec_integration_test_secret";

/// Stub processor that records every call and replies from a canned result.
struct StubProcessor {
    calls: AtomicUsize,
    last_charge: std::sync::Mutex<Option<ChargeRequest>>,
    response: Box<dyn Fn() -> Result<PaymentIntent, PaymentError> + Send + Sync>,
}

impl StubProcessor {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_charge: std::sync::Mutex::new(None),
            response: Box::new(|| {
                Ok(PaymentIntent {
                    id: "pi_1".to_string(),
                    status: PaymentStatus::Succeeded,
                    extra: serde_json::Map::new(),
                })
            }),
        })
    }

    fn declining(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_charge: std::sync::Mutex::new(None),
            response: Box::new(move || Err(PaymentError::Processor(message.clone()))),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProcessorClient for StubProcessor {
    fn create_and_confirm<'a>(
        &'a self,
        charge: &'a ChargeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PaymentIntent, PaymentError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_charge.lock().unwrap() = Some(charge.clone());
        let result = (self.response)();
        Box::pin(async move { result })
    }
}

fn make_state(processor: Arc<StubProcessor>) -> web::Data<AppState> {
    web::Data::new(AppState {
        processor,
        webhook_secret: WEBHOOK_SECRET.to_vec(),
        default_currency: "usd".to_string(),
        metrics_token: None,
        public_metrics: false,
    })
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[actix_rt::test]
async fn create_payment_succeeds_end_to_end() {
    let processor = StubProcessor::succeeding();
    let state = make_state(processor.clone());
    let app = test::init_service(App::new().app_data(state).service(routes::create_payment)).await;

    let req = test::TestRequest::post()
        .uri("/payment/create-payment")
        .set_json(serde_json::json!({
            "amount": 499,
            "currency": "usd",
            "paymentToken": "tok_visa",
            "description": "Test",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["paymentIntent"]["id"], "pi_1");
    assert_eq!(body["paymentIntent"]["status"], "succeeded");
    assert_eq!(processor.calls(), 1);
}

#[actix_rt::test]
async fn create_payment_passes_amount_through_and_defaults_currency() {
    let processor = StubProcessor::succeeding();
    let state = make_state(processor.clone());
    let app = test::init_service(App::new().app_data(state).service(routes::create_payment)).await;

    let req = test::TestRequest::post()
        .uri("/payment/create-payment")
        .set_json(serde_json::json!({
            "amount": 1250,
            "paymentToken": "tok_mastercard",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let charge = processor.last_charge.lock().unwrap().clone().unwrap();
    assert_eq!(charge.amount, 1250);
    assert_eq!(charge.currency, "usd");
    assert_eq!(charge.token, "tok_mastercard");
}

#[actix_rt::test]
async fn create_payment_rejects_missing_amount_without_calling_processor() {
    let processor = StubProcessor::succeeding();
    let state = make_state(processor.clone());
    let app = test::init_service(App::new().app_data(state).service(routes::create_payment)).await;

    let req = test::TestRequest::post()
        .uri("/payment/create-payment")
        .set_json(serde_json::json!({
            "paymentToken": "tok_visa",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "amount and paymentToken required");
    assert_eq!(processor.calls(), 0);
}

#[actix_rt::test]
async fn create_payment_rejects_missing_token_without_calling_processor() {
    let processor = StubProcessor::succeeding();
    let state = make_state(processor.clone());
    let app = test::init_service(App::new().app_data(state).service(routes::create_payment)).await;

    let req = test::TestRequest::post()
        .uri("/payment/create-payment")
        .set_json(serde_json::json!({ "amount": 499 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "amount and paymentToken required");
    assert_eq!(processor.calls(), 0);
}

#[actix_rt::test]
async fn create_payment_rejects_non_positive_amount() {
    let processor = StubProcessor::succeeding();
    let state = make_state(processor.clone());
    let app = test::init_service(App::new().app_data(state).service(routes::create_payment)).await;

    let req = test::TestRequest::post()
        .uri("/payment/create-payment")
        .set_json(serde_json::json!({
            "amount": 0,
            "paymentToken": "tok_visa",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(processor.calls(), 0);
}

#[actix_rt::test]
async fn create_payment_relays_processor_decline_message() {
    let processor = StubProcessor::declining("Your card was declined.");
    let state = make_state(processor.clone());
    let app = test::init_service(App::new().app_data(state).service(routes::create_payment)).await;

    let req = test::TestRequest::post()
        .uri("/payment/create-payment")
        .set_json(serde_json::json!({
            "amount": 499,
            "paymentToken": "tok_chargeDeclined",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Your card was declined.");
    assert_eq!(processor.calls(), 1);
}

#[actix_rt::test]
async fn webhook_rejects_missing_signature_header() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::webhook)).await;

    let req = test::TestRequest::post()
        .uri("/payment/webhook")
        .set_payload(r#"{"type":"payment_intent.succeeded","data":{"object":{}}}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "Webhook Error: missing signature header"
    );
}

#[actix_rt::test]
async fn webhook_rejects_bad_signature() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::webhook)).await;

    let payload = r#"{"type":"payment_intent.succeeded","data":{"object":{}}}"#;
    let header = sign_payload(b"some-other-secret", payload.as_bytes(), now());

    let req = test::TestRequest::post()
        .uri("/payment/webhook")
        .insert_header(("stripe-signature", header))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body)
        .unwrap()
        .starts_with("Webhook Error:"));
}

#[actix_rt::test]
async fn webhook_rejects_signature_over_different_body() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::webhook)).await;

    let header = sign_payload(WEBHOOK_SECRET, b"original body", now());

    let req = test::TestRequest::post()
        .uri("/payment/webhook")
        .insert_header(("stripe-signature", header))
        .set_payload(r#"{"type":"payment_intent.succeeded","data":{"object":{}}}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn webhook_acknowledges_valid_succeeded_event() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::webhook)).await;

    let payload = serde_json::json!({
        "id": "evt_1",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_1", "status": "succeeded" } },
    })
    .to_string();
    let header = sign_payload(WEBHOOK_SECRET, payload.as_bytes(), now());

    let req = test::TestRequest::post()
        .uri("/payment/webhook")
        .insert_header(("stripe-signature", header))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["received"], true);
}

#[actix_rt::test]
async fn webhook_acknowledges_payment_failed_event() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::webhook)).await;

    let payload = serde_json::json!({
        "id": "evt_2",
        "type": "payment_intent.payment_failed",
        "data": { "object": {
            "id": "pi_2",
            "last_payment_error": { "message": "Your card was declined." },
        }},
    })
    .to_string();
    let header = sign_payload(WEBHOOK_SECRET, payload.as_bytes(), now());

    let req = test::TestRequest::post()
        .uri("/payment/webhook")
        .insert_header(("stripe-signature", header))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["received"], true);
}

#[actix_rt::test]
async fn webhook_acknowledges_unknown_event_type() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::webhook)).await;

    let payload = serde_json::json!({
        "id": "evt_3",
        "type": "charge.refund.updated",
        "data": { "object": {} },
    })
    .to_string();
    let header = sign_payload(WEBHOOK_SECRET, payload.as_bytes(), now());

    let req = test::TestRequest::post()
        .uri("/payment/webhook")
        .insert_header(("stripe-signature", header))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["received"], true);
}

fn make_state_with_metrics_token(
    metrics_token: Option<Vec<u8>>,
    public_metrics: bool,
) -> web::Data<AppState> {
    web::Data::new(AppState {
        processor: StubProcessor::succeeding(),
        webhook_secret: WEBHOOK_SECRET.to_vec(),
        default_currency: "usd".to_string(),
        metrics_token,
        public_metrics,
    })
}

#[actix_rt::test]
async fn metrics_requires_bearer_token_when_configured() {
    let state = make_state_with_metrics_token(Some(b"metrics-token-123".to_vec()), false);
    let app =
        test::init_service(App::new().app_data(state).service(routes::metrics_endpoint)).await;

    // No bearer token -> 401
    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Wrong token -> 401
    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Correct token -> 200
    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer metrics-token-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn metrics_forbidden_without_token_unless_opted_in() {
    // No token and no opt-in -> 403; the opt-in is startup state, not a
    // per-request environment lookup.
    let state = make_state_with_metrics_token(None, false);
    let app =
        test::init_service(App::new().app_data(state).service(routes::metrics_endpoint)).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Explicit opt-in at startup -> 200 without any token.
    let state = make_state_with_metrics_token(None, true);
    let app =
        test::init_service(App::new().app_data(state).service(routes::metrics_endpoint)).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn health_reports_ok() {
    let state = make_state(StubProcessor::succeeding());
    let app = test::init_service(App::new().app_data(state).service(routes::health)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
