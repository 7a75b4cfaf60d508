use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use walletpay::processor::ChargeRequest;
use walletpay::types::{PaymentRequest, WebhookEvent};
use walletpay::{verify_signature, PaymentError, SignatureError};

use crate::metrics;
use crate::state::AppState;

/// Inbound create-payment body with optional fields, so missing-field
/// validation produces our error shape instead of a deserializer message.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub payment_token: Option<String>,
    pub description: Option<String>,
    pub request_id: Option<String>,
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "walletpay-server",
    }))
}

#[post("/payment/create-payment")]
pub async fn create_payment(
    state: web::Data<AppState>,
    body: web::Json<CreatePaymentBody>,
) -> HttpResponse {
    let body = body.into_inner();

    let (amount, payment_token) = match (body.amount, body.payment_token) {
        (Some(a), Some(t)) => (a, t),
        _ => {
            metrics::PAYMENT_REQUESTS
                .with_label_values(&["validation"])
                .inc();
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "amount and paymentToken required"
            }));
        }
    };

    let request = PaymentRequest {
        amount,
        currency: body.currency,
        payment_token,
        description: body.description,
        request_id: body.request_id,
    };

    let charge = match ChargeRequest::from_request(&request, &state.default_currency) {
        Ok(c) => c,
        Err(_) => {
            metrics::PAYMENT_REQUESTS
                .with_label_values(&["validation"])
                .inc();
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "amount and paymentToken required"
            }));
        }
    };

    let start = std::time::Instant::now();

    match state.processor.create_and_confirm(&charge).await {
        Ok(intent) => {
            let elapsed = start.elapsed().as_secs_f64();
            metrics::PAYMENT_REQUESTS
                .with_label_values(&["success"])
                .inc();
            metrics::PAYMENT_LATENCY
                .with_label_values(&["success"])
                .observe(elapsed);
            tracing::info!(
                intent = %intent.id,
                status = %intent.status.as_str(),
                amount = charge.amount,
                "payment intent created"
            );
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "paymentIntent": intent,
            }))
        }
        Err(e) => {
            let elapsed = start.elapsed().as_secs_f64();
            let result = match e {
                PaymentError::Timeout(_) => "timeout",
                _ => "processor_error",
            };
            metrics::PAYMENT_REQUESTS.with_label_values(&[result]).inc();
            metrics::PAYMENT_LATENCY
                .with_label_values(&[result])
                .observe(elapsed);
            tracing::error!(error = %e, amount = charge.amount, "payment failed");
            // Relay the processor's message only — no internal detail.
            let message = match e {
                PaymentError::Processor(msg) => msg,
                PaymentError::Timeout(secs) => {
                    format!("processor request timed out after {secs}s; safe to retry")
                }
                other => other.to_string(),
            };
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": message,
            }))
        }
    }
}

/// Webhook deliveries arrive as raw bytes — the signature is computed over
/// the exact byte sequence, so this route must never use the JSON extractor.
#[post("/payment/webhook")]
pub async fn webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> HttpResponse {
    let verified = match req
        .headers()
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(header) => verify_signature(&state.webhook_secret, &body, header),
        None => Err(SignatureError::MissingHeader),
    };

    if let Err(e) = verified {
        let reason = match e {
            SignatureError::MissingHeader => "missing",
            _ => "invalid",
        };
        tracing::warn!(error = %e, "webhook rejected: signature verification failed");
        metrics::SIGNATURE_FAILURES
            .with_label_values(&[reason])
            .inc();
        return HttpResponse::BadRequest().body(format!("Webhook Error: {e}"));
    }

    // Signature verified — only now is the payload trusted enough to parse.
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(error = %e, "webhook rejected: unparseable event payload");
            return HttpResponse::BadRequest().body("Webhook Error: invalid event payload");
        }
    };

    metrics::WEBHOOK_EVENTS
        .with_label_values(&[event.event_type.as_str()])
        .inc();

    // Handlers are repeat-safe: the processor redelivers on non-2xx, and the
    // same event may arrive more than once.
    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let intent_id = event.data.object["id"].as_str().unwrap_or("unknown");
            tracing::info!(event = %event.id, intent = %intent_id, "payment succeeded");
        }
        "payment_intent.payment_failed" => {
            let intent_id = event.data.object["id"].as_str().unwrap_or("unknown");
            let reason = event.data.object["last_payment_error"]["message"]
                .as_str()
                .unwrap_or("unknown");
            tracing::warn!(event = %event.id, intent = %intent_id, reason = %reason, "payment failed");
        }
        other => {
            // Forward-compatible: unknown event types are acknowledged so the
            // processor does not retry them.
            tracing::debug!(event = %event.id, event_type = %other, "unhandled webhook event");
        }
    }

    HttpResponse::Ok().json(serde_json::json!({ "received": true }))
}

#[get("/metrics")]
pub async fn metrics_endpoint(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match &state.metrics_token {
        Some(token) => {
            let authorized = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| walletpay::security::constant_time_eq(t.as_bytes(), token))
                .unwrap_or(false);

            if !authorized {
                return HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "unauthorized",
                    "message": "Valid Bearer token required for /metrics"
                }));
            }
        }
        None => {
            // The opt-in is resolved once at startup; no env reads here.
            if !state.public_metrics {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "forbidden",
                    "message": "Set METRICS_TOKEN or WALLETPAY_PUBLIC_METRICS=true to access /metrics"
                }));
            }
        }
    }
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::metrics_output())
}
