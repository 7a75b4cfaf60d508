//! Wallet-token payment integration for Stripe-style processors.
//!
//! Implements the server side of a mobile-wallet checkout: an opaque token
//! produced by Google Pay / Apple Pay is exchanged for a created-and-confirmed
//! payment intent at the external processor, and asynchronous status updates
//! arrive as HMAC-signed webhook events.
//!
//! # Three-party model
//!
//! - **Wallet** (external) — device wallet UI produces the opaque token
//! - **Backend** ([`StripeProcessor`] behind [`ProcessorClient`]) — creates
//!   and confirms the charge, verifies webhook signatures
//! - **Processor** (external) — owns the intent lifecycle and event delivery
//!
//! The heavy lifting (tokenization, card-network traffic, SCA) lives at the
//! processor; this crate is the integration contract only.

pub mod error;
pub mod processor;
pub mod security;
pub mod signature;
pub mod types;

pub use error::{PaymentError, SignatureError};
pub use processor::{ChargeRequest, ProcessorClient, StripeProcessor};
pub use signature::{sign_payload, verify_signature, SIGNATURE_TOLERANCE_SECS};
pub use types::{PaymentIntent, PaymentRequest, PaymentStatus, WebhookEvent};
