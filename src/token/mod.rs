//! Signed token handling.
//!
//! Tokens are compact JWS strings (`header.payload.signature`). The codec
//! owns the signing key and the time policy; the service adds the claims
//! chain on top so callers deal in [`Identity`](crate::identity::Identity)
//! values rather than raw claims.

pub mod algorithm;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod key;
pub mod service;

pub use algorithm::{KeyFamily, SignatureAlgorithm};
pub use claims::Claims;
pub use clock::{Clock, FixedClock, SystemClock, TimePolicy};
pub use codec::TokenCodec;
pub use key::SigningKey;
pub use service::TokenService;
