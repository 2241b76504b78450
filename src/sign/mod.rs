//! Request signing
//!
//! Business-credential requests are authenticated by an HMAC-SHA1 signature
//! computed over the request path and query string.
//!
//! # Canonical query
//!
//! The signature is only valid if it covers the exact bytes that go over the
//! wire. [`CanonicalQuery`] is the single serializer used both for signing and
//! for transmission: keys sorted ascending, values percent-encoded per
//! RFC 3986.

mod query;
mod signer;

pub use query::{build_request_url, reverse_geocode_query, CanonicalQuery, GeocodeRequest};
pub use signer::{decode_signing_key, sign, sign_url};
