/// Token sources
///
/// The identity service is the only place tokens come from.
pub mod issuer;

pub use issuer::TokenIssuer;
