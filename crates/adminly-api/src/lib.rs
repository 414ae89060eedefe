// adminly-api: Async HTTP client for the admin dashboard backend

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{CredentialProvider, Session, StaticToken};
pub use client::{ApiClient, ByteStream};
pub use envelope::{Envelope, WirePage};
pub use error::Error;
pub use models::{WireId, WireNumber, WirePrediction, WireTransaction, WireUser, WireUserRef};
pub use transport::{TlsMode, TransportConfig};
