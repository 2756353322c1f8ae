pub mod loader;

pub use loader::{Credential, CredentialLoader};
