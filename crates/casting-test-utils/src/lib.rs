//! # Casting Test Utilities
//!
//! Shared test utilities for the casting service.
//!
//! This crate provides:
//! - RSA key fixtures (`TestKeypair`)
//! - Token claim builders (`TestTokenBuilder`, `roles`)
//! - A mocked JWKS endpoint (`MockJwksServer`)
//! - Server test harness (`TestCastingServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use casting_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<()> {
//!     let keypair = TestKeypair::primary();
//!     let jwks = MockJwksServer::start(&[keypair.clone()]).await;
//!     let server = TestCastingServer::spawn(&jwks.jwks_url()).await?;
//!     let token = TestTokenBuilder::for_role(roles::EXECUTIVE_PRODUCER).sign(&keypair);
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod jwks_server;
pub mod keys;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use jwks_server::*;
pub use keys::*;
pub use server_harness::*;
pub use token_builders::*;
