//! Ward IV billing
//!
//! Provides the billing side of a hospital ward:
//! - Patient intake and the IV item catalog
//! - IV assignments and running per-patient charges
//! - The discharge workflow that archives a patient with a frozen bill
//! - Staff registration and login with Argon2id password hashes
//!
//! Storage goes through [`WardRepository`]; [`PostgresWardRepository`] is the
//! production backend and [`InMemoryWardRepository`] backs tests.

pub mod credentials;
pub mod discharge;
pub mod error;
pub mod models;
pub mod reporting;
pub mod repository;
pub mod service;

pub use credentials::*;
pub use discharge::*;
pub use error::*;
pub use models::*;
pub use reporting::*;
pub use repository::*;
pub use service::*;
