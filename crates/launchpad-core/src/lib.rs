//! Error taxonomy and classification for the Launchpad API
//!
//! Every failure a request can hit is raised as a [`RaisedError`], a closed
//! union with one variant per upstream collaborator. [`classify`] maps it to
//! exactly one [`OperationalError`], which is the only shape that ever
//! reaches the wire.

#![allow(clippy::must_use_candidate)]

mod classify;
mod error;
mod raised;

pub use classify::{FALLBACK_FIELD, classify};
pub use error::{ErrorCode, OperationalError};
pub use raised::{DatabaseError, MalformedIdError, RaisedError, SchemaError, TokenError, UploadError, sqlstate};
