//! Centralized error type for the tactus umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate
//! boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Dbn(#[from] tactus_dbn::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
