// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for CityJSON decoding.

use thiserror::Error;

/// Result type alias for document decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a CityJSON document.
#[derive(Error, Debug)]
pub enum Error {
    /// A required member is missing or has the wrong JSON shape.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A geometry carries a type tag outside the supported set.
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    /// The document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedDocument(err.to_string())
    }
}
