// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the import pipeline.

use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an import. Nothing is published when one is returned.
#[derive(Error, Debug)]
pub enum Error {
    /// A city object names a parent that is not in `CityObjects`.
    #[error("Dangling reference: \"{child}\" names missing parent \"{parent}\"")]
    DanglingReference { child: String, parent: String },

    /// The cancel flag was raised between two city objects.
    #[error("Import cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core decoding error: {0}")]
    CoreError(#[from] cityjson_lite_core::Error),

    #[error("Geometry error: {0}")]
    GeometryError(#[from] cityjson_lite_geometry::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedDocument,
    UnsupportedGeometryType,
    DanglingReference,
    Triangulation,
    Cancelled,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DanglingReference { .. } => ErrorKind::DanglingReference,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Io(_) => ErrorKind::Io,
            Error::CoreError(e) => core_kind(e),
            Error::GeometryError(e) => match e {
                cityjson_lite_geometry::Error::MalformedDocument(_)
                | cityjson_lite_geometry::Error::VertexIndexOutOfRange { .. } => {
                    ErrorKind::MalformedDocument
                }
                cityjson_lite_geometry::Error::TriangulationError(_) => ErrorKind::Triangulation,
                cityjson_lite_geometry::Error::CoreError(e) => core_kind(e),
            },
        }
    }
}

fn core_kind(err: &cityjson_lite_core::Error) -> ErrorKind {
    match err {
        cityjson_lite_core::Error::MalformedDocument(_) => ErrorKind::MalformedDocument,
        cityjson_lite_core::Error::UnsupportedGeometryType(_) => ErrorKind::UnsupportedGeometryType,
        cityjson_lite_core::Error::Io(_) => ErrorKind::Io,
    }
}
