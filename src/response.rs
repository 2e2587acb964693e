//! Uniform result envelope
//!
//! Every pager load and facade call produces a [`Response`]. Facade calls put
//! the decoded body in `json`; pager loads leave it empty (the shots live on
//! the pager) and carry a weak reference back to the pager instead.

use crate::error::{Error, Result};
use crate::pager::{Pager, PagerRef};
use crate::transport::Fetched;
use crate::types::{JsonValue, TransportMetadata};

/// Result of a pager load or facade call
#[derive(Debug, Default)]
pub struct Response {
    /// Decoded body (facade calls only)
    pub json: Option<JsonValue>,
    /// Failure, if any
    pub error: Option<Error>,
    /// Status/headers of the last HTTP exchange
    pub metadata: Option<TransportMetadata>,
    pager: Option<PagerRef>,
}

impl Response {
    /// Envelope for a failure that happened before any request was made
    pub fn failure(error: Error) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Envelope for a facade call
    pub fn from_fetched(fetched: Fetched<JsonValue>) -> Self {
        let (json, error) = match fetched.result {
            Ok(json) => (Some(json), None),
            Err(error) => (None, Some(error)),
        };

        Self {
            json,
            error,
            metadata: fetched.metadata,
            pager: None,
        }
    }

    /// Envelope for a pager load
    pub(crate) fn for_pager(
        pager: PagerRef,
        error: Option<Error>,
        metadata: Option<TransportMetadata>,
    ) -> Self {
        Self {
            json: None,
            error,
            metadata,
            pager: Some(pager),
        }
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The pager that produced this response, if it is still alive
    pub fn pager(&self) -> Option<Pager> {
        self.pager.as_ref().and_then(PagerRef::upgrade)
    }

    /// Whether a pager produced this response
    pub fn is_from_pager(&self) -> bool {
        self.pager.is_some()
    }

    /// Convert into a `Result`, dropping metadata
    pub fn into_result(self) -> Result<Option<JsonValue>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.json),
        }
    }
}
