// Copyright 2024 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error conditions.

use matrix_sync_base::IdParseError;
use reqwest::Error as ReqwestError;
use thiserror::Error;
use url::ParseError as UrlParseError;

/// Result type of the matrix-sync crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error returned by a [`ProtocolApi`](crate::ProtocolApi) call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never got a response, e.g. the connection failed or timed
    /// out.
    #[error("the request couldn't be sent: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The homeserver answered with a rate limit or server side error.
    #[error("the homeserver failed to handle the request, status {status}")]
    Server {
        /// The HTTP status code.
        status: u16,
    },

    /// The access token is missing, expired or was revoked.
    #[error("the homeserver rejected our credentials, status {status}: {errcode:?} {message:?}")]
    Auth {
        /// The HTTP status code.
        status: u16,
        /// The Matrix error code, e.g. `M_UNKNOWN_TOKEN`.
        errcode: Option<String>,
        /// The human readable error message of the homeserver.
        message: Option<String>,
    },

    /// The homeserver sent a response we couldn't make sense of.
    #[error("the homeserver sent an invalid response: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Whether retrying the same request later might succeed.
    ///
    /// Only rejected credentials are permanent, a malformed response is
    /// discarded and the request repeated.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Auth { .. })
    }

    pub(crate) fn transport(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(error))
    }
}

/// Internal representation of errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A call to the homeserver failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A room or user ID was malformed.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdParseError),

    /// The homeserver URL couldn't be parsed.
    #[error(transparent)]
    Url(#[from] UrlParseError),

    /// The HTTP client couldn't be constructed.
    #[error(transparent)]
    Http(#[from] ReqwestError),

    /// Neither a homeserver URL nor a protocol implementation was given to the
    /// client builder.
    #[error("no homeserver URL or protocol implementation was configured")]
    MissingHomeserver,

    /// The sync was stopped through a [`StopHandle`](crate::StopHandle).
    #[error("the sync was stopped")]
    Cancelled,
}

impl Error {
    /// The API error, if this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}
