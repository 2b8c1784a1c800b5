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

use std::time::Duration;

use backoff::ExponentialBackoff;

use crate::http_client::DEFAULT_REQUEST_TIMEOUT;

/// Configuration for requests the `Client` makes.
///
/// This sets how often and for how long a failed sync should be repeated, as
/// well as how long a single HTTP request is allowed to take.
///
/// By default failed syncs are retried indefinitely.
///
/// # Examples
///
/// ```
/// use matrix_sync::config::RequestConfig;
/// use std::time::Duration;
///
/// // Give up after the first failure, and let requests take 10s at most.
/// let request_config = RequestConfig::new()
///     .disable_retry()
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct RequestConfig {
    pub(crate) timeout: Duration,
    pub(crate) retry_limit: Option<u64>,
    pub(crate) retry_timeout: Option<Duration>,
    pub(crate) initial_retry_interval: Option<Duration>,
    pub(crate) max_retry_interval: Option<Duration>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_limit: Default::default(),
            retry_timeout: Default::default(),
            initial_retry_interval: Default::default(),
            max_retry_interval: Default::default(),
        }
    }
}

impl RequestConfig {
    /// Create a new default `RequestConfig`.
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a new `RequestConfig` with default values, except the retry limit
    /// which is set to 3.
    #[must_use]
    pub fn short_retry() -> Self {
        Self::default().retry_limit(3)
    }

    /// This is a convenience method to disable retries. Setting the
    /// `retry_limit` to `0` has the same effect.
    #[must_use]
    pub fn disable_retry(mut self) -> Self {
        self.retry_limit = Some(0);
        self
    }

    /// The number of times a failed sync should be retried. The default is no
    /// limit.
    #[must_use]
    pub fn retry_limit(mut self, retry_limit: u64) -> Self {
        self.retry_limit = Some(retry_limit);
        self
    }

    /// Set the timeout duration for all HTTP requests.
    ///
    /// Sync requests get the long-poll timeout on top of this.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a timeout for how long a failed sync should be retried. The default
    /// is no timeout, meaning syncs are retried forever.
    #[must_use]
    pub fn retry_timeout(mut self, retry_timeout: Duration) -> Self {
        self.retry_timeout = Some(retry_timeout);
        self
    }

    /// The wait before the first retry, later waits grow exponentially from
    /// it.
    #[must_use]
    pub fn initial_retry_interval(mut self, interval: Duration) -> Self {
        self.initial_retry_interval = Some(interval);
        self
    }

    /// The longest wait between two retries.
    #[must_use]
    pub fn max_retry_interval(mut self, interval: Duration) -> Self {
        self.max_retry_interval = Some(interval);
        self
    }

    pub(crate) fn backoff(&self) -> ExponentialBackoff {
        let mut backoff =
            ExponentialBackoff { max_elapsed_time: self.retry_timeout, ..Default::default() };

        if let Some(interval) = self.initial_retry_interval {
            backoff.initial_interval = interval;
            backoff.current_interval = interval;
        }

        if let Some(interval) = self.max_retry_interval {
            backoff.max_interval = interval;
        }

        backoff
    }
}
