// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Worker configuration.
//!
//! The binary fills this from flags or the environment; library code only
//! ever receives it through [`Worker::new`](crate::Worker::new).

use std::time::Duration;

/// Delay between queue polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where the worker reads jobs from and where it keeps debt data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Bucket holding both the uploaded debt files and their results.
    pub bucket: String,
    /// Queue delivering `{"debts_id": ...}` job messages.
    pub queue_url: String,
    /// Delay after each poll, whether or not it found work.
    pub poll_interval: Duration,
}

impl WorkerConfig {
    pub fn new(bucket: impl Into<String>, queue_url: impl Into<String>) -> Self {
        WorkerConfig {
            bucket: bucket.into(),
            queue_url: queue_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
