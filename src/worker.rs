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

//! Queue-driven settlement worker.
//!
//! The [`Worker`] polls a [`JobQueue`] for `{"debts_id": "<key>"}` messages.
//! For each one it downloads `<key>` from the configured bucket of an
//! [`ObjectStore`], settles the debt rows it contains, uploads the settlements
//! to `<key>_results` and deletes the message. A job that fails is logged and
//! its message stays on the queue.
//!
//! Re-running a job rewrites the same result object with identical bytes, so
//! redelivery is harmless. Two workers handling the same `debts_id` at once
//! would race on that object; keep one worker per queue.
//!
//! # Backends
//!
//! - [`DirQueue`] / [`DirStore`]: spool directory and bucket directories on the
//!   local filesystem.
//! - [`MemoryQueue`] / [`MemoryStore`]: in-process, for embedding and tests.

use crate::config::WorkerConfig;
use crate::csv_io::settle_csv;
use crate::error::WorkerError;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info, warn};

/// Upper bound on messages taken from a queue per poll.
pub const MAX_MESSAGES: usize = 10;

/// A message received from a [`JobQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
    /// Handle passed back to [`JobQueue::delete`] once the job is done.
    pub receipt: String,
}

/// Body of a settlement job message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleJob {
    /// Object key of the uploaded debt rows.
    pub debts_id: String,
}

impl SettleJob {
    /// Key the settlements for this job are uploaded under.
    pub fn results_key(&self) -> String {
        format!("{}_results", self.debts_id)
    }
}

/// Source of job messages.
pub trait JobQueue {
    /// Returns up to [`MAX_MESSAGES`] pending messages; empty when idle.
    fn receive(&self, queue_url: &str) -> Result<Vec<Message>, WorkerError>;

    /// Acknowledges a message so it is not delivered again.
    fn delete(&self, queue_url: &str, receipt: &str) -> Result<(), WorkerError>;
}

/// Keyed blob storage grouped into buckets.
pub trait ObjectStore {
    /// # Errors
    ///
    /// [`WorkerError::ObjectNotFound`] if the key is absent.
    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, WorkerError>;

    fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), WorkerError>;
}

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub processed: usize,
    pub failed: usize,
}

/// Settles debt files announced on a queue.
pub struct Worker<Q, S> {
    config: WorkerConfig,
    queue: Q,
    store: S,
}

impl<Q: JobQueue, S: ObjectStore> Worker<Q, S> {
    pub fn new(config: WorkerConfig, queue: Q, store: S) -> Self {
        Worker {
            config,
            queue,
            store,
        }
    }

    /// Settles one job and returns the key its results were uploaded under.
    ///
    /// The message is not deleted here.
    ///
    /// # Errors
    ///
    /// - [`WorkerError::Message`] - Body is not a valid job.
    /// - [`WorkerError::ObjectNotFound`] - The debt file is missing.
    /// - [`WorkerError::Data`] - The debt file is not valid CSV or fails validation.
    pub fn process(&self, message: &Message) -> Result<String, WorkerError> {
        let job: SettleJob = serde_json::from_str(&message.body)?;
        let bucket = &self.config.bucket;

        let input = self.store.download(bucket, &job.debts_id)?;
        let mut output = Vec::new();
        let settlements = settle_csv(input.as_slice(), &mut output)?;

        let results_key = job.results_key();
        self.store.upload(bucket, &results_key, output)?;

        info!(
            debts_id = %job.debts_id,
            results = %results_key,
            settlements,
            "settled job"
        );
        Ok(results_key)
    }

    /// Receives pending messages and processes each of them.
    ///
    /// Failed jobs are logged and counted; their messages are left in place.
    ///
    /// # Errors
    ///
    /// Only queue failures (receiving, or deleting a finished message) abort the poll.
    pub fn poll_once(&self) -> Result<PollStats, WorkerError> {
        let queue_url = &self.config.queue_url;
        let messages = self.queue.receive(queue_url)?;
        if messages.is_empty() {
            info!("no messages in the queue");
            return Ok(PollStats::default());
        }

        let mut stats = PollStats::default();
        for message in &messages {
            match self.process(message) {
                Ok(_) => {
                    self.queue.delete(queue_url, &message.receipt)?;
                    stats.processed += 1;
                }
                Err(e) => {
                    error!(receipt = %message.receipt, error = %e, "job failed");
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Polls until a value arrives on `shutdown` or its sender is dropped.
    ///
    /// Sleeps for the configured poll interval after every poll.
    pub fn run(&self, shutdown: &Receiver<()>) {
        info!(
            bucket = %self.config.bucket,
            queue = %self.config.queue_url,
            "worker started"
        );

        loop {
            if let Err(e) = self.poll_once() {
                warn!(error = %e, "poll failed");
            }

            match shutdown.recv_timeout(self.config.poll_interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("worker stopped");
    }
}

/// Rejects keys that would escape their bucket directory.
fn check_key(key: &str) -> Result<(), WorkerError> {
    let escapes = key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']);
    if escapes {
        return Err(WorkerError::Store {
            key: key.to_owned(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "invalid object key"),
        });
    }
    Ok(())
}

/// A queue backed by a spool directory.
///
/// The queue URL is the directory path, optionally prefixed with `file://`.
/// Every `*.json` file in it is one message and its path is the receipt.
/// Messages are delivered in file name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirQueue;

impl DirQueue {
    pub fn new() -> Self {
        DirQueue
    }

    fn spool_dir(queue_url: &str) -> &Path {
        Path::new(queue_url.strip_prefix("file://").unwrap_or(queue_url))
    }
}

impl JobQueue for DirQueue {
    fn receive(&self, queue_url: &str) -> Result<Vec<Message>, WorkerError> {
        let mut paths = fs::read_dir(Self::spool_dir(queue_url))
            .map_err(WorkerError::Queue)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(WorkerError::Queue)?;
        paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"));
        paths.sort();
        paths.truncate(MAX_MESSAGES);

        paths
            .into_iter()
            .map(|path| {
                let body = fs::read_to_string(&path).map_err(WorkerError::Queue)?;
                Ok(Message {
                    body,
                    receipt: path.display().to_string(),
                })
            })
            .collect()
    }

    fn delete(&self, _queue_url: &str, receipt: &str) -> Result<(), WorkerError> {
        fs::remove_file(receipt).map_err(WorkerError::Queue)
    }
}

/// An object store where each bucket is a subdirectory of `root`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, WorkerError> {
        check_key(bucket)?;
        check_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for DirStore {
    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, WorkerError> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => WorkerError::ObjectNotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            },
            _ => WorkerError::Store {
                key: key.to_owned(),
                source,
            },
        })
    }

    fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), WorkerError> {
        let path = self.object_path(bucket, key)?;
        let store_error = |source: io::Error| WorkerError::Store {
            key: key.to_owned(),
            source,
        };

        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir).map_err(store_error)?;
        // Write then rename so readers never see a partial result.
        let staging = dir.join(format!(".{key}.partial"));
        fs::write(&staging, body).map_err(store_error)?;
        fs::rename(&staging, &path).map_err(store_error)
    }
}

/// An in-process FIFO queue.
///
/// Received messages stay queued until deleted, so a failed job is handed
/// out again on the next poll.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    messages: Mutex<VecDeque<Message>>,
    next_receipt: AtomicU64,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a message body and returns its receipt.
    pub fn push(&self, body: impl Into<String>) -> String {
        let receipt = self.next_receipt.fetch_add(1, Ordering::Relaxed).to_string();
        self.messages.lock().push_back(Message {
            body: body.into(),
            receipt: receipt.clone(),
        });
        receipt
    }

    /// Enqueues a job for `debts_id`.
    pub fn push_job(&self, debts_id: impl Into<String>) -> Result<String, WorkerError> {
        let job = SettleJob {
            debts_id: debts_id.into(),
        };
        Ok(self.push(serde_json::to_string(&job)?))
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl JobQueue for MemoryQueue {
    fn receive(&self, _queue_url: &str) -> Result<Vec<Message>, WorkerError> {
        Ok(self.messages.lock().iter().take(MAX_MESSAGES).cloned().collect())
    }

    fn delete(&self, _queue_url: &str, receipt: &str) -> Result<(), WorkerError> {
        self.messages.lock().retain(|message| message.receipt != receipt);
        Ok(())
    }
}

/// An in-process object store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<(String, String), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|object| object.value().clone())
    }

    pub fn put(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        self.objects
            .insert((bucket.to_owned(), key.to_owned()), body.into());
    }
}

impl ObjectStore for MemoryStore {
    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, WorkerError> {
        self.get(bucket, key).ok_or_else(|| WorkerError::ObjectNotFound {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        })
    }

    fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), WorkerError> {
        self.put(bucket, key, body);
        Ok(())
    }
}

impl<T: JobQueue + ?Sized> JobQueue for &T {
    fn receive(&self, queue_url: &str) -> Result<Vec<Message>, WorkerError> {
        (**self).receive(queue_url)
    }

    fn delete(&self, queue_url: &str, receipt: &str) -> Result<(), WorkerError> {
        (**self).delete(queue_url, receipt)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, WorkerError> {
        (**self).download(bucket, key)
    }

    fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), WorkerError> {
        (**self).upload(bucket, key, body)
    }
}
