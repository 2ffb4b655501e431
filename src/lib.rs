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

//! # Debt Simplifier
//!
//! This library nets a group's pairwise debts into a short list of payments:
//! who pays whom, and how much, so that afterwards nobody owes anybody.
//!
//! ## Core Components
//!
//! - [`Balance`]: Aggregates [`DebtRecord`]s into one net amount per participant
//! - [`plan`]: Greedily matches debtors against the largest remaining creditors
//! - [`settle_debts`]: Both steps over raw `receiver, payer, amount` rows
//! - [`SettleError`]: Validation and invariant failures
//!
//! Around the core sit a CSV source/sink ([`csv_io`]) and a queue-driven
//! [`Worker`] that settles debt files announced on a job queue.
//!
//! ## Example
//!
//! ```
//! use debt_simplifier::{settle_debts, SettlementRecord};
//!
//! let settlements = settle_debts([
//!     ["Jacek", "Dominik", "10"],
//!     ["Dominik", "Jacek", "5"],
//!     ["Kasia", "Dominik", "5"],
//!     ["Michał", "Kamil", "13"],
//! ])
//! .unwrap();
//!
//! assert_eq!(
//!     settlements,
//!     [
//!         SettlementRecord::new("Kamil", "Michał", 13),
//!         SettlementRecord::new("Dominik", "Kasia", 5),
//!         SettlementRecord::new("Dominik", "Jacek", 5),
//!     ]
//! );
//! ```
//!
//! ## Determinism
//!
//! Netting is pure: the same rows always produce the same settlements in the
//! same order.

mod balance;
mod base;
pub mod config;
pub mod csv_io;
pub mod error;
mod planner;
mod record;
pub mod worker;

pub use balance::Balance;
pub use base::{Amount, Participant};
pub use config::WorkerConfig;
pub use error::{DataError, SettleError, ValidationError, WorkerError};
pub use planner::{plan, settle_debts};
pub use record::{DebtRecord, SettlementRecord};
pub use worker::{DirQueue, DirStore, JobQueue, MemoryQueue, MemoryStore, ObjectStore, Worker};
