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

use clap::{Parser, Subcommand};
use debt_simplifier::csv_io::{read_file, save_file, write_settlements};
use debt_simplifier::{DataError, DirQueue, DirStore, Worker, WorkerConfig, settle_debts};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Debt Simplifier - Settle group debts with as few payments as possible
///
/// Reads `receiver,payer,amount` rows and writes `debtor,creditor,amount`
/// payments that leave everybody even.
#[derive(Parser, Debug)]
#[command(name = "debt-simplifier")]
#[command(about = "Nets pairwise debts into a minimal list of payments", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Settle a single CSV file of debts
    ///
    /// Example: debt-simplifier settle debts.csv > payments.csv
    Settle {
        /// Headerless CSV with rows: receiver,payer,amount
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write payments here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Poll a job queue and settle every debt file it announces
    Worker {
        /// Bucket holding debt files and their results
        #[arg(long, env = "DEBTS_BUCKET_NAME")]
        bucket: String,

        /// Spool directory of job messages (`file://` prefix optional)
        #[arg(long, env = "WORKER_QUEUE_URL")]
        queue: String,

        /// Directory whose subdirectories are the buckets
        #[arg(long, value_name = "DIR")]
        store_root: PathBuf,

        /// Seconds to wait between polls
        #[arg(long, value_name = "SECS", default_value_t = 5)]
        poll_interval: u64,
    },
}

fn main() {
    // Logs go to stderr so stdout stays clean CSV.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Settle { input, output } => {
            if let Err(e) = settle(&input, output.as_deref()) {
                eprintln!("Error settling '{}': {}", input.display(), e);
                process::exit(1);
            }
        }
        Command::Worker {
            bucket,
            queue,
            store_root,
            poll_interval,
        } => {
            let config = WorkerConfig::new(bucket, queue)
                .with_poll_interval(Duration::from_secs(poll_interval));
            let worker = Worker::new(config, DirQueue::new(), DirStore::new(store_root));

            // Nothing sends on this channel; the worker runs until the process is killed.
            let (_shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
            worker.run(&shutdown_rx);
        }
    }
}

/// Settles one file, writing the payments to `output` or stdout.
fn settle(input: &Path, output: Option<&Path>) -> Result<(), DataError> {
    let rows = read_file(input)?;
    let settlements = settle_debts(&rows)?;

    match output {
        Some(path) => save_file(path, &settlements)?,
        None => write_settlements(std::io::stdout().lock(), &settlements)?,
    }

    info!(
        rows = rows.len(),
        settlements = settlements.len(),
        "settled {}",
        input.display()
    );
    Ok(())
}
