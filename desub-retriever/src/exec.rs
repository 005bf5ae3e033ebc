// Copyright 2019-2021 Parity Technologies (UK) Ltd.
// This file is part of substrate-desub.
//
// substrate-desub is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// substrate-desub is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with substrate-desub.  If not, see <http://www.gnu.org/licenses/>.

//! Bounded retries of an operation, with a fallback that runs between attempts
//! to fix whatever made the last attempt fail.

use crate::config::ExecutorConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// An enum of the possible errors that can be returned from [`RetryableExecutor::exec_with_fallback`].
#[derive(Debug, thiserror::Error)]
pub enum ExecError<E, F> {
	/// The last error of the operation, once no retries are left.
	#[error("failed after {attempts} attempt(s)")]
	Exhausted {
		attempts: usize,
		#[source]
		source: E,
	},
	#[error("fallback failed")]
	Fallback(#[source] F),
	#[error("cancelled")]
	Cancelled,
}

impl<E, F> ExecError<E, F> {
	/// The error from the final attempt, if the operation ran out of retries.
	pub fn last_error(&self) -> Option<&E> {
		match self {
			ExecError::Exhausted { source, .. } => Some(source),
			_ => None,
		}
	}
}

/// Runs an operation until it succeeds or its [`ExecutorConfig`] says to stop.
///
/// Attempts follow each other immediately; it's the job of the fallback to make the
/// next attempt more likely to succeed.
#[derive(Debug, Clone, Default)]
pub struct RetryableExecutor {
	config: ExecutorConfig,
}

impl RetryableExecutor {
	pub fn new(config: ExecutorConfig) -> Self {
		RetryableExecutor { config }
	}

	pub fn config(&self) -> &ExecutorConfig {
		&self.config
	}

	fn can_retry(&self, attempts: usize, started: Instant) -> bool {
		let within_budget = self.config.retry_budget().map_or(true, |budget| started.elapsed() < budget);
		attempts <= self.config.max_retry_count && within_budget
	}

	/// Run `primary`. If it fails and a retry is allowed, run `fallback` and then `primary` again.
	///
	/// A failing fallback ends the loop straight away with [`ExecError::Fallback`]. Once no retries
	/// are left the last error from `primary` is returned, and the fallback is not run again.
	/// Cancelling `cancel` abandons whichever of the two is running.
	pub async fn exec_with_fallback<T, E, F, P, PFut, B, BFut>(
		&self,
		cancel: &CancellationToken,
		mut primary: P,
		mut fallback: B,
	) -> Result<T, ExecError<E, F>>
	where
		E: Display,
		P: FnMut() -> PFut,
		PFut: Future<Output = Result<T, E>>,
		B: FnMut() -> BFut,
		BFut: Future<Output = Result<(), F>>,
	{
		let started = Instant::now();
		let mut attempts = 0;

		loop {
			if cancel.is_cancelled() {
				return Err(ExecError::Cancelled);
			}
			attempts += 1;
			let err = match until_cancelled(cancel, primary()).await {
				Some(Ok(value)) => return Ok(value),
				Some(Err(err)) => err,
				None => return Err(ExecError::Cancelled),
			};

			if !self.can_retry(attempts, started) {
				log::debug!("giving up after {} attempt(s): {}", attempts, err);
				return Err(ExecError::Exhausted { attempts, source: err });
			}

			log::warn!("attempt {} failed, running fallback: {}", attempts, err);
			match until_cancelled(cancel, fallback()).await {
				Some(Ok(())) => {}
				Some(Err(err)) => return Err(ExecError::Fallback(err)),
				None => return Err(ExecError::Cancelled),
			}
		}
	}
}

/// `None` if the token was cancelled before the future completed.
pub(crate) async fn until_cancelled<Fut: Future>(cancel: &CancellationToken, fut: Fut) -> Option<Fut::Output> {
	tokio::select! {
		biased;
		_ = cancel.cancelled() => None,
		output = fut => Some(output),
	}
}
