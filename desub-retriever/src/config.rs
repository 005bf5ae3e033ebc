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

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How hard a [`crate::RetryableExecutor`] tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutorConfig {
	/// How many times the operation is retried after the first attempt fails.
	pub max_retry_count: usize,
	/// No retries are started once this many milliseconds have passed since the first attempt.
	pub retry_budget_ms: Option<u64>,
}

impl ExecutorConfig {
	pub fn new(max_retry_count: usize) -> Self {
		ExecutorConfig { max_retry_count, retry_budget_ms: None }
	}

	pub fn with_retry_budget(mut self, budget: Duration) -> Self {
		self.retry_budget_ms = Some(budget.as_millis() as u64);
		self
	}

	pub fn retry_budget(&self) -> Option<Duration> {
		self.retry_budget_ms.map(Duration::from_millis)
	}
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		ExecutorConfig::new(3)
	}
}

/// Configuration for the two executors of an [`crate::ExtrinsicRetriever`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrieverConfig {
	/// Retries of transient block fetch failures.
	pub block_fetch: ExecutorConfig,
	/// Retries of decoding, each after refreshing the metadata.
	pub decoding: ExecutorConfig,
}

impl Default for RetrieverConfig {
	fn default() -> Self {
		RetrieverConfig {
			block_fetch: ExecutorConfig::new(3).with_retry_budget(Duration::from_secs(1)),
			decoding: ExecutorConfig::new(1),
		}
	}
}
