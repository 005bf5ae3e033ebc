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

//! Retrieve blocks from a substrate node and decode their extrinsics, rebuilding the
//! extrinsic decoder whenever the runtime it was built for has changed.

#![forbid(unsafe_code)]

mod block;
mod config;
mod exec;
mod retriever;
mod rpc;

pub use block::{BlockError, Header, SignedBlock};
pub use config::{ExecutorConfig, RetrieverConfig};
pub use exec::{ExecError, RetryableExecutor};
pub use retriever::{ExtrinsicRetriever, RetrieverError};
pub use rpc::{ChainRpc, RpcError, StateRpc};

pub use tokio_util::sync::CancellationToken;
