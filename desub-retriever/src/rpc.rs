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

//! The node RPC methods the retriever needs. Transports implement these however
//! they like; nothing here depends on one.

use crate::block::SignedBlock;
use async_trait::async_trait;
use desub_common::BlockHash;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
	#[error("block {0} not found")]
	BlockNotFound(BlockHash),
	#[error("transport error: {0}")]
	Transport(String),
	#[error("unexpected response: {0}")]
	InvalidResponse(String),
}

/// `chain_*` methods.
#[async_trait]
pub trait ChainRpc: Send + Sync {
	/// The header and body of the block with the given hash (`chain_getBlock`).
	async fn block(&self, hash: BlockHash) -> Result<SignedBlock, RpcError>;
}

/// `state_*` methods.
#[async_trait]
pub trait StateRpc: Send + Sync {
	/// The SCALE encoded runtime metadata at the given block, or at the latest block
	/// if none is given (`state_getMetadata`).
	async fn metadata(&self, at: Option<BlockHash>) -> Result<Vec<u8>, RpcError>;
}

#[async_trait]
impl<T: ChainRpc + ?Sized> ChainRpc for Arc<T> {
	async fn block(&self, hash: BlockHash) -> Result<SignedBlock, RpcError> {
		(**self).block(hash).await
	}
}

#[async_trait]
impl<T: StateRpc + ?Sized> StateRpc for Arc<T> {
	async fn metadata(&self, at: Option<BlockHash>) -> Result<Vec<u8>, RpcError> {
		(**self).metadata(at).await
	}
}
