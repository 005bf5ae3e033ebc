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

use crate::config::RetrieverConfig;
use crate::exec::{until_cancelled, ExecError, RetryableExecutor};
use crate::rpc::{ChainRpc, RpcError, StateRpc};
use desub_common::BlockHash;
use desub_registry::{
	decoder::{DecodedExtrinsic, ExtrinsicDecodeError, FieldOverride},
	metadata::MetadataError,
	DecoderFactory, ExtrinsicDecoder, Metadata, RegistryError,
};
use parking_lot::RwLock;
use std::convert::Infallible;
use std::future::ready;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
	#[error("couldn't retrieve metadata")]
	MetadataRetrieval(#[source] RpcError),
	#[error("couldn't parse metadata")]
	Metadata(#[from] MetadataError),
	#[error("couldn't create extrinsic decoder")]
	DecoderCreation(#[source] RegistryError),
	#[error("couldn't retrieve block")]
	BlockRetrieval(#[source] ExecError<RpcError, Infallible>),
	#[error("couldn't decode extrinsics")]
	ExtrinsicDecoding(#[source] ExecError<ExtrinsicDecodeError, Box<RetrieverError>>),
	#[error("cancelled")]
	Cancelled,
}

/// Fetches blocks and decodes their extrinsics.
///
/// The runtime, and with it the types that extrinsics are made of, can change from one
/// block to the next. When decoding fails, the metadata at the block being decoded is
/// fetched and the extrinsic decoder rebuilt from it before decoding is retried.
pub struct ExtrinsicRetriever<C, S> {
	chain: C,
	state: S,
	factory: DecoderFactory,
	block_executor: RetryableExecutor,
	decoding_executor: RetryableExecutor,
	decoder: RwLock<Arc<ExtrinsicDecoder>>,
}

impl<C: ChainRpc, S: StateRpc> ExtrinsicRetriever<C, S> {
	/// Create a retriever, with a decoder built from the latest metadata.
	pub async fn new(
		chain: C,
		state: S,
		factory: DecoderFactory,
		config: RetrieverConfig,
		cancel: &CancellationToken,
	) -> Result<Self, RetrieverError> {
		let decoder = until_cancelled(cancel, fetch_decoder(&state, &factory, None))
			.await
			.ok_or(RetrieverError::Cancelled)??;

		Ok(ExtrinsicRetriever {
			chain,
			state,
			factory,
			block_executor: RetryableExecutor::new(config.block_fetch),
			decoding_executor: RetryableExecutor::new(config.decoding),
			decoder: RwLock::new(Arc::new(decoder)),
		})
	}

	/// A retriever with the default retry configuration.
	pub async fn with_overrides(
		chain: C,
		state: S,
		overrides: Vec<FieldOverride>,
		cancel: &CancellationToken,
	) -> Result<Self, RetrieverError> {
		Self::new(chain, state, DecoderFactory::with_overrides(overrides), RetrieverConfig::default(), cancel).await
	}

	/// The decoder that will be used for the next block.
	pub fn decoder(&self) -> Arc<ExtrinsicDecoder> {
		Arc::clone(&self.decoder.read())
	}

	/// Fetch the block with the given hash and decode all of its extrinsics.
	pub async fn get_extrinsics(
		&self,
		hash: BlockHash,
		cancel: &CancellationToken,
	) -> Result<Vec<DecodedExtrinsic>, RetrieverError> {
		let chain = &self.chain;
		let block = self
			.block_executor
			.exec_with_fallback(cancel, move || chain.block(hash), || ready(Ok::<_, Infallible>(())))
			.await
			.map_err(|e| match e {
				ExecError::Cancelled => RetrieverError::Cancelled,
				e => RetrieverError::BlockRetrieval(e),
			})?;

		self.decoding_executor
			.exec_with_fallback(
				cancel,
				|| ready(block.decode_extrinsics(&self.decoder())),
				move || self.refresh(hash),
			)
			.await
			.map_err(|e| match e {
				ExecError::Cancelled => RetrieverError::Cancelled,
				e => RetrieverError::ExtrinsicDecoding(e),
			})
	}

	/// Replace the decoder with one built from the metadata at the given block.
	async fn refresh(&self, at: BlockHash) -> Result<(), Box<RetrieverError>> {
		log::debug!("refreshing extrinsic decoder from the metadata at block {}", at);
		let decoder = fetch_decoder(&self.state, &self.factory, Some(at)).await?;
		*self.decoder.write() = Arc::new(decoder);
		Ok(())
	}
}

async fn fetch_decoder<S: StateRpc>(
	state: &S,
	factory: &DecoderFactory,
	at: Option<BlockHash>,
) -> Result<ExtrinsicDecoder, RetrieverError> {
	let bytes = state.metadata(at).await.map_err(RetrieverError::MetadataRetrieval)?;
	let metadata = Metadata::from_bytes(&bytes)?;
	factory.create_extrinsic_decoder(&metadata).map_err(RetrieverError::DecoderCreation)
}
