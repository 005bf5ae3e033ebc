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

use desub_common::BlockHash;
use desub_registry::decoder::{
	AllExtrinsicBytes, DecodedExtrinsic, ExtrinsicBytesError, ExtrinsicDecodeError, ExtrinsicDecoder,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
	#[error(transparent)]
	Shape(#[from] ExtrinsicBytesError),
	#[error("block body advertises {expected} extrinsics, but only {found} were found")]
	MissingExtrinsics { expected: usize, found: usize },
	#[error("{0} bytes left over after the last extrinsic")]
	TrailingBytes(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
	pub parent_hash: BlockHash,
	pub number: u32,
}

/// A block as returned by `chain_getBlock`. Each extrinsic is kept exactly as it
/// appears in the body, including its compact length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBlock {
	pub header: Header,
	pub extrinsics: Vec<Vec<u8>>,
}

impl SignedBlock {
	pub fn new(header: Header, extrinsics: Vec<Vec<u8>>) -> Self {
		SignedBlock { header, extrinsics }
	}

	/// Split a SCALE encoded block body (`Vec<Extrinsic>`) into its extrinsics.
	pub fn from_encoded_body(header: Header, body: &[u8]) -> Result<Self, BlockError> {
		let all = AllExtrinsicBytes::new(body)?;
		let mut iter = all.iter();
		let extrinsics = (&mut iter).map(|ext| ext.map(|e| e.with_prefix().to_vec())).collect::<Result<Vec<_>, _>>()?;

		if extrinsics.len() != all.len() {
			return Err(BlockError::MissingExtrinsics { expected: all.len(), found: extrinsics.len() });
		}
		match iter.remaining_bytes().len() {
			0 => Ok(SignedBlock { header, extrinsics }),
			n => Err(BlockError::TrailingBytes(n)),
		}
	}

	/// Decode every extrinsic in the block. Fails on the first extrinsic that can't be decoded,
	/// or that has bytes left over once it has been decoded.
	pub fn decode_extrinsics(&self, decoder: &ExtrinsicDecoder) -> Result<Vec<DecodedExtrinsic>, ExtrinsicDecodeError> {
		log::debug!("decoding {} extrinsics of block {}", self.extrinsics.len(), self.header.number);
		self.extrinsics
			.iter()
			.enumerate()
			.map(|(index, bytes)| {
				let cursor = &mut &bytes[..];
				decoder
					.decode(cursor)
					.and_then(|ext| match cursor.len() {
						0 => Ok(ext),
						excess => Err(ExtrinsicDecodeError::ExcessBytes(excess)),
					})
					.map_err(|e| ExtrinsicDecodeError::Extrinsic { index, source: Box::new(e) })
			})
			.collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use codec::{Compact, Encode};

	fn header() -> Header {
		Header { parent_hash: BlockHash([1; 32]), number: 42 }
	}

	fn extrinsic(body: &[u8]) -> Vec<u8> {
		let mut bytes = Compact(body.len() as u32).encode();
		bytes.extend(body);
		bytes
	}

	#[test]
	fn splits_body_into_extrinsics() {
		let (a, b) = (extrinsic(&[4, 1, 2]), extrinsic(&[4, 3]));
		let mut body = Compact(2u32).encode();
		body.extend(&a);
		body.extend(&b);

		let block = SignedBlock::from_encoded_body(header(), &body).unwrap();
		assert_eq!(block.extrinsics, vec![a, b]);
	}

	#[test]
	fn rejects_malformed_bodies() {
		let mut short = Compact(2u32).encode();
		short.extend(extrinsic(&[4]));
		assert_eq!(
			SignedBlock::from_encoded_body(header(), &short),
			Err(BlockError::MissingExtrinsics { expected: 2, found: 1 })
		);

		let mut long = Compact(1u32).encode();
		long.extend(extrinsic(&[4]));
		long.extend([0, 0]);
		assert_eq!(SignedBlock::from_encoded_body(header(), &long), Err(BlockError::TrailingBytes(2)));

		assert!(matches!(SignedBlock::from_encoded_body(header(), &[]), Err(BlockError::Shape(_))));
	}

	#[test]
	fn header_serializes_hash_as_hex() {
		let json = serde_json::to_value(header()).unwrap();
		assert_eq!(json["parentHash"], format!("0x{}", "01".repeat(32)));
		assert_eq!(json["number"], 42);
	}
}
