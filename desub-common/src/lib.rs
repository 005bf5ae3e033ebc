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

//! Common types shared between the registry and the retriever.

#![forbid(unsafe_code)]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Spec Version type defined in the runtime of a chain.
pub type SpecVersion = u32;

/// The hash of a block, as handed out by a substrate node.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl From<[u8; 32]> for BlockHash {
	fn from(bytes: [u8; 32]) -> Self {
		BlockHash(bytes)
	}
}

impl fmt::Display for BlockHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl fmt::Debug for BlockHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

/// Returned when a string cannot be parsed into a [`BlockHash`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlockHashParseError {
	#[error("block hash is not valid hex")]
	InvalidHex(#[from] hex::FromHexError),
	#[error("block hash should be 32 bytes long, but got {0} bytes")]
	InvalidLength(usize),
}

impl FromStr for BlockHash {
	type Err = BlockHashParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.strip_prefix("0x").unwrap_or(s);
		let bytes = hex::decode(s)?;
		let len = bytes.len();
		let bytes: [u8; 32] = bytes.try_into().map_err(|_| BlockHashParseError::InvalidLength(len))?;
		Ok(BlockHash(bytes))
	}
}

impl Serialize for BlockHash {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for BlockHash {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

/// Render an error followed by each of its sources, separated by `": "`.
pub fn display_chain(err: &dyn std::error::Error) -> String {
	let mut out = err.to_string();
	let mut source = err.source();
	while let Some(err) = source {
		out.push_str(": ");
		out.push_str(&err.to_string());
		source = err.source();
	}
	out
}
