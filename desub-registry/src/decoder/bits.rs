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

//! Bit sequences are encoded by [`bitvec`], and their layout depends on both the
//! store type and the bit order, so we dispatch to the right `BitVec` here.

use bitvec::{
	order::{Lsb0, Msb0},
	store::BitStore as BitvecStore,
	vec::BitVec,
};
use codec::{Decode, Encode};

/// The primitive that bits are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitStore {
	U8,
	U16,
	U32,
	U64,
}

/// The order of bits within each store element. This is the last path segment
/// of the order type in the metadata (eg `bitvec::order::Lsb0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOrder {
	Lsb0,
	Msb0,
}

impl BitOrder {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"Lsb0" => Some(BitOrder::Lsb0),
			"Msb0" => Some(BitOrder::Msb0),
			_ => None,
		}
	}
}

fn decode_as<S, O>(input: &mut &[u8]) -> Result<Vec<bool>, codec::Error>
where
	S: BitvecStore,
	O: bitvec::order::BitOrder,
	BitVec<S, O>: Decode,
{
	let bits = BitVec::<S, O>::decode(input)?;
	Ok(bits.iter().by_vals().collect())
}

fn encode_as<S, O>(bits: &[bool]) -> Vec<u8>
where
	S: BitvecStore,
	O: bitvec::order::BitOrder,
	BitVec<S, O>: Encode,
{
	bits.iter().copied().collect::<BitVec<S, O>>().encode()
}

/// Decode a compact length prefixed bit sequence.
pub fn decode_bits(store: BitStore, order: BitOrder, input: &mut &[u8]) -> Result<Vec<bool>, codec::Error> {
	match (store, order) {
		(BitStore::U8, BitOrder::Lsb0) => decode_as::<u8, Lsb0>(input),
		(BitStore::U8, BitOrder::Msb0) => decode_as::<u8, Msb0>(input),
		(BitStore::U16, BitOrder::Lsb0) => decode_as::<u16, Lsb0>(input),
		(BitStore::U16, BitOrder::Msb0) => decode_as::<u16, Msb0>(input),
		(BitStore::U32, BitOrder::Lsb0) => decode_as::<u32, Lsb0>(input),
		(BitStore::U32, BitOrder::Msb0) => decode_as::<u32, Msb0>(input),
		(BitStore::U64, BitOrder::Lsb0) => decode_as::<u64, Lsb0>(input),
		(BitStore::U64, BitOrder::Msb0) => decode_as::<u64, Msb0>(input),
	}
}

/// The inverse of [`decode_bits`].
pub fn encode_bits(store: BitStore, order: BitOrder, bits: &[bool]) -> Vec<u8> {
	match (store, order) {
		(BitStore::U8, BitOrder::Lsb0) => encode_as::<u8, Lsb0>(bits),
		(BitStore::U8, BitOrder::Msb0) => encode_as::<u8, Msb0>(bits),
		(BitStore::U16, BitOrder::Lsb0) => encode_as::<u16, Lsb0>(bits),
		(BitStore::U16, BitOrder::Msb0) => encode_as::<u16, Msb0>(bits),
		(BitStore::U32, BitOrder::Lsb0) => encode_as::<u32, Lsb0>(bits),
		(BitStore::U32, BitOrder::Msb0) => encode_as::<u32, Msb0>(bits),
		(BitStore::U64, BitOrder::Lsb0) => encode_as::<u64, Lsb0>(bits),
		(BitStore::U64, BitOrder::Msb0) => encode_as::<u64, Msb0>(bits),
	}
}
