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

//! SCALE encoding of decoded values. Each value is written back in the same
//! shape it was read in, so decoding and then encoding gives back the input bytes.

use super::{BitSequenceValue, DecodedField, DecodedFields, Value};
use crate::decoder::bits;
use codec::{Compact, Encode, Output};

impl Encode for Value {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		match self {
			Value::Unit => {}
			Value::Bool(v) => v.encode_to(dest),
			Value::Char(v) => (*v as u32).encode_to(dest),
			Value::Str(v) => v.encode_to(dest),
			Value::U8(v) => v.encode_to(dest),
			Value::U16(v) => v.encode_to(dest),
			Value::U32(v) => v.encode_to(dest),
			Value::U64(v) => v.encode_to(dest),
			Value::U128(v) => v.encode_to(dest),
			Value::I8(v) => v.encode_to(dest),
			Value::I16(v) => v.encode_to(dest),
			Value::I32(v) => v.encode_to(dest),
			Value::I64(v) => v.encode_to(dest),
			Value::I128(v) => v.encode_to(dest),
			Value::U256(v) | Value::I256(v) => dest.write(v),
			Value::Compact(v) => Compact(*v).encode_to(dest),
			Value::Sequence(items) => {
				Compact(items.len() as u32).encode_to(dest);
				items.iter().for_each(|item| item.encode_to(dest));
			}
			Value::Array(items) => items.iter().for_each(|item| item.encode_to(dest)),
			Value::Composite(fields) => fields.encode_to(dest),
			Value::Variant(variant) => {
				variant.index.encode_to(dest);
				variant.fields.encode_to(dest);
			}
			Value::BitSequence(bits) => bits.encode_to(dest),
		}
	}
}

impl Encode for DecodedField {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.value.encode_to(dest)
	}
}

impl Encode for DecodedFields {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		self.iter().for_each(|field| field.encode_to(dest))
	}
}

impl Encode for BitSequenceValue {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		dest.write(&bits::encode_bits(self.store, self.order, &self.bits))
	}
}
