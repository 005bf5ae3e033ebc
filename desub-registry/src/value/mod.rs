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

/*!
This module exposes the [`Value`] type and related subtypes, which are the runtime
representations of SCALE encoded data that was decoded with a
[`crate::decoder::FieldDecoder`] (much like `serde_json::Value` is a runtime representation
of JSON data).

Values can be looked up and converted into concrete types with the accessors on
[`DecodedFields`], and turned back into their SCALE encoded bytes via [`codec::Encode`].
*/

mod access;
mod encode;
mod serialize;

use crate::decoder::{BitOrder, BitStore};
use crate::metadata::TypeId;
use std::fmt;
use std::ops::Deref;

pub use access::{AccessError, FromValue};

/// A value that has been decoded. The shape mirrors the decoder that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Produced by a no-op decoder (eg an empty tuple); nothing was read.
	Unit,
	Bool(bool),
	Char(char),
	Str(String),
	U8(u8),
	U16(u16),
	U32(u32),
	U64(u64),
	U128(u128),
	U256([u8; 32]),
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	I128(i128),
	I256([u8; 32]),
	/// A compact encoded unsigned integer.
	Compact(u128),
	/// A length prefixed sequence of values.
	Sequence(Vec<Value>),
	/// A fixed length array of values.
	Array(Vec<Value>),
	/// A struct or tuple.
	Composite(DecodedFields),
	/// An enum variant with fields. Variants without fields decode to a [`Value::U8`]
	/// holding the discriminant.
	Variant(VariantValue),
	BitSequence(BitSequenceValue),
}

impl Value {
	/// A short name for the shape of this value, used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Unit => "unit",
			Value::Bool(_) => "bool",
			Value::Char(_) => "char",
			Value::Str(_) => "str",
			Value::U8(_) => "u8",
			Value::U16(_) => "u16",
			Value::U32(_) => "u32",
			Value::U64(_) => "u64",
			Value::U128(_) => "u128",
			Value::U256(_) => "u256",
			Value::I8(_) => "i8",
			Value::I16(_) => "i16",
			Value::I32(_) => "i32",
			Value::I64(_) => "i64",
			Value::I128(_) => "i128",
			Value::I256(_) => "i256",
			Value::Compact(_) => "compact",
			Value::Sequence(_) => "sequence",
			Value::Array(_) => "array",
			Value::Composite(_) => "composite",
			Value::Variant(_) => "variant",
			Value::BitSequence(_) => "bit sequence",
		}
	}

	/// The items of a sequence or array value.
	pub fn items(&self) -> Option<&[Value]> {
		match self {
			Value::Sequence(items) | Value::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Interpret a sequence or array of `u8` values as raw bytes.
	pub fn as_bytes(&self) -> Option<Vec<u8>> {
		self.items()?
			.iter()
			.map(|item| match item {
				Value::U8(b) => Some(*b),
				_ => None,
			})
			.collect()
	}
}

/// The variant of an enum that was decoded, along with its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantValue {
	pub index: u8,
	pub name: String,
	pub fields: DecodedFields,
}

/// A decoded bit sequence. The store and order are kept so that the bits can
/// be encoded again exactly as they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSequenceValue {
	pub store: BitStore,
	pub order: BitOrder,
	pub bits: Vec<bool>,
}

impl fmt::Display for BitSequenceValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("0b")?;
		for bit in &self.bits {
			f.write_str(if *bit { "1" } else { "0" })?;
		}
		Ok(())
	}
}

/// A single decoded field: its name, value and the ID of the type it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
	pub name: String,
	pub value: Value,
	pub lookup_index: TypeId,
}

impl DecodedField {
	pub fn new(name: impl Into<String>, value: Value, lookup_index: TypeId) -> Self {
		DecodedField { name: name.into(), value, lookup_index }
	}
}

/// An ordered list of decoded fields. This follows the decoders that were actually
/// used, so fields of enum variants that were not present are not here either.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFields(Vec<DecodedField>);

impl DecodedFields {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, field: DecodedField) {
		self.0.push(field)
	}

	/// The first field with the given name.
	pub fn field(&self, name: &str) -> Option<&DecodedField> {
		self.0.iter().find(|f| f.name == name)
	}

	pub fn into_inner(self) -> Vec<DecodedField> {
		self.0
	}
}

impl Deref for DecodedFields {
	type Target = [DecodedField];
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<Vec<DecodedField>> for DecodedFields {
	fn from(fields: Vec<DecodedField>) -> Self {
		DecodedFields(fields)
	}
}

impl FromIterator<DecodedField> for DecodedFields {
	fn from_iter<I: IntoIterator<Item = DecodedField>>(iter: I) -> Self {
		DecodedFields(iter.into_iter().collect())
	}
}

impl IntoIterator for DecodedFields {
	type Item = DecodedField;
	type IntoIter = std::vec::IntoIter<DecodedField>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a DecodedFields {
	type Item = &'a DecodedField;
	type IntoIter = std::slice::Iter<'a, DecodedField>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn bytes_from_u8_sequence() {
		let value = Value::Sequence(b"test".iter().map(|b| Value::U8(*b)).collect());
		assert_eq!(value.as_bytes(), Some(b"test".to_vec()));
		assert_eq!(Value::Sequence(vec![Value::U16(1)]).as_bytes(), None);
		assert_eq!(Value::Bool(true).as_bytes(), None);
	}

	#[test]
	fn bit_sequence_display() {
		let bits = BitSequenceValue { store: BitStore::U8, order: BitOrder::Lsb0, bits: vec![true, false, true, true] };
		assert_eq!(bits.to_string(), "0b1011");
	}

	#[test]
	fn field_by_name() {
		let fields: DecodedFields =
			vec![DecodedField::new("a", Value::U8(1), 0), DecodedField::new("b", Value::Bool(true), 1)].into();
		assert_eq!(fields.field("b").map(|f| &f.value), Some(&Value::Bool(true)));
		assert!(fields.field("c").is_none());
		assert_eq!(fields.len(), 2);
	}
}
