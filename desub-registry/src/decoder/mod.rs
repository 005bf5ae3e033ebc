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

//! Given some [`crate::Metadata`] obtained from a substrate node, this module builds trees of
//! [`FieldDecoder`]s that can decode SCALE encoded values, such as extrinsics, that are compatible
//! with that metadata.
//!
//! Decoder trees are built once per metadata version by a [`DecoderFactory`], and are immutable
//! afterwards. Recursive types are represented by [`FieldDecoder::Recursive`] nodes, which point
//! at a slot in the [`DecoderTable`] that was filled in by the same build.

pub(crate) mod bits;
mod extrinsic;
mod extrinsic_bytes;
mod factory;

use crate::metadata::{PrimitiveKind, TypeId};
use crate::value::{BitSequenceValue, DecodedField, DecodedFields, Value, VariantValue};
use codec::{Compact, Decode};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use bits::{BitOrder, BitStore};
pub use extrinsic::{
	DecodedExtrinsic, ExtrinsicDecodeError, ExtrinsicDecoder, ADDRESS_FIELD, CALL_FIELD, EXTRA_FIELD, SIGNATURE_FIELD,
};
pub use extrinsic_bytes::{AllExtrinsicBytes, ExtrinsicBytes, ExtrinsicBytesError, ExtrinsicBytesIter};
pub use factory::{BuildError, DecoderFactory, FieldOverride, RootDecoder};

/// An enum of the possible errors that can be returned from decoding bytes with a [`FieldDecoder`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
	#[error("Failed to decode")]
	CodecError(#[from] codec::Error),
	#[error("{0} is expected to be a valid char, but is not")]
	InvalidChar(u32),
	#[error("variant '{0}' not found")]
	VariantNotFound(u8),
	#[error("no recursive decoder found in slot {0}")]
	RecursiveDecoderNotFound(usize),
	#[error("sequence of {len} empty items is longer than the {remaining} bytes left")]
	SliceTooLong { len: usize, remaining: usize },
	#[error("couldn't decode field '{field}'")]
	Field {
		field: String,
		#[source]
		source: Box<DecodeError>,
	},
	#[error("couldn't decode item {index}")]
	Item {
		index: usize,
		#[source]
		source: Box<DecodeError>,
	},
}

impl DecodeError {
	fn in_field(self, field: &str) -> Self {
		DecodeError::Field { field: field.to_owned(), source: Box::new(self) }
	}

	fn in_item(self, index: usize) -> Self {
		DecodeError::Item { index, source: Box::new(self) }
	}

	/// The names of the fields (and `[i]` for sequence items) from the outermost
	/// field down to the one that failed to decode.
	pub fn field_path(&self) -> Vec<String> {
		let mut path = Vec::new();
		let mut err = self;
		loop {
			match err {
				DecodeError::Field { field, source } => {
					path.push(field.clone());
					err = source;
				}
				DecodeError::Item { index, source } => {
					path.push(format!("[{index}]"));
					err = source;
				}
				_ => return path,
			}
		}
	}

	/// The error that caused decoding to fail, without any field context.
	pub fn root_cause(&self) -> &DecodeError {
		match self {
			DecodeError::Field { source, .. } | DecodeError::Item { source, .. } => source.root_cause(),
			err => err,
		}
	}
}

/// The width of a compact encoded unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompactWidth {
	U8,
	U16,
	U32,
	U64,
	U128,
}

impl CompactWidth {
	pub fn from_primitive(kind: PrimitiveKind) -> Option<Self> {
		match kind {
			PrimitiveKind::U8 => Some(CompactWidth::U8),
			PrimitiveKind::U16 => Some(CompactWidth::U16),
			PrimitiveKind::U32 => Some(CompactWidth::U32),
			PrimitiveKind::U64 => Some(CompactWidth::U64),
			PrimitiveKind::U128 => Some(CompactWidth::U128),
			_ => None,
		}
	}
}

/// The kind of single value read by [`FieldDecoder::Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Primitive(PrimitiveKind),
	Compact(CompactWidth),
}

impl ValueKind {
	fn decode(&self, input: &mut &[u8]) -> Result<Value, DecodeError> {
		let value = match self {
			ValueKind::Primitive(kind) => match kind {
				PrimitiveKind::Bool => Value::Bool(bool::decode(input)?),
				PrimitiveKind::Char => {
					// There is no `char::decode`; chars are encoded as their u32 code point.
					let val = u32::decode(input)?;
					Value::Char(char::from_u32(val).ok_or(DecodeError::InvalidChar(val))?)
				}
				PrimitiveKind::Str => Value::Str(String::decode(input)?),
				PrimitiveKind::U8 => Value::U8(u8::decode(input)?),
				PrimitiveKind::U16 => Value::U16(u16::decode(input)?),
				PrimitiveKind::U32 => Value::U32(u32::decode(input)?),
				PrimitiveKind::U64 => Value::U64(u64::decode(input)?),
				PrimitiveKind::U128 => Value::U128(u128::decode(input)?),
				PrimitiveKind::U256 => Value::U256(<[u8; 32]>::decode(input)?),
				PrimitiveKind::I8 => Value::I8(i8::decode(input)?),
				PrimitiveKind::I16 => Value::I16(i16::decode(input)?),
				PrimitiveKind::I32 => Value::I32(i32::decode(input)?),
				PrimitiveKind::I64 => Value::I64(i64::decode(input)?),
				PrimitiveKind::I128 => Value::I128(i128::decode(input)?),
				PrimitiveKind::I256 => Value::I256(<[u8; 32]>::decode(input)?),
			},
			ValueKind::Compact(width) => Value::Compact(match width {
				CompactWidth::U8 => Compact::<u8>::decode(input)?.0.into(),
				CompactWidth::U16 => Compact::<u16>::decode(input)?.0.into(),
				CompactWidth::U32 => Compact::<u32>::decode(input)?.0.into(),
				CompactWidth::U64 => Compact::<u64>::decode(input)?.0.into(),
				CompactWidth::U128 => Compact::<u128>::decode(input)?.0,
			}),
		};
		Ok(value)
	}
}

/// One arm of a [`FieldDecoder::Variant`]. An arm without fields is a no-op: decoding
/// it reads nothing further and yields the discriminant byte as a [`Value::U8`].
#[derive(Debug, Clone, PartialEq)]
pub struct VariantArm {
	pub name: String,
	pub fields: Arc<[Field]>,
}

impl VariantArm {
	pub fn is_noop(&self) -> bool {
		self.fields.is_empty()
	}
}

/// A decoder for a single type. Child decoders are reference counted, so cloning
/// a decoder is cheap and sub-trees are shared between the places that use them.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecoder {
	/// Reads nothing.
	Noop,
	/// Reads a single primitive or compact value.
	Value(ValueKind),
	/// A fixed number of items, with no length prefix.
	Array { len: u32, item: Arc<FieldDecoder> },
	/// A compact length prefix followed by that many items.
	Slice(Arc<FieldDecoder>),
	/// Each field in order.
	Composite(Arc<[Field]>),
	/// A discriminant byte, followed by the fields of the matching arm.
	Variant(Arc<BTreeMap<u8, VariantArm>>),
	/// Defers to the decoder in the given [`DecoderTable`] slot, which was built for type `ty`.
	Recursive { slot: usize, ty: TypeId },
	BitSequence { store: BitStore, order: BitOrder },
}

impl FieldDecoder {
	/// Decode a value from the input, moving the cursor past the bytes that were consumed.
	pub fn decode(&self, table: &DecoderTable, input: &mut &[u8]) -> Result<Value, DecodeError> {
		match self {
			FieldDecoder::Noop => Ok(Value::Unit),
			FieldDecoder::Value(kind) => kind.decode(input),
			FieldDecoder::Array { len, item } => {
				let items = (0..*len as usize)
					.map(|i| item.decode(table, input).map_err(|e| e.in_item(i)))
					.collect::<Result<_, _>>()?;
				Ok(Value::Array(items))
			}
			FieldDecoder::Slice(item) => {
				// We are trusting the length here, so don't reserve more than the input could hold.
				let len = Compact::<u32>::decode(input)?.0 as usize;
				let remaining = input.len();
				let mut items = Vec::with_capacity(len.min(remaining));
				for i in 0..len {
					let before = input.len();
					items.push(item.decode(table, input).map_err(|e| e.in_item(i))?);
					// Items that read nothing are only bounded by the length prefix.
					if input.len() == before && len > remaining {
						return Err(DecodeError::SliceTooLong { len, remaining });
					}
				}
				Ok(Value::Sequence(items))
			}
			FieldDecoder::Composite(fields) => decode_fields(fields, table, input).map(Value::Composite),
			FieldDecoder::Variant(arms) => {
				let index = u8::decode(input)?;
				let arm = arms.get(&index).ok_or(DecodeError::VariantNotFound(index))?;
				log::trace!("variant {} ({})", arm.name, index);

				if arm.is_noop() {
					return Ok(Value::U8(index));
				}

				let fields = decode_fields(&arm.fields, table, input).map_err(|e| e.in_field(&arm.name))?;
				Ok(Value::Variant(VariantValue { index, name: arm.name.clone(), fields }))
			}
			FieldDecoder::Recursive { slot, .. } => {
				let decoder = table.get(*slot).ok_or(DecodeError::RecursiveDecoderNotFound(*slot))?;
				decoder.decode(table, input)
			}
			FieldDecoder::BitSequence { store, order } => {
				let bits = bits::decode_bits(*store, *order, input)?;
				Ok(Value::BitSequence(BitSequenceValue { store: *store, order: *order, bits }))
			}
		}
	}
}

/// A named field, the decoder for it, and the ID of the type that the decoder was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	pub name: String,
	pub decoder: FieldDecoder,
	pub lookup_index: TypeId,
}

impl Field {
	pub fn new(name: impl Into<String>, decoder: FieldDecoder, lookup_index: TypeId) -> Self {
		Field { name: name.into(), decoder, lookup_index }
	}

	pub fn decode(&self, table: &DecoderTable, input: &mut &[u8]) -> Result<DecodedField, DecodeError> {
		log::trace!("decoding field '{}' (type {})", self.name, self.lookup_index);
		let value = self.decoder.decode(table, input).map_err(|e| e.in_field(&self.name))?;
		Ok(DecodedField { name: self.name.clone(), value, lookup_index: self.lookup_index })
	}
}

/// Decode each of the fields in order.
pub fn decode_fields(fields: &[Field], table: &DecoderTable, input: &mut &[u8]) -> Result<DecodedFields, DecodeError> {
	fields.iter().map(|field| field.decode(table, input)).collect()
}

/// The decoders that [`FieldDecoder::Recursive`] nodes refer to. Each build produces one
/// of these, and it must be handed to every decode that uses decoders from that build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoderTable {
	slots: Vec<FieldDecoder>,
}

impl DecoderTable {
	pub(crate) fn new(slots: Vec<FieldDecoder>) -> Self {
		DecoderTable { slots }
	}

	pub fn get(&self, slot: usize) -> Option<&FieldDecoder> {
		self.slots.get(slot)
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use codec::Encode;

	fn u8_field(name: &str) -> Field {
		Field::new(name, FieldDecoder::Value(ValueKind::Primitive(PrimitiveKind::U8)), 0)
	}

	fn variant(arms: Vec<(u8, VariantArm)>) -> FieldDecoder {
		FieldDecoder::Variant(Arc::new(arms.into_iter().collect()))
	}

	#[test]
	fn noop_reads_nothing() {
		let input = [1u8, 2];
		let cursor = &mut &input[..];
		assert_eq!(FieldDecoder::Noop.decode(&DecoderTable::default(), cursor), Ok(Value::Unit));
		assert_eq!(cursor.len(), 2);
	}

	#[test]
	fn primitives_and_compacts() {
		let table = DecoderTable::default();
		let char_bytes = ('x' as u32).encode();
		assert_eq!(
			FieldDecoder::Value(ValueKind::Primitive(PrimitiveKind::Char)).decode(&table, &mut &*char_bytes),
			Ok(Value::Char('x'))
		);

		let bad_char = 0xD800u32.encode();
		assert_eq!(
			FieldDecoder::Value(ValueKind::Primitive(PrimitiveKind::Char)).decode(&table, &mut &*bad_char),
			Err(DecodeError::InvalidChar(0xD800))
		);

		let compact = Compact(70_000u32).encode();
		assert_eq!(
			FieldDecoder::Value(ValueKind::Compact(CompactWidth::U32)).decode(&table, &mut &*compact),
			Ok(Value::Compact(70_000))
		);
	}

	#[test]
	fn array_has_no_length_prefix() {
		let decoder = FieldDecoder::Array { len: 3, item: Arc::new(u8_field("x").decoder) };
		let cursor = &mut &[1u8, 2, 3, 4][..];
		assert_eq!(
			decoder.decode(&DecoderTable::default(), cursor),
			Ok(Value::Array(vec![Value::U8(1), Value::U8(2), Value::U8(3)]))
		);
		assert_eq!(*cursor, &[4u8][..]);
	}

	#[test]
	fn slice_reads_compact_length() {
		let decoder = FieldDecoder::Slice(Arc::new(u8_field("x").decoder));
		let bytes = b"test".to_vec().encode();
		let value = decoder.decode(&DecoderTable::default(), &mut &*bytes).unwrap();
		assert_eq!(value.as_bytes(), Some(b"test".to_vec()));
	}

	#[test]
	fn slice_of_empty_items_is_bounded_by_input() {
		let decoder = FieldDecoder::Slice(Arc::new(FieldDecoder::Noop));
		let table = DecoderTable::default();

		let huge = Compact(1u32 << 30).encode();
		assert_eq!(
			decoder.decode(&table, &mut &*huge),
			Err(DecodeError::SliceTooLong { len: 1 << 30, remaining: 0 })
		);

		let mut short = Compact(2u32).encode();
		short.extend([7u8, 8]);
		let cursor = &mut &*short;
		assert_eq!(decoder.decode(&table, cursor), Ok(Value::Sequence(vec![Value::Unit, Value::Unit])));
		assert_eq!(*cursor, &[7u8, 8][..]);

		assert_eq!(decoder.decode(&table, &mut &[0u8][..]), Ok(Value::Sequence(vec![])));
	}

	#[test]
	fn unit_variant_yields_discriminant() {
		let decoder = variant(vec![
			(0, VariantArm { name: "None".into(), fields: Arc::from(vec![]) }),
			(1, VariantArm { name: "Some".into(), fields: Arc::from(vec![u8_field("value")]) }),
		]);
		let table = DecoderTable::default();
		assert_eq!(decoder.decode(&table, &mut &[0u8][..]), Ok(Value::U8(0)));

		let Value::Variant(some) = decoder.decode(&table, &mut &[1u8, 9][..]).unwrap() else {
			panic!("expected a variant value")
		};
		assert_eq!((some.index, some.name.as_str()), (1, "Some"));
		assert_eq!(some.fields.get_by_name::<u8>("value"), Ok(9));
	}

	#[test]
	fn unknown_variant_fails() {
		let decoder = variant(vec![(0, VariantArm { name: "A".into(), fields: Arc::from(vec![]) })]);
		assert_eq!(decoder.decode(&DecoderTable::default(), &mut &[7u8][..]), Err(DecodeError::VariantNotFound(7)));
	}

	#[test]
	fn errors_carry_field_path() {
		let inner = FieldDecoder::Composite(Arc::from(vec![u8_field("a"), u8_field("b")]));
		let outer = Field::new("outer", FieldDecoder::Slice(Arc::new(inner)), 0);

		// One item, which runs out of bytes on field 'b'.
		let err = outer.decode(&DecoderTable::default(), &mut &[4u8, 1][..]).unwrap_err();
		assert_eq!(err.field_path(), vec!["outer", "[0]", "b"]);
		assert!(matches!(err.root_cause(), DecodeError::CodecError(_)));

		// Each level names only itself, the rest of the chain comes from `source()`.
		assert_eq!(err.to_string(), "couldn't decode field 'outer'");
		let chain = desub_common::display_chain(&err);
		assert!(chain.starts_with("couldn't decode field 'outer': couldn't decode item 0: couldn't decode field 'b': Failed to decode"), "{chain}");
		assert_eq!(chain.matches("couldn't decode field 'b'").count(), 1);
	}

	#[test]
	fn recursive_resolves_through_table() {
		// A linked list: struct Node { value: u8, next: Option<Node> }
		let option = variant(vec![
			(0, VariantArm { name: "None".into(), fields: Arc::from(vec![]) }),
			(1, VariantArm { name: "Some".into(), fields: Arc::from(vec![Field::new("0", FieldDecoder::Recursive { slot: 0, ty: 0 }, 0)]) }),
		]);
		let node = FieldDecoder::Composite(Arc::from(vec![u8_field("value"), Field::new("next", option, 1)]));
		let table = DecoderTable::new(vec![node.clone()]);

		let cursor = &mut &[1u8, 1, 2, 0][..];
		let Value::Composite(fields) = node.decode(&table, cursor).unwrap() else { panic!("expected a composite") };
		assert!(cursor.is_empty());
		assert_eq!(fields.get_by_name::<u8>("value"), Ok(1));

		let missing = FieldDecoder::Recursive { slot: 3, ty: 0 };
		assert_eq!(missing.decode(&table, &mut &[0u8][..]), Err(DecodeError::RecursiveDecoderNotFound(3)));
	}
}
