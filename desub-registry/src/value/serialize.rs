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

use super::{BitSequenceValue, DecodedFields, Value, VariantValue};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		// Delegate to the serialization strategy used by the primitive types.
		match self {
			Value::Unit => serializer.serialize_unit(),
			Value::Bool(v) => v.serialize(serializer),
			Value::Char(v) => v.serialize(serializer),
			Value::Str(v) => v.serialize(serializer),
			Value::U8(v) => v.serialize(serializer),
			Value::U16(v) => v.serialize(serializer),
			Value::U32(v) => v.serialize(serializer),
			Value::U64(v) => v.serialize(serializer),
			// JSON numbers don't go past 64 bits, so larger values become decimal strings.
			Value::U128(v) | Value::Compact(v) => match u64::try_from(*v) {
				Ok(v) => v.serialize(serializer),
				Err(_) => serializer.collect_str(v),
			},
			Value::I8(v) => v.serialize(serializer),
			Value::I16(v) => v.serialize(serializer),
			Value::I32(v) => v.serialize(serializer),
			Value::I64(v) => v.serialize(serializer),
			Value::I128(v) => match i64::try_from(*v) {
				Ok(v) => v.serialize(serializer),
				Err(_) => serializer.collect_str(v),
			},
			Value::U256(v) | Value::I256(v) => serializer.collect_str(&format_args!("0x{}", hex::encode(v))),
			Value::Sequence(items) | Value::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Value::Composite(fields) => fields.serialize(serializer),
			Value::Variant(variant) => variant.serialize(serializer),
			Value::BitSequence(bits) => bits.serialize(serializer),
		}
	}
}

impl Serialize for DecodedFields {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		// Fields are often named after their type, so names can repeat. Repeated
		// names get their position appended to keep every key in the map.
		let mut counts: HashMap<&str, usize> = HashMap::new();
		for field in self.iter() {
			*counts.entry(field.name.as_str()).or_default() += 1;
		}

		let mut map = serializer.serialize_map(Some(self.len()))?;
		for (i, field) in self.iter().enumerate() {
			if counts.get(field.name.as_str()).copied().unwrap_or_default() > 1 {
				map.serialize_entry(&format!("{}_{}", field.name, i), &field.value)?;
			} else {
				map.serialize_entry(&field.name, &field.value)?;
			}
		}
		map.end()
	}
}

impl Serialize for VariantValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		// Variant names aren't 'static, so we can't use the serde enum representation.
		let mut map = serializer.serialize_map(Some(2))?;
		map.serialize_entry("name", &self.name)?;
		map.serialize_entry("values", &self.fields)?;
		map.end()
	}
}

impl Serialize for BitSequenceValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::decoder::{BitOrder, BitStore};
	use crate::value::DecodedField;
	use serde_json::json;

	fn assert_value(value: Value, expected: serde_json::Value) {
		let val = serde_json::to_value(&value).expect("can serialize to serde_json::Value");
		assert_eq!(val, expected);
	}

	#[test]
	fn serialize_primitives() {
		assert_value(Value::U8(1), json!(1));
		assert_value(Value::U64(1), json!(1));
		assert_value(Value::Compact(5), json!(5));
		assert_value(Value::Bool(true), json!(true));
		assert_value(Value::Str("hello".into()), json!("hello"));
		assert_value(Value::Unit, json!(null));
		assert_value(Value::U256([0xab; 32]), json!(format!("0x{}", "ab".repeat(32))));
	}

	#[test]
	fn serialize_integers_wider_than_64_bits() {
		assert_value(Value::U128(u64::MAX as u128), json!(u64::MAX));
		assert_value(Value::U128(u128::MAX), json!(u128::MAX.to_string()));
		assert_value(Value::Compact(1 << 64), json!("18446744073709551616"));
		assert_value(Value::I128(-5), json!(-5));
		assert_value(Value::I128(i128::MIN), json!(i128::MIN.to_string()));

		// 100 tokens with 18 decimals, as found in a balance transfer.
		let fields: DecodedFields = vec![DecodedField::new("amount", Value::Compact(100 * 10u128.pow(18)), 6)].into();
		assert_value(Value::Composite(fields), json!({ "amount": "100000000000000000000" }));
	}

	#[test]
	fn serialize_repeated_field_names() {
		let fields: DecodedFields = vec![
			DecodedField::new("T::AccountId", Value::U8(1), 0),
			DecodedField::new("T::AccountId", Value::U8(2), 0),
			DecodedField::new("T::Balance", Value::U8(3), 6),
		]
		.into();
		assert_value(
			Value::Composite(fields),
			json!({ "T::AccountId_0": 1, "T::AccountId_1": 2, "T::Balance": 3 }),
		);
	}

	#[test]
	fn serialize_composites_and_variants() {
		let fields: DecodedFields =
			vec![DecodedField::new("a", Value::Bool(true), 0), DecodedField::new("b", Value::Char('c'), 1)].into();
		assert_value(Value::Composite(fields.clone()), json!({ "a": true, "b": 'c' }));
		assert_value(
			Value::Variant(VariantValue { index: 2, name: "Foo".into(), fields }),
			json!({ "name": "Foo", "values": { "a": true, "b": 'c' } }),
		);
		assert_value(Value::Sequence(vec![Value::U8(1), Value::U8(2)]), json!([1, 2]));
	}

	#[test]
	fn serialize_bit_sequence() {
		let bits = BitSequenceValue { store: BitStore::U8, order: BitOrder::Msb0, bits: vec![false, true] };
		assert_value(Value::BitSequence(bits), json!("0b01"));
	}
}
