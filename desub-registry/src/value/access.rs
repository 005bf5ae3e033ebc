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

//! Typed access to [`DecodedFields`].

use super::{BitSequenceValue, DecodedField, DecodedFields, Value, VariantValue};
use codec::Compact;

/// An error returned when a decoded field can't be found or converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
	#[error("decoded field not found")]
	FieldNotFound,
	#[error("decoded field value type mismatch: expected {expected}, got {found}")]
	ValueTypeMismatch { expected: &'static str, found: &'static str },
	#[error("decoded field value is a {0}, not a sequence")]
	NotASequence(&'static str),
}

/// Types that can be read out of a decoded [`Value`].
pub trait FromValue: Sized {
	fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value_impls {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl FromValue for $ty {
				fn from_value(value: &Value) -> Option<Self> {
					match value {
						Value::$variant(v) => Some(v.clone()),
						_ => None,
					}
				}
			}
		)*
	};
}

from_value_impls!(
	bool => Bool,
	char => Char,
	String => Str,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	u128 => U128,
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	i128 => I128,
	DecodedFields => Composite,
	VariantValue => Variant,
	BitSequenceValue => BitSequence,
);

impl FromValue for Compact<u128> {
	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Compact(v) => Some(Compact(*v)),
			_ => None,
		}
	}
}

/// Byte sequences and byte arrays.
impl FromValue for Vec<u8> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_bytes()
	}
}

impl FromValue for Value {
	fn from_value(value: &Value) -> Option<Self> {
		Some(value.clone())
	}
}

fn mismatch<T>(value: &Value) -> AccessError {
	AccessError::ValueTypeMismatch { expected: std::any::type_name::<T>(), found: value.kind_name() }
}

/// A predicate matching the field with the given name.
pub fn with_name(name: &str) -> impl Fn(usize, &DecodedField) -> bool + '_ {
	move |_, field| field.name == name
}

/// A predicate matching the field at the given position.
pub fn at_index(index: usize) -> impl Fn(usize, &DecodedField) -> bool {
	move |i, _| i == index
}

impl DecodedFields {
	/// Return the first field that matches the predicate.
	pub fn find<P>(&self, mut predicate: P) -> Result<&DecodedField, AccessError>
	where
		P: FnMut(usize, &DecodedField) -> bool,
	{
		self.iter().enumerate().find(|(i, field)| predicate(*i, *field)).map(|(_, field)| field).ok_or(AccessError::FieldNotFound)
	}

	/// Apply `process` to the value of the first field that matches the predicate.
	pub fn process<T, P, F>(&self, predicate: P, process: F) -> Result<T, AccessError>
	where
		P: FnMut(usize, &DecodedField) -> bool,
		F: FnOnce(&Value) -> Result<T, AccessError>,
	{
		process(&self.find(predicate)?.value)
	}

	/// Return the value of the first field that matches the predicate as `T`.
	pub fn get_as<T, P>(&self, predicate: P) -> Result<T, AccessError>
	where
		T: FromValue,
		P: FnMut(usize, &DecodedField) -> bool,
	{
		self.process(predicate, |value| T::from_value(value).ok_or_else(|| mismatch::<T>(value)))
	}

	/// Return the value of the first field that matches the predicate as a `Vec<T>`. The field
	/// must hold a sequence or array, and every item must convert, or nothing is returned.
	pub fn get_as_vec<T, P>(&self, predicate: P) -> Result<Vec<T>, AccessError>
	where
		T: FromValue,
		P: FnMut(usize, &DecodedField) -> bool,
	{
		self.process(predicate, |value| {
			let items = value.items().ok_or(AccessError::NotASequence(value.kind_name()))?;
			items.iter().map(|item| T::from_value(item).ok_or_else(|| mismatch::<T>(item))).collect()
		})
	}

	/// Shorthand for [`DecodedFields::get_as`] with a field name.
	pub fn get_by_name<T: FromValue>(&self, name: &str) -> Result<T, AccessError> {
		self.get_as(with_name(name))
	}
}
