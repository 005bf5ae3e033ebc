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

//! Lookup tables from the on-chain identifiers of calls, events and errors to
//! decoders for their fields, built from a [`Metadata`] by a [`DecoderFactory`].

use crate::decoder::{
	decode_fields, BuildError, DecodeError, DecoderFactory, DecoderTable, ExtrinsicDecoder, Field,
};
use crate::metadata::{DescriptorKind, Metadata, MetadataError, VariantDescriptor};
use crate::value::DecodedFields;
use codec::Decode;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// An enum of the possible errors that can be returned from building or using a registry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
	#[error(transparent)]
	Metadata(#[from] MetadataError),
	#[error("couldn't get fields for {kind} '{name}'")]
	FieldsNotBuilt {
		kind: DescriptorKind,
		name: String,
		#[source]
		source: BuildError,
	},
	#[error("couldn't get decoder for extrinsic field '{name}'")]
	ExtrinsicField {
		name: String,
		#[source]
		source: BuildError,
	},
	#[error("Failed to decode")]
	CodecError(#[from] codec::Error),
	#[error("{kind} with pallet index {pallet} and index {index} not found")]
	NotFound { kind: DescriptorKind, pallet: u8, index: u8 },
	#[error("couldn't decode {kind} '{name}'")]
	Decode {
		kind: DescriptorKind,
		name: String,
		#[source]
		source: DecodeError,
	},
}

/// Identifies a call by the index of its pallet and its index within that pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CallIndex {
	pub pallet: u8,
	pub call: u8,
}

/// Identifies an event by the index of its pallet and its index within that pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventId {
	pub pallet: u8,
	pub event: u8,
}

/// Decodes the fields of one call, event or error.
#[derive(Debug, Clone)]
pub struct TypeDecoder {
	name: String,
	fields: Vec<Field>,
	table: Arc<DecoderTable>,
}

impl TypeDecoder {
	pub(crate) fn new(name: String, fields: Vec<Field>, table: Arc<DecoderTable>) -> Self {
		TypeDecoder { name, fields, table }
	}

	/// The name of the decoded thing, eg `Balances.transfer`.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	pub fn decode(&self, input: &mut &[u8]) -> Result<DecodedFields, DecodeError> {
		decode_fields(&self.fields, &self.table, input)
	}
}

/// A call or event decoded via a [`Registry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedVariant {
	pub pallet_index: u8,
	pub index: u8,
	pub name: String,
	pub fields: DecodedFields,
}

/// A table of [`TypeDecoder`]s. Once built it is never modified, so it can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct Registry<K> {
	decoders: HashMap<K, TypeDecoder>,
}

impl<K> Default for Registry<K> {
	fn default() -> Self {
		Registry { decoders: HashMap::new() }
	}
}

impl<K: Eq + Hash> Registry<K> {
	pub fn get<Q>(&self, key: &Q) -> Option<&TypeDecoder>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.decoders.get(key)
	}

	pub fn len(&self) -> usize {
		self.decoders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decoders.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&K, &TypeDecoder)> {
		self.decoders.iter()
	}
}

pub type CallRegistry = Registry<CallIndex>;
pub type EventRegistry = Registry<EventId>;
/// Errors are keyed by `"<Pallet>.<Variant>"`, since that's how they are reported in dispatch results.
pub type ErrorRegistry = Registry<String>;

impl Registry<CallIndex> {
	/// Decode a call: the pallet index, the call index, then the call's arguments.
	pub fn decode_call(&self, input: &mut &[u8]) -> Result<DecodedVariant, RegistryError> {
		let pallet = u8::decode(input)?;
		let call = u8::decode(input)?;
		decode_variant(self.get(&CallIndex { pallet, call }), DescriptorKind::Call, pallet, call, input)
	}
}

impl Registry<EventId> {
	/// Decode an event: the pallet index, the event index, then the event's fields.
	pub fn decode_event(&self, input: &mut &[u8]) -> Result<DecodedVariant, RegistryError> {
		let pallet = u8::decode(input)?;
		let event = u8::decode(input)?;
		decode_variant(self.get(&EventId { pallet, event }), DescriptorKind::Event, pallet, event, input)
	}
}

fn decode_variant(
	decoder: Option<&TypeDecoder>,
	kind: DescriptorKind,
	pallet: u8,
	index: u8,
	input: &mut &[u8],
) -> Result<DecodedVariant, RegistryError> {
	let decoder = decoder.ok_or(RegistryError::NotFound { kind, pallet, index })?;
	let fields = decoder
		.decode(input)
		.map_err(|source| RegistryError::Decode { kind, name: decoder.name.clone(), source })?;
	Ok(DecodedVariant { pallet_index: pallet, index, name: decoder.name.clone(), fields })
}

impl DecoderFactory {
	/// Build decoders for every call of every pallet in the metadata.
	pub fn create_call_registry(&self, metadata: &Metadata) -> Result<CallRegistry, RegistryError> {
		self.create_registry(metadata, DescriptorKind::Call, |d| CallIndex { pallet: d.pallet_index, call: d.variant_index })
	}

	/// Build decoders for every event of every pallet in the metadata.
	pub fn create_event_registry(&self, metadata: &Metadata) -> Result<EventRegistry, RegistryError> {
		self.create_registry(metadata, DescriptorKind::Event, |d| EventId { pallet: d.pallet_index, event: d.variant_index })
	}

	/// Build decoders for every error of every pallet in the metadata.
	pub fn create_error_registry(&self, metadata: &Metadata) -> Result<ErrorRegistry, RegistryError> {
		self.create_registry(metadata, DescriptorKind::Error, VariantDescriptor::full_name)
	}

	/// Build a decoder for the extrinsics described by the metadata.
	pub fn create_extrinsic_decoder(&self, metadata: &Metadata) -> Result<ExtrinsicDecoder, RegistryError> {
		let mut builder = self.builder(metadata.types());
		let mut fields = Vec::with_capacity(metadata.extrinsic().params().len());
		for param in metadata.extrinsic().params() {
			let decoder = builder
				.build_type(&param.name, param.ty)
				.map_err(|source| RegistryError::ExtrinsicField { name: param.name.clone(), source })?;
			fields.push(Field::new(param.name.clone(), decoder, param.ty));
		}
		let table = builder.finish();
		log::debug!("built extrinsic decoder with {} fields ({} recursive types)", fields.len(), table.len());
		Ok(ExtrinsicDecoder::new(fields, Arc::new(table)))
	}

	fn create_registry<K: Eq + Hash>(
		&self,
		metadata: &Metadata,
		kind: DescriptorKind,
		key: impl Fn(&VariantDescriptor) -> K,
	) -> Result<Registry<K>, RegistryError> {
		let descriptors = metadata.variant_descriptors(kind)?;

		// One build for the whole registry, so types shared between entries are only built once.
		let mut builder = self.builder(metadata.types());
		let mut entries = Vec::with_capacity(descriptors.len());
		for descriptor in &descriptors {
			let name = descriptor.full_name();
			let fields = builder
				.build_fields(&descriptor.fields)
				.map_err(|source| RegistryError::FieldsNotBuilt { kind, name: name.clone(), source })?;
			entries.push((key(descriptor), name, fields));
		}

		let table = Arc::new(builder.finish());
		let decoders: HashMap<_, _> = entries
			.into_iter()
			.map(|(key, name, fields)| (key, TypeDecoder::new(name, fields, table.clone())))
			.collect();
		log::debug!("built {} registry with {} entries ({} recursive types)", kind, decoders.len(), table.len());

		Ok(Registry { decoders })
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::metadata::{
		FieldDefinition, MetadataExtrinsic, PalletDescriptor, PrimitiveKind, RegistryType, TypeDefinition, TypeRegistry,
		VariantDefinition,
	};
	use crate::value::Value;

	fn variant_type(variants: Vec<VariantDefinition>) -> RegistryType {
		RegistryType::new(TypeDefinition::Variant(variants))
	}

	fn metadata(types: TypeRegistry, pallets: Vec<PalletDescriptor>) -> Metadata {
		Metadata::new(types, pallets, MetadataExtrinsic::new(4, vec![], vec![]))
	}

	fn test_types() -> TypeRegistry {
		TypeRegistry::new()
			.with_type(0, RegistryType::new(TypeDefinition::Primitive(PrimitiveKind::U8)))
			.with_type(1, RegistryType::new(TypeDefinition::Primitive(PrimitiveKind::Bool)))
			.with_type(
				2,
				variant_type(vec![
					VariantDefinition::new("first_call", 0, vec![FieldDefinition::named("x", 0)]),
					VariantDefinition::new("second_call", 1, vec![FieldDefinition::named("y", 1)]),
				]),
			)
			.with_type(
				3,
				variant_type(vec![VariantDefinition::new("Happened", 2, vec![FieldDefinition::unnamed(0)])]),
			)
			.with_type(
				4,
				variant_type(vec![
					VariantDefinition::new("ErrorVariant1", 0, vec![FieldDefinition::named("ErrorVariant1Field", 99)]),
				]),
			)
	}

	#[test]
	fn no_pallets_yields_empty_registries() {
		let meta = metadata(test_types(), vec![PalletDescriptor::new("TestModule", 0)]);
		let factory = DecoderFactory::new();
		assert!(factory.create_call_registry(&meta).unwrap().is_empty());
		assert!(factory.create_event_registry(&meta).unwrap().is_empty());
		assert!(factory.create_error_registry(&meta).unwrap().is_empty());
	}

	#[test]
	fn call_registry_is_keyed_by_indexes() {
		let meta = metadata(test_types(), vec![PalletDescriptor::new("TestModule", 5).with_calls(2)]);
		let calls = DecoderFactory::new().create_call_registry(&meta).unwrap();
		assert_eq!(calls.len(), 2);

		let first = calls.get(&CallIndex { pallet: 5, call: 0 }).unwrap();
		assert_eq!(first.name(), "TestModule.first_call");
		assert_eq!(first.fields()[0].lookup_index, 0);
		assert_eq!(calls.get(&CallIndex { pallet: 5, call: 1 }).unwrap().name(), "TestModule.second_call");

		let decoded = calls.decode_call(&mut &[5u8, 1, 1][..]).unwrap();
		assert_eq!(decoded.name, "TestModule.second_call");
		assert_eq!(decoded.fields.get_by_name::<bool>("y"), Ok(true));

		assert!(matches!(
			calls.decode_call(&mut &[5u8, 9][..]),
			Err(RegistryError::NotFound { kind: DescriptorKind::Call, pallet: 5, index: 9 })
		));
	}

	#[test]
	fn event_registry_decodes_events() {
		let meta = metadata(test_types(), vec![PalletDescriptor::new("System", 0).with_events(3)]);
		let events = DecoderFactory::new().create_event_registry(&meta).unwrap();

		let decoded = events.decode_event(&mut &[0u8, 2, 42][..]).unwrap();
		assert_eq!((decoded.pallet_index, decoded.index, decoded.name.as_str()), (0, 2, "System.Happened"));
		assert_eq!(decoded.fields[0].value, Value::U8(42));

		let err = events.decode_event(&mut &[0u8, 2][..]).unwrap_err();
		assert!(matches!(err, RegistryError::Decode { kind: DescriptorKind::Event, .. }), "{err:?}");
	}

	#[test]
	fn missing_error_field_type_is_reported() {
		let meta = metadata(test_types(), vec![PalletDescriptor::new("TestModule", 0).with_errors(4)]);
		let err = DecoderFactory::new().create_error_registry(&meta).unwrap_err();
		assert_eq!(err.to_string(), "couldn't get fields for error 'TestModule.ErrorVariant1'");
		assert_eq!(
			desub_common::display_chain(&err),
			"couldn't get fields for error 'TestModule.ErrorVariant1': type not found for field 'ErrorVariant1Field'"
		);
	}

	#[test]
	fn metadata_errors_pass_through() {
		let meta = metadata(test_types(), vec![PalletDescriptor::new("TestModule", 0).with_calls(0)]);
		let err = DecoderFactory::new().create_call_registry(&meta).unwrap_err();
		assert!(matches!(err, RegistryError::Metadata(MetadataError::PalletTypeNotAVariant { .. })), "{err:?}");
	}

	#[test]
	fn shared_recursive_table() {
		// Two calls that both take a recursive `enum List { Nil, Cons(u8, Box<List>) }`.
		let types = TypeRegistry::new()
			.with_type(0, RegistryType::new(TypeDefinition::Primitive(PrimitiveKind::U8)))
			.with_type(
				1,
				variant_type(vec![
					VariantDefinition::new("Nil", 0, vec![]),
					VariantDefinition::new("Cons", 1, vec![FieldDefinition::unnamed(0), FieldDefinition::unnamed(1)]),
				]),
			)
			.with_type(
				2,
				variant_type(vec![
					VariantDefinition::new("a", 0, vec![FieldDefinition::named("list", 1)]),
					VariantDefinition::new("b", 1, vec![FieldDefinition::named("list", 1)]),
				]),
			);
		let meta = metadata(types, vec![PalletDescriptor::new("Lists", 0).with_calls(2)]);
		let calls = DecoderFactory::new().create_call_registry(&meta).unwrap();

		let a = calls.get(&CallIndex { pallet: 0, call: 0 }).unwrap();
		let b = calls.get(&CallIndex { pallet: 0, call: 1 }).unwrap();
		assert!(Arc::ptr_eq(&a.table, &b.table));
		assert_eq!(a.table.len(), 1);

		let decoded = calls.decode_call(&mut &[0u8, 1, 1, 7, 1, 8, 0][..]).unwrap();
		assert_eq!(decoded.name, "Lists.b");
	}
}
