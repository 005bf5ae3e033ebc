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

use super::{BitOrder, BitStore, CompactWidth, DecodeError, DecoderTable, Field, FieldDecoder, ValueKind, VariantArm};
use crate::metadata::{FieldDefinition, PrimitiveKind, TypeDefinition, TypeId, TypeRegistry};
use crate::registry::TypeDecoder;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// An enum of the possible errors that can be returned when building decoders from a [`TypeRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
	#[error("type not found for field '{field}'")]
	TypeNotFound { field: String, ty: TypeId },
	#[error("unsupported field type definition '{0}'")]
	UnsupportedTypeDefinition(&'static str),
	#[error("compact encoding of '{0}' is not supported")]
	UnsupportedCompactTarget(String),
	#[error("bit store type '{0}' is not supported")]
	BitStoreTypeNotSupported(String),
	#[error("bit order '{0}' is not supported")]
	BitOrderNotSupported(String),
	#[error("couldn't get field decoder for '{field}'")]
	Field {
		field: String,
		#[source]
		source: Box<BuildError>,
	},
}

impl BuildError {
	fn in_field(self, field: &str) -> Self {
		BuildError::Field { field: field.to_owned(), source: Box::new(self) }
	}

	/// The names of the fields from the outermost one down to the one that failed.
	pub fn field_path(&self) -> Vec<String> {
		match self {
			BuildError::Field { field, source } => {
				let mut path = vec![field.clone()];
				path.extend(source.field_path());
				path
			}
			BuildError::TypeNotFound { field, .. } => vec![field.clone()],
			_ => Vec::new(),
		}
	}

	/// The error that caused the build to fail, without any field context.
	pub fn root_cause(&self) -> &BuildError {
		match self {
			BuildError::Field { source, .. } => source.root_cause(),
			err => err,
		}
	}
}

/// Replaces whatever decoder would be built for the type with the given ID.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverride {
	pub lookup_index: TypeId,
	pub decoder: FieldDecoder,
}

/// Builds [`FieldDecoder`] trees from a [`TypeRegistry`]. See [`crate::registry`] for
/// building the call, event and error registries and the extrinsic decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderFactory {
	overrides: HashMap<TypeId, FieldDecoder>,
}

impl DecoderFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// A factory that uses the given decoders for their types instead of building them
	/// from the registry. Useful for chain specific types that the metadata describes poorly.
	pub fn with_overrides(overrides: impl IntoIterator<Item = FieldOverride>) -> Self {
		DecoderFactory { overrides: overrides.into_iter().map(|o| (o.lookup_index, o.decoder)).collect() }
	}

	pub(crate) fn builder<'a>(&'a self, types: &'a TypeRegistry) -> Builder<'a> {
		Builder { types, overrides: &self.overrides, storages: HashMap::new(), slots: Vec::new() }
	}

	/// Build a decoder for the type with the given ID.
	pub fn build_decoder(&self, types: &TypeRegistry, ty: TypeId) -> Result<RootDecoder, BuildError> {
		let name = types.resolve(ty).and_then(|t| t.ident()).unwrap_or("root");
		let mut builder = self.builder(types);
		let decoder = builder.build_type(name, ty)?;
		Ok(RootDecoder { decoder, table: Arc::new(builder.finish()) })
	}

	/// Build a decoder for a list of fields, such as those of a call variant.
	pub fn build_type_decoder(
		&self,
		types: &TypeRegistry,
		name: impl Into<String>,
		fields: &[FieldDefinition],
	) -> Result<TypeDecoder, BuildError> {
		let mut builder = self.builder(types);
		let fields = builder.build_fields(fields)?;
		Ok(TypeDecoder::new(name.into(), fields, Arc::new(builder.finish())))
	}
}

/// A decoder for a single type, along with the table its recursive nodes refer to.
#[derive(Debug, Clone)]
pub struct RootDecoder {
	pub decoder: FieldDecoder,
	pub table: Arc<DecoderTable>,
}

impl RootDecoder {
	pub fn decode(&self, input: &mut &[u8]) -> Result<Value, DecodeError> {
		self.decoder.decode(&self.table, input)
	}
}

/// The name given to a field: its own name if it has one, then the name
/// of its type, and finally its position.
pub(crate) fn field_name(index: usize, field: &FieldDefinition) -> String {
	field.name.clone().or_else(|| field.type_name.clone()).unwrap_or_else(|| format!("field_{index}"))
}

fn tuple_item_name(index: usize) -> String {
	format!("tuple_item_{index}")
}

enum Storage {
	/// We're partway through building this type. If it turns out to be recursive,
	/// the finished decoder goes in `slot`.
	InProgress { slot: Option<usize> },
	Complete(FieldDecoder),
}

/// The state for one build. Every decoder that is built is cached by type ID, so types that
/// are used in several places are only built once, and decoders for recursive types
/// end up in `slots` for [`FieldDecoder::Recursive`] nodes to find.
pub(crate) struct Builder<'a> {
	types: &'a TypeRegistry,
	overrides: &'a HashMap<TypeId, FieldDecoder>,
	storages: HashMap<TypeId, Storage>,
	slots: Vec<FieldDecoder>,
}

impl<'a> Builder<'a> {
	pub fn finish(self) -> DecoderTable {
		DecoderTable::new(self.slots)
	}

	pub fn build_fields(&mut self, fields: &[FieldDefinition]) -> Result<Vec<Field>, BuildError> {
		let mut out = Vec::with_capacity(fields.len());
		for (i, field) in fields.iter().enumerate() {
			let name = field_name(i, field);
			let decoder = self.build_type(&name, field.ty)?;
			out.push(Field::new(name, decoder, field.ty));
		}
		Ok(out)
	}

	pub fn build_type(&mut self, field: &str, ty: TypeId) -> Result<FieldDecoder, BuildError> {
		if let Some(decoder) = self.overrides.get(&ty) {
			return Ok(decoder.clone());
		}

		match self.storages.get_mut(&ty) {
			Some(Storage::Complete(decoder)) => return Ok(decoder.clone()),
			Some(Storage::InProgress { slot }) => {
				let slot = match slot {
					Some(slot) => *slot,
					None => {
						let new_slot = self.slots.len();
						self.slots.push(FieldDecoder::Noop);
						*slot = Some(new_slot);
						new_slot
					}
				};
				log::trace!("type {} is recursive, using slot {}", ty, slot);
				return Ok(FieldDecoder::Recursive { slot, ty });
			}
			None => {}
		}

		let types = self.types;
		let registry_type = types.resolve(ty).ok_or_else(|| BuildError::TypeNotFound { field: field.to_owned(), ty })?;

		self.storages.insert(ty, Storage::InProgress { slot: None });
		let decoder = self.build_definition(field, &registry_type.def).map_err(|e| e.in_field(field))?;

		if let Some(Storage::InProgress { slot: Some(slot) }) = self.storages.insert(ty, Storage::Complete(decoder.clone()))
		{
			self.slots[slot] = decoder.clone();
		}

		Ok(decoder)
	}

	fn build_definition(&mut self, field: &str, def: &TypeDefinition) -> Result<FieldDecoder, BuildError> {
		match def {
			TypeDefinition::Primitive(kind) => Ok(FieldDecoder::Value(ValueKind::Primitive(*kind))),
			TypeDefinition::Compact(inner) => self.build_compact(field, *inner, &mut Vec::new()),
			TypeDefinition::Composite(fields) => Ok(FieldDecoder::Composite(self.build_fields(fields)?.into())),
			TypeDefinition::Variant(variants) => {
				let mut arms = BTreeMap::new();
				for variant in variants {
					let fields = self.build_fields(&variant.fields).map_err(|e| e.in_field(&variant.name))?;
					arms.insert(variant.index, VariantArm { name: variant.name.clone(), fields: fields.into() });
				}
				Ok(FieldDecoder::Variant(Arc::new(arms)))
			}
			TypeDefinition::Sequence(item) => Ok(FieldDecoder::Slice(Arc::new(self.build_type(field, *item)?))),
			TypeDefinition::Array { len, ty } => {
				Ok(FieldDecoder::Array { len: *len, item: Arc::new(self.build_type(field, *ty)?) })
			}
			TypeDefinition::Tuple(items) if items.is_empty() => Ok(FieldDecoder::Noop),
			TypeDefinition::Tuple(items) => {
				let mut fields = Vec::with_capacity(items.len());
				for (i, item) in items.iter().enumerate() {
					let name = tuple_item_name(i);
					let decoder = self.build_type(&name, *item)?;
					fields.push(Field::new(name, decoder, *item));
				}
				Ok(FieldDecoder::Composite(fields.into()))
			}
			TypeDefinition::BitSequence { store, order } => self.build_bit_sequence(field, *store, *order),
			TypeDefinition::HistoricMetaCompat(_) => Err(BuildError::UnsupportedTypeDefinition(def.kind_name())),
		}
	}

	/// Compact primitives are read as a single compact integer. Compact structs and tuples
	/// (eg `Compact<Perbill>`) have every leaf read as a compact integer.
	fn build_compact(&mut self, field: &str, ty: TypeId, seen: &mut Vec<TypeId>) -> Result<FieldDecoder, BuildError> {
		let types = self.types;
		let inner = types.resolve(ty).ok_or_else(|| BuildError::TypeNotFound { field: field.to_owned(), ty })?;
		if seen.contains(&ty) {
			return Err(BuildError::UnsupportedCompactTarget(format!("recursive type {ty}")));
		}
		seen.push(ty);

		let decoder = match &inner.def {
			TypeDefinition::Primitive(kind) => CompactWidth::from_primitive(*kind)
				.map(|width| FieldDecoder::Value(ValueKind::Compact(width)))
				.ok_or_else(|| BuildError::UnsupportedCompactTarget(format!("{kind:?}")))?,
			TypeDefinition::Composite(fields) => {
				let mut out = Vec::with_capacity(fields.len());
				for (i, f) in fields.iter().enumerate() {
					let name = field_name(i, f);
					let decoder = self.build_compact(&name, f.ty, seen)?;
					out.push(Field::new(name, decoder, f.ty));
				}
				FieldDecoder::Composite(out.into())
			}
			TypeDefinition::Tuple(items) if items.is_empty() => FieldDecoder::Noop,
			TypeDefinition::Tuple(items) => {
				let mut out = Vec::with_capacity(items.len());
				for (i, item) in items.iter().enumerate() {
					let name = tuple_item_name(i);
					let decoder = self.build_compact(&name, *item, seen)?;
					out.push(Field::new(name, decoder, *item));
				}
				FieldDecoder::Composite(out.into())
			}
			other => return Err(BuildError::UnsupportedCompactTarget(other.kind_name().to_owned())),
		};

		seen.pop();
		Ok(decoder)
	}

	fn build_bit_sequence(&mut self, field: &str, store: TypeId, order: TypeId) -> Result<FieldDecoder, BuildError> {
		let types = self.types;

		let store_type = types.resolve(store).ok_or_else(|| BuildError::TypeNotFound { field: field.to_owned(), ty: store })?;
		let store = match &store_type.def {
			TypeDefinition::Primitive(PrimitiveKind::U8) => BitStore::U8,
			TypeDefinition::Primitive(PrimitiveKind::U16) => BitStore::U16,
			TypeDefinition::Primitive(PrimitiveKind::U32) => BitStore::U32,
			TypeDefinition::Primitive(PrimitiveKind::U64) => BitStore::U64,
			TypeDefinition::Primitive(kind) => return Err(BuildError::BitStoreTypeNotSupported(format!("{kind:?}"))),
			other => return Err(BuildError::BitStoreTypeNotSupported(other.kind_name().to_owned())),
		};

		let order_type = types.resolve(order).ok_or_else(|| BuildError::TypeNotFound { field: field.to_owned(), ty: order })?;
		let order = order_type
			.ident()
			.and_then(BitOrder::from_name)
			.ok_or_else(|| BuildError::BitOrderNotSupported(order_type.path.join("::")))?;

		Ok(FieldDecoder::BitSequence { store, order })
	}
}
