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

//! The type registry that decoders are built from. It mirrors the shape of a
//! [`scale_info::PortableRegistry`], but can also be put together by hand, which
//! lets us describe types that `scale_info` has no representation for.

use scale_info::{form::PortableForm, PortableRegistry, TypeDef, TypeDefPrimitive};
use std::collections::HashMap;

/// The ID of a type in the [`TypeRegistry`].
pub type TypeId = u32;

/// The primitive types that can appear in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
	Bool,
	Char,
	Str,
	U8,
	U16,
	U32,
	U64,
	U128,
	U256,
	I8,
	I16,
	I32,
	I64,
	I128,
	I256,
}

impl From<&TypeDefPrimitive> for PrimitiveKind {
	fn from(primitive: &TypeDefPrimitive) -> Self {
		match primitive {
			TypeDefPrimitive::Bool => PrimitiveKind::Bool,
			TypeDefPrimitive::Char => PrimitiveKind::Char,
			TypeDefPrimitive::Str => PrimitiveKind::Str,
			TypeDefPrimitive::U8 => PrimitiveKind::U8,
			TypeDefPrimitive::U16 => PrimitiveKind::U16,
			TypeDefPrimitive::U32 => PrimitiveKind::U32,
			TypeDefPrimitive::U64 => PrimitiveKind::U64,
			TypeDefPrimitive::U128 => PrimitiveKind::U128,
			TypeDefPrimitive::U256 => PrimitiveKind::U256,
			TypeDefPrimitive::I8 => PrimitiveKind::I8,
			TypeDefPrimitive::I16 => PrimitiveKind::I16,
			TypeDefPrimitive::I32 => PrimitiveKind::I32,
			TypeDefPrimitive::I64 => PrimitiveKind::I64,
			TypeDefPrimitive::I128 => PrimitiveKind::I128,
			TypeDefPrimitive::I256 => PrimitiveKind::I256,
		}
	}
}

/// A field of a composite type or of an enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
	/// The field name, if the field is named.
	pub name: Option<String>,
	/// The name of the type as it was written in the source, if known.
	pub type_name: Option<String>,
	pub ty: TypeId,
}

impl FieldDefinition {
	pub fn named(name: impl Into<String>, ty: TypeId) -> Self {
		FieldDefinition { name: Some(name.into()), type_name: None, ty }
	}

	pub fn unnamed(ty: TypeId) -> Self {
		FieldDefinition { name: None, type_name: None, ty }
	}

	pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
		self.type_name = Some(type_name.into());
		self
	}
}

/// A single variant of an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDefinition {
	pub name: String,
	/// The discriminant byte that identifies this variant on the wire.
	pub index: u8,
	pub fields: Vec<FieldDefinition>,
}

impl VariantDefinition {
	pub fn new(name: impl Into<String>, index: u8, fields: Vec<FieldDefinition>) -> Self {
		VariantDefinition { name: name.into(), index, fields }
	}
}

/// The shape of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
	Primitive(PrimitiveKind),
	/// A compact encoded wrapper around the given type.
	Compact(TypeId),
	Composite(Vec<FieldDefinition>),
	Variant(Vec<VariantDefinition>),
	/// A length prefixed sequence of the given type.
	Sequence(TypeId),
	Array { len: u32, ty: TypeId },
	Tuple(Vec<TypeId>),
	BitSequence { store: TypeId, order: TypeId },
	/// A type described in the pre-V14 string based way. We can't build decoders for these.
	HistoricMetaCompat(String),
}

impl TypeDefinition {
	/// A short name for the shape, used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			TypeDefinition::Primitive(_) => "primitive",
			TypeDefinition::Compact(_) => "compact",
			TypeDefinition::Composite(_) => "composite",
			TypeDefinition::Variant(_) => "variant",
			TypeDefinition::Sequence(_) => "sequence",
			TypeDefinition::Array { .. } => "array",
			TypeDefinition::Tuple(_) => "tuple",
			TypeDefinition::BitSequence { .. } => "bit sequence",
			TypeDefinition::HistoricMetaCompat(_) => "historic meta compat",
		}
	}
}

/// A generic type parameter, such as the `Call` in `UncheckedExtrinsic<Address, Call, Signature, Extra>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
	pub name: String,
	pub ty: Option<TypeId>,
}

/// A type in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryType {
	/// The path segments of the type, eg `["bitvec", "order", "Lsb0"]`.
	pub path: Vec<String>,
	pub params: Vec<TypeParameter>,
	pub def: TypeDefinition,
}

impl RegistryType {
	pub fn new(def: TypeDefinition) -> Self {
		RegistryType { path: Vec::new(), params: Vec::new(), def }
	}

	pub fn with_path<S: Into<String>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
		self.path = path.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_param(mut self, name: impl Into<String>, ty: Option<TypeId>) -> Self {
		self.params.push(TypeParameter { name: name.into(), ty });
		self
	}

	/// The last path segment, which is the bare name of the type.
	pub fn ident(&self) -> Option<&str> {
		self.path.last().map(|s| s.as_str())
	}
}

/// A mapping from [`TypeId`] to [`RegistryType`]. One of these exists for each metadata
/// snapshot, and it is not modified once it has been handed to a decoder factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
	types: HashMap<TypeId, RegistryType>,
}

impl TypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, id: TypeId, ty: RegistryType) -> Option<RegistryType> {
		self.types.insert(id, ty)
	}

	/// Builder style version of [`TypeRegistry::insert`].
	pub fn with_type(mut self, id: TypeId, ty: RegistryType) -> Self {
		self.insert(id, ty);
		self
	}

	pub fn resolve(&self, id: TypeId) -> Option<&RegistryType> {
		self.types.get(&id)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (TypeId, &RegistryType)> {
		self.types.iter().map(|(id, ty)| (*id, ty))
	}
}

impl From<&PortableRegistry> for TypeRegistry {
	fn from(registry: &PortableRegistry) -> Self {
		let types = registry.types.iter().map(|ty| (ty.id, convert_type(&ty.ty))).collect();
		TypeRegistry { types }
	}
}

fn convert_type(ty: &scale_info::Type<PortableForm>) -> RegistryType {
	let params = ty
		.type_params
		.iter()
		.map(|param| TypeParameter { name: param.name.clone(), ty: param.ty.as_ref().map(|t| t.id) })
		.collect();

	let def = match &ty.type_def {
		TypeDef::Composite(composite) => TypeDefinition::Composite(convert_fields(&composite.fields)),
		TypeDef::Variant(variant) => TypeDefinition::Variant(
			variant
				.variants
				.iter()
				.map(|v| VariantDefinition { name: v.name.clone(), index: v.index, fields: convert_fields(&v.fields) })
				.collect(),
		),
		TypeDef::Sequence(seq) => TypeDefinition::Sequence(seq.type_param.id),
		TypeDef::Array(arr) => TypeDefinition::Array { len: arr.len, ty: arr.type_param.id },
		TypeDef::Tuple(tuple) => TypeDefinition::Tuple(tuple.fields.iter().map(|f| f.id).collect()),
		TypeDef::Primitive(primitive) => TypeDefinition::Primitive(primitive.into()),
		TypeDef::Compact(compact) => TypeDefinition::Compact(compact.type_param.id),
		TypeDef::BitSequence(bits) => {
			TypeDefinition::BitSequence { store: bits.bit_store_type.id, order: bits.bit_order_type.id }
		}
	};

	RegistryType { path: ty.path.segments.clone(), params, def }
}

fn convert_fields(fields: &[scale_info::Field<PortableForm>]) -> Vec<FieldDefinition> {
	fields
		.iter()
		.map(|f| FieldDefinition { name: f.name.clone(), type_name: f.type_name.clone(), ty: f.ty.id })
		.collect()
}
