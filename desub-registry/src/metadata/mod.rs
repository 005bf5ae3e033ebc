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

//! Decode SCALE encoded metadata from a substrate node into a format that
//! we can build decoders from (see [`crate::decoder::DecoderFactory`]).

mod types;
mod version_14;
mod version_15;

use codec::Decode;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};

pub use types::{
	FieldDefinition, PrimitiveKind, RegistryType, TypeDefinition, TypeId, TypeParameter, TypeRegistry,
	VariantDefinition,
};

/// An enum of the possible errors that can be returned from attempting to construct
/// a [`Metadata`] struct, or from reading descriptor tables out of one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
	#[error("metadata version {0} is not supported")]
	UnsupportedVersion(u32),
	#[error(transparent)]
	CodecError(#[from] codec::Error),
	#[error("extrinsic type {0} not found")]
	ExtrinsicTypeNotFound(TypeId),
	#[error("{} type {ty} not found for module '{pallet}'", kind.plural())]
	PalletTypeNotFound { kind: DescriptorKind, ty: TypeId, pallet: String },
	#[error("{} type {ty} for module '{pallet}' is not a variant", kind.plural())]
	PalletTypeNotAVariant { kind: DescriptorKind, ty: TypeId, pallet: String },
}

/// Which of the per-pallet variant types a descriptor table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DescriptorKind {
	#[display(fmt = "call")]
	Call,
	#[display(fmt = "event")]
	Event,
	#[display(fmt = "error")]
	Error,
}

impl DescriptorKind {
	pub fn plural(&self) -> &'static str {
		match self {
			DescriptorKind::Call => "calls",
			DescriptorKind::Event => "events",
			DescriptorKind::Error => "errors",
		}
	}
}

/// This is a representation of the SCALE encoded metadata obtained from a substrate
/// node. It holds the type registry alongside the pallet and extrinsic information
/// needed to build decoders from it.
#[derive(Debug, Clone)]
pub struct Metadata {
	types: TypeRegistry,
	pallets: Vec<PalletDescriptor>,
	extrinsic: MetadataExtrinsic,
}

impl Metadata {
	pub fn new(types: TypeRegistry, pallets: Vec<PalletDescriptor>, extrinsic: MetadataExtrinsic) -> Self {
		Metadata { types, pallets, extrinsic }
	}

	/// Attempt to convert some SCALE encoded bytes into Metadata, returning an
	/// error if something goes wrong in doing so. Here's an example command using
	/// `curl` and `jq` to download this from a locally running node (on the default port)
	/// and save it as `node_metadata.scale`.
	///
	/// ```sh
	/// curl -sX POST -H "Content-Type: application/json" --data '{"jsonrpc":"2.0","method":"state_getMetadata", "id": 1}' localhost:9933 \
	///     | jq .result \
	///     | cut -d '"' -f 2 \
	///     | xxd -r -p > node_metadata.scale
	/// ```
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
		log::trace!("Decoding metadata");
		let meta = RuntimeMetadataPrefixed::decode(&mut &*bytes)?;
		Self::from_runtime_metadata(meta.1)
	}

	/// Convert the substrate runtime metadata into our Metadata.
	pub fn from_runtime_metadata(metadata: RuntimeMetadata) -> Result<Self, MetadataError> {
		match metadata {
			RuntimeMetadata::V14(meta_v14) => {
				log::trace!("V14 metadata found.");
				version_14::decode(meta_v14)
			}
			RuntimeMetadata::V15(meta_v15) => {
				log::trace!("V15 metadata found.");
				version_15::decode(meta_v15)
			}
			unsupported_meta => Err(MetadataError::UnsupportedVersion(unsupported_meta.version())),
		}
	}

	pub fn types(&self) -> &TypeRegistry {
		&self.types
	}

	pub fn pallets(&self) -> &[PalletDescriptor] {
		&self.pallets
	}

	pub fn pallet_by_index(&self, index: u8) -> Option<&PalletDescriptor> {
		self.pallets.iter().find(|p| p.index == index)
	}

	/// Return details about the type of extrinsic supported by this metadata.
	pub fn extrinsic(&self) -> &MetadataExtrinsic {
		&self.extrinsic
	}

	/// Build the descriptor table of every call, event or error variant declared
	/// across all pallets. Pallets that declare none of the requested kind are skipped,
	/// so metadata without any yields an empty table.
	pub fn variant_descriptors(&self, kind: DescriptorKind) -> Result<Vec<VariantDescriptor>, MetadataError> {
		let mut descriptors = Vec::new();

		for pallet in &self.pallets {
			let Some(ty) = pallet.type_for(kind) else {
				continue;
			};

			let pallet_type = self.types.resolve(ty).ok_or_else(|| MetadataError::PalletTypeNotFound {
				kind,
				ty,
				pallet: pallet.name.clone(),
			})?;

			let TypeDefinition::Variant(variants) = &pallet_type.def else {
				return Err(MetadataError::PalletTypeNotAVariant { kind, ty, pallet: pallet.name.clone() });
			};

			descriptors.extend(variants.iter().map(|variant| VariantDescriptor {
				pallet_name: pallet.name.clone(),
				pallet_index: pallet.index,
				variant_name: variant.name.clone(),
				variant_index: variant.index,
				fields: variant.fields.clone(),
			}));
		}

		Ok(descriptors)
	}
}

/// The call, event and error types declared by a single pallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalletDescriptor {
	pub name: String,
	pub index: u8,
	pub calls: Option<TypeId>,
	pub events: Option<TypeId>,
	pub errors: Option<TypeId>,
}

impl PalletDescriptor {
	pub fn new(name: impl Into<String>, index: u8) -> Self {
		PalletDescriptor { name: name.into(), index, calls: None, events: None, errors: None }
	}

	pub fn with_calls(mut self, ty: TypeId) -> Self {
		self.calls = Some(ty);
		self
	}

	pub fn with_events(mut self, ty: TypeId) -> Self {
		self.events = Some(ty);
		self
	}

	pub fn with_errors(mut self, ty: TypeId) -> Self {
		self.errors = Some(ty);
		self
	}

	pub fn type_for(&self, kind: DescriptorKind) -> Option<TypeId> {
		match kind {
			DescriptorKind::Call => self.calls,
			DescriptorKind::Event => self.events,
			DescriptorKind::Error => self.errors,
		}
	}
}

/// One entry of a descriptor table: a single call, event or error variant of a pallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
	pub pallet_name: String,
	pub pallet_index: u8,
	pub variant_name: String,
	pub variant_index: u8,
	pub fields: Vec<FieldDefinition>,
}

impl VariantDescriptor {
	/// The `Pallet.Variant` name of this entry.
	pub fn full_name(&self) -> String {
		format!("{}.{}", self.pallet_name, self.variant_name)
	}
}

/// Information about the extrinsic format supported on the substrate node
/// that the metadata was obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataExtrinsic {
	version: u8,
	/// The envelope parameters (eg `Address`, `Call`, `Signature`, `Extra`) in the
	/// order that the metadata declares them.
	params: Vec<ExtrinsicParam>,
	signed_extensions: Vec<SignedExtension>,
}

impl MetadataExtrinsic {
	pub fn new(version: u8, params: Vec<ExtrinsicParam>, signed_extensions: Vec<SignedExtension>) -> Self {
		MetadataExtrinsic { version, params, signed_extensions }
	}

	/// The version of the extrinsic format in use by the node.
	pub fn version(&self) -> u8 {
		self.version
	}

	pub fn params(&self) -> &[ExtrinsicParam] {
		&self.params
	}

	/// Part of the extrinsic signature area can be varied to include whatever information
	/// a node decides is important. This returns details about that part.
	pub fn signed_extensions(&self) -> &[SignedExtension] {
		&self.signed_extensions
	}
}

/// A named part of the extrinsic envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicParam {
	pub name: String,
	pub ty: TypeId,
}

impl ExtrinsicParam {
	pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
		ExtrinsicParam { name: name.into(), ty }
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtension {
	pub identifier: String,
	pub ty: TypeId,
	pub additional_signed: TypeId,
}
