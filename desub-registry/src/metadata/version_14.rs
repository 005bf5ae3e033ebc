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

use super::{ExtrinsicParam, Metadata, MetadataError, MetadataExtrinsic, PalletDescriptor, SignedExtension, TypeRegistry};
use frame_metadata::v14::RuntimeMetadataV14;

/// Decode V14 metadata into our general Metadata struct
pub fn decode(meta: RuntimeMetadataV14) -> Result<Metadata, MetadataError> {
	let types = TypeRegistry::from(&meta.types);

	let pallets = meta
		.pallets
		.into_iter()
		.map(|pallet| PalletDescriptor {
			name: pallet.name,
			index: pallet.index,
			calls: pallet.calls.map(|c| c.ty.id),
			events: pallet.event.map(|e| e.ty.id),
			errors: pallet.error.map(|e| e.ty.id),
		})
		.collect();

	// V14 only describes the extrinsic as `UncheckedExtrinsic<Address, Call, Signature, Extra>`,
	// so the envelope parts are found in the generic parameters of that type.
	let extrinsic_ty_id = meta.extrinsic.ty.id;
	let extrinsic_ty = types.resolve(extrinsic_ty_id).ok_or(MetadataError::ExtrinsicTypeNotFound(extrinsic_ty_id))?;
	let params = extrinsic_ty
		.params
		.iter()
		.filter_map(|param| param.ty.map(|ty| ExtrinsicParam::new(param.name.clone(), ty)))
		.collect();

	let signed_extensions = meta
		.extrinsic
		.signed_extensions
		.iter()
		.map(|ext| SignedExtension {
			identifier: ext.identifier.clone(),
			ty: ext.ty.id,
			additional_signed: ext.additional_signed.id,
		})
		.collect();

	let extrinsic = MetadataExtrinsic::new(meta.extrinsic.version, params, signed_extensions);

	Ok(Metadata::new(types, pallets, extrinsic))
}
