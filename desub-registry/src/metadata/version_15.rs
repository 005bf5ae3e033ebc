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
use crate::decoder::{ADDRESS_FIELD, CALL_FIELD, EXTRA_FIELD, SIGNATURE_FIELD};
use frame_metadata::v15::RuntimeMetadataV15;

/// Decode V15 metadata into our general Metadata struct
pub fn decode(meta: RuntimeMetadataV15) -> Result<Metadata, MetadataError> {
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

	// V15 names the envelope types directly; keep them in the order V14 declares them.
	let ext = &meta.extrinsic;
	let params = vec![
		ExtrinsicParam::new(ADDRESS_FIELD, ext.address_ty.id),
		ExtrinsicParam::new(CALL_FIELD, ext.call_ty.id),
		ExtrinsicParam::new(SIGNATURE_FIELD, ext.signature_ty.id),
		ExtrinsicParam::new(EXTRA_FIELD, ext.extra_ty.id),
	];

	let signed_extensions = ext
		.signed_extensions
		.iter()
		.map(|ext| SignedExtension {
			identifier: ext.identifier.clone(),
			ty: ext.ty.id,
			additional_signed: ext.additional_signed.id,
		})
		.collect();

	let extrinsic = MetadataExtrinsic::new(ext.version, params, signed_extensions);

	Ok(Metadata::new(types, pallets, extrinsic))
}
