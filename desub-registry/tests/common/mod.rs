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

//! A small runtime, described by V14 metadata built from the types below. The types
//! are laid out the way a real runtime lays them out, so the encoded extrinsics here
//! look like the ones a node would produce.

#![allow(dead_code, non_camel_case_types)]

use codec::{Compact, Encode};
use desub_registry::Metadata;
use frame_metadata::{
	v14::{
		ExtrinsicMetadata, PalletCallMetadata, PalletErrorMetadata, PalletEventMetadata, PalletMetadata,
		RuntimeMetadataV14, SignedExtensionMetadata,
	},
	RuntimeMetadataPrefixed,
};
use scale_info::{meta_type, TypeInfo};
use std::marker::PhantomData;

pub const SYSTEM_INDEX: u8 = 0;
pub const BALANCES_INDEX: u8 = 5;
pub const UTILITY_INDEX: u8 = 26;

#[derive(Encode, TypeInfo, Clone)]
pub enum MultiAddress {
	Id([u8; 32]),
	Index(#[codec(compact)] u32),
}

#[derive(Encode, TypeInfo, Clone)]
pub enum MultiSignature {
	Ed25519([u8; 64]),
	Sr25519([u8; 64]),
}

#[derive(Encode, TypeInfo, Clone)]
pub struct CheckNonce(#[codec(compact)] pub u32);

#[derive(Encode, TypeInfo, Clone)]
pub struct ChargeTransactionPayment(#[codec(compact)] pub u128);

pub type SignedExtra = (CheckNonce, ChargeTransactionPayment);

#[derive(Encode, TypeInfo, Clone)]
pub struct Perbill(pub u32);

#[derive(Encode, TypeInfo, Clone)]
pub enum SystemCall {
	#[codec(index = 0)]
	remark { remark: Vec<u8> },
	#[codec(index = 1)]
	set_heap_pages { pages: u64 },
	#[codec(index = 2)]
	fill_block { ratio: Perbill },
}

#[derive(Encode, TypeInfo, Clone)]
pub enum BalancesCall {
	#[codec(index = 0)]
	transfer {
		dest: MultiAddress,
		#[codec(compact)]
		value: u128,
	},
	#[codec(index = 4)]
	transfer_all { dest: MultiAddress, keep_alive: bool },
}

#[derive(Encode, TypeInfo, Clone)]
pub enum UtilityCall {
	#[codec(index = 0)]
	batch { calls: Vec<RuntimeCall> },
}

#[derive(Encode, TypeInfo, Clone)]
pub enum RuntimeCall {
	#[codec(index = 0)]
	System(SystemCall),
	#[codec(index = 5)]
	Balances(BalancesCall),
	#[codec(index = 26)]
	Utility(UtilityCall),
}

#[derive(Encode, TypeInfo, Clone)]
pub enum SystemEvent {
	#[codec(index = 0)]
	ExtrinsicSuccess { weight: u64 },
	#[codec(index = 7)]
	Remarked { sender: [u8; 32], hash: [u8; 32] },
}

#[derive(Encode, TypeInfo, Clone)]
pub enum BalancesEvent {
	#[codec(index = 2)]
	Transfer { from: [u8; 32], to: [u8; 32], amount: u128 },
}

#[derive(Encode, TypeInfo, Clone)]
pub enum SystemError {
	InvalidSpecName,
	SpecVersionNeedsToIncrease,
}

#[derive(Encode, TypeInfo, Clone)]
pub enum BalancesError {
	InsufficientBalance,
	ExistentialDeposit,
}

#[derive(TypeInfo)]
pub struct UncheckedExtrinsic<Address, Call, Signature, Extra>(PhantomData<(Address, Call, Signature, Extra)>);

fn pallet(name: &'static str, index: u8) -> PalletMetadata {
	PalletMetadata { name, storage: None, calls: None, event: None, constants: vec![], error: None, index }
}

/// The V14 metadata for the runtime.
pub fn runtime_metadata() -> RuntimeMetadataV14 {
	let pallets = vec![
		PalletMetadata {
			calls: Some(PalletCallMetadata { ty: meta_type::<SystemCall>() }),
			event: Some(PalletEventMetadata { ty: meta_type::<SystemEvent>() }),
			error: Some(PalletErrorMetadata { ty: meta_type::<SystemError>() }),
			..pallet("System", SYSTEM_INDEX)
		},
		PalletMetadata {
			calls: Some(PalletCallMetadata { ty: meta_type::<BalancesCall>() }),
			event: Some(PalletEventMetadata { ty: meta_type::<BalancesEvent>() }),
			error: Some(PalletErrorMetadata { ty: meta_type::<BalancesError>() }),
			..pallet("Balances", BALANCES_INDEX)
		},
		PalletMetadata { calls: Some(PalletCallMetadata { ty: meta_type::<UtilityCall>() }), ..pallet("Utility", UTILITY_INDEX) },
		// A pallet with nothing to decode.
		pallet("Timestamp", 3),
	];

	let extrinsic = ExtrinsicMetadata {
		ty: meta_type::<UncheckedExtrinsic<MultiAddress, RuntimeCall, MultiSignature, SignedExtra>>(),
		version: 4,
		signed_extensions: vec![
			SignedExtensionMetadata {
				identifier: "CheckNonce",
				ty: meta_type::<CheckNonce>(),
				additional_signed: meta_type::<()>(),
			},
			SignedExtensionMetadata {
				identifier: "ChargeTransactionPayment",
				ty: meta_type::<ChargeTransactionPayment>(),
				additional_signed: meta_type::<()>(),
			},
		],
	};

	RuntimeMetadataV14::new(pallets, extrinsic, meta_type::<()>())
}

/// The runtime metadata, as it would be returned by `state_getMetadata`.
pub fn metadata_bytes() -> Vec<u8> {
	RuntimeMetadataPrefixed::from(runtime_metadata()).encode()
}

pub fn metadata() -> Metadata {
	Metadata::from_bytes(&metadata_bytes()).expect("valid metadata")
}

pub fn to_bytes(hex_str: &str) -> Vec<u8> {
	let hex_str = hex_str.strip_prefix("0x").expect("0x should prefix hex encoded bytes");
	hex::decode(hex_str).expect("valid bytes from hex")
}

pub const ALICE: [u8; 32] = [0xd4; 32];
pub const BOB: [u8; 32] = [0x8e; 32];

/// A signed extrinsic: length prefix, version byte with the signed bit set, and then the
/// address, signature, extra and call.
pub fn signed_extrinsic(call: &RuntimeCall, nonce: u32, tip: u128) -> Vec<u8> {
	let mut body = vec![0x84];
	MultiAddress::Id(ALICE).encode_to(&mut body);
	MultiSignature::Sr25519([7; 64]).encode_to(&mut body);
	(CheckNonce(nonce), ChargeTransactionPayment(tip)).encode_to(&mut body);
	call.encode_to(&mut body);

	let mut bytes = Compact(body.len() as u32).encode();
	bytes.extend(body);
	bytes
}
