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

use super::extrinsic_bytes::{AllExtrinsicBytes, ExtrinsicBytesError};
use super::{DecodeError, DecoderTable, Field};
use crate::value::{DecodedField, DecodedFields};
use codec::{Compact, Decode, Encode, Output};
use serde::Serialize;
use std::sync::Arc;

pub const ADDRESS_FIELD: &str = "Address";
pub const SIGNATURE_FIELD: &str = "Signature";
pub const EXTRA_FIELD: &str = "Extra";
pub const CALL_FIELD: &str = "Call";

/// Set in the version byte of signed extrinsics.
const SIGNED_BIT: u8 = 0b1000_0000;

/// An enum of the possible errors that can be returned from decoding an extrinsic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExtrinsicDecodeError {
	#[error("extrinsic field '{0}' not found")]
	FieldNotFound(&'static str),
	#[error("couldn't decode extrinsic length")]
	CompactLengthDecoding(#[source] codec::Error),
	#[error("couldn't decode extrinsic version")]
	VersionDecoding(#[source] codec::Error),
	#[error("couldn't decode extrinsic field '{name}'")]
	FieldDecoding {
		name: &'static str,
		#[source]
		source: DecodeError,
	},
	#[error("Failed to parse the provided vector of extrinsics")]
	UnexpectedExtrinsicsShape(#[from] ExtrinsicBytesError),
	#[error("block body advertises {expected} extrinsics, but only {found} were found")]
	MissingExtrinsics { expected: usize, found: usize },
	#[error("Failed to decode extrinsic: {0} bytes of the input were not consumed")]
	ExcessBytes(usize),
	#[error("couldn't decode extrinsic {index}")]
	Extrinsic {
		index: usize,
		#[source]
		source: Box<ExtrinsicDecodeError>,
	},
}

/// The result of successfully decoding an extrinsic.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DecodedExtrinsic {
	/// The version byte, including the signed bit.
	pub version: u8,
	/// `Address`, `Signature` (only if signed), `Extra` and `Call`, in that order.
	pub fields: DecodedFields,
}

impl DecodedExtrinsic {
	pub fn is_signed(&self) -> bool {
		self.version & SIGNED_BIT != 0
	}

	pub fn address(&self) -> Option<&DecodedField> {
		self.fields.field(ADDRESS_FIELD)
	}

	pub fn signature(&self) -> Option<&DecodedField> {
		self.fields.field(SIGNATURE_FIELD)
	}

	pub fn extra(&self) -> Option<&DecodedField> {
		self.fields.field(EXTRA_FIELD)
	}

	pub fn call(&self) -> Option<&DecodedField> {
		self.fields.field(CALL_FIELD)
	}
}

impl Encode for DecodedExtrinsic {
	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		let mut body = vec![self.version];
		self.fields.encode_to(&mut body);
		Compact(body.len() as u32).encode_to(dest);
		dest.write(&body);
	}
}

/// Decodes extrinsics using the `Address`, `Signature`, `Extra` and `Call` decoders
/// built from one version of the metadata.
#[derive(Debug, Clone)]
pub struct ExtrinsicDecoder {
	fields: Vec<Field>,
	table: Arc<DecoderTable>,
}

impl ExtrinsicDecoder {
	pub fn new(fields: Vec<Field>, table: Arc<DecoderTable>) -> Self {
		ExtrinsicDecoder { fields, table }
	}

	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	fn decode_field(&self, name: &'static str, input: &mut &[u8]) -> Result<DecodedField, ExtrinsicDecodeError> {
		let field = self.fields.iter().find(|f| f.name == name).ok_or(ExtrinsicDecodeError::FieldNotFound(name))?;
		let value = field
			.decoder
			.decode(&self.table, input)
			.map_err(|source| ExtrinsicDecodeError::FieldDecoding { name, source })?;
		Ok(DecodedField { name: field.name.clone(), value, lookup_index: field.lookup_index })
	}

	/// Decode a single length prefixed extrinsic.
	///
	/// The parts are read in the order they appear on the wire, which differs from the order
	/// that the metadata lists them in: `Address`, then `Signature` only if the extrinsic is
	/// signed, then `Extra`, and finally `Call`.
	pub fn decode(&self, input: &mut &[u8]) -> Result<DecodedExtrinsic, ExtrinsicDecodeError> {
		// Ignore the expected extrinsic length here; callers can check that the
		// right number of bytes were consumed.
		let _len = Compact::<u32>::decode(input).map_err(ExtrinsicDecodeError::CompactLengthDecoding)?;
		let version = u8::decode(input).map_err(ExtrinsicDecodeError::VersionDecoding)?;
		let is_signed = version & SIGNED_BIT != 0;
		log::trace!("extrinsic version {}, signed: {}", version & !SIGNED_BIT, is_signed);

		let mut fields = DecodedFields::new();
		fields.push(self.decode_field(ADDRESS_FIELD, input)?);
		if is_signed {
			fields.push(self.decode_field(SIGNATURE_FIELD, input)?);
		}
		fields.push(self.decode_field(EXTRA_FIELD, input)?);
		fields.push(self.decode_field(CALL_FIELD, input)?);

		Ok(DecodedExtrinsic { version, fields })
	}

	/// Decode a SCALE encoded vector of extrinsics. Conceptually, this is `Vec<(Compact<u32>, Extrinsic)>`;
	/// a compact encoded count of how many extrinsics exist, followed by each extrinsic prefixed
	/// by a compact encoding of its byte length.
	pub fn decode_all(&self, input: &mut &[u8]) -> Result<Vec<DecodedExtrinsic>, ExtrinsicDecodeError> {
		let extrinsic_bytes = AllExtrinsicBytes::new(*input)?;

		log::trace!("Decoding {} Total Extrinsics.", extrinsic_bytes.len());

		let mut out = Vec::with_capacity(extrinsic_bytes.len());
		let mut extrinsics_iter = extrinsic_bytes.iter();
		for (index, res) in (&mut extrinsics_iter).enumerate() {
			let bytes = &mut res?.with_prefix();
			let ext = self
				.decode(bytes)
				.and_then(|ext| match bytes.len() {
					0 => Ok(ext),
					excess => Err(ExtrinsicDecodeError::ExcessBytes(excess)),
				})
				.map_err(|e| ExtrinsicDecodeError::Extrinsic { index, source: Box::new(e) })?;
			out.push(ext);
		}

		if out.len() != extrinsic_bytes.len() {
			return Err(ExtrinsicDecodeError::MissingExtrinsics { expected: extrinsic_bytes.len(), found: out.len() });
		}

		// Shift our externally provided data cursor forwards to the right spot,
		// so that one can continue to decode more bytes if there are any:
		*input = extrinsics_iter.remaining_bytes();

		Ok(out)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::decoder::{CompactWidth, FieldDecoder, ValueKind, VariantArm};
	use crate::metadata::PrimitiveKind;
	use crate::value::Value;

	fn u8_decoder() -> FieldDecoder {
		FieldDecoder::Value(ValueKind::Primitive(PrimitiveKind::U8))
	}

	fn single_arm(index: u8, name: &str, fields: Vec<Field>) -> FieldDecoder {
		let arm = VariantArm { name: name.into(), fields: Arc::from(fields) };
		FieldDecoder::Variant(Arc::new([(index, arm)].into_iter().collect()))
	}

	// RuntimeCall::System(SystemCall::remark { remark: Vec<u8> })
	fn remark_call() -> FieldDecoder {
		let remark = single_arm(0, "remark", vec![Field::new("remark", FieldDecoder::Slice(Arc::new(u8_decoder())), 2)]);
		single_arm(0, "System", vec![Field::new("SystemCall", remark, 3)])
	}

	fn decoder(address: FieldDecoder, signature: FieldDecoder, extra: FieldDecoder) -> ExtrinsicDecoder {
		let fields = vec![
			Field::new(ADDRESS_FIELD, address, 10),
			Field::new(CALL_FIELD, remark_call(), 11),
			Field::new(SIGNATURE_FIELD, signature, 12),
			Field::new(EXTRA_FIELD, extra, 13),
		];
		ExtrinsicDecoder::new(fields, Arc::new(DecoderTable::default()))
	}

	#[test]
	fn decodes_unsigned_remark() {
		let decoder = decoder(FieldDecoder::Noop, FieldDecoder::Noop, FieldDecoder::Noop);
		let bytes = hex::decode("200400001074657374").unwrap();
		let cursor = &mut &*bytes;
		let ext = decoder.decode(cursor).unwrap();

		assert!(cursor.is_empty());
		assert!(!ext.is_signed());
		let names: Vec<_> = ext.fields.iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec![ADDRESS_FIELD, EXTRA_FIELD, CALL_FIELD]);

		let Value::Variant(pallet) = &ext.call().unwrap().value else { panic!("call should be a variant") };
		assert_eq!(pallet.name, "System");
		let Value::Variant(call) = &pallet.fields[0].value else { panic!("inner call should be a variant") };
		assert_eq!(call.name, "remark");
		assert_eq!(call.fields.get_by_name::<Vec<u8>>("remark"), Ok(b"test".to_vec()));

		assert_eq!(ext.encode(), bytes);
	}

	#[test]
	fn signed_extrinsic_round_trips() {
		let decoder = decoder(
			u8_decoder(),
			FieldDecoder::Array { len: 2, item: Arc::new(u8_decoder()) },
			FieldDecoder::Value(ValueKind::Compact(CompactWidth::U64)),
		);
		// version 0x84, address 7, signature [1, 2], extra compact(1000), call remark "hi"
		let mut body = vec![0x84, 7, 1, 2];
		body.extend(Compact(1000u64).encode());
		body.extend([0, 0]);
		body.extend(b"hi".to_vec().encode());
		let mut bytes = Compact(body.len() as u32).encode();
		bytes.extend(body);

		let ext = decoder.decode(&mut &*bytes).unwrap();
		assert!(ext.is_signed());
		let names: Vec<_> = ext.fields.iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec![ADDRESS_FIELD, SIGNATURE_FIELD, EXTRA_FIELD, CALL_FIELD]);
		assert_eq!(ext.extra().map(|f| &f.value), Some(&Value::Compact(1000)));
		assert_eq!(ext.encode(), bytes);
	}

	#[test]
	fn missing_field_is_reported() {
		let fields = vec![Field::new(ADDRESS_FIELD, FieldDecoder::Noop, 0)];
		let decoder = ExtrinsicDecoder::new(fields, Arc::new(DecoderTable::default()));
		assert_eq!(decoder.decode(&mut &[4u8, 4][..]), Err(ExtrinsicDecodeError::FieldNotFound(EXTRA_FIELD)));
	}

	#[test]
	fn staged_failures() {
		let decoder = decoder(FieldDecoder::Noop, FieldDecoder::Noop, FieldDecoder::Noop);
		assert!(matches!(decoder.decode(&mut &[0u8; 0][..]), Err(ExtrinsicDecodeError::CompactLengthDecoding(_))));
		assert!(matches!(decoder.decode(&mut &[4u8][..]), Err(ExtrinsicDecodeError::VersionDecoding(_))));

		let err = decoder.decode(&mut &[12u8, 4, 9, 0][..]).unwrap_err();
		let ExtrinsicDecodeError::FieldDecoding { name, source } = err else { panic!("expected a field error") };
		assert_eq!(name, CALL_FIELD);
		assert_eq!(source, DecodeError::VariantNotFound(9));
	}

	#[test]
	fn decode_all_checks_each_length() {
		let decoder = decoder(FieldDecoder::Noop, FieldDecoder::Noop, FieldDecoder::Noop);
		let remark = hex::decode("200400001074657374").unwrap();

		let mut all = Compact(2u32).encode();
		all.extend(&remark);
		all.extend(&remark);
		let cursor = &mut &*all;
		let exts = decoder.decode_all(cursor).unwrap();
		assert_eq!(exts.len(), 2);
		assert!(cursor.is_empty());

		// An extrinsic whose length prefix claims one byte more than its fields use.
		let mut padded = Compact(9u32).encode();
		padded.extend(&remark[1..]);
		padded.push(0);
		let mut all = Compact(1u32).encode();
		all.extend(padded);
		let err = decoder.decode_all(&mut &*all).unwrap_err();
		assert_eq!(
			err,
			ExtrinsicDecodeError::Extrinsic { index: 0, source: Box::new(ExtrinsicDecodeError::ExcessBytes(1)) }
		);

		// The count says three, but the body ends after the first one.
		let mut short = Compact(3u32).encode();
		short.extend(&remark);
		let cursor = &mut &*short;
		assert_eq!(
			decoder.decode_all(cursor),
			Err(ExtrinsicDecodeError::MissingExtrinsics { expected: 3, found: 1 })
		);
	}

	#[test]
	fn extrinsic_errors_name_each_level_once() {
		let decoder = decoder(FieldDecoder::Noop, FieldDecoder::Noop, FieldDecoder::Noop);
		let mut all = Compact(1u32).encode();
		all.extend([12u8, 4, 9, 0]);
		let err = decoder.decode_all(&mut &*all).unwrap_err();
		assert_eq!(err.to_string(), "couldn't decode extrinsic 0");
		assert_eq!(
			desub_common::display_chain(&err),
			"couldn't decode extrinsic 0: couldn't decode extrinsic field 'Call': variant '9' not found"
		);
	}
}
