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

//! A crate to build decoders for the calls, events, errors and extrinsics of substrate
//! nodes from V14+ metadata. See [`decoder`] for more information.

pub mod decoder;
pub mod metadata;
pub mod registry;
pub mod value;

pub use decoder::{DecoderFactory, ExtrinsicDecoder};
pub use metadata::{Metadata, TypeId, TypeRegistry};
pub use registry::{CallRegistry, ErrorRegistry, EventRegistry, RegistryError};
pub use value::{DecodedField, DecodedFields, Value};

/// A re-export of the [`scale_info`] crate, since type registries are usually converted from it.
pub use scale_info;
