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

use anyhow::Context;
use clap::{Parser, ValueEnum};
use desub_registry::{DecoderFactory, Metadata};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
	/// A single length prefixed extrinsic.
	Extrinsic,
	/// A SCALE encoded vector of extrinsics, as found in a block body.
	Block,
	/// Call data: pallet index, call index and arguments.
	Call,
	/// An event: pallet index, event index and fields.
	Event,
}

#[derive(Debug, Parser)]
#[command(about = "Decode SCALE encoded extrinsics, calls and events using V14+ metadata")]
struct Opts {
	/// SCALE encoded V14 or V15 metadata blob
	metadata: PathBuf,
	/// Hex encoded bytes in the form 0x1a2b3c
	input: String,
	/// What the input bytes are
	#[arg(short, long, value_enum, default_value_t = Kind::Extrinsic)]
	kind: Kind,
	/// Print the decoded value on a single line
	#[arg(long)]
	compact: bool,
}

fn main() -> Result<(), anyhow::Error> {
	let opts = Opts::parse();
	pretty_env_logger::init();

	let metadata_bytes = std::fs::read(&opts.metadata)
		.with_context(|| format!("Cannot read metadata from {}", opts.metadata.display()))?;
	let meta = Metadata::from_bytes(&metadata_bytes)?;
	log::info!("Extrinsic version: {}", meta.extrinsic().version());

	let input = match opts.input.strip_prefix("0x") {
		Some(input) => input,
		None => anyhow::bail!("Input should start with 0x"),
	};
	let bytes = hex::decode(input).context("Cannot decode hex string into bytes")?;
	let cursor = &mut &*bytes;

	let factory = DecoderFactory::new();
	let decoded = match opts.kind {
		Kind::Extrinsic => serde_json::to_value(factory.create_extrinsic_decoder(&meta)?.decode(cursor)?)?,
		Kind::Block => serde_json::to_value(factory.create_extrinsic_decoder(&meta)?.decode_all(cursor)?)?,
		Kind::Call => serde_json::to_value(factory.create_call_registry(&meta)?.decode_call(cursor)?)?,
		Kind::Event => serde_json::to_value(factory.create_event_registry(&meta)?.decode_event(cursor)?)?,
	};

	if !cursor.is_empty() {
		log::warn!("{} bytes were not decoded: 0x{}", cursor.len(), hex::encode(cursor));
	}

	let out = if opts.compact { serde_json::to_string(&decoded)? } else { serde_json::to_string_pretty(&decoded)? };
	println!("{}", out);
	Ok(())
}
