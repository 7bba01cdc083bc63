//! Dump request frames: encode a request without sending it and print the bytes

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use tokenwire::protocol::messages;
use tokenwire::protocol::{FieldValue, Gas, GroupTail, Layout, ProtocolDescriptor, Sas, WireCodec};

#[derive(Parser, Debug)]
#[command(name = "dump_request", about = "Print the wire encoding of a token request")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Itr {
        id: String,
        #[arg(allow_negative_numbers = true)]
        nonce: i32,
    },
    Itv {
        sas: String,
    },
    Gtr {
        #[arg(required = true)]
        sas: Vec<String>,
    },
    Gtv {
        gas: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let codec = WireCodec::new(ProtocolDescriptor::STANDARD);

    let (bytes, layout) = match args.command {
        Command::Itr { id, nonce } => (
            messages::individual_token_request(&codec, &id, nonce)?,
            Layout::individual_token_request(),
        ),
        Command::Itv { sas } => {
            let sas: Sas = sas.parse()?;
            (
                messages::individual_token_validation(&codec, &sas)?,
                Layout::individual_token_response(),
            )
        }
        Command::Gtr { sas } => {
            let entries = sas
                .iter()
                .map(|s| s.parse::<Sas>())
                .collect::<Result<Vec<_>, _>>()?;
            (
                messages::group_token_request(&codec, &entries)?,
                Layout::group(entries.len(), GroupTail::Nothing),
            )
        }
        Command::Gtv { gas } => {
            let gas: Gas = gas.parse()?;
            (
                messages::group_token_validation(&codec, &gas)?,
                Layout::group(gas.len(), GroupTail::GroupToken),
            )
        }
    };

    println!("=== Request frame ({} bytes) ===", bytes.len());
    for (i, chunk) in bytes.chunks(16).enumerate() {
        println!("{:04x}  {}", i * 16, hex::encode(chunk));
    }

    let expected = layout.width(codec.descriptor());
    if bytes.len() != expected {
        // Only an over-long student id can do this
        bail!(
            "frame is {} bytes but the layout is {}; student id exceeds its field",
            bytes.len(),
            expected
        );
    }

    println!("\n=== Fields ===");
    let decoded = codec
        .decode(&layout, &bytes)
        .context("decoding our own frame")?;
    for (kind, value) in layout.fields().iter().zip(decoded.fields()) {
        let shown = match value {
            FieldValue::Token(text) | FieldValue::GroupToken(text) => text.trim_end_matches('\0').to_string(),
            FieldValue::StudentId(text) => format!("'{}'", text),
            other => format!("{:?}", other),
        };
        println!("{:<12} {}", kind.name(), shown);
    }

    Ok(())
}
