use std::{
    io::Read as _,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use serde::Serialize;
use tracing::debug;

use tapread::{
    config::{CONFIG_ENV_VAR, ReaderConfig},
    filter::{self, DispatchTarget},
    logging,
    ndef::{
        BYTES_PER_BLOCK, Decoder, DisplayLabel, NUMBER_OF_BLOCKS_PER_CHUNK, NdefMessage, NfcReader,
        NfcReaderError, ParseResult, PayloadRendering,
    },
};
use tapread_util::{InputEncoding, decode_input};

#[derive(Parser)]
#[command(name = "tapread")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHORT_HASH"), ")")
)]
#[command(about = "Decode NDEF messages read from NFC tags", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON reader configuration, defaults to the built in filters
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a label for every text and URI record
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// Show payload bytes without applying the text and URI record rules
        #[arg(long)]
        raw: bool,

        /// Print labels and a record summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where the tag would be dispatched and which filter receives it
    Dispatch {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the discovery filters built from the configuration
    Filters,
}

#[derive(Args)]
struct InputArgs {
    /// Tag dump to read, stdin when omitted
    file: Option<PathBuf>,

    /// How the dump is encoded: auto, bytes, hex or binary
    #[arg(long, default_value_t = InputEncoding::Auto)]
    encoding: InputEncoding,

    /// The dump is Type 2 tag memory with the message inside an NDEF TLV
    #[arg(long)]
    tlv: bool,
}

#[derive(Serialize)]
struct DecodeOutput {
    labels: Vec<DisplayLabel>,
    records: Vec<RecordSummary>,
}

#[derive(Serialize)]
struct RecordSummary {
    tnf: String,
    #[serde(rename = "type")]
    type_: String,
    id: Option<String>,
    payload_length: usize,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    if cli.verbose {
        logging::init_with_default("debug");
    } else {
        logging::init();
    }

    let config = match &cli.config {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::default(),
    };

    match cli.command {
        Commands::Decode { input, raw, json } => {
            let rendering = if raw {
                PayloadRendering::Raw
            } else {
                config.rendering
            };

            decode(&input, Decoder::new(rendering), json)
        }
        Commands::Dispatch { input } => dispatch(&input, &config),
        Commands::Filters => {
            for filter in filter::build_filters(&config) {
                println!("{filter}");
            }

            Ok(())
        }
    }
}

fn decode(input: &InputArgs, decoder: Decoder, json: bool) -> Result<()> {
    let message = read_message(input)?;

    if !json {
        for label in decoder.labels(&message) {
            println!("{label}");
        }

        return Ok(());
    }

    let records = message
        .iter()
        .map(|record| RecordSummary {
            tnf: record.tnf.to_string(),
            type_: String::from_utf8_lossy(&record.type_).to_string(),
            id: record.id.as_ref().map(|id| String::from_utf8_lossy(id).to_string()),
            payload_length: record.payload.len(),
        })
        .collect();

    let output = DecodeOutput {
        labels: decoder.labels(&message).collect(),
        records,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn dispatch(input: &InputArgs, config: &ReaderConfig) -> Result<()> {
    let message = read_message(input)?;

    let Some(target) = DispatchTarget::from_message(&message) else {
        println!("not dispatched, the first record has no dispatch target");
        return Ok(());
    };

    println!("target: {target}");

    let filters = filter::build_filters(config);
    match filter::matching_filter(&filters, &message) {
        Some(filter) => println!("matched: {filter}"),
        None => println!("not dispatched, no filter matches"),
    }

    Ok(())
}

fn read_message(input: &InputArgs) -> Result<NdefMessage> {
    let data = match &input.file {
        Some(path) => read_file(path)?,
        None => {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data).wrap_err("unable to read stdin")?;
            data
        }
    };

    let bytes = decode_input(&data, input.encoding)?;
    debug!("read {} bytes", bytes.len());

    if input.tlv {
        read_tag(&bytes)
    } else {
        Ok(NdefMessage::from_bytes(&bytes)?)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).wrap_err_with(|| format!("unable to read {}", path.display()))
}

/// Feed the dump through the reader one chunk at a time, the way it comes off a tag
fn read_tag(bytes: &[u8]) -> Result<NdefMessage> {
    let chunk_size = (BYTES_PER_BLOCK * NUMBER_OF_BLOCKS_PER_CHUNK) as usize;

    let mut reader = NfcReader::new();
    let mut left_over = Vec::new();

    for chunk in bytes.chunks(chunk_size) {
        let mut data = std::mem::take(&mut left_over);
        data.extend_from_slice(chunk);

        match reader.parse(data.clone()) {
            Ok(ParseResult::Complete(info, message)) => {
                debug!(?info, "read complete message");
                return Ok(message);
            }
            Ok(ParseResult::Incomplete(incomplete)) => left_over = incomplete.left_over_bytes,
            Err(NfcReaderError::NotEnoughData) => left_over = data,
            Err(error) => return Err(error.into()),
        }
    }

    Err(eyre!("tag dump ended before the NDEF message was complete"))
}
