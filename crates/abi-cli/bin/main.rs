//! `abi-cli` — encode, decode and derive selectors from an EVM contract
//! ABI on the command line.

use std::fs;
use std::path::PathBuf;

use abi_codec::entry::Abi;
use abi_codec::error::Result;
use abi_codec::{decode, encode, serialize, value};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "abi-cli", version, about = "Encode, decode and derive selectors from an EVM contract ABI")]
struct App {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode call data for a function named in an ABI file.
    Encode {
        /// Path to a JSON ABI document.
        #[arg(long)]
        abi: PathBuf,
        /// Name of the function to encode.
        #[arg(long)]
        function: String,
        /// JSON array of argument values, in declaration order.
        #[arg(long)]
        args: String,
    },
    /// Decode call data against a function named in an ABI file.
    Decode {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        function: String,
        /// `0x`-prefixed hex call data.
        #[arg(long)]
        data: String,
    },
    /// Print the 4-byte selector for a function named in an ABI file.
    Selector {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        function: String,
    },
    /// Print the canonical `name(type1,type2,...)` signature.
    Sig {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        function: String,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_abi(path: &PathBuf) -> Result<Abi> {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to read ABI file");
        std::process::exit(1);
    });
    Abi::from_json(&text)
}

fn find_function<'a>(abi: &'a Abi, name: &str) -> &'a abi_codec::Entry {
    abi.function(name).unwrap_or_else(|| {
        tracing::error!(function = name, "no such function in ABI");
        std::process::exit(1);
    })
}

fn run() -> Result<()> {
    let app = App::parse();
    match app.command {
        Command::Encode { abi, function, args } => {
            let abi = load_abi(&abi)?;
            let entry = find_function(&abi, &function);
            let tuple_ty = entry.inputs_tuple();
            let args: serde_json::Value = serde_json::from_str(&args).expect("--args must be valid JSON");
            let built = value::build(&tuple_ty, &args, "$")?;
            let call_data = encode::encode_call_data(entry, &built)?;
            println!("0x{}", alloy_primitives::hex::encode(call_data));
        }
        Command::Decode { abi, function, data } => {
            let abi = load_abi(&abi)?;
            let entry = find_function(&abi, &function);
            let hex = data.strip_prefix("0x").unwrap_or(&data);
            let bytes = alloy_primitives::hex::decode(hex).expect("--data must be valid hex");
            let decoded = decode::decode_call_data(entry, &bytes)?;
            let tuple_ty = entry.inputs_tuple();
            let rendered = serialize::serialize(&tuple_ty, &decoded, &serialize::SerializerConfig::default());
            println!("{}", serde_json::to_string_pretty(&rendered).expect("JSON serialization cannot fail"));
        }
        Command::Selector { abi, function } => {
            let abi = load_abi(&abi)?;
            let entry = find_function(&abi, &function);
            println!("0x{}", alloy_primitives::hex::encode(entry.selector()?));
        }
        Command::Sig { abi, function } => {
            let abi = load_abi(&abi)?;
            let entry = find_function(&abi, &function);
            println!("{}", entry.signature()?);
        }
    }
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        tracing::error!(%err, code = err.code(), "abi-cli failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
