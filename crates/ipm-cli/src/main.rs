/// IPM command-line tool — converts between text and binary IPM
/// container files, and drives bulk file transfer against a Mastercard
/// Interface Processor over TCP.
///
/// # Command overview
///
/// ```text
/// ipm <COMMAND> [OPTIONS]
///
/// Commands:
///   encode    Convert a text file into a blocked/VBS/EBCDIC IPM container
///   decode    Convert an IPM container into a line-oriented text file
///   send      Transmit a local file to the MIP
///   receive   Pull a file from the MIP via the sequence scan
///   manage    Compose conversion and transfer in one step
///   help      Print help information
///
/// Global options:
///   -v, --verbose    Enable diagnostic logging (including stack traces)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                                  |
/// |------|-----------------------------------------------------------|
/// | 0    | Success                                                    |
/// | 1    | Runtime error (I/O, network, protocol)                     |
/// | 2    | Usage error: bad flags (clap) or a malformed Transmission  |
/// |      | ID / mode value rejected by the protocol layer             |
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ipm_protocol::ProtocolError;

mod cmd_decode;
mod cmd_encode;
mod cmd_manage;
mod cmd_receive;
mod cmd_send;

#[derive(Parser)]
#[command(name = "ipm", version, about = "Bulk IPM file transfer and conversion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable diagnostic logging (debug-level tracing, full error chains).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a text file into an IPM container.
    Encode(EncodeArgs),
    /// Convert an IPM container into a text file.
    Decode(DecodeArgs),
    /// Send a local IPM file to the MIP.
    Send(SendArgs),
    /// Receive a file from the MIP.
    Receive(ReceiveArgs),
    /// Convert and transfer in a single step, owning any temporary file.
    Manage(ManageArgs),
}

/// How the local side of a `manage` transfer stores its file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncodeMode {
    /// The local file is already an IPM container; transfer it as-is.
    Ebcdic,
    /// The local file is line-oriented text; convert through a private
    /// temporary IPM file before/after transfer.
    Ascii,
}

#[derive(clap::Args)]
pub struct EncodeArgs {
    /// Input text file.
    #[arg(long)]
    pub input: PathBuf,
    /// Output IPM container file.
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Input IPM container file.
    #[arg(long)]
    pub input: PathBuf,
    /// Output text file.
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(clap::Args)]
pub struct SendArgs {
    /// MIP host address.
    #[arg(long)]
    pub ip: String,
    /// MIP port.
    #[arg(long)]
    pub port: u16,
    /// Local IPM container file to send.
    #[arg(long)]
    pub file: PathBuf,
    /// Transmission ID: 9-char short form or 14-char full form.
    #[arg(long)]
    pub ipmname: String,
}

#[derive(clap::Args)]
pub struct ReceiveArgs {
    /// MIP host address.
    #[arg(long)]
    pub ip: String,
    /// MIP port.
    #[arg(long)]
    pub port: u16,
    /// Local path to write the received IPM container to.
    #[arg(long)]
    pub file: PathBuf,
    /// Transmission ID: 9-char short form or 14-char full form.
    #[arg(long)]
    pub ipmname: String,
    /// First sequence number to try during the scan.
    #[arg(long, default_value_t = 1)]
    pub start_sequence: u8,
}

#[derive(clap::Args)]
pub struct ManageArgs {
    /// `send` or `receive`.
    #[arg(long, value_enum)]
    pub mode: TransferMode,
    /// MIP host address.
    #[arg(long)]
    pub ip: String,
    /// MIP port.
    #[arg(long)]
    pub port: u16,
    /// Local file path: an IPM container (EBCDIC mode) or text file (ASCII
    /// mode).
    #[arg(long)]
    pub file: PathBuf,
    /// Transmission ID: 9-char short form or 14-char full form.
    #[arg(long)]
    pub ipmname: String,
    /// Whether `file` is a raw IPM container or line-oriented text.
    #[arg(long, value_enum, default_value = "ebcdic")]
    pub encode: EncodeMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransferMode {
    Send,
    Receive,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Encode(args) => cmd_encode::run(args),
        Commands::Decode(args) => cmd_decode::run(args),
        Commands::Send(args) => cmd_send::run(args),
        Commands::Receive(args) => cmd_receive::run(args),
        Commands::Manage(args) => cmd_manage::run(args),
    };

    if let Err(e) = result {
        if cli.verbose {
            eprintln!("error: {e:?}");
        } else {
            eprintln!("error: {e}");
        }
        process::exit(if is_usage_error(&e) { 2 } else { 1 });
    }
}

/// Does `err`'s source chain bottom out in a value rejected by the
/// protocol layer itself (a malformed `--ipmname`), rather than an I/O or
/// network failure? Those are usage errors, not runtime errors.
fn is_usage_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<ProtocolError>(), Some(ProtocolError::InvalidTxId { .. })))
}

/// Resolves `ip:port` into the single address used for a dialogue.
fn resolve_addr(ip: &str, port: u16) -> anyhow::Result<SocketAddr> {
    use std::net::ToSocketAddrs;
    (ip, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("could not resolve {ip}:{port}"))
}
