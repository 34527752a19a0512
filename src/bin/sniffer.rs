//! resp-sniffer binary
//!
//! Reads a capture and prints one line per request/response exchange.

use std::io;
use std::net::IpAddr;

use clap::Parser;
use resp_sniffer::capture::{self, CaptureFilter, PcapSource};
use resp_sniffer::config::DEFAULT_SERVER_PORT;
use resp_sniffer::output::{OutputFormat, RecordWriter};
use resp_sniffer::{Config, Engine, SizeBasis, Sniffer};
use tracing_subscriber::{fmt, EnvFilter};

/// Key-value server traffic sniffer
#[derive(Parser, Debug)]
#[command(name = "resp-sniffer")]
#[command(about = "Reconstruct key-value server requests and response sizes from captured traffic")]
#[command(version)]
struct Args {
    /// Capture file (pcap or pcapng), or "-" for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,

    /// Only consider packets sent from this address
    #[arg(long)]
    src: Option<IpAddr>,

    /// Only consider packets sent to this address
    #[arg(long)]
    dst: Option<IpAddr>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// What sizes count: payload (TCP payload) or frame (whole captured frame)
    #[arg(long, default_value = "payload")]
    size_basis: SizeBasis,

    /// Print requests still waiting for a response when the capture ends
    #[arg(long)]
    flush_pending: bool,
}

fn main() {
    // Logs go to stderr; stdout carries records only
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("resp-sniffer v{}", resp_sniffer::VERSION);
    tracing::info!("Input: {}", args.input);
    tracing::info!("Server port: {}", args.port);

    let config = Config::builder()
        .server_port(args.port)
        .src_filter(args.src)
        .dst_filter(args.dst)
        .size_basis(args.size_basis)
        .flush_pending_on_end(args.flush_pending)
        .build();

    if let Err(e) = run(&args, config) {
        if e.is_broken_pipe() {
            tracing::debug!("Output closed, stopping");
            return;
        }
        tracing::error!("Sniffer error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: Config) -> resp_sniffer::Result<()> {
    let filter = CaptureFilter::from_config(&config);
    let input = args.input.clone();

    // Capture runs on its own thread; reconstruction stays on this one
    let (segments, capture_thread) =
        capture::spawn_reader(move || PcapSource::from_arg(&input, filter), config.channel_capacity)?;

    let mut writer = RecordWriter::new(io::stdout().lock(), args.format);
    for record in Sniffer::new(Engine::new(config), segments) {
        writer.write(&record?)?;
    }

    if capture_thread.join().is_err() {
        tracing::warn!("Capture thread panicked");
    }
    Ok(())
}
