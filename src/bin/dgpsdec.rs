use std::fs::File;
use std::io::{self, BufReader};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dgps::decoder::Decoder;
use dgps::sink::TextSink;
use dgps::source::{BitSource, ReadBitSource, UdpBitSource};

/// ITU-R M.823 DGPS beacon broadcast decoder
///
/// Reads the 100/200 bps beacon bit stream (one byte per bit) from a UDP
/// multicast group and prints the decoded messages as text lines.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Multicast group carrying the bit stream
    #[arg(default_value = "225.0.0.1")]
    group: Ipv4Addr,

    /// UDP port of the bit stream
    #[arg(default_value_t = 10000)]
    port: u16,

    /// Include the raw shift-register words in status lines
    #[arg(long)]
    debug: bool,

    /// Replay bit-bytes from a capture file instead of the network
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let sink = TextSink::new(io::stdout().lock(), args.debug);

    match args.replay {
        Some(path) => match File::open(&path) {
            Ok(file) => run(ReadBitSource::new(BufReader::new(file)), sink),
            Err(err) => fail(format!("cannot open {}: {}", path.display(), err)),
        },
        None => match UdpBitSource::multicast(args.group, args.port) {
            Ok(source) => run(source, sink),
            Err(err) => fail(format!("cannot join {}:{}: {}", args.group, args.port, err)),
        },
    }
}

fn run<S: BitSource>(source: S, sink: TextSink<io::StdoutLock<'static>>) -> ExitCode {
    let mut decoder = Decoder::new(source, sink);
    decoder.run();
    ExitCode::SUCCESS
}

fn fail(message: String) -> ExitCode {
    eprintln!("{}", message);
    ExitCode::FAILURE
}
