use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use dns_codec::protocol::types::RecordType;
use dnsq::lookup::lookup;
use dnsq::transport::UdpTransport;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

// the doc comments for this struct turn into the CLI help text
#[derive(Parser)]
/// DNS lookup utility
///
/// Sends a single query over UDP to the given nameserver and prints
/// the response.  The exit status is 0 if a matching response came
/// back, even if it signals an error, and 1 otherwise.
///
/// Logs go to stderr, filtered by `RUST_LOG` (default "warn").
struct Args {
    /// Address of the nameserver to query
    #[arg(value_parser)]
    nameserver: IpAddr,

    /// Domain name to look up
    #[arg(value_parser)]
    domain: String,

    /// Query type, a mnemonic like "MX" or "TYPE65"
    #[arg(default_value_t = RecordType::A, value_parser)]
    qtype: RecordType,

    /// Port the nameserver listens on
    #[arg(short, long, default_value_t = 53, env = "DNSQ_PORT")]
    port: u16,

    /// Local port to send from (0 for any)
    #[arg(short, long, default_value_t = 0, env = "DNSQ_SOURCE_PORT")]
    source_port: u16,

    /// How long to wait for a response, in milliseconds
    #[arg(short, long, default_value_t = 5000, env = "DNSQ_TIMEOUT_MS")]
    timeout_ms: u64,

    /// How many more times to send the query if there is no response
    #[arg(short, long, default_value_t = 0, env = "DNSQ_RETRIES")]
    retries: u32,

    /// Clear the RD (recursion desired) flag
    #[arg(long)]
    norecurse: bool,

    /// Format of log messages
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "DNSQ_LOG_FORMAT")]
    log_format: LogFormat,
}

fn begin_logging(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let logger = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => logger.init(),
        LogFormat::Json => logger.json().init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    begin_logging(args.log_format);

    let transport = UdpTransport {
        nameserver: SocketAddr::new(args.nameserver, args.port),
        source_port: args.source_port,
        timeout: Duration::from_millis(args.timeout_ms),
        retries: args.retries,
    };

    match lookup(&transport, &args.domain, args.qtype, !args.norecurse).await {
        Ok(response) => {
            println!(";; SERVER: {}", transport.nameserver);
            print!("{response}");
        }
        Err(error) => {
            tracing::error!(nameserver = %transport.nameserver, domain = %args.domain, %error, "lookup failed");
            process::exit(1);
        }
    }
}
