mod ids;
mod lookup;

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::process;
use std::time::Duration;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use dns_wire::protocol::query::{FixedId, IdSource};
use dns_wire::protocol::types::{
    DomainName, Packet, Question, RecordClass, RecordType, ResourceRecord, FLAG_RECURSION_DESIRED,
};

use self::ids::RandomIds;
use self::lookup::{first_address, lookup};

fn print_section(heading: &str, rrs: &[ResourceRecord]) {
    if rrs.is_empty() {
        return;
    }

    println!("\n;; {heading}");
    for rr in rrs {
        println!("{rr}");
    }
}

fn print_response(response: &Packet) {
    println!(
        ";; id: {}, rcode: {}, authoritative: {}, truncated: {}, recursion available: {}",
        response.header.id,
        response.header.rcode(),
        response.header.is_authoritative(),
        response.header.is_truncated(),
        response.header.recursion_available(),
    );

    println!("\n;; QUESTION");
    for question in &response.questions {
        println!("{question}");
    }

    print_section("ANSWER", &response.answers);
    print_section("AUTHORITY", &response.authorities);
    print_section("ADDITIONAL", &response.additionals);
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn begin_logging(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

// the doc comments for this struct turn into the CLI help text
#[derive(Parser)]
/// DNS lookup utility
///
/// Sends a single query over UDP to a nameserver and prints the
/// response.  Set RUST_LOG to see what is sent and received.
struct Args {
    /// Domain name to look up
    #[clap(value_parser)]
    domain: DomainName,

    /// Query type to look up
    #[clap(default_value_t = RecordType::A, value_parser)]
    qtype: RecordType,

    /// Nameserver to send the query to
    #[clap(short, long, default_value = "8.8.8.8", env = "DNSQ_SERVER", value_parser)]
    server: IpAddr,

    /// Port the nameserver listens on
    #[clap(short, long, default_value_t = 53, env = "DNSQ_PORT", value_parser)]
    port: u16,

    /// How many seconds to wait for a response
    #[clap(short, long, default_value_t = 5, env = "DNSQ_TIMEOUT", value_parser)]
    timeout: u64,

    /// Query id to use, rather than a random one
    #[clap(long, value_parser)]
    id: Option<u16>,

    /// Do not set the recursion-desired flag
    #[clap(long, action(clap::ArgAction::SetTrue))]
    no_recurse: bool,

    /// Format of the log messages
    #[clap(long, value_enum, default_value_t = LogFormat::Text, env = "DNSQ_LOG_FORMAT")]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    begin_logging(args.log_format);

    let mut ids: Box<dyn IdSource> = match args.id {
        Some(id) => Box::new(FixedId(id)),
        None => Box::new(RandomIds::default()),
    };

    let question = Question {
        name: args.domain.clone(),
        qtype: args.qtype,
        qclass: RecordClass::IN,
    };
    let flags = if args.no_recurse {
        0
    } else {
        FLAG_RECURSION_DESIRED
    };

    let span = tracing::error_span!("lookup", domain = %args.domain, qtype = %args.qtype);
    let response = match lookup(
        SocketAddr::new(args.server, args.port),
        Duration::from_secs(args.timeout),
        question,
        flags,
        ids.as_mut(),
    )
    .instrument(span)
    .await
    {
        Ok(response) => response,
        Err(err) => {
            eprintln!("; {err}");
            process::exit(1);
        }
    };

    print_response(&response);

    if args.qtype == RecordType::A {
        match first_address(&response) {
            Ok(address) => println!("\n;; ADDRESS\n{address}"),
            Err(err) => {
                println!("\n;; ADDRESS");
                println!("; {err}");
                process::exit(1);
            }
        }
    } else if response.answers.is_empty() {
        println!("\n;; ANSWER");
        println!("; {}", lookup::LookupError::EmptyAnswerSet);
        process::exit(1);
    }
}
