use clap::{Arg, ArgMatches, Command};
use nano_address::{AddressValidator, Prefixes};
use std::io::{self, Write};
use tracing::{Level, debug};

fn cli() -> ArgMatches {
    Command::new("nano-address")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validates Nano account addresses")
        .arg(
            Arg::new("prefix")
                .short('p')
                .long("prefix")
                .value_name("PREFIX")
                .help("An allowed prefix; may be repeated (default: nano, xrb)")
                .takes_value(true)
                .multiple_occurrences(true),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .help("Sets a log level. Can be one of `trace`, `debug`, `info`, `warn`, `error` ")
                .takes_value(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .takes_value(false)
                .help("prints the public key of valid addresses and the reason for invalid ones"),
        )
        .arg(
            Arg::new("address")
                .value_name("ADDRESS")
                .help("addresses to validate")
                .required(true)
                .multiple_values(true),
        )
        .get_matches()
}

/// Writes one `<address>: valid|invalid` line per address. Returns whether
/// every address was valid.
fn report<'a, W: Write>(
    validator: &AddressValidator,
    addresses: impl Iterator<Item = &'a str>,
    verbose: bool,
    out: &mut W,
) -> io::Result<bool> {
    let mut all_valid = true;
    for address in addresses {
        match validator.decode(address) {
            Ok(decoded) if verbose => writeln!(out, "{address}: valid ({})", decoded.public_key_hex())?,
            Ok(_) => writeln!(out, "{address}: valid")?,
            Err(e) => {
                all_valid = false;
                if verbose {
                    writeln!(out, "{address}: invalid ({e})")?;
                } else {
                    writeln!(out, "{address}: invalid")?;
                }
            }
        }
    }
    Ok(all_valid)
}

fn main() {
    let matches = cli();
    let log_level = match matches.value_of("loglevel") {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("error") => Level::ERROR,
        _ => Level::WARN,
    };
    tracing_subscriber::fmt().with_max_level(log_level).with_writer(io::stderr).init();

    let prefixes = match matches.values_of("prefix") {
        Some(values) => values.collect::<Prefixes>(),
        None => Prefixes::default(),
    };
    debug!("allowed prefixes: {:?}", prefixes.as_slice());

    let validator = AddressValidator::new(prefixes);
    let addresses = matches.values_of("address").into_iter().flatten();
    let verbose = matches.is_present("verbose");

    match report(&validator, addresses, verbose, &mut io::stdout().lock()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("failed to write report: {e}");
            std::process::exit(2);
        }
    }
}
