mod args;
mod output;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use mailverify_lib::{SystemResolver, TcpConnector, VerificationResult, Verifier};
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let addresses = read_addresses(&cli)?;
    let verifier = Verifier::new(SystemResolver::from_system_conf(), TcpConnector)
        .with_options(cli.probe_options());

    let rows: Vec<VerificationResult> = addresses
        .iter()
        .map(|address| verifier.verify(address))
        .collect();

    output::write_reports(&rows, &cli)?;

    // codes de sortie : 0 acceptée(s), 2 refus/invalide, 1 fatal
    if output::any_rejected(&rows) {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_addresses(cli: &Cli) -> Result<Vec<String>> {
    if cli.stdin {
        let mut addresses = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            if !line.is_empty() {
                addresses.push(line);
            }
        }
        return Ok(addresses);
    }

    if let Some(email) = &cli.email {
        return Ok(vec![email.clone()]);
    }

    print!("Please enter a valid email> ");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read from input")?;
    if read == 0 {
        bail!("could not read from input");
    }
    let address = line.trim_end_matches(['\r', '\n']);
    if address.is_empty() {
        bail!("email parameter is missing");
    }
    Ok(vec![address.to_string()])
}
