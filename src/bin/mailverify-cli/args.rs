use std::time::Duration;

use clap::Parser;
use mailverify_lib::ProbeOptions;

#[derive(Parser)]
#[command(name = "mailverify-cli")]
pub struct Cli {
    /// adresse e-mail à vérifier (sinon invite interactive)
    pub email: Option<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// port SMTP des MX
    #[arg(long, default_value_t = 25)]
    pub port: u16,

    /// timeout connexion et commandes (ms)
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// nom utilisé pour EHLO/HELO (par défaut le domaine vérifié)
    #[arg(long)]
    pub helo: Option<String>,

    /// n'envoie pas QUIT après le RCPT TO
    #[arg(long = "no-quit")]
    pub no_quit: bool,

    /// logs détaillés (debug) sur stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn probe_options(&self) -> ProbeOptions {
        let timeout = Duration::from_millis(self.timeout_ms);
        ProbeOptions {
            port: self.port,
            connect_timeout: timeout,
            command_timeout: timeout,
            helo_domain: self.helo.clone(),
            send_quit: !self.no_quit,
            ..ProbeOptions::default()
        }
    }
}
