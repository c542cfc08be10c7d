use std::borrow::Cow;
use std::time::Duration;

/// Controls how [`probe_recipient`](crate::probe_recipient) talks to MX hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub port: u16,
    pub connect_timeout: Duration,
    /// Read and write deadline for every command/reply exchange.
    pub command_timeout: Duration,
    /// Identity sent with `EHLO`; the verified domain when unset.
    pub helo_domain: Option<String>,
    pub sender_local_part: String,
    /// Write a trailing `QUIT` once the recipient verdict is known.
    pub send_quit: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
            helo_domain: None,
            sender_local_part: "test".to_string(),
            send_quit: true,
        }
    }
}

impl ProbeOptions {
    pub fn helo_domain<'a>(&'a self, domain: &'a str) -> Cow<'a, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(domain))
    }

    /// Synthetic envelope sender scoped to the verified domain.
    pub fn envelope_sender(&self, domain: &str) -> String {
        format!("{}@{domain}", self.sender_local_part)
    }
}
