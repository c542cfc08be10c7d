//! SMTP recipient probing.
//!
//! Each MX host is asked, in preference order, whether it would accept the
//! recipient: banner, `EHLO`/`HELO`, `MAIL FROM`, `RCPT TO`, then the session
//! is dropped. No `DATA` is ever sent. Hosts that cannot be reached or refuse
//! the greeting or the sender are skipped; the first `RCPT TO` verdict ends
//! the probe.

mod connector;
mod error;
mod options;
mod session;
mod types;

pub use connector::{Connector, TcpConnector};
pub use error::ProbeError;
pub use options::ProbeOptions;
pub use types::{ProbeStage, ProbeVerdict, SmtpReply};

use crate::records::MxRecord;
use session::SmtpSession;
use types::HostOutcome;

pub(crate) const ALL_MX_FAILED: &str = "Could not verify email: all MX servers failed";

/// Probe `address` against `records` over TCP port 25 with default timeouts.
pub fn probe_recipient(address: &str, records: &[MxRecord]) -> ProbeVerdict {
    probe_recipient_with_options(address, records, &ProbeOptions::default())
}

pub fn probe_recipient_with_options(
    address: &str,
    records: &[MxRecord],
    options: &ProbeOptions,
) -> ProbeVerdict {
    probe_with(&TcpConnector, address, records, options)
}

/// Same as [`probe_recipient_with_options`] over an arbitrary transport.
/// Hosts are tried strictly one after the other, in the given order.
pub fn probe_with<C>(
    connector: &C,
    address: &str,
    records: &[MxRecord],
    options: &ProbeOptions,
) -> ProbeVerdict
where
    C: Connector + ?Sized,
{
    let domain = address
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .unwrap_or_default();
    let mut hosts_tried = Vec::new();

    for record in records {
        hosts_tried.push(record.exchange.clone());
        match probe_host(connector, &record.exchange, address, domain, options) {
            HostOutcome::Unreachable { stage, reason } => {
                tracing::warn!(host = %record.exchange, %stage, %reason, "MX host skipped");
            }
            HostOutcome::Rejected { detail } => {
                tracing::debug!(
                    host = %record.exchange,
                    stage = %ProbeStage::RcptTo,
                    %detail,
                    "recipient rejected"
                );
                return ProbeVerdict {
                    accepted: false,
                    detail,
                    hosts_tried,
                };
            }
            HostOutcome::Accepted => {
                tracing::debug!(host = %record.exchange, "recipient accepted");
                return ProbeVerdict {
                    accepted: true,
                    detail: String::new(),
                    hosts_tried,
                };
            }
        }
    }

    ProbeVerdict {
        accepted: false,
        detail: ALL_MX_FAILED.to_string(),
        hosts_tried,
    }
}

fn probe_host<C>(
    connector: &C,
    host: &str,
    address: &str,
    domain: &str,
    options: &ProbeOptions,
) -> HostOutcome
where
    C: Connector + ?Sized,
{
    let stream = match connector.connect(host, options) {
        Ok(stream) => stream,
        Err(err) => return skip_host(ProbeStage::Connect, &err),
    };
    let mut session = SmtpSession::new(host, stream);

    if let Err(err) = session.read_banner() {
        return skip_host(ProbeStage::Greeting, &err);
    }
    if let Err(err) = session.hello(&options.helo_domain(domain)) {
        return skip_host(ProbeStage::Greeting, &err);
    }
    if let Err(err) = session.mail_from(&options.envelope_sender(domain)) {
        return skip_host(ProbeStage::MailFrom, &err);
    }

    let outcome = match session.rcpt_to(address) {
        Ok(reply) if reply.is_positive_completion() => HostOutcome::Accepted,
        Ok(reply) => HostOutcome::Rejected {
            detail: format!("SMTP Error Code {}: {}", reply.code, reply.message),
        },
        Err(err) => HostOutcome::Rejected {
            detail: format!("SMTP Error: {err}"),
        },
    };

    if options.send_quit {
        session.quit();
    }
    outcome
}

fn skip_host(stage: ProbeStage, err: &ProbeError) -> HostOutcome {
    HostOutcome::Unreachable {
        stage,
        reason: err.to_string(),
    }
}
