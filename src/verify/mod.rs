//! End-to-end verification: syntax, DNS records, recipient probe.
//!
//! [`Verifier::verify`] never fails; every problem ends up in the fields of
//! the returned [`VerificationResult`].

mod types;

pub use types::VerificationResult;

use crate::probe::{Connector, ProbeOptions, ProbeVerdict, TcpConnector, probe_with};
use crate::records::{DnsLookup, SystemResolver, resolve_with};
use crate::validator::{extract_domain, validate_address};

pub(crate) const INVALID_FORMAT: &str = "Invalid email format";
pub(crate) const NO_MX_RECORDS: &str = "No MX records found for the domain";

/// Verify `address` with the system resolver and plain TCP on port 25.
pub fn verify_email(address: &str) -> VerificationResult {
    verify_email_with_options(address, &ProbeOptions::default())
}

pub fn verify_email_with_options(address: &str, options: &ProbeOptions) -> VerificationResult {
    // no resolver (and no resolv.conf read) for malformed input
    if !validate_address(address) {
        return VerificationResult::invalid_syntax(address);
    }
    let verifier = Verifier::new(SystemResolver::from_system_conf(), TcpConnector)
        .with_options(options.clone());
    verifier.verify(address)
}

/// Verification pipeline over injectable DNS and transport.
pub struct Verifier<D, C> {
    dns: D,
    connector: C,
    options: ProbeOptions,
}

impl<D, C> Verifier<D, C>
where
    D: DnsLookup,
    C: Connector,
{
    pub fn new(dns: D, connector: C) -> Self {
        Self {
            dns,
            connector,
            options: ProbeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProbeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn verify(&self, address: &str) -> VerificationResult {
        if !validate_address(address) {
            tracing::debug!(address, "rejected by syntax check");
            return VerificationResult::invalid_syntax(address);
        }
        let Some(domain) = extract_domain(address) else {
            return VerificationResult::invalid_syntax(address);
        };

        let records = resolve_with(&self.dns, domain);

        let verdict = if records.has_mx() {
            probe_with(
                &self.connector,
                address,
                &records.mx_records,
                &self.options,
            )
        } else {
            ProbeVerdict {
                accepted: false,
                detail: NO_MX_RECORDS.to_string(),
                hosts_tried: Vec::new(),
            }
        };

        tracing::debug!(
            address,
            accepted = verdict.accepted,
            hosts = verdict.hosts_tried.len(),
            "verification finished"
        );
        VerificationResult::from_parts(address, &records, verdict)
    }
}

#[cfg(test)]
mod tests;
