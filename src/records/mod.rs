//! MX, SPF and DMARC lookups for a domain.
//!
//! The three queries are independent and individually fault tolerant: a
//! failing lookup is logged and reads as "no record", so [`resolve_with`]
//! always produces a [`DomainRecords`].

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{DnsLookup, SystemResolver};
pub use types::{DomainRecords, MxRecord};

use resolver::{fqdn, normalize_domain};

pub(crate) const SPF_PREFIX: &str = "v=spf1";
pub(crate) const DMARC_PREFIX: &str = "v=DMARC1";
const DMARC_LABEL: &str = "_dmarc";

/// Resolve `domain` with the system resolver.
pub fn resolve_domain_records(domain: &str) -> DomainRecords {
    let resolver = SystemResolver::from_system_conf();
    resolve_with(&resolver, domain)
}

pub fn resolve_with<R>(resolver: &R, domain: &str) -> DomainRecords
where
    R: DnsLookup + ?Sized,
{
    let ascii = match normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => {
            tracing::warn!(domain, error = %err, "domain unusable for DNS queries");
            return DomainRecords::empty(domain);
        }
    };

    let mx_records = match resolver.lookup_mx(&ascii) {
        Ok(mut records) => {
            // stable: equal preferences keep the resolver's order
            records.sort_by_key(|record| record.preference);
            records
        }
        Err(err) => {
            tracing::warn!(domain = %ascii, error = %err, "MX lookup failed");
            Vec::new()
        }
    };
    tracing::debug!(domain = %ascii, count = mx_records.len(), "MX records resolved");

    let spf = policy_record(resolver, &ascii, SPF_PREFIX);
    let dmarc = policy_record(resolver, &fqdn(DMARC_LABEL, &ascii), DMARC_PREFIX);

    DomainRecords {
        domain: domain.to_string(),
        mx_records,
        spf,
        dmarc,
    }
}

fn policy_record<R>(resolver: &R, name: &str, prefix: &str) -> Option<String>
where
    R: DnsLookup + ?Sized,
{
    match resolver.lookup_txt(name) {
        Ok(records) => {
            let found = first_with_prefix(&records, prefix);
            tracing::debug!(name, prefix, found = found.is_some(), "TXT records scanned");
            found
        }
        Err(err) => {
            tracing::warn!(name, error = %err, "TXT lookup failed");
            None
        }
    }
}

/// First record, in returned order, starting with the literal `prefix`.
pub(crate) fn first_with_prefix(records: &[String], prefix: &str) -> Option<String> {
    records
        .iter()
        .find(|record| record.starts_with(prefix))
        .cloned()
}
