use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
};

use super::{DnsError, MxRecord};

/// DNS queries needed by the verifier. Implemented for the blocking
/// `trust-dns` [`Resolver`]; tests plug in stubs.
pub trait DnsLookup {
    /// MX records of `domain`, in the order the server returned them.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;

    /// TXT records of `name`, multi-string records concatenated.
    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError>;
}

impl<T: DnsLookup + ?Sized> DnsLookup for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        (**self).lookup_mx(domain)
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        (**self).lookup_txt(name)
    }
}

impl DnsLookup for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("MX", domain, err)),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        let lookup = match Resolver::txt_lookup(self, name) {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("TXT", name, err)),
        };
        Ok(collect_txt_records(name, lookup.iter().map(|txt| txt.txt_data())))
    }
}

/// The system resolver, or nothing if `/etc/resolv.conf` (or the platform
/// equivalent) could not be read. In the latter case every lookup fails with
/// [`DnsError::ResolverUnavailable`].
pub struct SystemResolver {
    inner: Option<Resolver>,
}

impl SystemResolver {
    pub fn from_system_conf() -> Self {
        match Resolver::from_system_conf() {
            Ok(resolver) => Self {
                inner: Some(resolver),
            },
            Err(err) => {
                tracing::error!(error = %err, "system DNS resolver initialization failed");
                Self { inner: None }
            }
        }
    }
}

impl DnsLookup for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        self.inner
            .as_ref()
            .ok_or(DnsError::ResolverUnavailable)?
            .lookup_mx(domain)
    }

    fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        self.inner
            .as_ref()
            .ok_or(DnsError::ResolverUnavailable)?
            .lookup_txt(name)
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DnsError::idna)
}

pub(crate) fn fqdn(label: &str, domain: &str) -> String {
    format!("{label}.{domain}")
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// Joins the character-strings of each record. A record that is not UTF-8 is
/// dropped on its own so the rest of the answer can still be scanned.
pub(crate) fn collect_txt_records<'a, I>(name: &str, answers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [Box<[u8]>]>,
{
    let mut records = Vec::new();
    for pieces in answers {
        match join_txt_pieces(name, pieces) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(error = %err, "TXT record skipped"),
        }
    }
    records
}

fn join_txt_pieces(name: &str, pieces: &[Box<[u8]>]) -> Result<String, DnsError> {
    let mut record = String::new();
    for piece in pieces {
        let segment =
            std::str::from_utf8(piece).map_err(|err| DnsError::txt_data_utf8(name, err))?;
        record.push_str(segment);
    }
    Ok(record)
}

fn should_treat_as_empty(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
