#![forbid(unsafe_code)]
//! mailverify_lib: does this address look alive?
//!
//! Syntax check, MX/SPF/DMARC lookups and an SMTP `RCPT TO` probe folded into
//! one [`VerificationResult`]. No message is ever sent.

pub mod probe;
pub mod records;
pub mod validator;
pub mod verify;

pub use probe::{
    Connector, ProbeError, ProbeOptions, ProbeStage, ProbeVerdict, SmtpReply, TcpConnector,
    probe_recipient, probe_recipient_with_options, probe_with,
};
pub use records::{
    DnsError, DnsLookup, DomainRecords, MxRecord, SystemResolver, resolve_domain_records,
    resolve_with,
};
pub use validator::{extract_domain, validate_address};
pub use verify::{VerificationResult, Verifier, verify_email, verify_email_with_options};
