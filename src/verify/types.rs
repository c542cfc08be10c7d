use crate::probe::ProbeVerdict;
use crate::records::DomainRecords;

/// Final verdict for one address. Serialises with stable keys:
/// `email`, `syntax_valid`, `is_valid`, `has_mx`, `has_spf`, `spf_record`,
/// `has_dmarc`, `dmarc_record`, `error`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub syntax_valid: bool,
    /// The MX host accepted the recipient.
    pub is_valid: bool,
    pub has_mx: bool,
    pub has_spf: bool,
    pub spf_record: String,
    pub has_dmarc: bool,
    pub dmarc_record: String,
    /// Empty when nothing went wrong.
    #[cfg_attr(feature = "with-serde", serde(default))]
    pub error: String,
}

impl VerificationResult {
    pub(crate) fn invalid_syntax(email: &str) -> Self {
        Self {
            email: email.to_string(),
            error: super::INVALID_FORMAT.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(email: &str, records: &DomainRecords, verdict: ProbeVerdict) -> Self {
        Self {
            email: email.to_string(),
            syntax_valid: true,
            is_valid: verdict.accepted,
            has_mx: records.has_mx(),
            has_spf: records.has_spf(),
            spf_record: records.spf.clone().unwrap_or_default(),
            has_dmarc: records.has_dmarc(),
            dmarc_record: records.dmarc.clone().unwrap_or_default(),
            error: verdict.detail,
        }
    }
}
