/// One mail exchanger of a domain. Lower `preference` is tried first.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Everything the resolver learned about a domain. A failed lookup shows up as
/// an empty list or `None`, never as an error.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainRecords {
    pub domain: String,
    /// Sorted by ascending preference; ties keep the resolver's order.
    pub mx_records: Vec<MxRecord>,
    pub spf: Option<String>,
    pub dmarc: Option<String>,
}

impl DomainRecords {
    pub(crate) fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn has_mx(&self) -> bool {
        !self.mx_records.is_empty()
    }

    pub fn has_spf(&self) -> bool {
        self.spf.is_some()
    }

    pub fn has_dmarc(&self) -> bool {
        self.dmarc.is_some()
    }
}
