//! Classification of transport failures for the fetch retry loop

use std::error::Error;

const TLS_MARKERS: [&str; 4] = ["certificate", "tls", "ssl", "handshake"];

/// How a failed request should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// Certificate or TLS negotiation failure. Worth retrying once the operator has fixed it.
    Tls,
    /// Anything else; not retried
    Other,
}

impl TransportFault {
    /// Walk the error's source chain looking for a TLS failure
    pub fn classify(error: &(dyn Error + 'static)) -> Self {
        let mut current: Option<&(dyn Error + 'static)> = Some(error);
        while let Some(err) = current {
            let message = err.to_string().to_ascii_lowercase();
            if TLS_MARKERS.iter().any(|marker| message.contains(marker)) {
                return TransportFault::Tls;
            }
            current = err.source();
        }
        TransportFault::Other
    }

    pub fn from_reqwest_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() || error.status().is_some() {
            return TransportFault::Other;
        }
        Self::classify(error)
    }

    pub fn should_prompt(&self) -> bool {
        matches!(self, TransportFault::Tls)
    }
}
