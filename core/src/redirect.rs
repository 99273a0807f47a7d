//! Hosted payment page completion detection.
//!
//! The gateway reports the result only by navigating somewhere: either a URL
//! with a `status=success|failed|cancelled` query parameter or one whose path
//! contains `/payment/success`, `/payment/failed` or `/payment/cancel`. The
//! host feeds every navigation URL of its webview through [`classify`] and
//! closes the webview on the first `Some`.

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success,
    Failed,
    Cancelled,
}

impl PaymentOutcome {
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "success" | "successful" => Some(PaymentOutcome::Success),
            "failed" | "fail" | "failure" => Some(PaymentOutcome::Failed),
            "cancelled" | "canceled" | "cancel" => Some(PaymentOutcome::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentOutcome::Success => "success",
            PaymentOutcome::Failed => "failed",
            PaymentOutcome::Cancelled => "cancelled",
        }
    }
}

/// `None` means the URL is an intermediate gateway page.
pub fn classify(url: &str) -> Option<PaymentOutcome> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| classify_parsed(&parsed))
        .or_else(|| classify_raw(url))
}

fn classify_parsed(url: &Url) -> Option<PaymentOutcome> {
    let from_query = url
        .query_pairs()
        .find(|(key, _)| key == "status")
        .and_then(|(_, value)| PaymentOutcome::from_word(&value));
    if from_query.is_some() {
        return from_query;
    }

    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
    segments
        .windows(2)
        .find(|pair| pair[0].eq_ignore_ascii_case("payment"))
        .and_then(|pair| PaymentOutcome::from_word(pair[1]))
}

// Deep links such as `messfinder://payment/success` put `payment` in the host
// slot, and some hosts hand over strings that do not parse at all.
fn classify_raw(url: &str) -> Option<PaymentOutcome> {
    let lower = url.to_ascii_lowercase();
    let checks = [
        ("status=success", PaymentOutcome::Success),
        ("status=failed", PaymentOutcome::Failed),
        ("status=cancelled", PaymentOutcome::Cancelled),
        ("/payment/success", PaymentOutcome::Success),
        ("/payment/failed", PaymentOutcome::Failed),
        ("/payment/cancel", PaymentOutcome::Cancelled),
    ];
    checks
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, outcome)| *outcome)
}
