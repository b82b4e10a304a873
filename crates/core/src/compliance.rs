/// Risk vocabulary, in reporting order.
pub const RISK_TERMS: [&str; 7] = [
    "restatement",
    "earnings risk",
    "regulatory breach",
    "non-compliance",
    "violation",
    "penalty",
    "audit failure",
];

/// Each term appears at most once, in [`RISK_TERMS`] order.
pub fn detect(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    RISK_TERMS
        .into_iter()
        .filter(|term| lowered.contains(term))
        .collect()
}
