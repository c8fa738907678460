use crate::transactions::TransactionRecord;

/// Render one canonical sentence per record, in record order. Position in
/// the returned vector is the sentence's identity for the whole session;
/// retrieval results refer back to it by index.
pub fn build_corpus(records: &[TransactionRecord]) -> Vec<String> {
    records.iter().map(sentence_for).collect()
}

/// The fixed sentence template. The answer layer's extraction patterns are
/// written against exactly this shape; the two must change together.
pub fn sentence_for(record: &TransactionRecord) -> String {
    format!(
        "On {}, {} purchased a {} for {}.",
        record.date.format("%Y-%m-%d"),
        record.customer,
        record.product,
        format_amount(record.amount)
    )
}

/// Integral amounts render without a decimal tail so they stay parseable as
/// integers downstream.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{}", amount)
    }
}
