use regex::Regex;
use std::sync::OnceLock;

/// Returned whenever no intent matches or a matched intent finds no data.
pub const FALLBACK_ANSWER: &str = "I don't know.";

// Extraction grammar for the corpus sentence template
// "On {date}, {customer} purchased a {product} for {amount}.". The patterns
// and the template in corpus.rs must change together.
fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"for\s+([0-9]+)").unwrap())
}

fn product_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"purchased a\s+([A-Za-z ]+)\s+for").unwrap())
}

struct AnswerContext<'a> {
    sentences: &'a [String],
    customer: Option<&'a str>,
}

impl<'a> AnswerContext<'a> {
    /// Sentences considered by the per-customer aggregations: when a known
    /// customer was named in the question, only sentences mentioning that
    /// customer count.
    fn applicable(&self) -> Vec<&'a str> {
        match self.customer {
            Some(name) => {
                let needle = name.to_lowercase();
                self.sentences
                    .iter()
                    .filter(|sentence| sentence.to_lowercase().contains(&needle))
                    .map(|sentence| sentence.as_str())
                    .collect()
            }
            None => self.sentences.iter().map(|sentence| sentence.as_str()).collect(),
        }
    }
}

type IntentPredicate = fn(&str) -> bool;
type IntentHandler = fn(&AnswerContext) -> Option<String>;

/// Intent precedence is data: the table is walked top to bottom against the
/// lower-cased question and the first matching predicate's handler runs.
const INTENTS: &[(IntentPredicate, IntentHandler)] = &[
    (is_total_spend, total_spend),
    (is_purchase_history, purchase_history),
    (is_average_amount, average_amount),
    (is_most_purchased, most_purchased),
];

/// Produce an answer from the retrieved sentences, or the fallback string
/// when no intent matches or the matched intent finds nothing to report.
/// Never fails; extraction problems degrade to the fallback.
pub fn answer_from_context(sentences: &[String], question: &str, customers: &[String]) -> String {
    let lowered = question.to_lowercase();
    let customer = customers
        .iter()
        .find(|name| lowered.contains(&name.to_lowercase()))
        .map(|name| name.as_str());

    let ctx = AnswerContext { sentences, customer };
    for (matches, handler) in INTENTS {
        if matches(&lowered) {
            return handler(&ctx).unwrap_or_else(|| FALLBACK_ANSWER.to_string());
        }
    }
    FALLBACK_ANSWER.to_string()
}

fn is_total_spend(question: &str) -> bool {
    question.contains("total") && (question.contains("spend") || question.contains("spent"))
}

fn total_spend(ctx: &AnswerContext) -> Option<String> {
    let amounts: Vec<i64> = ctx
        .applicable()
        .into_iter()
        .filter_map(parse_amount)
        .collect();
    if amounts.is_empty() {
        return None;
    }
    let total: i64 = amounts.iter().sum();
    let answer = match ctx.customer {
        Some(name) => format!("{} spent a total of {}.", name, total),
        // No customer named: the name slot is omitted entirely.
        None => format!("spent a total of {}.", total),
    };
    Some(answer)
}

fn is_purchase_history(question: &str) -> bool {
    question.contains("purchase history")
        || (question.contains("list") && question.contains("transaction"))
}

fn purchase_history(ctx: &AnswerContext) -> Option<String> {
    let items = ctx.applicable();
    if items.is_empty() {
        None
    } else {
        Some(items.join(" ; "))
    }
}

fn is_average_amount(question: &str) -> bool {
    question.contains("average") && (question.contains("order") || question.contains("amount"))
}

fn average_amount(ctx: &AnswerContext) -> Option<String> {
    // Amounts are pooled across everything retrieved; the customer filter
    // does not gate this aggregation.
    let amounts: Vec<i64> = ctx
        .sentences
        .iter()
        .filter_map(|sentence| parse_amount(sentence))
        .collect();
    if amounts.is_empty() {
        return None;
    }
    let average = amounts.iter().sum::<i64>() as f64 / amounts.len() as f64;
    Some(format!(
        "The average order amount is {}.",
        format_rounded(average)
    ))
}

fn is_most_purchased(question: &str) -> bool {
    question.contains("most") && (question.contains("product") || question.contains("often"))
}

fn most_purchased(ctx: &AnswerContext) -> Option<String> {
    // Counts accumulate in first-encountered order over the retrieved hits.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for sentence in ctx.sentences {
        if let Some(product) = parse_product(sentence) {
            match counts.iter_mut().find(|(name, _)| *name == product) {
                Some((_, count)) => *count += 1,
                None => counts.push((product, 1)),
            }
        }
    }

    // Strictly-greater comparison keeps the earliest product on ties.
    let mut best: Option<(String, usize)> = None;
    for (product, count) in counts {
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((product, count));
        }
    }
    best.map(|(product, count)| {
        format!("The most purchased product is {} ({} times).", product, count)
    })
}

/// Amount following "for" in the sentence template. Tokens that do not parse
/// as an integer are skipped silently.
fn parse_amount(sentence: &str) -> Option<i64> {
    amount_pattern()
        .captures(sentence)
        .and_then(|captures| captures[1].parse().ok())
}

/// Product name between "purchased a" and "for" in the sentence template.
fn parse_product(sentence: &str) -> Option<String> {
    product_pattern()
        .captures(sentence)
        .map(|captures| captures[1].trim().to_string())
}

/// Round to two decimals, always keeping at least one decimal place so an
/// integral mean reads "850.0" rather than "850".
fn format_rounded(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1}", rounded)
    } else {
        format!("{}", rounded)
    }
}
