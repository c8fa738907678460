use anyhow::Result;

use crate::answer::answer_from_context;
use crate::corpus::build_corpus;
use crate::index::VectorSpaceModel;
use crate::retriever::{retrieve, RetrievalHit};
use crate::transactions::TransactionRecord;

/// Two-slot question history. An answer request pushes the prior `last`
/// question into `previous` before recording the new one; nothing older is
/// kept, and nothing outlives the session.
#[derive(Debug, Default, Clone)]
pub struct ConversationMemory {
    pub last_question: Option<String>,
    pub previous_question: Option<String>,
}

impl ConversationMemory {
    pub fn record(&mut self, question: &str) {
        self.previous_question = self.last_question.take();
        self.last_question = Some(question.to_string());
    }
}

/// The assembled pipeline: records, their sentence corpus, the vector space
/// fitted over it, and session memory. The corpus and model are built once
/// here and stay read-only for the engine's lifetime.
pub struct RagEngine {
    records: Vec<TransactionRecord>,
    corpus: Vec<String>,
    model: VectorSpaceModel,
    customers: Vec<String>,
    pub memory: ConversationMemory,
}

impl RagEngine {
    pub fn new(records: Vec<TransactionRecord>, customers: Vec<String>) -> Result<Self> {
        let corpus = build_corpus(&records);
        let model = VectorSpaceModel::fit(&corpus)?;
        crate::config::verbose_print(&format!(
            "Fitted vector space: {} sentences x {} terms",
            model.row_count(),
            model.dimensions()
        ));
        Ok(Self {
            records,
            corpus,
            model,
            customers,
            memory: ConversationMemory::default(),
        })
    }

    /// Answer one question: record it into memory, rank the corpus against
    /// it, and extract an answer from the retrieved sentences.
    pub fn answer(&mut self, question: &str, top_k: usize) -> (Vec<RetrievalHit>, String) {
        self.memory.record(question);
        let hits = retrieve(question, &self.model, &self.corpus, top_k);
        let retrieved: Vec<String> = hits.iter().map(|hit| hit.sentence.clone()).collect();
        let answer = answer_from_context(&retrieved, question, &self.customers);
        (hits, answer)
    }

    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, customer: &str, product: &str, amount: f64) -> TransactionRecord {
        TransactionRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            customer: customer.into(),
            product: product.into(),
            amount,
        }
    }

    fn engine() -> RagEngine {
        RagEngine::new(
            vec![
                record(1, "Amit", "Shirt", 500.0),
                record(5, "Amit", "Shoes", 1200.0),
                record(9, "Riya", "Watch", 2000.0),
            ],
            vec!["Amit".to_string(), "Riya".to_string(), "Karan".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn corpus_matches_record_count() {
        let engine = engine();
        assert_eq!(engine.corpus().len(), engine.records().len());
    }

    #[test]
    fn empty_record_set_fails_construction() {
        let result = RagEngine::new(vec![], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn answer_returns_hits_and_extracted_answer() {
        let mut engine = engine();
        let (hits, answer) = engine.answer("What is Amit's total spending?", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(answer, "Amit spent a total of 1700.");
    }

    #[test]
    fn repeated_questions_give_identical_results() {
        let mut engine = engine();
        let (first_hits, first_answer) = engine.answer("What is Amit's total spending?", 3);
        let (second_hits, second_answer) = engine.answer("What is Amit's total spending?", 3);
        assert_eq!(first_answer, second_answer);
        assert_eq!(
            first_hits.iter().map(|h| (h.index, h.score)).collect::<Vec<_>>(),
            second_hits.iter().map(|h| (h.index, h.score)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn answering_records_the_question() {
        let mut engine = engine();
        engine.answer("first question", 3);
        assert_eq!(engine.memory.last_question.as_deref(), Some("first question"));
        assert_eq!(engine.memory.previous_question, None);

        engine.answer("second question", 3);
        assert_eq!(engine.memory.last_question.as_deref(), Some("second question"));
        assert_eq!(engine.memory.previous_question.as_deref(), Some("first question"));
    }

    #[test]
    fn memory_keeps_only_two_entries() {
        let mut memory = ConversationMemory::default();
        memory.record("one");
        memory.record("two");
        memory.record("three");
        assert_eq!(memory.last_question.as_deref(), Some("three"));
        assert_eq!(memory.previous_question.as_deref(), Some("two"));
    }
}
