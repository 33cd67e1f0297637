//! Strategy-keyed store of evaluation records.
//!
//! The accumulator is append-only: entries are found or created by
//! strategy, records are pushed in execution order and never edited.
//! It is owned by the benchmark loop and handed to the renderer by
//! reference, so `&mut self` on [`ResultsAccumulator::record`] is the only
//! write path. A parallel runner would have to funnel every `record` call
//! through one writer (a `Mutex` or a channel), since the find-or-create
//! step is not atomic.

use super::record::{EvaluationRecord, Grade};
use super::strategy::StrategyId;
use crate::error::{BenchError, Result};
use serde::Serialize;

/// All records for one strategy, in append order.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsEntry {
    strategy: StrategyId,
    records: Vec<EvaluationRecord>,
}

impl ResultsEntry {
    pub fn strategy(&self) -> StrategyId {
        self.strategy
    }

    /// Never empty.
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    /// Aggregate timing, cost and correctness for this strategy.
    pub fn summary(&self) -> StrategySummary {
        let count = self.records.len();
        let avg_latency_ms =
            self.records.iter().map(|r| r.latency_ms).sum::<f64>() / count.max(1) as f64;

        let reported: Vec<u64> = self
            .records
            .iter()
            .map(|r| r.tokens_used)
            .filter(|&t| t > 0)
            .collect();
        let avg_tokens = if reported.is_empty() {
            None
        } else {
            Some(reported.iter().sum::<u64>() as f64 / reported.len() as f64)
        };

        let correct = self
            .records
            .iter()
            .filter(|r| r.grade == Grade::Correct)
            .count();
        let graded = self.records.iter().filter(|r| r.grade.is_graded()).count();
        let correct_pct = (graded > 0).then(|| correct as f64 / graded as f64 * 100.0);

        StrategySummary {
            strategy: self.strategy,
            records: count,
            avg_latency_ms,
            avg_tokens,
            graded,
            correct,
            correct_pct,
        }
    }
}

/// Per-strategy aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySummary {
    pub strategy: StrategyId,
    pub records: usize,
    pub avg_latency_ms: f64,
    /// Mean over records that reported usage.
    pub avg_tokens: Option<f64>,
    pub graded: usize,
    pub correct: usize,
    /// Share of graded records judged correct.
    pub correct_pct: Option<f64>,
}

/// Append-only results for one benchmarking run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsAccumulator {
    entries: Vec<ResultsEntry>,
}

impl ResultsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `evaluation` under `strategy`, creating the entry on first use.
    ///
    /// Sequence numbers must strictly increase within a strategy.
    pub fn record(&mut self, strategy: StrategyId, evaluation: EvaluationRecord) -> Result<()> {
        match self.entries.iter_mut().find(|e| e.strategy == strategy) {
            Some(entry) => {
                // Entries are created with one record, so `last` always exists.
                if let Some(last) = entry.records.last() {
                    if evaluation.sequence_number <= last.sequence_number {
                        return Err(BenchError::SequenceOrder {
                            strategy: strategy.to_string(),
                            last: last.sequence_number,
                            got: evaluation.sequence_number,
                        });
                    }
                }
                entry.records.push(evaluation);
            }
            None => self.entries.push(ResultsEntry {
                strategy,
                records: vec![evaluation],
            }),
        }
        Ok(())
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[ResultsEntry] {
        &self.entries
    }

    pub fn get(&self, strategy: StrategyId) -> Option<&ResultsEntry> {
        self.entries.iter().find(|e| e.strategy == strategy)
    }

    /// Number of distinct strategies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records across all strategies.
    pub fn total_records(&self) -> usize {
        self.entries.iter().map(|e| e.records.len()).sum()
    }

    pub fn summaries(&self) -> Vec<StrategySummary> {
        self.entries.iter().map(ResultsEntry::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(seq: u32, grade: Grade, latency_ms: f64, tokens_used: u64) -> EvaluationRecord {
        EvaluationRecord {
            sequence_number: seq,
            query: format!("q{}", seq),
            predicted_answer: format!("p{}", seq),
            reference_answer: format!("a{}", seq),
            grade,
            latency_ms,
            tokens_used,
        }
    }

    #[test]
    fn test_same_key_appends_to_one_entry() {
        let mut acc = ResultsAccumulator::new();
        acc.record(StrategyId::Stuff, rec(0, Grade::Correct, 1.0, 10))
            .unwrap();
        acc.record(StrategyId::Stuff, rec(1, Grade::Incorrect, 2.0, 20))
            .unwrap();

        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get(StrategyId::Stuff).unwrap().records().len(), 2);
    }

    #[test]
    fn test_interleaved_keys_stay_unique() {
        let mut acc = ResultsAccumulator::new();
        let order = [
            StrategyId::Refine,
            StrategyId::Stuff,
            StrategyId::Refine,
            StrategyId::MapRerank,
            StrategyId::Stuff,
            StrategyId::Refine,
        ];
        for (i, s) in order.into_iter().enumerate() {
            acc.record(s, rec(i as u32, Grade::Ungraded, 0.0, 0)).unwrap();
        }

        assert_eq!(acc.len(), 3);
        assert_eq!(acc.total_records(), order.len());
        let keys: Vec<_> = acc.entries().iter().map(|e| e.strategy()).collect();
        assert_eq!(
            keys,
            vec![StrategyId::Refine, StrategyId::Stuff, StrategyId::MapRerank]
        );

        for entry in acc.entries() {
            assert!(!entry.records().is_empty());
            let seqs: Vec<u32> = entry.records().iter().map(|r| r.sequence_number).collect();
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }
        let refine: Vec<u32> = acc
            .get(StrategyId::Refine)
            .unwrap()
            .records()
            .iter()
            .map(|r| r.sequence_number)
            .collect();
        assert_eq!(refine, vec![0, 2, 5]);
    }

    #[test]
    fn test_rejects_non_increasing_sequence() {
        let mut acc = ResultsAccumulator::new();
        acc.record(StrategyId::Stuff, rec(3, Grade::Correct, 1.0, 1))
            .unwrap();

        let err = acc
            .record(StrategyId::Stuff, rec(3, Grade::Correct, 1.0, 1))
            .unwrap_err();
        assert!(matches!(err, BenchError::SequenceOrder { last: 3, got: 3, .. }));

        // Other strategies keep their own sequence.
        acc.record(StrategyId::Refine, rec(0, Grade::Correct, 1.0, 1))
            .unwrap();
        assert_eq!(acc.total_records(), 2);
    }

    #[test]
    fn test_summary() {
        let mut acc = ResultsAccumulator::new();
        acc.record(StrategyId::MapReduce, rec(0, Grade::Correct, 100.0, 30))
            .unwrap();
        acc.record(StrategyId::MapReduce, rec(1, Grade::Incorrect, 200.0, 0))
            .unwrap();
        acc.record(StrategyId::MapReduce, rec(2, Grade::Ungraded, 300.0, 50))
            .unwrap();

        let summary = acc.get(StrategyId::MapReduce).unwrap().summary();
        assert_eq!(summary.records, 3);
        assert!((summary.avg_latency_ms - 200.0).abs() < 1e-9);
        assert_eq!(summary.avg_tokens, Some(40.0));
        assert_eq!(summary.graded, 2);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.correct_pct, Some(50.0));
    }

    #[test]
    fn test_summary_without_grades_or_usage() {
        let mut acc = ResultsAccumulator::new();
        acc.record(StrategyId::Stuff, rec(0, Grade::Ungraded, 5.0, 0))
            .unwrap();
        let summary = &acc.summaries()[0];
        assert!(summary.avg_tokens.is_none());
        assert!(summary.correct_pct.is_none());
    }
}
