//! Terminal rendering: vertical cards for results, Arrow tables for rows.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use arrow::util::pretty::pretty_format_batches;

use concord_agreement::{AgreementResult, PairwiseKappa};
use concord_consensus::ConsensusResult;
use concord_match::SegmentMatch;

const MAX_LIST_ITEMS: usize = 10;
const MAX_TEXT_CHARS: usize = 60;

// ── Cards ──

pub fn print_agreement_card(result: &AgreementResult) {
    println!("=== {} ===", result.metric);
    println!("{:.4} ({})", result.value, result.interpretation);
    println!();

    let d = &result.detail;
    println!("Detail");
    println!("  {:<26} {}", "raters", d.raters);
    println!("  {:<26} {}", "units", d.units);
    println!("  {:<26} {}", "categories", d.categories);
    println!("  {:<26} {:.4}", "observed_agreement", d.observed_agreement);
    if let Some(expected) = d.expected_agreement {
        println!("  {:<26} {:.4}", "expected_agreement", expected);
    }
    if d.weighted {
        println!("  {:<26} yes", "weighted");
    }
    if let Some(dis) = &d.disagreement {
        println!("  {:<26} {:.4}", "observed_disagreement", dis.observed);
        println!("  {:<26} {:.4}", "expected_disagreement", dis.expected);
    }
    println!();

    if !d.category_kappas.is_empty() {
        println!("Per-category kappa");
        for (category, kappa) in &d.category_kappas {
            println!("  {:<26} {:.4}", category, kappa);
        }
        println!();
    }
}

pub fn print_pairwise_card(pairwise: &PairwiseKappa) {
    println!("Pairwise Cohen's kappa ({} pairs)", pairwise.pairs.len());
    for pair in &pairwise.pairs {
        println!(
            "  {:<26} {:.4}  ({} units)",
            format!("{} / {}", pair.rater_a, pair.rater_b),
            pair.kappa,
            pair.units
        );
    }
    println!("  {:<26} {:.4}", "mean", pairwise.mean);
    println!();
}

pub fn print_match_cards(matches: &[SegmentMatch], min_confidence: f64) {
    for m in matches {
        println!(
            "[{}] {}..{}  {}",
            m.segment.index,
            m.segment.start,
            m.segment.end,
            m.status(min_confidence).as_str()
        );
        println!("  {}", truncate(&m.segment.text, MAX_TEXT_CHARS));
        for c in m.candidates.iter().take(MAX_LIST_ITEMS) {
            println!("    {:<30} {:.4}", c.category_name, c.similarity);
        }
        println!();
    }
}

pub fn print_consensus_card(result: &ConsensusResult) {
    println!("=== Consensus ===");
    println!(
        "{} of {} claims agreed by at least {} of {} passes ({:.1}%)",
        result.annotations.len(),
        result.total_claims,
        result.required_passes,
        result.passes,
        result.consensus_rate * 100.0
    );
    println!();

    if !result.annotations.is_empty() {
        println!("Annotations ({}):", result.annotations.len());
        for a in result.annotations.iter().take(MAX_LIST_ITEMS) {
            print!("  {:<20} {}..{}", a.category_id, a.start, a.end);
            if let Some(c) = a.confidence {
                print!("  ({:.3})", c);
            }
            println!();
            println!("    {}", truncate(&a.text, MAX_TEXT_CHARS));
        }
        if result.annotations.len() > MAX_LIST_ITEMS {
            println!("  ... and {} more", result.annotations.len() - MAX_LIST_ITEMS);
        }
        println!();
    }

    if !result.categories.is_empty() {
        println!("Taxonomy ({}):", result.categories.len());
        for c in &result.categories {
            println!("  {:<20} {}", c.id, c.name);
        }
        println!();
    }
}

/// Print every row of a batch as a vertical card, one line per non-null column.
pub fn print_row_cards(batch: &RecordBatch) -> anyhow::Result<()> {
    let options = FormatOptions::default();
    let formatters = batch
        .columns()
        .iter()
        .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;
    let schema = batch.schema();

    for row in 0..batch.num_rows() {
        println!("--- row {} ---", row + 1);
        for (idx, field) in schema.fields().iter().enumerate() {
            if batch.column(idx).is_null(row) {
                continue;
            }
            let value = formatters[idx].value(row).to_string();
            match field.data_type() {
                DataType::Utf8 => println!("  {:<26} {}", field.name(), truncate(&value, MAX_TEXT_CHARS)),
                _ => println!("  {:<26} {}", field.name(), value),
            }
        }
    }
    println!();
    Ok(())
}

pub fn print_table(batch: &RecordBatch) -> anyhow::Result<()> {
    println!("{}", pretty_format_batches(std::slice::from_ref(batch))?);
    Ok(())
}

// ── Row batches ──

pub fn pairwise_to_batch(pairwise: &PairwiseKappa) -> anyhow::Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("rater_a", DataType::Utf8, false),
        Field::new("rater_b", DataType::Utf8, false),
        Field::new("kappa", DataType::Float64, false),
        Field::new("units", DataType::UInt64, false),
    ]));
    let p = &pairwise.pairs;
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(p.iter().map(|x| x.rater_a.as_str()))),
        Arc::new(StringArray::from_iter_values(p.iter().map(|x| x.rater_b.as_str()))),
        Arc::new(Float64Array::from_iter_values(p.iter().map(|x| x.kappa))),
        Arc::new(UInt64Array::from_iter_values(p.iter().map(|x| x.units as u64))),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

/// One row per (segment, candidate); segments without candidates get a null category.
pub fn matches_to_batch(matches: &[SegmentMatch], min_confidence: f64) -> anyhow::Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("segment", DataType::UInt64, false),
        Field::new("start", DataType::UInt64, false),
        Field::new("end", DataType::UInt64, false),
        Field::new("status", DataType::Utf8, false),
        Field::new("category_id", DataType::Utf8, true),
        Field::new("similarity", DataType::Float64, true),
    ]));

    let mut segment = Vec::new();
    let mut start = Vec::new();
    let mut end = Vec::new();
    let mut status = Vec::new();
    let mut category: Vec<Option<&str>> = Vec::new();
    let mut similarity: Vec<Option<f64>> = Vec::new();
    for m in matches {
        let s = m.status(min_confidence).as_str();
        let rows: Vec<(Option<&str>, Option<f64>)> = if m.candidates.is_empty() {
            vec![(None, None)]
        } else {
            m.candidates
                .iter()
                .map(|c| (Some(c.category_id.as_str()), Some(c.similarity)))
                .collect()
        };
        for (cat, sim) in rows {
            segment.push(m.segment.index as u64);
            start.push(m.segment.start as u64);
            end.push(m.segment.end as u64);
            status.push(s);
            category.push(cat);
            similarity.push(sim);
        }
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(segment)),
        Arc::new(UInt64Array::from(start)),
        Arc::new(UInt64Array::from(end)),
        Arc::new(StringArray::from(status)),
        Arc::new(StringArray::from(category)),
        Arc::new(Float64Array::from(similarity)),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

// ── Helpers ──

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_agreement::{AgreementOptions, pairwise_cohen};
    use concord_core::{Annotation, Attribution, Category, Document, RaterRecord};
    use concord_match::{MatcherOptions, match_patterns};

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("équipe très motivée", 10), "équipe ...");
        assert_eq!(truncate("équipe très motivée", 10).chars().count(), 10);
    }

    #[test]
    fn pairwise_batch_has_one_row_per_pair() {
        let rec = |rater: &str, cat: &str| {
            RaterRecord::new(
                rater,
                vec![Annotation::new("d", cat, 0, 5, "hello", Attribution::human(rater))],
            )
        };
        let records = vec![rec("ana", "x"), rec("ben", "x"), rec("cy", "y")];
        let pairwise = pairwise_cohen(&records, &AgreementOptions::default()).unwrap();
        let batch = pairwise_to_batch(&pairwise).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 4);
    }

    #[test]
    fn match_batch_keeps_segments_without_candidates() {
        let doc = Document::new(
            "d",
            "The salary keeps me in this job.\n\nWe moved offices twice last spring.",
        );
        let cats = vec![Category::new("money", "Salary").with_description("pay money")];
        let matches = match_patterns(&doc, &cats, &MatcherOptions::default());
        let batch = matches_to_batch(&matches, 0.3).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert!(batch.column(4).is_null(1));
        assert!(!batch.column(4).is_null(0));
    }

    #[test]
    fn row_cards_render_annotation_batch() {
        let ann = Annotation::new("d", "money", 0, 12, "salary talk", Attribution::method("consensus"))
            .with_confidence(0.667);
        let batch = concord_core::annotations_to_batch(&[ann]).unwrap();
        assert!(print_row_cards(&batch).is_ok());
    }
}
