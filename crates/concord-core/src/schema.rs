use std::sync::Arc;

use arrow::array::{Float64Array, StringArray, TimestampNanosecondArray, UInt64Array};
use arrow::record_batch::RecordBatch;

use crate::error::CoreError;
use crate::model::Annotation;

/// Arrow schema definitions for exporting engine output.
pub mod export {
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

    /// Schema for annotation exports (consensus results, matcher proposals).
    pub fn annotation_schema() -> Schema {
        Schema::new(vec![
            Field::new("unit_key", DataType::Utf8, false),
            Field::new("document_id", DataType::Utf8, false),
            Field::new("category_id", DataType::Utf8, false),
            Field::new("start", DataType::UInt64, false),
            Field::new("end", DataType::UInt64, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("attribution", DataType::Utf8, false),
            Field::new("confidence", DataType::Float64, true),
            Field::new(
                "created_at",
                DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                false,
            ),
        ])
    }
}

/// Convert annotations to a single RecordBatch matching [`export::annotation_schema`].
pub fn annotations_to_batch(annotations: &[Annotation]) -> Result<RecordBatch, CoreError> {
    let keys: Vec<String> = annotations.iter().map(|a| a.unit().key()).collect();
    let attributions: Vec<String> = annotations.iter().map(|a| a.attribution.to_string()).collect();

    let unit_key = StringArray::from_iter_values(keys.iter());
    let document_id = StringArray::from_iter_values(annotations.iter().map(|a| a.document_id.as_str()));
    let category_id = StringArray::from_iter_values(annotations.iter().map(|a| a.category_id.as_str()));
    let start = UInt64Array::from_iter_values(annotations.iter().map(|a| a.start as u64));
    let end = UInt64Array::from_iter_values(annotations.iter().map(|a| a.end as u64));
    let text = StringArray::from_iter_values(annotations.iter().map(|a| a.text.as_str()));
    let attribution = StringArray::from_iter_values(attributions.iter());
    let confidence: Float64Array = annotations.iter().map(|a| a.confidence).collect();
    let created_at = TimestampNanosecondArray::from_iter_values(
        annotations
            .iter()
            .map(|a| a.created_at.timestamp_nanos_opt().unwrap_or_default()),
    )
    .with_timezone("UTC");

    let batch = RecordBatch::try_new(
        Arc::new(export::annotation_schema()),
        vec![
            Arc::new(unit_key),
            Arc::new(document_id),
            Arc::new(category_id),
            Arc::new(start),
            Arc::new(end),
            Arc::new(text),
            Arc::new(attribution),
            Arc::new(confidence),
            Arc::new(created_at),
        ],
    )?;
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribution;
    use arrow::array::Array;

    #[test]
    fn annotation_schema_has_expected_fields() {
        let schema = export::annotation_schema();
        assert_eq!(schema.fields().len(), 9);
        assert!(schema.field_with_name("unit_key").is_ok());
        assert!(schema.field_with_name("confidence").unwrap().is_nullable());
    }

    #[test]
    fn annotations_convert_to_batch() {
        let annotations = vec![
            Annotation::new("doc", "trust", 0, 12, "I trust them", Attribution::human("a"))
                .with_confidence(0.9),
            Annotation::new("doc", "fear", 13, 30, "but I am afraid", Attribution::method("consensus")),
        ];
        let batch = annotations_to_batch(&annotations).unwrap();
        assert_eq!(batch.num_rows(), 2);

        let confidence = batch
            .column_by_name("confidence")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!((confidence.value(0) - 0.9).abs() < 1e-9);
        assert!(confidence.is_null(1));

        let keys = batch
            .column_by_name("unit_key")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(keys.value(1), "doc@0000000013-0000000030");
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = annotations_to_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 9);
    }
}
