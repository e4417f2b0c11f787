//! Free-text series.

use series_protocol::Payload;

use crate::assembler::SeriesAssembler;
use crate::descriptor::DatasetDescriptor;

/// Assembles text series; payloads pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAssembler;

impl SeriesAssembler for TextAssembler {
    fn dataset_type(&self) -> &'static str {
        "text"
    }

    fn entity_type(&self) -> &'static str {
        "TextObservation"
    }

    fn format_payload(&self, payload: &Payload, _descriptor: &DatasetDescriptor) -> Payload {
        payload.clone()
    }
}
