//! Composite ("record") series whose values are key/value maps.

use series_protocol::Payload;

use crate::assembler::SeriesAssembler;
use crate::descriptor::DatasetDescriptor;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAssembler;

impl SeriesAssembler for RecordAssembler {
    fn dataset_type(&self) -> &'static str {
        "record"
    }

    fn entity_type(&self) -> &'static str {
        "RecordObservation"
    }

    fn format_payload(&self, payload: &Payload, _descriptor: &DatasetDescriptor) -> Payload {
        payload.clone()
    }
}
