//! Numeric ("measurement") series.

use rust_decimal::RoundingStrategy;

use series_protocol::Payload;

use crate::assembler::SeriesAssembler;
use crate::descriptor::DatasetDescriptor;

/// Assembles numeric series, rounding half away from zero when the dataset
/// configures a number of decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementAssembler;

impl SeriesAssembler for MeasurementAssembler {
    fn dataset_type(&self) -> &'static str {
        "measurement"
    }

    fn entity_type(&self) -> &'static str {
        "QuantityObservation"
    }

    fn format_payload(&self, payload: &Payload, descriptor: &DatasetDescriptor) -> Payload {
        match (payload, descriptor.number_of_decimals) {
            (Payload::Numeric(n), Some(decimals)) => Payload::Numeric(
                n.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero),
            ),
            _ => payload.clone(),
        }
    }
}
