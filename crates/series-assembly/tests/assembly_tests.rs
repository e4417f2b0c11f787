//! Series assembly across dataset types.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use series_assembly::{
    DatasetDescriptor, DatasetTypeRegistry, MeasurementAssembler, NoDataValues, RecordAssembler,
    SeriesAssembler, TextAssembler,
};
use series_protocol::{Geometry, Observation, Payload, ValueTime};
use test_utils::{
    day_start, hour, hourly_intervals, hourly_series, moving_track, query_for_day, text_series,
    InMemoryStore,
};

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Rounding
// ============================================================================

#[test]
fn test_half_up_rounding_from_decimal_text() {
    let descriptor = DatasetDescriptor::new("temp").with_decimals(2);
    let store = InMemoryStore::new()
        .with_observations("temp", vec![Observation::at(hour(1), Payload::numeric("1.005"))]);

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value.as_ref().unwrap().as_decimal(), Some(decimal("1.01")));
}

#[test]
fn test_rounding_from_json_number() {
    let descriptor = DatasetDescriptor::new("temp").with_decimals(2);
    let payload = Payload::from_json(&serde_json::json!(2.675)).unwrap();

    let rounded = MeasurementAssembler.format_payload(&payload, &descriptor);
    assert_eq!(rounded.as_decimal(), Some(decimal("2.68")));
}

#[test]
fn test_rounding_is_numeric_only() {
    let text = DatasetDescriptor::new("notes").with_type("text").with_decimals(0);
    let store = InMemoryStore::new().with_observations("notes", text_series(day_start(), &["12.75"]));

    let values = TextAssembler.assemble(&text, &query_for_day(&[]), &store).unwrap();
    assert_eq!(values[0].value, Some(Payload::text("12.75")));
}

// ============================================================================
// No-data masking
// ============================================================================

#[test]
fn test_no_data_yields_null_with_timestamp() {
    let descriptor = DatasetDescriptor::new("temp").with_decimals(1);
    let store = InMemoryStore::new().with_observations(
        "temp",
        vec![
            Observation::at(hour(1), Payload::numeric("-9999")),
            Observation::at(hour(2), Payload::numeric("0")),
        ],
    );

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    assert!(values[0].value.is_none());
    assert_eq!(values[0].timestamp(), hour(1));
    assert_eq!(values[1].value.as_ref().unwrap().as_decimal(), Some(Decimal::ZERO));
}

#[test]
fn test_service_specific_sentinel() {
    let descriptor = DatasetDescriptor::new("level")
        .with_no_data(Arc::new(NoDataValues::new(["-1"])));
    let store = InMemoryStore::new().with_observations(
        "level",
        vec![
            Observation::at(hour(1), Payload::numeric("-1.0")),
            Observation::at(hour(2), Payload::numeric("-9999")),
        ],
    );

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    assert!(values[0].value.is_none());
    assert!(values[1].value.is_some());
}

#[test]
fn test_no_data_serializes_as_null() {
    let descriptor = DatasetDescriptor::new("temp");
    let observation = Observation::at(hour(3), Payload::numeric("NaN").or(Some(Payload::text("NaN"))));

    let value = MeasurementAssembler.create_value(&observation, &descriptor, &query_for_day(&[]));
    let json = serde_json::to_value(&value).unwrap();

    assert!(json["value"].is_null());
    assert_eq!(json["timestamp"], hour(3).timestamp_millis());
}

// ============================================================================
// Time shape, gaps and ordering
// ============================================================================

#[test]
fn test_instants_use_end_time() {
    let descriptor = DatasetDescriptor::new("rain");
    let store = InMemoryStore::new().with_observations("rain", hourly_intervals(day_start(), &["0.1", "0.4"]));

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    assert_eq!(values[0].time, ValueTime::Instant { timestamp: hour(1) });
    assert_eq!(values[1].time, ValueTime::Instant { timestamp: hour(2) });
}

#[test]
fn test_show_time_intervals_emits_start_and_end() {
    let descriptor = DatasetDescriptor::new("rain");
    let store = InMemoryStore::new().with_observations("rain", hourly_intervals(day_start(), &["0.1"]));

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[("showTimeIntervals", "true")]), &store)
        .unwrap();

    let json = serde_json::to_value(&values[0]).unwrap();
    assert_eq!(json["timestart"], hour(0).timestamp_millis());
    assert_eq!(json["timeend"], hour(1).timestamp_millis());
    assert!(json.get("timestamp").is_none());
}

#[test]
fn test_gaps_are_skipped_and_order_kept() {
    let descriptor = DatasetDescriptor::new("temp");
    let mut series: Vec<Option<Observation>> =
        hourly_series(day_start(), 3, "5", "1").into_iter().map(Some).collect();
    series.insert(1, None);
    let store = InMemoryStore::new().with_gaps("temp", series);

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    let stamps: Vec<_> = values.iter().map(|v| v.timestamp()).collect();
    assert_eq!(stamps, vec![hour(0), hour(1), hour(2)]);
}

// ============================================================================
// Enrichment
// ============================================================================

#[test]
fn test_expanded_attaches_everything() {
    let descriptor = DatasetDescriptor::new("temp");
    let observation = Observation::at(hour(2), Payload::numeric("4"))
        .with_geometry(Geometry::point(7.6, 51.9))
        .with_valid_time(hour(2), hour(8))
        .with_parameter("sensor", "pt100");
    let store = InMemoryStore::new().with_observations("temp", vec![observation]);

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[("expanded", "true")]), &store)
        .unwrap();
    let json = serde_json::to_value(&values[0]).unwrap();

    assert_eq!(json["geometry"]["type"], "Point");
    assert_eq!(json["validTime"]["end"], hour(8).timestamp_millis());
    assert_eq!(json["parameters"]["sensor"], "pt100");
}

#[test]
fn test_condensed_stationary_has_no_enrichment() {
    let descriptor = DatasetDescriptor::new("temp");
    let observation = Observation::at(hour(2), Payload::numeric("4"))
        .with_geometry(Geometry::point(7.6, 51.9))
        .with_parameter("sensor", "pt100");
    let store = InMemoryStore::new().with_observations("temp", vec![observation]);

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    assert!(values[0].geometry.is_none());
    assert!(values[0].parameters.is_empty());
}

#[test]
fn test_condensed_mobile_keeps_track_positions() {
    let descriptor = DatasetDescriptor::new("ship").with_mobile(true);
    let store = InMemoryStore::new().with_observations("ship", moving_track(day_start(), 3, 7.0, 54.0));

    let values = MeasurementAssembler
        .assemble(&descriptor, &query_for_day(&[]), &store)
        .unwrap();

    assert!(values.iter().all(|v| v.geometry.is_some()));
    assert!(values.iter().all(|v| v.valid_time.is_none()));
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_record_values_pass_through() {
    let descriptor = DatasetDescriptor::new("wind").with_type("record");
    let payload = Payload::from_json(&serde_json::json!({"speed": 3.333, "direction": "NW"}));
    let store = InMemoryStore::new()
        .with_observations("wind", vec![Observation::at(hour(1), payload.clone())]);

    let values = RecordAssembler.assemble(&descriptor, &query_for_day(&[]), &store).unwrap();
    let json = serde_json::to_value(&values[0]).unwrap();

    assert_eq!(values[0].value, payload);
    assert_eq!(json["value"]["direction"], "NW");
}

#[test]
fn test_registry_dispatch_matches_descriptor_type() {
    let registry = DatasetTypeRegistry::default();
    for (tag, entity) in [
        ("measurement", "QuantityObservation"),
        ("text", "TextObservation"),
        ("record", "RecordObservation"),
    ] {
        let descriptor = DatasetDescriptor::new("x").with_type(tag);
        let assembler = registry.resolve(&descriptor.dataset_type).unwrap();
        assert_eq!(assembler.entity_type(), entity);
    }
}
