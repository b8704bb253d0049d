//! Benchmark fixtures for brokerkit.
//!
//! Builds synthetic upstream payloads shaped like real market-data
//! responses so the normalizer can be measured without a network.

use serde_json::{Map, Value, json};

/// A raw bar with the prices encoded the way `index` selects: even indices
/// carry JSON numbers, odd ones numeric strings.
pub fn bar_item(index: usize) -> Map<String, Value> {
    let base = 100.0 + (index % 500) as f64 * 0.25;
    let value = if index % 2 == 0 {
        json!({
            "t": format!("2024-01-02T{:02}:{:02}:00Z", (index / 60) % 24, index % 60),
            "o": base,
            "h": base + 1.5,
            "l": base - 1.25,
            "c": base + 0.5,
            "v": 1_000 + index,
            "n": 42,
            "vw": base + 0.1
        })
    } else {
        json!({
            "t": format!("2024-01-02T{:02}:{:02}:00Z", (index / 60) % 24, index % 60),
            "o": base.to_string(),
            "h": (base + 1.5).to_string(),
            "l": (base - 1.25).to_string(),
            "c": (base + 0.5).to_string(),
            "v": (1_000 + index).to_string()
        })
    };
    into_object(value)
}

/// `count` bars for one symbol.
pub fn bar_items(count: usize) -> Vec<Map<String, Value>> {
    (0..count).map(bar_item).collect()
}

/// A raw snapshot with every nested child present.
pub fn snapshot_item() -> Map<String, Value> {
    into_object(json!({
        "latestTrade": {"t": "2024-06-14T15:59:59Z", "p": 212.49, "s": 100, "x": "V", "i": 52983525029461_i64},
        "latestQuote": {"t": "2024-06-14T15:59:59Z", "bp": 212.48, "bs": 3, "ap": 212.50, "as": 2},
        "minuteBar": {"t": "2024-06-14T15:59:00Z", "o": 212.3, "h": 212.6, "l": 212.2, "c": 212.49, "v": 152_400},
        "dailyBar": {"t": "2024-06-14T04:00:00Z", "o": 213.85, "h": 215.17, "l": 211.3, "c": 212.49, "v": 70_122_748},
        "prevDailyBar": {"t": "2024-06-13T04:00:00Z", "o": 214.74, "h": 216.75, "l": 211.6, "c": 214.24, "v": 97_862_729}
    }))
}

/// Timeframe inputs covering every accepted spelling family.
pub const TIMEFRAME_INPUTS: &[&str] =
    &["1Min", "5min", "15 minutes", "1h", "4Hour", "Day", "1d", "1Week", "1M", "3Months"];

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerkit_lib::{BarRecord, SnapshotRecord, TimeframeSpec, normalize_keyed_as};

    #[test]
    fn test_fixtures_normalize() {
        for item in bar_items(4) {
            let bar: BarRecord = normalize_keyed_as("AAPL", &item).unwrap();
            assert_eq!(bar.symbol, "AAPL");
        }
        let snapshot: SnapshotRecord = normalize_keyed_as("AAPL", &snapshot_item()).unwrap();
        assert!(snapshot.prev_daily_bar.is_some());
    }

    #[test]
    fn test_timeframe_inputs_parse() {
        for input in TIMEFRAME_INPUTS {
            assert!(TimeframeSpec::parse(input).is_ok(), "{input}");
        }
    }
}
