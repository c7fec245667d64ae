// Batch Grouper
// Partitions decoded ticks by symbol, preserving arrival order within each group

use std::collections::HashMap;

use common::{RawTick, Symbol, SymbolBatch};
use tracing::{debug, error};

/// Group ticks by symbol. Order inside each [`SymbolBatch`] is the order the
/// ticks were received; the groups themselves carry no ordering.
pub fn group_by_symbol<I>(ticks: I) -> HashMap<Symbol, SymbolBatch>
where
    I: IntoIterator<Item = RawTick>,
{
    let mut groups: HashMap<Symbol, SymbolBatch> = HashMap::new();

    for tick in ticks {
        let batch = groups
            .entry(tick.symbol.clone())
            .or_insert_with(|| SymbolBatch::new(tick.symbol.clone()));

        if let Err(tick) = batch.try_push(tick) {
            error!("Tick for {} routed to the wrong group, dropping it", tick.symbol);
        }
    }

    debug!("Grouped ticks into {} symbol batches", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tick(symbol: &str, price: f64) -> RawTick {
        RawTick::new(
            Symbol::parse(symbol).unwrap(),
            price,
            100.0,
            0.5,
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn empty_input_yields_empty_mapping() {
        let groups = group_by_symbol(Vec::new());
        assert!(groups.is_empty());
    }

    #[test]
    fn preserves_arrival_order_per_symbol() {
        let ticks = vec![
            tick("AAPL", 3.0),
            tick("MSFT", 10.0),
            tick("AAPL", 1.0),
            tick("AAPL", 2.0),
            tick("MSFT", 9.0),
        ];

        let groups = group_by_symbol(ticks);
        assert_eq!(groups.len(), 2);

        let aapl = &groups[&Symbol::parse("AAPL").unwrap()];
        assert_eq!(aapl.prices(), vec![3.0, 1.0, 2.0]);

        let msft = &groups[&Symbol::parse("MSFT").unwrap()];
        assert_eq!(msft.prices(), vec![10.0, 9.0]);
    }

    #[test]
    fn symbols_are_case_normalized_before_grouping() {
        let groups = group_by_symbol(vec![tick("aapl", 1.0), tick("AAPL", 2.0)]);
        assert_eq!(groups.len(), 1);
    }
}
