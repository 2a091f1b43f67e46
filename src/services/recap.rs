// src/services/recap.rs
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::order::Order;
use crate::models::product::{Producer, Product, UNKNOWN_NAME};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapLine {
    pub product_name: String,
    pub unit: String,
    pub quantity: f64,
}

fn in_window(order: &Order, week_start: NaiveDate, week_end: NaiveDate) -> bool {
    // Date-only comparison, inclusive on both ends.
    let day = order.order_date.date_naive();
    day >= week_start && day <= week_end
}

fn product_name(products: &HashMap<i64, Product>, product_id: i64) -> String {
    products
        .get(&product_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

fn sort_lines(lines: &mut [RecapLine]) {
    lines.sort_by(|a, b| {
        a.product_name
            .to_lowercase()
            .cmp(&b.product_name.to_lowercase())
            .then_with(|| a.unit.cmp(&b.unit))
    });
}

fn collect_lines(totals: HashMap<(String, String), f64>) -> Vec<RecapLine> {
    let mut lines: Vec<RecapLine> = totals
        .into_iter()
        .map(|((product_name, unit), quantity)| RecapLine {
            product_name,
            unit,
            quantity,
        })
        .collect();
    sort_lines(&mut lines);
    lines
}

/// Sums ordered quantities per (product, unit) over the orders whose
/// date falls inside `[week_start, week_end]`.
pub fn aggregate_by_product_unit(
    orders: &[Order],
    products: &HashMap<i64, Product>,
    week_start: NaiveDate,
    week_end: NaiveDate,
) -> Vec<RecapLine> {
    let mut totals: HashMap<(String, String), f64> = HashMap::new();
    for order in orders.iter().filter(|o| in_window(o, week_start, week_end)) {
        for item in &order.items {
            let key = (product_name(products, item.product_id), item.unit.clone());
            *totals.entry(key).or_insert(0.0) += item.quantity;
        }
    }
    collect_lines(totals)
}

/// Same window and sums, grouped by producer first. Products without a
/// resolvable producer land under "Inconnu". Outer keys come back
/// sorted (BTreeMap), inner lines sorted by product name.
pub fn aggregate_by_producer(
    orders: &[Order],
    products: &HashMap<i64, Product>,
    producers: &HashMap<i64, Producer>,
    week_start: NaiveDate,
    week_end: NaiveDate,
) -> BTreeMap<String, Vec<RecapLine>> {
    let mut grouped: BTreeMap<String, HashMap<(String, String), f64>> = BTreeMap::new();

    for order in orders.iter().filter(|o| in_window(o, week_start, week_end)) {
        for item in &order.items {
            let producer = products
                .get(&item.product_id)
                .and_then(|p| p.producer_id)
                .and_then(|id| producers.get(&id))
                .map(|p| p.name.clone())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string());

            let key = (product_name(products, item.product_id), item.unit.clone());
            *grouped.entry(producer).or_default().entry(key).or_insert(0.0) += item.quantity;
        }
    }

    grouped
        .into_iter()
        .map(|(producer, totals)| (producer, collect_lines(totals)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderItem, OrderStatus};
    use crate::models::product::Unit;
    use chrono::{TimeZone, Utc};

    fn week_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 28).unwrap()
    }

    fn week_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 3).unwrap()
    }

    fn product(id: i64, name: &str, producer_id: Option<i64>) -> Product {
        Product {
            id,
            name: name.to_string(),
            unit: Unit::Kg,
            category_id: 1,
            producer_id,
            is_active: true,
        }
    }

    fn producer(id: i64, name: &str) -> Producer {
        Producer {
            id,
            name: name.to_string(),
        }
    }

    fn order(id: i64, day: u32, items: Vec<OrderItem>) -> Order {
        Order {
            id,
            customer_id: Some(1),
            client_id: None,
            order_date: Utc.with_ymd_and_hms(2025, 7, day, 15, 30, 0).unwrap(),
            status: OrderStatus::Pending,
            total_amount: 0.0,
            items,
        }
    }

    fn item(product_id: i64, quantity: f64) -> OrderItem {
        OrderItem {
            id: 0,
            order_id: 0,
            product_id,
            quantity,
            unit_price: 1.0,
            unit: "KG".to_string(),
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn same_product_and_unit_merge_across_orders() {
        let products = catalog(vec![product(1, "Pomme", None)]);
        let orders = vec![
            order(1, 29, vec![item(1, 3.0)]),
            order(2, 30, vec![item(1, 2.0)]),
        ];

        let lines = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Pomme");
        assert_eq!(lines[0].unit, "KG");
        assert_eq!(lines[0].quantity, 5.0);
    }

    #[test]
    fn orders_one_day_outside_the_window_are_excluded() {
        let products = catalog(vec![product(1, "Pomme", None)]);
        let orders = vec![
            order(1, 27, vec![item(1, 3.0)]), // Sunday before
            order(2, 28, vec![item(1, 2.0)]), // Monday, included
        ];

        let lines = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2.0);

        // One day past the end is out too.
        let late = vec![Order {
            order_date: Utc.with_ymd_and_hms(2025, 8, 4, 0, 0, 0).unwrap(),
            ..order(3, 29, vec![item(1, 9.0)])
        }];
        assert!(aggregate_by_product_unit(&late, &products, week_start(), week_end()).is_empty());
    }

    #[test]
    fn time_of_day_does_not_affect_the_window() {
        let products = catalog(vec![product(1, "Pomme", None)]);
        // 23:59 on the last day still counts.
        let orders = vec![Order {
            order_date: Utc.with_ymd_and_hms(2025, 8, 3, 23, 59, 0).unwrap(),
            ..order(1, 28, vec![item(1, 1.0)])
        }];
        let lines = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn lines_sort_case_insensitively_by_product_name() {
        let products = catalog(vec![
            product(1, "poire", None),
            product(2, "Abricot", None),
            product(3, "Cerise", None),
        ]);
        let orders = vec![order(1, 29, vec![item(1, 1.0), item(2, 1.0), item(3, 1.0)])];

        let lines = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        let names: Vec<&str> = lines.iter().map(|l| l.product_name.as_str()).collect();
        assert_eq!(names, vec!["Abricot", "Cerise", "poire"]);
    }

    #[test]
    fn unknown_product_renders_as_inconnu() {
        let products = catalog(vec![]);
        let orders = vec![order(1, 29, vec![item(77, 2.0)])];

        let lines = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, UNKNOWN_NAME);
    }

    #[test]
    fn producer_grouping_keys_and_falls_back_to_inconnu() {
        let products = catalog(vec![
            product(1, "Pomme", Some(10)),
            product(2, "Poire", Some(10)),
            product(3, "Lait", None),
        ]);
        let producers: HashMap<i64, Producer> =
            [(10, producer(10, "Ferme du Val"))].into_iter().collect();

        let orders = vec![order(1, 29, vec![item(1, 2.0), item(2, 1.0), item(3, 4.0)])];
        let grouped = aggregate_by_producer(&orders, &products, &producers, week_start(), week_end());

        let keys: Vec<&str> = grouped.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Ferme du Val", UNKNOWN_NAME]);

        let farm = &grouped["Ferme du Val"];
        assert_eq!(farm.len(), 2);
        assert_eq!(farm[0].product_name, "Poire");
        assert_eq!(farm[1].product_name, "Pomme");

        assert_eq!(grouped[UNKNOWN_NAME][0].product_name, "Lait");
        assert_eq!(grouped[UNKNOWN_NAME][0].quantity, 4.0);
    }

    #[test]
    fn aggregation_is_idempotent_over_the_same_input() {
        let products = catalog(vec![product(1, "Pomme", None)]);
        let orders = vec![order(1, 29, vec![item(1, 3.0)])];

        let first = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        let second = aggregate_by_product_unit(&orders, &products, week_start(), week_end());
        assert_eq!(first, second);
    }
}
