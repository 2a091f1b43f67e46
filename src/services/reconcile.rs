// src/services/reconcile.rs
use std::collections::HashSet;

use crate::error::AppError;
use crate::models::order::{Order, OrderItemRef};

/// One row of the order edit grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedItem {
    pub item_ref: OrderItemRef,
    pub product_id: i64,
    pub quantity: f64,
    pub unit_price: f64,
    pub unit: String,
}

impl EditedItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Disjoint create/update/delete sets that bring the store's order
/// items in line with the edited copy, plus the recomputed order
/// total. Transient, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    pub to_create: Vec<EditedItem>,
    pub to_update: Vec<EditedItem>,
    pub to_delete: Vec<i64>,
    pub total_amount: f64,
}

/// One order's in-flight edits. Deletions are tracked the moment a row
/// is removed, not recomputed at save time, so re-adding the same
/// product later stays a separate create.
#[derive(Debug, Clone)]
pub struct OrderEditSession {
    order_id: i64,
    items: Vec<EditedItem>,
    pending_deletes: HashSet<i64>,
    next_temp_key: u64,
}

impl OrderEditSession {
    pub fn from_order(order: &Order) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| EditedItem {
                item_ref: OrderItemRef::Existing { id: item.id },
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                unit: item.unit.clone(),
            })
            .collect();

        Self {
            order_id: order.id,
            items,
            pending_deletes: HashSet::new(),
            next_temp_key: 0,
        }
    }

    /// Rebuilds a session from rows a client already edited plus the
    /// deletions it tracked while editing. Non-positive ids in
    /// `deleted_ids` are placeholder noise and are dropped here.
    pub fn from_parts(
        order_id: i64,
        items: Vec<EditedItem>,
        deleted_ids: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            order_id,
            items,
            pending_deletes: deleted_ids.into_iter().filter(|id| *id > 0).collect(),
            next_temp_key: 0,
        }
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    pub fn items(&self) -> &[EditedItem] {
        &self.items
    }

    pub fn pending_deletes(&self) -> &HashSet<i64> {
        &self.pending_deletes
    }

    /// Appends a new row and returns its ref.
    pub fn add_item(
        &mut self,
        product_id: i64,
        quantity: f64,
        unit_price: f64,
        unit: impl Into<String>,
    ) -> OrderItemRef {
        self.next_temp_key += 1;
        let item_ref = OrderItemRef::New {
            temp_key: format!("new-{}", self.next_temp_key),
        };
        self.items.push(EditedItem {
            item_ref: item_ref.clone(),
            product_id,
            quantity,
            unit_price,
            unit: unit.into(),
        });
        item_ref
    }

    pub fn update_item(&mut self, item_ref: &OrderItemRef, quantity: f64, unit_price: f64) -> bool {
        match self.items.iter_mut().find(|i| &i.item_ref == item_ref) {
            Some(item) => {
                item.quantity = quantity;
                item.unit_price = unit_price;
                true
            }
            None => false,
        }
    }

    /// Removes a row. An existing row enters `pending_deletes` right
    /// here, at the moment of removal.
    pub fn remove_item(&mut self, item_ref: &OrderItemRef) -> bool {
        let Some(pos) = self.items.iter().position(|i| &i.item_ref == item_ref) else {
            return false;
        };
        self.items.remove(pos);
        if let OrderItemRef::Existing { id } = item_ref {
            self.pending_deletes.insert(*id);
        }
        true
    }

    /// Validates every row, then classifies: new rows are creates,
    /// existing rows not pending deletion are updates, tracked
    /// deletions are deletes. The total covers the edited rows only.
    /// Validation failure enumerates every offending row and applies
    /// nothing.
    pub fn plan(&self, known_products: &HashSet<i64>) -> Result<ReconciliationPlan, AppError> {
        let mut issues: Vec<String> = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            if !known_products.contains(&item.product_id) {
                issues.push(format!("row {}: unknown product {}", index, item.product_id));
            }
            if !(item.quantity > 0.0) {
                issues.push(format!("row {}: quantity must be greater than 0", index));
            }
            if !(item.unit_price >= 0.0) {
                issues.push(format!("row {}: unit price must not be negative", index));
            }
            if item.unit.trim().is_empty() {
                issues.push(format!("row {}: unit is required", index));
            }
        }
        if !issues.is_empty() {
            return Err(AppError::validation(format!(
                "Invalid order items: {}",
                issues.join("; ")
            )));
        }

        let mut plan = ReconciliationPlan::default();
        for item in &self.items {
            plan.total_amount += item.line_total();
            match &item.item_ref {
                OrderItemRef::New { .. } => plan.to_create.push(item.clone()),
                OrderItemRef::Existing { id } => {
                    if !self.pending_deletes.contains(id) {
                        plan.to_update.push(item.clone());
                    }
                }
            }
        }
        plan.to_delete = self.pending_deletes.iter().copied().collect();
        plan.to_delete.sort_unstable();

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderItem, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn order_with_items(items: Vec<OrderItem>) -> Order {
        Order {
            id: 42,
            customer_id: Some(7),
            client_id: None,
            order_date: Utc.with_ymd_and_hms(2025, 7, 29, 10, 0, 0).unwrap(),
            status: OrderStatus::Pending,
            total_amount: items.iter().map(|i| i.quantity * i.unit_price).sum(),
            items,
        }
    }

    fn item(id: i64, product_id: i64, quantity: f64, unit_price: f64) -> OrderItem {
        OrderItem {
            id,
            order_id: 42,
            product_id,
            quantity,
            unit_price,
            unit: "KG".to_string(),
        }
    }

    fn known(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn changed_row_plus_new_row_split_into_update_and_create() {
        let order = order_with_items(vec![item(1, 5, 2.0, 3.0)]);
        let mut session = OrderEditSession::from_order(&order);

        session.update_item(&OrderItemRef::Existing { id: 1 }, 4.0, 3.0);
        session.add_item(6, 1.0, 10.0, "UN");
        assert_eq!(session.order_id(), 42);
        assert_eq!(session.items().len(), 2);

        let plan = session.plan(&known(&[5, 6])).unwrap();
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].item_ref, OrderItemRef::Existing { id: 1 });
        assert_eq!(plan.to_update[0].quantity, 4.0);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].product_id, 6);
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.total_amount, 22.0);
    }

    #[test]
    fn removal_then_readd_of_same_product_stays_delete_plus_create() {
        let order = order_with_items(vec![item(1, 5, 2.0, 3.0)]);
        let mut session = OrderEditSession::from_order(&order);

        session.remove_item(&OrderItemRef::Existing { id: 1 });
        session.add_item(5, 2.0, 3.0, "KG");

        let plan = session.plan(&known(&[5])).unwrap();
        assert_eq!(plan.to_delete, vec![1]);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].product_id, 5);
        assert!(plan.to_update.is_empty());
        assert_eq!(plan.total_amount, 6.0);
    }

    #[test]
    fn removing_a_new_row_tracks_nothing() {
        let order = order_with_items(vec![]);
        let mut session = OrderEditSession::from_order(&order);
        let added = session.add_item(5, 1.0, 2.0, "KG");

        assert!(session.remove_item(&added));
        assert!(session.pending_deletes().is_empty());

        let plan = session.plan(&known(&[5])).unwrap();
        assert!(plan.to_create.is_empty());
        assert_eq!(plan.total_amount, 0.0);
    }

    #[test]
    fn deleted_rows_do_not_count_toward_the_total() {
        let order = order_with_items(vec![item(1, 5, 2.0, 3.0), item(2, 6, 1.0, 10.0)]);
        let mut session = OrderEditSession::from_order(&order);
        session.remove_item(&OrderItemRef::Existing { id: 2 });

        let plan = session.plan(&known(&[5, 6])).unwrap();
        assert_eq!(plan.to_delete, vec![2]);
        assert_eq!(plan.total_amount, 6.0);
    }

    #[test]
    fn from_parts_drops_placeholder_ids_from_deletes() {
        let session = OrderEditSession::from_parts(42, vec![], vec![3, -999, 0, 1]);
        let plan = session.plan(&known(&[])).unwrap();
        assert_eq!(plan.to_delete, vec![1, 3]);
    }

    #[test]
    fn validation_enumerates_every_offending_row() {
        let items = vec![
            EditedItem {
                item_ref: OrderItemRef::Existing { id: 1 },
                product_id: 5,
                quantity: 0.0,
                unit_price: 3.0,
                unit: "KG".to_string(),
            },
            EditedItem {
                item_ref: OrderItemRef::New { temp_key: "new-1".to_string() },
                product_id: 99,
                quantity: 1.0,
                unit_price: -2.0,
                unit: "".to_string(),
            },
        ];
        let session = OrderEditSession::from_parts(42, items, vec![]);

        let err = session.plan(&known(&[5])).unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("row 0"), "{}", msg);
        assert!(msg.contains("row 1"), "{}", msg);
        assert!(msg.contains("unknown product 99"), "{}", msg);
    }

    #[test]
    fn nan_quantity_fails_validation() {
        let items = vec![EditedItem {
            item_ref: OrderItemRef::New { temp_key: "new-1".to_string() },
            product_id: 5,
            quantity: f64::NAN,
            unit_price: 1.0,
            unit: "KG".to_string(),
        }];
        let session = OrderEditSession::from_parts(42, items, vec![]);
        assert!(session.plan(&known(&[5])).is_err());
    }

    #[test]
    fn temp_keys_are_unique_within_a_session() {
        let order = order_with_items(vec![]);
        let mut session = OrderEditSession::from_order(&order);
        let a = session.add_item(5, 1.0, 1.0, "KG");
        let b = session.add_item(5, 1.0, 1.0, "KG");
        assert_ne!(a, b);
    }
}
