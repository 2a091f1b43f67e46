// src/services/ledger.rs
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::history::HistoryEntry;
use crate::models::product::Product;
use crate::services::week::{monday_of_previous_week, monday_of_week, week_start_utc};

// ==================== Fields ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerField {
    Received,
    Sold,
    Unsold,
    Price,
    Description,
}

// ==================== Save plan ====================

/// Batch of history upserts produced by `LedgerSession::plan_save`.
#[derive(Debug, Clone, Default)]
pub struct SavePlan {
    pub creates: Vec<HistoryEntry>,
    pub updates: Vec<HistoryEntry>,
}

impl SavePlan {
    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==================== Session ====================

/// Per-request ledger state for one selected week: the active entry of
/// every active product, plus the set of products the user touched.
/// Owned by a single edit flow; nothing here is shared.
#[derive(Debug, Clone)]
pub struct LedgerSession {
    week_monday: NaiveDate,
    entries: HashMap<i64, HistoryEntry>,
    modified: HashSet<i64>,
}

impl LedgerSession {
    /// Materializes the week: every active product gets the store entry
    /// whose week matches `week_monday`, or a synthesized zero entry.
    /// Synthesized entries in a carry-forward category open with the
    /// previous week's unsold quantity as received stock. Entries that
    /// already exist are never defaulted.
    pub fn build(
        products: &[Product],
        history: &[HistoryEntry],
        week_monday: NaiveDate,
        carry_forward_categories: &HashSet<i64>,
    ) -> Self {
        let week_monday = monday_of_week(week_monday);
        let previous_monday = monday_of_previous_week(week_monday);

        let entry_for = |product_id: i64, monday: NaiveDate| {
            history.iter().find(|e| {
                e.product_id == product_id && monday_of_week(e.week_start_date.date_naive()) == monday
            })
        };

        let mut entries = HashMap::new();
        for product in products.iter().filter(|p| p.is_active) {
            let mut entry = match entry_for(product.id, week_monday) {
                Some(existing) => existing.clone(),
                None => {
                    let received = if carry_forward_categories.contains(&product.category_id) {
                        // What stayed unsold last week becomes this
                        // week's opening stock.
                        entry_for(product.id, previous_monday)
                            .map(|e| e.unsold_quantity)
                            .unwrap_or(0.0)
                    } else {
                        0.0
                    };

                    HistoryEntry {
                        id: None,
                        product_id: product.id,
                        week_start_date: week_start_utc(week_monday),
                        received_quantity: received,
                        sold_quantity: 0.0,
                        unsold_quantity: 0.0,
                        price: None,
                        description: String::new(),
                    }
                }
            };
            // Whatever the store had, what leaves the session is the
            // canonical UTC midnight of the Monday.
            entry.week_start_date = week_start_utc(week_monday);
            entries.insert(product.id, entry);
        }

        Self {
            week_monday,
            entries,
            modified: HashSet::new(),
        }
    }

    pub fn week_monday(&self) -> NaiveDate {
        self.week_monday
    }

    pub fn entry(&self, product_id: i64) -> Option<&HistoryEntry> {
        self.entries.get(&product_id)
    }

    pub fn is_modified(&self, product_id: i64) -> bool {
        self.modified.contains(&product_id)
    }

    /// Applies one form edit and marks the product modified. Numeric
    /// input parses leniently: anything that does not parse counts as
    /// 0. A blank price clears it.
    pub fn edit(&mut self, product_id: i64, field: LedgerField, raw: &str) -> Result<(), AppError> {
        let entry = self
            .entries
            .get_mut(&product_id)
            .ok_or_else(|| AppError::not_found(format!("No ledger entry for product {}", product_id)))?;

        match field {
            LedgerField::Received => entry.received_quantity = lenient_number(raw),
            LedgerField::Sold => entry.sold_quantity = lenient_number(raw),
            LedgerField::Unsold => entry.unsold_quantity = lenient_number(raw),
            LedgerField::Price => {
                entry.price = if raw.trim().is_empty() {
                    None
                } else {
                    Some(lenient_number(raw))
                };
            }
            LedgerField::Description => entry.description = raw.to_string(),
        }

        self.modified.insert(product_id);
        Ok(())
    }

    /// Entries worth persisting: modified, with a non-zero received
    /// quantity. Zero-received entries are skipped even when modified;
    /// empty weeks are never written back. Output is ordered by product
    /// id so dispatch and reporting are deterministic.
    pub fn plan_save(&self) -> SavePlan {
        let mut product_ids: Vec<i64> = self.modified.iter().copied().collect();
        product_ids.sort_unstable();

        let mut plan = SavePlan::default();
        for product_id in product_ids {
            let Some(entry) = self.entries.get(&product_id) else {
                continue;
            };
            if entry.received_quantity == 0.0 {
                continue;
            }
            if entry.id.is_some() {
                plan.updates.push(entry.clone());
            } else {
                plan.creates.push(entry.clone());
            }
        }
        plan
    }

    /// Called after a successful save; the caller is expected to
    /// rebuild from freshly fetched store state so new ids are picked
    /// up before the next edit cycle.
    pub fn clear_modified(&mut self) {
        self.modified.clear();
    }
}

fn lenient_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}
