//! # Cart Ledger
//!
//! The shopping cart as an ordered list of lines with a per-product stock
//! ceiling that holds across plain lines and the contents of boxes.
//!
//! ## Occupancy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart                                        occupancy(alfajor)         │
//! │  ─────────────────────────────────────       ──────────────────         │
//! │  alfajor            × 1                  →   1                          │
//! │  caja-dulce         × 2                                                 │
//! │    └─ alfajor  (3 per box)               →   2 × 3 = 6                  │
//! │    └─ medialuna (2 per box)                                             │
//! │                                              ─────                      │
//! │                                              7   ≤ ceiling?             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation checks the ceiling against this number before touching the
//! ledger. A rejected mutation leaves the ledger exactly as it was.
//!
//! ## Outcomes vs Errors
//! Running out of stock is a normal outcome, returned as
//! [`StockOutcome::Rejected`] with the headroom that is left. Only malformed
//! input (empty ids, non-positive quantities) is a [`CoreError`].
//!
//! ## Persistence
//! The whole line list is the unit of persistence. [`CartLedger::to_json`]
//! writes a JSON array, [`CartLedger::from_json`] reads it back, ignoring
//! unknown fields and treating missing optional fields as unconstrained.
//!
//! ## Concurrency
//! A ledger has a single writer. Server-side carts serialize access per cart
//! id before calling into it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_price_cents, validate_product_id, validate_quantity, validate_units_per_bundle,
};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Lines
// =============================================================================

/// One component of a composite box line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BundleComponent {
    pub product_id: String,
    /// Units of `product_id` consumed by one box.
    pub units_per_bundle: i64,
}

impl BundleComponent {
    pub fn new(product_id: impl Into<String>, units_per_bundle: i64) -> Self {
        BundleComponent {
            product_id: product_id.into(),
            units_per_bundle,
        }
    }
}

/// A line in the cart.
///
/// ## Design Notes
/// - `unit_price` is frozen when the line is first added.
/// - `stock_ceiling` is replaced on every add (last write wins).
/// - `bundled_components` is only present on box lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,

    /// Display label for the storefront. Not used by any rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub unit_price: Money,

    pub quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_ceiling: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundled_components: Option<Vec<BundleComponent>>,
}

impl CartLine {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// True for box lines that carry other products inside them.
    pub fn is_composite(&self) -> bool {
        self.bundled_components
            .as_ref()
            .is_some_and(|components| !components.is_empty())
    }

    /// How many units of `product_id` this line holds, directly or inside
    /// its boxes.
    pub fn units_of(&self, product_id: &str) -> i64 {
        let direct = if self.product_id == product_id {
            self.quantity
        } else {
            0
        };

        let nested: i64 = self
            .bundled_components
            .iter()
            .flatten()
            .filter(|c| c.product_id == product_id)
            .map(|c| self.quantity * c.units_per_bundle)
            .sum();

        direct + nested
    }
}

/// Everything needed to add a line.
///
/// ## Example
/// ```rust
/// use hornada_core::ledger::{BundleComponent, LineRequest};
/// use hornada_core::money::Money;
///
/// let request = LineRequest::new("caja-dulce", 1, Money::from_cents(4500))
///     .with_ceiling(10)
///     .with_bundle(vec![BundleComponent::new("alfajor", 6)]);
/// assert_eq!(request.stock_ceiling, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub stock_ceiling: Option<i64>,
    #[serde(default)]
    pub bundled_components: Option<Vec<BundleComponent>>,
}

impl LineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        LineRequest {
            product_id: product_id.into(),
            name: None,
            unit_price,
            quantity,
            stock_ceiling: None,
            bundled_components: None,
        }
    }

    pub fn with_ceiling(mut self, ceiling: i64) -> Self {
        self.stock_ceiling = Some(ceiling);
        self
    }

    pub fn with_bundle(mut self, components: Vec<BundleComponent>) -> Self {
        self.bundled_components = Some(components);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn validate(&self) -> CoreResult<()> {
        validate_product_id(&self.product_id)?;
        validate_quantity(self.quantity)?;
        validate_price_cents(self.unit_price.cents())?;

        for component in self.bundled_components.iter().flatten() {
            validate_product_id(&component.product_id)?;
            validate_units_per_bundle(component.units_per_bundle)?;
        }

        Ok(())
    }
}

// =============================================================================
// Stock Outcome
// =============================================================================

/// Why an addition was refused. Drives the storefront message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// Nothing more can be added ("you already have all we have").
    AtCeiling,
    /// Some, but not all, of the request fits ("only N more available").
    PartialHeadroom,
}

/// Result of a stock check.
///
/// ## Serialization
/// ```json
/// { "status": "ok" }
/// { "status": "rejected", "reason": "partialHeadroom", "maxAdditional": 2 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StockOutcome {
    Ok,
    Rejected {
        reason: RejectReason,
        #[serde(rename = "maxAdditional")]
        max_additional: i64,
    },
}

impl StockOutcome {
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, StockOutcome::Ok)
    }

    /// Builds a rejection, picking the reason from the remaining headroom.
    pub fn rejected(max_additional: i64) -> Self {
        let max_additional = max_additional.max(0);
        let reason = if max_additional == 0 {
            RejectReason::AtCeiling
        } else {
            RejectReason::PartialHeadroom
        };
        StockOutcome::Rejected {
            reason,
            max_additional,
        }
    }

    /// Remaining headroom for a rejection, `None` when the check passed.
    pub fn max_additional(&self) -> Option<i64> {
        match self {
            StockOutcome::Ok => None,
            StockOutcome::Rejected { max_additional, .. } => Some(*max_additional),
        }
    }
}

/// Checks `requested` more units against `ceiling` given current occupancy.
///
/// A ceiling of `None` or `<= 0` means the product is unmetered
/// (made to order) and always passes.
pub fn check_ceiling(occupancy: i64, requested: i64, ceiling: Option<i64>) -> StockOutcome {
    match ceiling {
        Some(ceiling) if ceiling > 0 => {
            if occupancy.saturating_add(requested) > ceiling {
                StockOutcome::rejected(ceiling - occupancy)
            } else {
                StockOutcome::Ok
            }
        }
        _ => StockOutcome::Ok,
    }
}

// =============================================================================
// Cart Ledger
// =============================================================================

/// The cart: an ordered list of lines, unique by product id.
///
/// ## Invariants
/// - At most one line per `product_id`; insertion order is kept
/// - Every line has `quantity >= 1`
/// - For every product with a known ceiling, occupancy never exceeds it
///   through any operation on this type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        CartLedger { lines: Vec::new() }
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    // -------------------------------------------------------------------------
    // Stock
    // -------------------------------------------------------------------------

    /// Units of `product_id` committed across the whole cart, boxes included.
    pub fn compute_occupancy(&self, product_id: &str) -> i64 {
        self.lines.iter().map(|l| l.units_of(product_id)).sum()
    }

    /// Would adding `requested` units of `product_id` stay within `ceiling`?
    pub fn validate_addition(
        &self,
        product_id: &str,
        requested: i64,
        ceiling: Option<i64>,
    ) -> StockOutcome {
        check_ceiling(self.compute_occupancy(product_id), requested, ceiling)
    }

    /// Checks the component ceilings of `box_quantity` new boxes.
    ///
    /// `ceiling_of` returns the known ceiling of a component product.
    /// Components repeated inside one box are summed first. On rejection,
    /// `max_additional` counts whole boxes and reflects the tightest
    /// component.
    ///
    /// ## Example
    /// ```rust
    /// use hornada_core::ledger::{BundleComponent, CartLedger};
    ///
    /// let ledger = CartLedger::new();
    /// let bundle = vec![BundleComponent::new("alfajor", 4)];
    /// let outcome = ledger.validate_bundle_addition(&bundle, 3, |_| Some(10));
    /// // 3 boxes need 12 alfajores, only 10 exist: 2 boxes fit
    /// assert_eq!(outcome.max_additional(), Some(2));
    /// ```
    pub fn validate_bundle_addition<F>(
        &self,
        components: &[BundleComponent],
        box_quantity: i64,
        ceiling_of: F,
    ) -> StockOutcome
    where
        F: Fn(&str) -> Option<i64>,
    {
        let mut per_product: Vec<(&str, i64)> = Vec::new();
        for component in components {
            match per_product
                .iter_mut()
                .find(|(id, _)| *id == component.product_id)
            {
                Some((_, units)) => *units = units.saturating_add(component.units_per_bundle),
                None => per_product.push((&component.product_id, component.units_per_bundle)),
            }
        }

        let mut tightest: Option<i64> = None;
        for (product_id, units) in per_product {
            if units <= 0 {
                continue;
            }
            let outcome = self.validate_addition(
                product_id,
                box_quantity.saturating_mul(units),
                ceiling_of(product_id),
            );
            if let Some(free_units) = outcome.max_additional() {
                let boxes = free_units / units;
                tightest = Some(tightest.map_or(boxes, |t| t.min(boxes)));
            }
        }

        match tightest {
            Some(boxes) => StockOutcome::rejected(boxes),
            None => StockOutcome::Ok,
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds a line, or merges into the existing line for the same product.
    ///
    /// ## Behavior
    /// ```text
    /// validate input ──► Err(Validation)
    ///      │
    ///      ▼
    /// check product's own ceiling ──► Ok(Rejected{..})   (ledger untouched)
    ///      │
    ///      ├── line exists: quantity += n, ceiling = latest,
    ///      │                bundle = latest if supplied
    ///      └── otherwise:   append
    /// ```
    ///
    /// Component ceilings of a box are not checked here; use
    /// [`validate_bundle_addition`](Self::validate_bundle_addition) first.
    pub fn add_line(&mut self, request: LineRequest) -> CoreResult<StockOutcome> {
        request.validate()?;

        let position = self
            .lines
            .iter()
            .position(|l| l.product_id == request.product_id);

        match position {
            Some(index) => {
                let merged = self.lines[index].quantity + request.quantity;
                if merged > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: merged,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
            }
            None => {
                if self.lines.len() >= MAX_CART_LINES {
                    return Err(CoreError::CartTooLarge {
                        max: MAX_CART_LINES,
                    });
                }
            }
        }

        let outcome = self.validate_addition(
            &request.product_id,
            request.quantity,
            request.stock_ceiling,
        );
        if !outcome.is_ok() {
            return Ok(outcome);
        }

        match position {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity += request.quantity;
                line.stock_ceiling = request.stock_ceiling;
                if request.bundled_components.is_some() {
                    line.bundled_components = request.bundled_components;
                }
                if request.name.is_some() {
                    line.name = request.name;
                }
            }
            None => self.lines.push(CartLine {
                product_id: request.product_id,
                name: request.name,
                unit_price: request.unit_price,
                quantity: request.quantity,
                stock_ceiling: request.stock_ceiling,
                bundled_components: request.bundled_components,
            }),
        }

        Ok(StockOutcome::Ok)
    }

    /// Sets the quantity of an existing line.
    ///
    /// ## Behavior
    /// - `new_quantity <= 0`: removes the line, always `Ok`
    /// - increase: only the delta is checked, against the line's stored ceiling
    /// - decrease: never fails
    /// - unknown product: nothing to update, `Ok`
    pub fn update_quantity(&mut self, product_id: &str, new_quantity: i64) -> CoreResult<StockOutcome> {
        if new_quantity <= 0 {
            self.remove_line(product_id);
            return Ok(StockOutcome::Ok);
        }

        if new_quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return Ok(StockOutcome::Ok);
        };

        let delta = new_quantity - self.lines[index].quantity;
        if delta > 0 {
            let outcome =
                self.validate_addition(product_id, delta, self.lines[index].stock_ceiling);
            if !outcome.is_ok() {
                return Ok(outcome);
            }
        }

        self.lines[index].quantity = new_quantity;
        Ok(StockOutcome::Ok)
    }

    /// Removes the line for `product_id`. Removing an absent id is a no-op.
    ///
    /// Returns true if a line was removed.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // -------------------------------------------------------------------------
    // Derived Totals
    // -------------------------------------------------------------------------

    /// Sum of line quantities. A box counts once, not per component.
    pub fn total_item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit_price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Same as [`subtotal`](Self::subtotal); shipping is added at checkout.
    pub fn total(&self) -> Money {
        self.subtotal()
    }

    /// Every product id the cart touches, lines first, then box contents.
    pub fn referenced_product_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let all = self.lines.iter().flat_map(|line| {
            std::iter::once(line.product_id.as_str()).chain(
                line.bundled_components
                    .iter()
                    .flatten()
                    .map(|c| c.product_id.as_str()),
            )
        });
        for id in all {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    // -------------------------------------------------------------------------
    // Persistence Boundary
    // -------------------------------------------------------------------------

    /// Serializes the full line list as a JSON array.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::SnapshotWrite(e.to_string()))
    }

    /// Restores a ledger from [`to_json`](Self::to_json) output.
    ///
    /// ## Errors
    /// `CorruptSnapshot` when the payload is not a line array, or when a
    /// restored line breaks a rule [`add_line`](Self::add_line) enforces:
    /// bad id, quantity, price or box units, a repeated product id, or more
    /// than [`MAX_CART_LINES`] lines. The caller should discard it and start
    /// empty.
    pub fn from_json(payload: &str) -> CoreResult<Self> {
        let ledger: CartLedger =
            serde_json::from_str(payload).map_err(|e| CoreError::CorruptSnapshot(e.to_string()))?;

        if ledger.lines.len() > MAX_CART_LINES {
            return Err(CoreError::CorruptSnapshot(format!(
                "{} lines, at most {} allowed",
                ledger.lines.len(),
                MAX_CART_LINES
            )));
        }

        for (index, line) in ledger.lines.iter().enumerate() {
            check_restored_line(line).map_err(|e| {
                CoreError::CorruptSnapshot(format!("line {}: {}", line.product_id, e))
            })?;

            if ledger.lines[..index]
                .iter()
                .any(|earlier| earlier.product_id == line.product_id)
            {
                return Err(CoreError::CorruptSnapshot(format!(
                    "product {} appears on more than one line",
                    line.product_id
                )));
            }
        }

        Ok(ledger)
    }
}

/// Applies the input rules of [`LineRequest`] to a line read back from storage.
fn check_restored_line(line: &CartLine) -> Result<(), ValidationError> {
    validate_product_id(&line.product_id)?;
    validate_quantity(line.quantity)?;
    validate_price_cents(line.unit_price.cents())?;

    for component in line.bundled_components.iter().flatten() {
        validate_product_id(&component.product_id)?;
        validate_units_per_bundle(component.units_per_bundle)?;
    }

    Ok(())
}

/// Totals summary for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: i64,
    pub subtotal: Money,
    pub total: Money,
}

impl From<&CartLedger> for CartTotals {
    fn from(ledger: &CartLedger) -> Self {
        CartTotals {
            line_count: ledger.line_count(),
            item_count: ledger.total_item_count(),
            subtotal: ledger.subtotal(),
            total: ledger.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, qty: i64, cents: i64) -> LineRequest {
        LineRequest::new(id, qty, Money::from_cents(cents))
    }

    fn caja(qty: i64, components: Vec<BundleComponent>) -> LineRequest {
        item("caja", qty, 4000).with_bundle(components)
    }

    #[test]
    fn test_standalone_ceiling_enforced() {
        let mut ledger = CartLedger::new();

        let first = ledger.add_line(item("x", 5, 100).with_ceiling(5)).unwrap();
        assert!(first.is_ok());

        let second = ledger.add_line(item("x", 1, 100).with_ceiling(5)).unwrap();
        assert_eq!(
            second,
            StockOutcome::Rejected {
                reason: RejectReason::AtCeiling,
                max_additional: 0
            }
        );
        assert_eq!(ledger.compute_occupancy("x"), 5);
    }

    #[test]
    fn test_nested_bundle_counts_toward_component() {
        let mut ledger = CartLedger::new();
        ledger
            .add_line(caja(1, vec![BundleComponent::new("y", 2)]))
            .unwrap();
        assert_eq!(ledger.compute_occupancy("y"), 2);

        let too_many = ledger.add_line(item("y", 2, 300).with_ceiling(3)).unwrap();
        assert_eq!(
            too_many,
            StockOutcome::Rejected {
                reason: RejectReason::PartialHeadroom,
                max_additional: 1
            }
        );

        let fits = ledger.add_line(item("y", 1, 300).with_ceiling(3)).unwrap();
        assert!(fits.is_ok());
        assert_eq!(ledger.compute_occupancy("y"), 3);
    }

    #[test]
    fn test_rejected_add_is_atomic() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("x", 4, 250).with_ceiling(5)).unwrap();
        ledger.add_line(item("z", 1, 900)).unwrap();

        let count_before = ledger.total_item_count();
        let subtotal_before = ledger.subtotal();
        let snapshot = ledger.clone();

        let outcome = ledger.add_line(item("x", 3, 250).with_ceiling(5)).unwrap();
        assert!(!outcome.is_ok());
        assert_eq!(ledger.total_item_count(), count_before);
        assert_eq!(ledger.subtotal(), subtotal_before);
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn test_unmetered_products_always_fit() {
        let mut ledger = CartLedger::new();
        assert!(ledger.add_line(item("torta", 50, 100)).unwrap().is_ok());
        assert!(ledger
            .add_line(item("torta", 50, 100).with_ceiling(0))
            .unwrap()
            .is_ok());
        assert!(ledger
            .add_line(item("torta", 50, 100).with_ceiling(-3))
            .unwrap()
            .is_ok());
        assert_eq!(ledger.compute_occupancy("torta"), 150);
    }

    #[test]
    fn test_merge_keeps_order_and_replaces_ceiling() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("a", 1, 100).with_ceiling(2)).unwrap();
        ledger.add_line(item("b", 1, 200)).unwrap();
        ledger.add_line(item("a", 1, 150).with_ceiling(10)).unwrap();

        let ids: Vec<&str> = ledger.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let a = ledger.line("a").unwrap();
        assert_eq!(a.quantity, 2);
        assert_eq!(a.stock_ceiling, Some(10));
        // Price frozen at first add
        assert_eq!(a.unit_price.cents(), 100);
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let mut ledger = CartLedger::new();
        assert!(matches!(
            ledger.add_line(item("", 1, 100)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.add_line(item("a", 0, 100)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.add_line(item("a", 1, -5)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.add_line(caja(1, vec![BundleComponent::new("y", 0)])),
            Err(CoreError::Validation(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_merge_beyond_line_maximum_is_an_error() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("a", MAX_ITEM_QUANTITY, 100)).unwrap();
        assert!(matches!(
            ledger.add_line(item("a", 1, 100)),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(ledger.line("a").unwrap().quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_line_limit() {
        let mut ledger = CartLedger::new();
        for i in 0..MAX_CART_LINES {
            ledger.add_line(item(&format!("p{}", i), 1, 10)).unwrap();
        }
        assert!(matches!(
            ledger.add_line(item("one-more", 1, 10)),
            Err(CoreError::CartTooLarge { .. })
        ));
        // Merging into an existing line is still allowed
        assert!(ledger.add_line(item("p0", 1, 10)).unwrap().is_ok());
    }

    #[test]
    fn test_update_quantity_checks_only_delta() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("x", 2, 100).with_ceiling(4)).unwrap();

        assert!(ledger.update_quantity("x", 4).unwrap().is_ok());
        assert_eq!(ledger.line("x").unwrap().quantity, 4);

        let outcome = ledger.update_quantity("x", 6).unwrap();
        assert_eq!(
            outcome,
            StockOutcome::Rejected {
                reason: RejectReason::AtCeiling,
                max_additional: 0
            }
        );
        assert_eq!(ledger.line("x").unwrap().quantity, 4);
    }

    #[test]
    fn test_update_quantity_sees_box_contents() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("y", 1, 300).with_ceiling(5)).unwrap();
        ledger
            .add_line(caja(1, vec![BundleComponent::new("y", 3)]))
            .unwrap();

        // occupancy 4, ceiling 5: raising to 3 needs 2 more, only 1 fits
        let outcome = ledger.update_quantity("y", 3).unwrap();
        assert_eq!(outcome.max_additional(), Some(1));
        assert!(ledger.update_quantity("y", 2).unwrap().is_ok());
    }

    #[test]
    fn test_decrease_and_zero_never_fail() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("x", 3, 100).with_ceiling(3)).unwrap();

        assert!(ledger.update_quantity("x", 1).unwrap().is_ok());
        assert_eq!(ledger.line("x").unwrap().quantity, 1);

        assert!(ledger.update_quantity("x", 0).unwrap().is_ok());
        assert!(ledger.line("x").is_none());

        assert!(ledger.update_quantity("x", -2).unwrap().is_ok());
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let mut ledger = CartLedger::new();
        assert!(ledger.update_quantity("ghost", 3).unwrap().is_ok());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("a", 1, 100)).unwrap();
        ledger.add_line(item("b", 2, 100)).unwrap();

        assert!(ledger.remove_line("a"));
        let once = ledger.clone();
        assert!(!ledger.remove_line("a"));
        assert_eq!(ledger, once);
    }

    #[test]
    fn test_totals() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("pan", 2, 350)).unwrap();
        ledger
            .add_line(caja(
                1,
                vec![
                    BundleComponent::new("alfajor", 6),
                    BundleComponent::new("medialuna", 4),
                ],
            ))
            .unwrap();

        // Box counts once
        assert_eq!(ledger.total_item_count(), 3);
        assert_eq!(ledger.subtotal().cents(), 2 * 350 + 4000);
        assert_eq!(ledger.total(), ledger.subtotal());

        let totals = CartTotals::from(&ledger);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_validate_bundle_addition() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("alfajor", 4, 200)).unwrap();

        let bundle = vec![
            BundleComponent::new("alfajor", 3),
            BundleComponent::new("medialuna", 2),
        ];
        let ceilings = |id: &str| match id {
            "alfajor" => Some(10),
            "medialuna" => Some(100),
            _ => None,
        };

        // 2 boxes = 6 alfajores, 4 + 6 = 10
        assert!(ledger.validate_bundle_addition(&bundle, 2, ceilings).is_ok());

        // 3 boxes = 9, only 6 free → 2 boxes
        let outcome = ledger.validate_bundle_addition(&bundle, 3, ceilings);
        assert_eq!(
            outcome,
            StockOutcome::Rejected {
                reason: RejectReason::PartialHeadroom,
                max_additional: 2
            }
        );
    }

    #[test]
    fn test_validate_bundle_addition_sums_repeated_components() {
        let ledger = CartLedger::new();
        let bundle = vec![
            BundleComponent::new("alfajor", 2),
            BundleComponent::new("alfajor", 2),
        ];
        let outcome = ledger.validate_bundle_addition(&bundle, 1, |_| Some(3));
        assert_eq!(
            outcome,
            StockOutcome::Rejected {
                reason: RejectReason::AtCeiling,
                max_additional: 0
            }
        );
    }

    #[test]
    fn test_stock_checks_do_not_overflow() {
        let mut ledger = CartLedger::new();
        ledger.add_line(item("y", 2, 300).with_ceiling(5)).unwrap();

        assert_eq!(
            ledger.validate_addition("y", i64::MAX, Some(5)).max_additional(),
            Some(3)
        );

        let bundle = vec![
            BundleComponent::new("y", i64::MAX),
            BundleComponent::new("y", i64::MAX),
        ];
        let outcome = ledger.validate_bundle_addition(&bundle, i64::MAX, |_| Some(5));
        assert_eq!(outcome.max_additional(), Some(0));
    }

    #[test]
    fn test_json_round_trip() {
        let mut ledger = CartLedger::new();
        ledger
            .add_line(item("pan", 2, 350).with_ceiling(10).with_name("Pan de campo"))
            .unwrap();
        ledger.add_line(item("alfajor", 1, 200).with_ceiling(20)).unwrap();
        ledger
            .add_line(caja(
                2,
                vec![
                    BundleComponent::new("alfajor", 6),
                    BundleComponent::new("medialuna", 4),
                ],
            ))
            .unwrap();

        let json = ledger.to_json().unwrap();
        assert!(json.starts_with('['));

        let restored = CartLedger::from_json(&json).unwrap();
        assert_eq!(restored.subtotal(), ledger.subtotal());
        assert_eq!(restored.total_item_count(), ledger.total_item_count());
        for id in ledger.referenced_product_ids() {
            assert_eq!(
                restored.compute_occupancy(id),
                ledger.compute_occupancy(id),
                "occupancy differs for {}",
                id
            );
        }
        assert_eq!(restored, ledger);
    }

    #[test]
    fn test_from_json_tolerates_unknown_and_missing_fields() {
        let json = r#"[
            {"productId":"pan","unitPrice":350,"quantity":2,"imageUrl":"pan.jpg"},
            {"productId":"caja","unitPrice":4000,"quantity":1,
             "bundledComponents":[{"productId":"pan","unitsPerBundle":3}]}
        ]"#;

        let ledger = CartLedger::from_json(json).unwrap();
        assert_eq!(ledger.line("pan").unwrap().stock_ceiling, None);
        assert_eq!(ledger.compute_occupancy("pan"), 5);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            CartLedger::from_json("{not json"),
            Err(CoreError::CorruptSnapshot(_))
        ));
        assert!(matches!(
            CartLedger::from_json(r#"{"lines":[]}"#),
            Err(CoreError::CorruptSnapshot(_))
        ));
        assert!(matches!(
            CartLedger::from_json(r#"[{"productId":"a","unitPrice":1,"quantity":0}]"#),
            Err(CoreError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_lines_add_line_would_refuse() {
        let corrupt = [
            // Negative box units hide stock from the ceiling check
            r#"[{"productId":"caja","unitPrice":4000,"quantity":1,
                 "bundledComponents":[{"productId":"y","unitsPerBundle":-5}]}]"#,
            r#"[{"productId":"caja","unitPrice":4000,"quantity":1,
                 "bundledComponents":[{"productId":"y","unitsPerBundle":0}]}]"#,
            r#"[{"productId":"a","unitPrice":100,"quantity":1000}]"#,
            r#"[{"productId":"a","unitPrice":-1,"quantity":1}]"#,
            r#"[{"productId":"a","unitPrice":9223372036854775807,"quantity":1}]"#,
            r#"[{"productId":"","unitPrice":100,"quantity":1}]"#,
            r#"[{"productId":"y","unitPrice":300,"quantity":3,"stockCeiling":3},
                {"productId":"y","unitPrice":300,"quantity":2}]"#,
        ];

        for payload in corrupt {
            assert!(
                matches!(CartLedger::from_json(payload), Err(CoreError::CorruptSnapshot(_))),
                "accepted {}",
                payload
            );
        }
    }

    #[test]
    fn test_from_json_rejects_too_many_lines() {
        let lines: Vec<serde_json::Value> = (0..=MAX_CART_LINES)
            .map(|i| serde_json::json!({ "productId": format!("p{}", i), "unitPrice": 1, "quantity": 1 }))
            .collect();
        let payload = serde_json::to_string(&lines).unwrap();

        assert!(matches!(
            CartLedger::from_json(&payload),
            Err(CoreError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_oversized_price_is_refused_and_totals_stay_finite() {
        let mut ledger = CartLedger::new();
        assert!(matches!(
            ledger.add_line(item("x", 2, i64::MAX / 2 + 1)),
            Err(CoreError::Validation(_))
        ));
        assert!(ledger.is_empty());

        // Largest cart the caps allow still totals without overflow
        for i in 0..MAX_CART_LINES {
            ledger
                .add_line(item(&format!("p{}", i), MAX_ITEM_QUANTITY, crate::MAX_UNIT_PRICE_CENTS))
                .unwrap();
        }
        let expected = MAX_CART_LINES as i64 * MAX_ITEM_QUANTITY * crate::MAX_UNIT_PRICE_CENTS;
        assert_eq!(ledger.subtotal().cents(), expected);
        assert_eq!(CartTotals::from(&ledger).total.cents(), expected);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(StockOutcome::rejected(2)).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "partialHeadroom");
        assert_eq!(json["maxAdditional"], 2);

        let ok = serde_json::to_value(StockOutcome::Ok).unwrap();
        assert_eq!(ok["status"], "ok");
    }
}
