use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by bucket mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("size {size} is not stocked")]
    SizeNotFound { size: String },

    #[error("insufficient stock for size {size} (available: {available}, requested: {requested})")]
    InsufficientStock {
        size: String,
        available: u32,
        requested: u32,
    },

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("duplicate size label {size}")]
    DuplicateSize { size: String },

    #[error("quantity overflow for size {size}")]
    Overflow { size: String },

    #[error("stored stock {stored} does not match bucket total {computed}")]
    StockMismatch { stored: u64, computed: u64 },
}

/// On-hand quantity for one size label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBucket {
    pub size: String,
    pub quantity: u32,
}

impl SizeBucket {
    pub fn new(size: impl Into<String>, quantity: u32) -> Self {
        Self {
            size: size.into(),
            quantity,
        }
    }
}

/// Ordered size buckets plus the derived aggregate stock.
///
/// `stock` always equals the sum of bucket quantities once a mutation returns;
/// it is recomputed, never adjusted directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizeInventory {
    buckets: Vec<SizeBucket>,
    stock: u64,
}

impl SizeInventory {
    /// Build an inventory from buckets, rejecting repeated size labels.
    pub fn new(buckets: Vec<SizeBucket>) -> Result<Self, LedgerError> {
        for (i, bucket) in buckets.iter().enumerate() {
            if buckets[..i].iter().any(|b| b.size == bucket.size) {
                return Err(LedgerError::DuplicateSize {
                    size: bucket.size.clone(),
                });
            }
        }
        let stock = total(&buckets);
        Ok(Self { buckets, stock })
    }

    /// Rebuild from a persisted (buckets, stock) pair, checking the cached total.
    pub fn restore(buckets: Vec<SizeBucket>, stored_stock: u64) -> Result<Self, LedgerError> {
        let inventory = Self::new(buckets)?;
        if inventory.stock != stored_stock {
            return Err(LedgerError::StockMismatch {
                stored: stored_stock,
                computed: inventory.stock,
            });
        }
        Ok(inventory)
    }

    pub fn buckets(&self) -> &[SizeBucket] {
        &self.buckets
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }

    /// Available quantity for `size`, or `None` when the size is not stocked.
    pub fn available(&self, size: &str) -> Option<u32> {
        self.bucket(size).map(|b| b.quantity)
    }

    /// Decrement `size` by `quantity`; fails without mutating if it would go negative.
    pub fn reserve(&mut self, size: &str, quantity: u32) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        let bucket = self.bucket_mut(size)?;
        if bucket.quantity < quantity {
            return Err(LedgerError::InsufficientStock {
                size: size.to_string(),
                available: bucket.quantity,
                requested: quantity,
            });
        }
        bucket.quantity -= quantity;
        self.recompute();
        Ok(())
    }

    /// Increment `size` by `quantity` (compensation for a cancelled reservation).
    pub fn release(&mut self, size: &str, quantity: u32) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        let bucket = self.bucket_mut(size)?;
        bucket.quantity = bucket
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| LedgerError::Overflow {
                size: size.to_string(),
            })?;
        self.recompute();
        Ok(())
    }

    fn bucket(&self, size: &str) -> Option<&SizeBucket> {
        self.buckets.iter().find(|b| b.size == size)
    }

    fn bucket_mut(&mut self, size: &str) -> Result<&mut SizeBucket, LedgerError> {
        self.buckets
            .iter_mut()
            .find(|b| b.size == size)
            .ok_or_else(|| LedgerError::SizeNotFound {
                size: size.to_string(),
            })
    }

    fn recompute(&mut self) {
        self.stock = total(&self.buckets);
    }
}

fn total(buckets: &[SizeBucket]) -> u64 {
    buckets.iter().map(|b| u64::from(b.quantity)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn suit_sizes() -> SizeInventory {
        SizeInventory::new(vec![
            SizeBucket::new("S", 1),
            SizeBucket::new("M", 2),
            SizeBucket::new("L", 0),
        ])
        .unwrap()
    }

    #[test]
    fn stock_is_sum_of_buckets() {
        assert_eq!(suit_sizes().stock(), 3);
        assert_eq!(SizeInventory::default().stock(), 0);
    }

    #[test]
    fn reserve_decrements_bucket_and_stock() {
        let mut inv = suit_sizes();
        inv.reserve("M", 2).unwrap();
        assert_eq!(inv.available("M"), Some(0));
        assert_eq!(inv.stock(), 1);
    }

    #[test]
    fn reserve_beyond_available_leaves_inventory_untouched() {
        let mut inv = suit_sizes();
        let before = inv.clone();
        let err = inv.reserve("M", 3).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                size: "M".into(),
                available: 2,
                requested: 3
            }
        );
        assert_eq!(inv, before);
    }

    #[test]
    fn unknown_size_is_distinct_from_short_stock() {
        let mut inv = suit_sizes();
        assert_eq!(
            inv.reserve("XL", 1),
            Err(LedgerError::SizeNotFound { size: "XL".into() })
        );
        assert_eq!(
            inv.release("XL", 1),
            Err(LedgerError::SizeNotFound { size: "XL".into() })
        );
    }

    #[test]
    fn zero_quantities_are_rejected() {
        let mut inv = suit_sizes();
        assert_eq!(inv.reserve("S", 0), Err(LedgerError::InvalidQuantity));
        assert_eq!(inv.release("S", 0), Err(LedgerError::InvalidQuantity));
    }

    #[test]
    fn release_overflow_is_an_error() {
        let mut inv = SizeInventory::new(vec![SizeBucket::new("M", u32::MAX)]).unwrap();
        assert_eq!(
            inv.release("M", 1),
            Err(LedgerError::Overflow { size: "M".into() })
        );
        assert_eq!(inv.available("M"), Some(u32::MAX));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = SizeInventory::new(vec![SizeBucket::new("M", 1), SizeBucket::new("M", 2)])
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateSize { size: "M".into() });
    }

    #[test]
    fn restore_rejects_stale_stock_cache() {
        let buckets = vec![SizeBucket::new("M", 2)];
        assert!(SizeInventory::restore(buckets.clone(), 2).is_ok());
        assert_eq!(
            SizeInventory::restore(buckets, 5),
            Err(LedgerError::StockMismatch {
                stored: 5,
                computed: 2
            })
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Reserve(usize, u32),
        Release(usize, u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4, 0u32..6).prop_map(|(i, q)| Op::Reserve(i, q)),
            (0usize..4, 0u32..6).prop_map(|(i, q)| Op::Release(i, q)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of reserve/release calls the aggregate
        /// stock equals the bucket total and no bucket ever underflows.
        #[test]
        fn stock_tracks_bucket_total(
            initial in prop::collection::vec(0u32..10, 3),
            ops in prop::collection::vec(op(), 0..40)
        ) {
            let labels = ["S", "M", "L", "XL"];
            let buckets = initial
                .iter()
                .zip(labels)
                .map(|(q, s)| SizeBucket::new(s, *q))
                .collect();
            let mut inv = SizeInventory::new(buckets).unwrap();
            let mut expected: i64 = initial.iter().map(|q| i64::from(*q)).sum();

            for op in ops {
                match op {
                    Op::Reserve(i, q) => {
                        if inv.reserve(labels[i], q).is_ok() {
                            expected -= i64::from(q);
                        }
                    }
                    Op::Release(i, q) => {
                        if inv.release(labels[i], q).is_ok() {
                            expected += i64::from(q);
                        }
                    }
                }
                let sum: u64 = inv.buckets().iter().map(|b| u64::from(b.quantity)).sum();
                prop_assert_eq!(inv.stock(), sum);
                prop_assert_eq!(inv.stock() as i64, expected);
            }
        }

        /// Property: reserving then releasing the same quantity is a no-op.
        #[test]
        fn release_compensates_reserve(q in 1u32..10, extra in 0u32..10) {
            let mut inv = SizeInventory::new(vec![SizeBucket::new("M", q + extra)]).unwrap();
            let before = inv.clone();
            inv.reserve("M", q).unwrap();
            inv.release("M", q).unwrap();
            prop_assert_eq!(inv, before);
        }
    }
}
