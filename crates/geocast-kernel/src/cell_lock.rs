//! Spatial-cell locks.
//!
//! Clustering reads neighbors and then writes assignments in separate store
//! calls. Two streams created at the same spot at the same moment can both
//! see "no event yet" and form two events. Holding a lock over every grid
//! cell the neighbor query touches serializes clustering passes whose
//! pre-filter boxes overlap, while passes in unrelated places run freely.
//!
//! A pass claims all of its cells at once (or waits until it can), so two
//! passes never hold part of each other's region and deadlock is impossible.

use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use geocast_geo::BoundingBox;

/// Upper bound on individually tracked cells per claim. Larger regions (only
/// reachable near the poles, where longitude spans explode) lock whole rows.
const MAX_CELLS_PER_CLAIM: i64 = 1024;

type Cell = (i64, i64);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Claim {
    Cells(Vec<Cell>),
    Rows(Vec<i64>),
}

#[derive(Debug, Default)]
struct Held {
    cells: HashSet<Cell>,
    cells_per_row: HashMap<i64, usize>,
    rows: HashSet<i64>,
}

impl Held {
    fn conflicts(&self, claim: &Claim) -> bool {
        match claim {
            Claim::Cells(cells) => cells
                .iter()
                .any(|cell| self.cells.contains(cell) || self.rows.contains(&cell.0)),
            Claim::Rows(rows) => rows
                .iter()
                .any(|row| self.rows.contains(row) || self.cells_per_row.contains_key(row)),
        }
    }

    fn take(&mut self, claim: &Claim) {
        match claim {
            Claim::Cells(cells) => {
                for &cell in cells {
                    self.cells.insert(cell);
                    *self.cells_per_row.entry(cell.0).or_default() += 1;
                }
            }
            Claim::Rows(rows) => self.rows.extend(rows.iter().copied()),
        }
    }

    fn release(&mut self, claim: &Claim) {
        match claim {
            Claim::Cells(cells) => {
                for cell in cells {
                    self.cells.remove(cell);
                    if let Some(count) = self.cells_per_row.get_mut(&cell.0) {
                        *count -= 1;
                        if *count == 0 {
                            self.cells_per_row.remove(&cell.0);
                        }
                    }
                }
            }
            Claim::Rows(rows) => {
                for row in rows {
                    self.rows.remove(row);
                }
            }
        }
    }
}

/// A table of held grid cells with a condition variable for waiters.
#[derive(Debug)]
pub struct CellLocks {
    cell_size_deg: f64,
    held: Mutex<Held>,
    released: Condvar,
}

impl CellLocks {
    /// Creates a lock table over a grid of `cell_size_deg` square cells.
    pub fn new(cell_size_deg: f64) -> Self {
        Self {
            cell_size_deg,
            held: Mutex::new(Held::default()),
            released: Condvar::new(),
        }
    }

    /// Blocks until every cell covered by `region` is free, then claims them.
    ///
    /// The claim is released when the returned guard drops.
    pub fn lock_region(&self, region: &BoundingBox) -> CellGuard<'_> {
        let claim = self.claim_for(region);
        let mut held = self.lock_table();
        while held.conflicts(&claim) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.take(&claim);
        drop(held);

        CellGuard { locks: self, claim }
    }

    /// Number of cells and rows currently held.
    pub fn held_count(&self) -> usize {
        let held = self.lock_table();
        held.cells.len() + held.rows.len()
    }

    fn lock_table(&self) -> MutexGuard<'_, Held> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index(&self, degrees: f64) -> i64 {
        (degrees / self.cell_size_deg).floor() as i64
    }

    fn claim_for(&self, region: &BoundingBox) -> Claim {
        let lat_lo = self.index(region.min_lat.clamp(-90.0, 90.0));
        let lat_hi = self.index(region.max_lat.clamp(-90.0, 90.0));
        let lng_lo = self.index(region.min_lng.clamp(-180.0, 180.0));
        let lng_hi = self.index(region.max_lng.clamp(-180.0, 180.0));

        let rows = lat_lo..=lat_hi;
        let area = (lat_hi - lat_lo + 1).saturating_mul(lng_hi - lng_lo + 1);
        if area > MAX_CELLS_PER_CLAIM {
            return Claim::Rows(rows.collect());
        }

        Claim::Cells(
            rows.flat_map(|row| (lng_lo..=lng_hi).map(move |col| (row, col)))
                .collect(),
        )
    }
}

/// Releases its cells on drop and wakes every waiter.
#[derive(Debug)]
pub struct CellGuard<'a> {
    locks: &'a CellLocks,
    claim: Claim,
}

impl Drop for CellGuard<'_> {
    fn drop(&mut self) {
        self.locks.lock_table().release(&self.claim);
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use geocast_types::GeoPoint;

    use super::*;

    fn region(lat: f64, lng: f64) -> BoundingBox {
        BoundingBox::around(GeoPoint::new(lat, lng), 60.0)
    }

    #[test]
    fn small_region_claims_a_few_cells() {
        let locks = CellLocks::new(0.001);
        match locks.claim_for(&region(40.0, -73.0)) {
            Claim::Cells(cells) => assert!((1..=9).contains(&cells.len())),
            Claim::Rows(_) => panic!("expected cell claim"),
        }
    }

    #[test]
    fn polar_region_falls_back_to_rows() {
        let locks = CellLocks::new(0.001);
        let claim = locks.claim_for(&region(89.999_999, 0.0));
        assert!(matches!(claim, Claim::Rows(_)));
    }

    #[test]
    fn guard_releases_on_drop() {
        let locks = CellLocks::new(0.001);
        {
            let _guard = locks.lock_region(&region(10.0, 10.0));
            assert!(locks.held_count() > 0);
        }
        assert_eq!(locks.held_count(), 0);
    }

    #[test]
    fn disjoint_regions_do_not_block() {
        let locks = CellLocks::new(0.001);
        let _a = locks.lock_region(&region(10.0, 10.0));
        let _b = locks.lock_region(&region(-10.0, -10.0));
    }

    #[test]
    fn row_claim_conflicts_with_cells_in_the_same_row() {
        let mut held = Held::default();
        held.take(&Claim::Cells(vec![(5, 7)]));
        assert!(held.conflicts(&Claim::Rows(vec![5])));
        assert!(!held.conflicts(&Claim::Rows(vec![6])));
        held.release(&Claim::Cells(vec![(5, 7)]));
        assert!(!held.conflicts(&Claim::Rows(vec![5])));
    }

    #[test]
    fn overlapping_region_waits_for_release() {
        let locks = Arc::new(CellLocks::new(0.001));
        let acquired = Arc::new(AtomicBool::new(false));

        let guard = locks.lock_region(&region(10.0, 10.0));
        let handle = {
            let locks = Arc::clone(&locks);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                let _guard = locks.lock_region(&region(10.0, 10.000_1));
                acquired.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));
        drop(guard);
        handle.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }
}
