use super::cell_list::CellList;
use super::config::BondingPolicy;
use super::progress::{CancellationToken, Progress, ProgressReporter};
use crate::core::models::cell::Cell;
use crate::core::models::ids::AsymmetricAtomId;
use crate::core::models::topology::BoundaryType;
use crate::core::utils::geometry::{BoundingBox, wrap_fractional};
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace, warn};

/// One atom copy as seen by bond inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondCandidate {
    /// Cartesian position relative to the cell origin.
    pub position: Point3<f64>,
    pub bond_distance_criteria: f64,
    pub occupancy: f64,
    pub parent: AsymmetricAtomId,
}

/// A bond between two candidates, referenced by index with `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InferredBond {
    pub first: usize,
    pub second: usize,
    pub boundary: BoundaryType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondingOutcome {
    /// Bonds between candidates not flagged as duplicates, in discovery order.
    pub bonds: Vec<InferredBond>,
    /// Sorted indices of candidates flagged as duplicates.
    pub duplicates: Vec<usize>,
    pub cancelled: bool,
}

impl BondingOutcome {
    fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }
}

/// The frame candidates are bucketed and compared in.
struct Frame<'a> {
    cell: &'a Cell,
    periodic: bool,
    origin: Point3<f64>,
    extent: Vector3<f64>,
}

impl Frame<'_> {
    fn grid_position(&self, position: &Point3<f64>) -> Point3<f64> {
        if self.periodic {
            wrap_fractional(&self.cell.to_fractional(position))
        } else {
            let relative = position - self.origin;
            Point3::new(
                relative.x / self.extent.x,
                relative.y / self.extent.y,
                relative.z / self.extent.z,
            )
        }
    }

    fn widths(&self) -> Vector3<f64> {
        if self.periodic {
            self.cell.perpendicular_widths()
        } else {
            self.extent
        }
    }
}

struct Classifier<'a> {
    candidates: &'a [BondCandidate],
    cell: &'a Cell,
    policy: &'a BondingPolicy,
    bonds: Vec<InferredBond>,
    duplicates: Vec<usize>,
}

impl Classifier<'_> {
    fn classify(&mut self, i: usize, j: usize) {
        let a = &self.candidates[i];
        let b = &self.candidates[j];

        let separation = a.position - b.position;
        let periodic_separation = if self.policy.applies_periodic_boundary {
            self.cell.minimum_image(&separation)
        } else {
            separation
        };
        let bond_criteria = self
            .policy
            .bond_criteria(a.bond_distance_criteria, b.bond_distance_criteria);
        let bond_length = periodic_separation.norm();

        if bond_length < self.policy.duplicate_threshold {
            let both_fully_occupied = a.occupancy >= 1.0 && b.occupancy >= 1.0;
            let same_parent = a.parent == b.parent;
            if self
                .policy
                .duplicate_guard
                .allows(both_fully_occupied, same_parent)
            {
                self.duplicates.push(i.max(j));
            }
        } else if bond_length >= self.policy.minimum_bond_length && bond_length < bond_criteria {
            let boundary = if separation.norm() > bond_criteria {
                BoundaryType::External
            } else {
                BoundaryType::Internal
            };
            self.bonds.push(InferredBond {
                first: i.min(j),
                second: i.max(j),
                boundary,
            });
        }
    }

    fn finish(mut self) -> BondingOutcome {
        self.duplicates.sort_unstable();
        self.duplicates.dedup();
        let duplicates = self.duplicates;
        let bonds = self
            .bonds
            .into_iter()
            .filter(|bond| {
                duplicates.binary_search(&bond.first).is_err()
                    && duplicates.binary_search(&bond.second).is_err()
            })
            .collect();
        BondingOutcome {
            bonds,
            duplicates,
            cancelled: false,
        }
    }
}

/// Finds bonds and duplicate copies among `candidates`.
///
/// Uses a linked-cell list when the frame is wide enough and an all-pairs scan
/// otherwise. Both paths agree whenever every bond criterion is within the cell-list
/// cutoff; longer bonds are only found by the all-pairs scan.
///
/// # Arguments
///
/// * `candidates` - The copies eligible for bonding, in a stable order.
/// * `cell` - The unit cell; ignored for aperiodic policies.
/// * `policy` - Tolerances, periodicity and duplicate guard.
/// * `cancel` - Polled at every checkpoint.
/// * `reporter` - Receives one increment per checkpoint.
///
/// # Return
///
/// The classified bonds and duplicates. A degenerate periodic cell yields an empty
/// outcome; cancellation yields an empty outcome with `cancelled` set.
pub fn infer_bonds(
    candidates: &[BondCandidate],
    cell: &Cell,
    policy: &BondingPolicy,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> BondingOutcome {
    if cancel.is_cancelled() {
        return BondingOutcome::cancelled();
    }
    if policy.applies_periodic_boundary && cell.is_degenerate() {
        warn!("Unit cell is degenerate; no bonds inferred.");
        return BondingOutcome::default();
    }
    if candidates.len() < 2 {
        return BondingOutcome::default();
    }

    let frame = frame_for(candidates, cell, policy);
    let grid_positions: Vec<Point3<f64>> = candidates
        .iter()
        .map(|c| frame.grid_position(&c.position))
        .collect();

    let mut classifier = Classifier {
        candidates,
        cell,
        policy,
        bonds: Vec::new(),
        duplicates: Vec::new(),
    };

    let interval = policy.checkpoint_interval.max(1);
    reporter.report(Progress::PhaseStart {
        name: "Bond Inference",
    });

    let completed = match CellList::build(&grid_positions, &frame.widths(), policy.cell_list_cutoff)
    {
        Some(list) => {
            debug!(
                cells = ?list.number_of_cells(),
                atoms = candidates.len(),
                "Using linked-cell list."
            );
            scan_cells(&list, &mut classifier, interval, cancel, reporter)
        }
        None => {
            debug!(atoms = candidates.len(), "Cell list unusable; scanning all pairs.");
            scan_pairs(candidates.len(), &mut classifier, interval, cancel, reporter)
        }
    };

    reporter.report(Progress::PhaseFinish);
    if !completed {
        debug!("Bond inference cancelled.");
        return BondingOutcome::cancelled();
    }
    classifier.finish()
}

fn frame_for<'a>(
    candidates: &[BondCandidate],
    cell: &'a Cell,
    policy: &BondingPolicy,
) -> Frame<'a> {
    if policy.applies_periodic_boundary {
        return Frame {
            cell,
            periodic: true,
            origin: Point3::origin(),
            extent: Vector3::zeros(),
        };
    }
    // A virtual box around the atoms, padded by the cutoff so that wraparound never
    // places far atoms in neighbouring cells without also checking their distance.
    let padding = Vector3::repeat(policy.cell_list_cutoff);
    let (origin, extent) = match BoundingBox::from_points(candidates.iter().map(|c| &c.position)) {
        Some(bbox) => (bbox.minimum - padding, bbox.widths() + padding * 2.0),
        None => (Point3::origin(), padding * 2.0),
    };
    Frame {
        cell,
        periodic: false,
        origin,
        extent,
    }
}

fn scan_cells(
    list: &CellList,
    classifier: &mut Classifier,
    interval: usize,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> bool {
    let total = list.total_cells();
    reporter.report(Progress::TaskStart {
        total_steps: total.div_ceil(interval) as u64,
    });
    for cell in 0..total {
        if cell % interval == 0 {
            if cancel.is_cancelled() {
                return false;
            }
            trace!(cell, total, "Bond inference checkpoint.");
            reporter.report(Progress::TaskIncrement);
        }
        list.visit_cell(cell, |i, j| classifier.classify(i, j));
    }
    reporter.report(Progress::TaskFinish);
    true
}

fn scan_pairs(
    count: usize,
    classifier: &mut Classifier,
    interval: usize,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> bool {
    reporter.report(Progress::TaskStart {
        total_steps: count.div_ceil(interval) as u64,
    });
    for i in 0..count {
        if i % interval == 0 {
            if cancel.is_cancelled() {
                return false;
            }
            trace!(atom = i, total = count, "Bond inference checkpoint.");
            reporter.report(Progress::TaskIncrement);
        }
        for j in (i + 1)..count {
            classifier.classify(i, j);
        }
    }
    reporter.report(Progress::TaskFinish);
    true
}
