//! Lock-free parameter dirty-list shared between the render/host threads and
//! the main thread.
//!
//! Each declared parameter owns one atomic slot packing its latest value and
//! a dirty flag into a single word. Writers store unconditionally, so rapid
//! successive writes coalesce to the most recent value; the main thread
//! exchanges the slot on drain, so a burst of writes between two drains
//! produces exactly one notification and no update is ever lost.

use std::sync::atomic::{AtomicU64, Ordering};

use beltane_types::ParameterDescriptor;

/// Bit 32 marks the slot as written-since-last-drain. Low 32 bits hold the
/// value's f32 representation.
const DIRTY_BIT: u64 = 1 << 32;

fn pack(value: f32, dirty: bool) -> u64 {
    let bits = u64::from(value.to_bits());
    if dirty {
        bits | DIRTY_BIT
    } else {
        bits
    }
}

fn unpack(bits: u64) -> (f32, bool) {
    (f32::from_bits(bits as u32), bits & DIRTY_BIT != 0)
}

/// Fixed-size array of per-parameter readout slots.
///
/// The render thread (or any host notification thread) is the writer; the
/// main thread is the sole drainer. `write` is wait-free, allocation-free and
/// O(1).
pub struct ParameterReadouts {
    slots: Box<[AtomicU64]>,
}

impl ParameterReadouts {
    /// Declare the parameter set. One slot per descriptor, initialized to the
    /// declared default with the dirty flag clear.
    pub fn declare(descriptors: &[ParameterDescriptor]) -> Self {
        let slots = descriptors
            .iter()
            .map(|d| AtomicU64::new(pack(d.default as f32, false)))
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a new value into slot `index`, unconditionally marking it dirty.
    /// Out-of-range indices are ignored. Safe to call from the render thread.
    pub fn write(&self, index: usize, value: f32) {
        if let Some(slot) = self.slots.get(index) {
            slot.store(pack(value, true), Ordering::Release);
        }
    }

    /// Exchange every slot with a clean placeholder and return the
    /// `(index, value)` pairs whose previous dirty flag was set, in ascending
    /// index order. Main thread only.
    ///
    /// The exchanged-in value is arbitrary: the next drain only trusts it if
    /// the dirty flag has been set again by an intervening write.
    pub fn drain_dirty(&self) -> Vec<(usize, f32)> {
        let mut changed = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let (value, dirty) = unpack(slot.swap(pack(0.0, false), Ordering::AcqRel));
            if dirty {
                changed.push((index, value));
            }
        }
        changed
    }
}
