//! DSP-runtime collaborator boundary and the render-thread handle.
//!
//! The runtime's structural identity (construction, replacement, teardown) is
//! owned by the main thread; its `process` entry point is invoked from the
//! render thread. The two meet in [`RuntimeSlot`], an atomically swapped
//! pointer: the render thread pins the current instance once per block, so an
//! instance retired during re-initialization is freed only after the last
//! in-flight render call drops its pin.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use beltane_types::{DspError, InstructionBatch, RenderFormat, Snapshot};

/// The external engine that executes the signal-processing graph.
///
/// `apply_instructions` must be all-or-nothing: a rejected batch leaves the
/// prior graph unchanged. `process` must be safe to call from the render
/// thread while instructions are applied on the main thread; the bridge
/// guarantees it never races with instance teardown.
pub trait DspRuntime: Send + Sync {
    /// Render one block. `input` and `output` are planar channel buffers of
    /// at least `frames` samples each.
    fn process(&self, input: &[&[f32]], output: &mut [&mut [f32]], frames: usize);

    /// Apply one instruction batch atomically.
    fn apply_instructions(&self, batch: &InstructionBatch) -> Result<(), DspError>;

    /// Capture the runtime's internal state for hydration.
    fn snapshot(&self) -> Snapshot;
}

/// Constructs runtime instances against a render format. Called on the main
/// thread during (re)initialization.
pub trait DspRuntimeFactory {
    fn create_runtime(&self, format: RenderFormat) -> Result<Box<dyn DspRuntime>, String>;
}

/// Sized holder so the swap slot stores a thin pointer.
pub struct RuntimeCell {
    runtime: Box<dyn DspRuntime>,
}

impl RuntimeCell {
    pub fn runtime(&self) -> &dyn DspRuntime {
        self.runtime.as_ref()
    }
}

/// Atomically swapped slot holding the currently published runtime instance.
pub struct RuntimeSlot {
    inner: ArcSwapOption<RuntimeCell>,
}

impl RuntimeSlot {
    pub fn empty() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    /// Publish a freshly constructed instance, retiring the previous one.
    pub fn publish(&self, runtime: Box<dyn DspRuntime>) {
        self.inner.store(Some(Arc::new(RuntimeCell { runtime })));
    }

    /// Retire the current instance. Render calls already holding a pin finish
    /// against it; new render calls see silence.
    pub fn clear(&self) {
        self.inner.store(None);
    }

    /// Main-thread access to the current instance, if any.
    pub fn current(&self) -> Option<Arc<RuntimeCell>> {
        self.inner.load_full()
    }

    pub fn is_published(&self) -> bool {
        self.inner.load().is_some()
    }
}

/// Render-thread handle: the only part of the bridge the audio callback
/// touches. Lock-free and allocation-free.
#[derive(Clone)]
pub struct RenderHandle {
    slot: Arc<RuntimeSlot>,
}

impl RenderHandle {
    pub(crate) fn new(slot: Arc<RuntimeSlot>) -> Self {
        Self { slot }
    }

    /// Render one block through the published runtime, or fill the output
    /// with silence when none is published (not ready, or mid-reinit).
    pub fn process(&self, input: &[&[f32]], output: &mut [&mut [f32]], frames: usize) {
        // Pin once per block; the guard defers reclamation of a concurrently
        // retired instance until this call returns.
        let guard = self.slot.inner.load();
        match &*guard {
            Some(cell) => cell.runtime().process(input, output, frames),
            None => {
                for channel in output.iter_mut() {
                    let n = frames.min(channel.len());
                    channel[..n].fill(0.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRuntime {
        processed: Arc<AtomicUsize>,
    }

    impl DspRuntime for CountingRuntime {
        fn process(&self, _input: &[&[f32]], output: &mut [&mut [f32]], frames: usize) {
            self.processed.fetch_add(1, Ordering::SeqCst);
            for channel in output.iter_mut() {
                channel[..frames].fill(1.0);
            }
        }

        fn apply_instructions(&self, _batch: &InstructionBatch) -> Result<(), DspError> {
            Ok(())
        }

        fn snapshot(&self) -> Snapshot {
            Snapshot::new(serde_json::json!({}))
        }
    }

    #[test]
    fn render_is_silent_without_a_published_runtime() {
        let slot = Arc::new(RuntimeSlot::empty());
        let handle = RenderHandle::new(Arc::clone(&slot));

        let mut left = [0.7f32; 8];
        let mut right = [0.7f32; 8];
        let mut output: [&mut [f32]; 2] = [&mut left, &mut right];
        handle.process(&[], &mut output, 8);

        assert!(left.iter().all(|&s| s == 0.0));
        assert!(right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn render_uses_the_published_runtime() {
        let slot = Arc::new(RuntimeSlot::empty());
        let handle = RenderHandle::new(Arc::clone(&slot));
        let processed = Arc::new(AtomicUsize::new(0));
        slot.publish(Box::new(CountingRuntime {
            processed: Arc::clone(&processed),
        }));

        let mut left = [0.0f32; 8];
        let mut output: [&mut [f32]; 1] = [&mut left];
        handle.process(&[], &mut output, 8);

        assert_eq!(processed.load(Ordering::SeqCst), 1);
        assert!(left.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn clearing_the_slot_mutes_subsequent_blocks() {
        let slot = Arc::new(RuntimeSlot::empty());
        let handle = RenderHandle::new(Arc::clone(&slot));
        slot.publish(Box::new(CountingRuntime {
            processed: Arc::new(AtomicUsize::new(0)),
        }));
        slot.clear();
        assert!(!slot.is_published());

        let mut left = [0.9f32; 4];
        let mut output: [&mut [f32]; 1] = [&mut left];
        handle.process(&[], &mut output, 4);
        assert!(left.iter().all(|&s| s == 0.0));
    }
}
