//! The effect bridge: canonical state ownership, the (re)initialization
//! state machine, and the main-thread reconcile/dispatch cycle.
//!
//! Thread roles:
//! - render/host threads touch only [`BridgeHandle`] (atomic stores + a
//!   coalesced wake) and [`RenderHandle`] (pinned runtime pointer),
//! - the main thread owns [`EffectBridge`]: canonical state, the script
//!   context, and the runtime's structural identity.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use beltane_types::{ErrorKind, Manifest, ParameterDescriptor, RenderFormat, ViewMessage};

use crate::config::Config;
use crate::dispatch;
use crate::instruction::{self, PendingErrors};
use crate::persistence;
use crate::readout::ParameterReadouts;
use crate::runtime::{DspRuntimeFactory, RenderHandle, RuntimeSlot};
use crate::script::{
    HostBindings, ScriptContext, ScriptEngineFactory, ScriptLogLevel, HYDRATION_RECEIVER,
};
use crate::state::CanonicalState;
use crate::view::{UiView, ViewSlot};

/// Lifecycle phase of the script context + DSP runtime pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Uninitialized,
    Initializing,
    Ready,
}

/// State shared across threads: parameter readouts, the pending-init flag,
/// the last-known render format, and the runtime slot.
pub(crate) struct SharedControl {
    descriptors: Arc<[ParameterDescriptor]>,
    readouts: ParameterReadouts,
    needs_init: AtomicBool,
    update_pending: AtomicBool,
    sample_rate_bits: AtomicU64,
    block_size: AtomicU32,
    slot: Arc<RuntimeSlot>,
    tick_tx: Sender<()>,
}

impl SharedControl {
    pub(crate) fn sample_rate(&self) -> f64 {
        f64::from_bits(self.sample_rate_bits.load(Ordering::Acquire))
    }

    fn render_format(&self) -> RenderFormat {
        RenderFormat::new(self.sample_rate(), self.block_size.load(Ordering::Acquire))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.id == id)
    }

    /// Coalesced main-thread wake: at most one tick request is ever in
    /// flight. Wait-free; safe from the render thread.
    fn request_tick(&self) {
        if !self.update_pending.swap(true, Ordering::AcqRel) {
            let _ = self.tick_tx.try_send(());
        }
    }
}

/// Cheap, cloneable, any-thread handle onto the bridge.
#[derive(Clone)]
pub struct BridgeHandle {
    shared: Arc<SharedControl>,
}

impl BridgeHandle {
    /// Host render-format notification. Callable from the render thread or
    /// the main thread; never performs the heavy work itself. A change flags
    /// a one-shot re-initialization; either way the main thread is woken so
    /// it can push current state.
    pub fn prepare_to_render(&self, format: RenderFormat) {
        let bits = format.sample_rate.to_bits();
        let changed = self.shared.sample_rate_bits.load(Ordering::Acquire) != bits
            || self.shared.block_size.load(Ordering::Acquire) != format.block_size;

        if changed {
            self.shared.sample_rate_bits.store(bits, Ordering::Release);
            self.shared.block_size.store(format.block_size, Ordering::Release);
            self.shared.needs_init.store(true, Ordering::Release);
        }

        self.shared.request_tick();
    }

    /// Host parameter notification: store into the dirty list and wake the
    /// main thread. Wait-free, allocation-free; the value is clamped to the
    /// declared range.
    pub fn write_parameter(&self, index: usize, value: f32) {
        if let Some(descriptor) = self.shared.descriptors.get(index) {
            self.shared
                .readouts
                .write(index, descriptor.clamp(value as f64) as f32);
            self.shared.request_tick();
        }
    }

    /// Declared parameter list, for host-side UI generation.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.shared.descriptors
    }

    /// Last-known render sample rate (0.0 before the first prepare).
    pub fn sample_rate(&self) -> f64 {
        self.shared.sample_rate()
    }

    /// Ask the main thread for a tick without flagging anything.
    pub fn request_tick(&self) {
        self.shared.request_tick();
    }
}

/// Main-thread owner of the bridge.
pub struct EffectBridge {
    shared: Arc<SharedControl>,
    state: CanonicalState,
    phase: BridgePhase,
    script: Option<Box<dyn ScriptContext>>,
    view: Arc<ViewSlot>,
    pending_errors: Arc<PendingErrors>,
    runtime_factory: Box<dyn DspRuntimeFactory>,
    script_factory: Box<dyn ScriptEngineFactory>,
    assets_dir: PathBuf,
    config: Config,
    parameter_hook: Option<Box<dyn Fn(usize, f64)>>,
}

impl EffectBridge {
    /// Construct against a resolved asset directory, declaring parameters
    /// from the manifest file. A missing or malformed manifest yields an
    /// empty parameter set rather than a failure.
    ///
    /// Returns the bridge plus the tick request line the host's main loop
    /// must service by calling [`EffectBridge::tick`].
    pub fn new(
        assets_dir: PathBuf,
        config: Config,
        runtime_factory: Box<dyn DspRuntimeFactory>,
        script_factory: Box<dyn ScriptEngineFactory>,
    ) -> (Self, Receiver<()>) {
        let manifest_path = assets_dir.join(config.manifest_file());
        let manifest = match std::fs::read_to_string(&manifest_path) {
            Ok(text) => Manifest::from_json_str(&text),
            Err(e) => {
                log::warn!(target: "bridge", "could not read manifest {}: {}", manifest_path.display(), e);
                Manifest::default()
            }
        };

        Self::with_parameters(
            manifest.parameters,
            assets_dir,
            config,
            runtime_factory,
            script_factory,
        )
    }

    /// Construct with an explicit parameter declaration, bypassing the
    /// manifest file.
    pub fn with_parameters(
        descriptors: Vec<ParameterDescriptor>,
        assets_dir: PathBuf,
        config: Config,
        runtime_factory: Box<dyn DspRuntimeFactory>,
        script_factory: Box<dyn ScriptEngineFactory>,
    ) -> (Self, Receiver<()>) {
        let (tick_tx, tick_rx) = crossbeam_channel::bounded(1);
        let descriptors: Arc<[ParameterDescriptor]> = descriptors.into();

        let shared = Arc::new(SharedControl {
            readouts: ParameterReadouts::declare(&descriptors),
            descriptors: Arc::clone(&descriptors),
            needs_init: AtomicBool::new(false),
            update_pending: AtomicBool::new(false),
            sample_rate_bits: AtomicU64::new(0.0f64.to_bits()),
            block_size: AtomicU32::new(0),
            slot: Arc::new(RuntimeSlot::empty()),
            tick_tx,
        });

        let bridge = Self {
            state: CanonicalState::from_descriptors(&descriptors),
            shared,
            phase: BridgePhase::Uninitialized,
            script: None,
            view: Arc::new(ViewSlot::new()),
            pending_errors: Arc::new(PendingErrors::default()),
            runtime_factory,
            script_factory,
            assets_dir,
            config,
            parameter_hook: None,
        };

        (bridge, tick_rx)
    }

    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn render_handle(&self) -> RenderHandle {
        RenderHandle::new(Arc::clone(&self.shared.slot))
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.shared.descriptors
    }

    pub fn canonical_state(&self) -> &CanonicalState {
        &self.state
    }

    /// Register the host parameter-change subscriber, invoked synchronously
    /// when the UI edits a parameter. Exactly one; re-registering replaces.
    pub fn set_parameter_change_hook(&mut self, hook: Box<dyn Fn(usize, f64)>) {
        self.parameter_hook = Some(hook);
    }

    // ── Main-thread cycle ─────────────────────────────────────────

    /// One main-thread tick: run a pending re-initialization, reconcile the
    /// dirty list into canonical state, and dispatch. Dispatch runs
    /// unconditionally, even on an empty drain, since
    /// the dispatch is idempotent and consumers rely on re-announcement.
    pub fn tick(&mut self) {
        self.shared.update_pending.store(false, Ordering::Release);

        if self.shared.needs_init.swap(false, Ordering::AcqRel) {
            self.initialize();
        }

        self.reconcile();
        self.dispatch_state_change();
        self.flush_pending_errors();
    }

    fn reconcile(&mut self) {
        for (index, value) in self.shared.readouts.drain_dirty() {
            let id = &self.shared.descriptors[index].id;
            self.state.set(id, value as f64);
        }
    }

    /// Serialize the full canonical state (plus derived fields) and deliver
    /// it UI-first, script-second.
    pub fn dispatch_state_change(&mut self) {
        let payload = self.state.dispatch_payload(self.shared.sample_rate());
        dispatch::dispatch_state_change(&payload, &self.view, self.script.as_deref_mut());
    }

    /// Deliver an error record to the UI and the script error receiver.
    pub fn dispatch_error(&mut self, kind: ErrorKind, message: &str) {
        dispatch::dispatch_error(kind, message, &self.view, self.script.as_deref_mut());
    }

    fn flush_pending_errors(&mut self) {
        for (kind, message) in self.pending_errors.drain() {
            self.dispatch_error(kind, &message);
        }
    }

    // ── (Re)initialization ────────────────────────────────────────

    /// Tear down the previous script context and runtime instance, build
    /// fresh ones against the latest render format, evaluate the entry file,
    /// and hydrate. On any failure the bridge stays out of `Ready` and render
    /// calls remain silent until the next format change or dev reload.
    fn initialize(&mut self) {
        self.phase = BridgePhase::Initializing;
        self.script = None;
        // Retire the old instance; in-flight batches for it are dropped and
        // the render thread sees silence until the new one is published.
        self.shared.slot.clear();

        let format = self.shared.render_format();

        let runtime = match self.runtime_factory.create_runtime(format) {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!(target: "bridge", "dsp runtime construction failed: {}", e);
                self.phase = BridgePhase::Uninitialized;
                return;
            }
        };

        let mut script = match self.script_factory.create_context(self.bindings()) {
            Ok(script) => script,
            Err(e) => {
                log::warn!(target: "bridge", "script context construction failed: {}", e);
                self.phase = BridgePhase::Uninitialized;
                return;
            }
        };

        let entry_path = self.assets_dir.join(self.config.entry_file());
        let source = match std::fs::read_to_string(&entry_path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!(target: "bridge", "could not read script entry {}: {}", entry_path.display(), e);
                self.phase = BridgePhase::Uninitialized;
                return;
            }
        };

        if let Err(e) = script.evaluate(&source) {
            log::warn!(target: "bridge", "script entry evaluation failed: {}", e);
            self.phase = BridgePhase::Uninitialized;
            return;
        }

        // Capture the fresh instance's state, publish it (instruction batches
        // are accepted from here on), then hydrate. The main thread is serial,
        // so nothing can slip a batch in between publish and hydration.
        let snapshot = runtime.snapshot();
        self.shared.slot.publish(runtime);

        match script.invoke_entry_point(HYDRATION_RECEIVER, snapshot.as_value()) {
            Ok(_) => {}
            Err(e) => log::warn!(target: "script", "hydration receiver failed: {}", e),
        }

        self.script = Some(script);
        self.phase = BridgePhase::Ready;
        log::info!(target: "bridge", "initialized at {} Hz, block size {}", format.sample_rate, format.block_size);
    }

    /// Native functions handed to every fresh script context.
    fn bindings(&self) -> HostBindings {
        let shared = Arc::clone(&self.shared);
        let sample_rate: Arc<dyn Fn() -> f64 + Send + Sync> =
            Arc::new(move || shared.sample_rate());

        let slot = Arc::clone(&self.shared.slot);
        let errors = Arc::clone(&self.pending_errors);
        let post_instructions: Arc<dyn Fn(&str) + Send + Sync> =
            Arc::new(move |batch_json: &str| {
                // The script context is mid-evaluation here, so failures are
                // queued and dispatched after the evaluation returns.
                if let Err((kind, message)) = instruction::apply_batch(&slot, batch_json) {
                    errors.push(kind, message);
                }
            });

        let view = Arc::clone(&self.view);
        let log: Arc<dyn Fn(ScriptLogLevel, &[serde_json::Value]) + Send + Sync> =
            Arc::new(move |level: ScriptLogLevel, args: &[serde_json::Value]| {
                instruction::route_script_log(&view, level, args);
            });

        HostBindings {
            sample_rate,
            post_instructions,
            log,
        }
    }

    // ── Inbound surfaces ──────────────────────────────────────────

    /// Apply an instruction batch arriving from outside the script context
    /// (the UI path). Failures dispatch synchronously; batches with no
    /// published runtime are dropped.
    pub fn receive_instructions(&mut self, batch_json: &str) {
        if let Err((kind, message)) = instruction::apply_batch(&self.shared.slot, batch_json) {
            self.dispatch_error(kind, &message);
        }
    }

    /// Handle one message from the attached view.
    pub fn handle_view_message(&mut self, message: ViewMessage) {
        match message {
            ViewMessage::Ready => {
                // The view has just installed its hooks; push current state.
                self.dispatch_state_change();
            }
            ViewMessage::Reload => {
                if !self.config.dev_reload() {
                    log::debug!(target: "bridge", "ignoring reload outside dev mode");
                    return;
                }
                self.shared.needs_init.store(true, Ordering::Release);
                self.tick();
            }
            ViewMessage::SetParameterValue { param_id, value } => {
                let index = match self.shared.index_of(&param_id) {
                    Some(index) => index,
                    None => {
                        log::debug!(target: "params", "unknown parameter id {}", param_id);
                        return;
                    }
                };
                let clamped = self.shared.descriptors[index].clamp(value);
                if let Some(hook) = &self.parameter_hook {
                    hook(index, clamped);
                }
                self.shared.readouts.write(index, clamped as f32);
                self.shared.request_tick();
            }
        }
    }

    // ── View attachment ───────────────────────────────────────────

    pub fn attach_view(&self, view: &Arc<dyn UiView + Send + Sync>) {
        self.view.attach(view);
    }

    pub fn detach_view(&self) {
        self.view.detach();
    }

    // ── Persisted state ───────────────────────────────────────────

    /// Serialize the canonical state, restricted to declared parameter ids,
    /// for host-side storage.
    pub fn save_state(&self) -> Vec<u8> {
        persistence::store(&self.state)
    }

    /// Restore canonical values from a previously stored blob. Unknown keys
    /// and malformed blobs are ignored; a tick is requested so the restored
    /// state is re-announced.
    pub fn load_state(&mut self, blob: &[u8]) {
        persistence::load(&mut self.state, blob);
        self.shared.request_tick();
    }
}
