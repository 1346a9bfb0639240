//! # beltane-core
//!
//! Control plane for a script-defined real-time audio effect: the bridge
//! between a deadline-bound render thread, the cooperative main thread, an
//! embedded script engine, and an optional detached UI. The DSP runtime and
//! the script engine are external collaborators reached through traits; this
//! crate owns the cross-thread state synchronization between them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beltane_core::bridge::EffectBridge;
//! use beltane_core::config::Config;
//! use beltane_types::{RenderFormat, ViewMessage};
//!
//! // 1. Construct against a resolved asset directory and the two
//! //    collaborator factories. Parameters come from the manifest file.
//! let (mut bridge, ticks) =
//!     EffectBridge::new(assets_dir, Config::load(), runtime_factory, script_factory);
//!
//! // 2. Hand the render handle to the audio callback and the bridge handle
//! //    to the host lifecycle/parameter callbacks.
//! let render = bridge.render_handle();
//! let handle = bridge.handle();
//!
//! // 3. Host notifications (any thread): format changes flag a one-shot
//! //    re-initialization; parameter writes land in the lock-free dirty list.
//! handle.prepare_to_render(RenderFormat::new(48_000.0, 512));
//! handle.write_parameter(0, 0.8);
//!
//! // 4. Service the tick line on the main thread: each tick runs a pending
//! //    init, drains the dirty list into canonical state, and dispatches.
//! while ticks.recv().is_ok() {
//!     bridge.tick();
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`bridge`] — `EffectBridge` (main thread), `BridgeHandle` (any thread),
//!   the lifecycle state machine, and the reconcile/dispatch tick
//! - [`readout`] — lock-free per-parameter dirty list crossing the thread gap
//! - [`state`] — `CanonicalState`, the authoritative id → value mapping
//! - [`runtime`] — DSP-runtime collaborator traits and the render handle over
//!   an atomically swapped instance slot
//! - [`script`] — script-engine collaborator traits, host bindings, and the
//!   well-known entry point names
//! - [`dispatch`] — UI-first/script-second state and error delivery
//! - [`instruction`] — inbound batch application and script log routing
//! - [`view`] — weak attachment of an optional detached UI view
//! - [`persistence`] — the flat id → value persisted-state blob
//! - [`config`] — TOML configuration (embedded defaults + user override)

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod instruction;
pub mod persistence;
pub mod readout;
pub mod runtime;
pub mod script;
pub mod state;
pub mod view;

pub use bridge::{BridgeHandle, BridgePhase, EffectBridge};
pub use config::Config;
pub use runtime::{DspRuntime, DspRuntimeFactory, RenderHandle};
pub use script::{HostBindings, ScriptContext, ScriptEngineFactory, ScriptLogLevel};
pub use state::CanonicalState;
pub use view::UiView;
