//! The scoped ownership heap (spec §3 "Context", §4.1).

mod arena;
#[cfg(feature = "profiling")]
pub mod profiling;

pub use arena::{AllocKey, Destructor, Owner};

use crate::color::ColorContext;
use crate::error::{ErrorState, Frame};
use std::collections::HashMap;
use std::marker::PhantomData;

/// Codec identifiers (spec §6 "Codec ids").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
  DecodePng,
  EncodePng,
  DecodeJpeg,
  EncodeJpeg,
}

#[derive(Debug, Clone, Copy)]
pub struct CodecDefinition {
  pub id: CodecId,
  pub extension: &'static str,
  pub mime_type: &'static str,
}

fn builtin_codecs() -> HashMap<CodecId, CodecDefinition> {
  use CodecId::*;
  [
    (DecodeJpeg, CodecDefinition { id: DecodeJpeg, extension: "jpg", mime_type: "image/jpeg" }),
    (EncodeJpeg, CodecDefinition { id: EncodeJpeg, extension: "jpg", mime_type: "image/jpeg" }),
    (DecodePng, CodecDefinition { id: DecodePng, extension: "png", mime_type: "image/png" }),
    (EncodePng, CodecDefinition { id: EncodePng, extension: "png", mime_type: "image/png" }),
  ]
  .into_iter()
  .collect()
}

/// Root owner of every allocation, codec state, and the error record
/// (spec §3, §4.1). Replaces the source's process-wide codec table with a
/// per-context registry (Design Note "Global state").
///
/// `Context` carries no `Send`/`Sync` impl: everything reachable through
/// it is non-shareable across threads (spec §5), which this type encodes
/// structurally via a `PhantomData<*const ()>` marker rather than a
/// runtime check.
pub struct Context {
  arena: arena::Arena,
  error_state: ErrorState,
  color: ColorContext,
  codecs: HashMap<CodecId, CodecDefinition>,
  #[cfg(feature = "profiling")]
  profiling: Option<profiling::ProfileLog>,
  _not_send_sync: PhantomData<*const ()>,
}
impl Default for Context {
  fn default() -> Self {
    Self::new()
  }
}
impl Context {
  pub fn new() -> Self {
    Self {
      arena: arena::Arena::default(),
      error_state: ErrorState::default(),
      color: ColorContext::default(),
      codecs: builtin_codecs(),
      #[cfg(feature = "profiling")]
      profiling: None,
      _not_send_sync: PhantomData,
    }
  }

  #[cfg(feature = "profiling")]
  pub fn with_profiling() -> Self {
    let mut ctx = Self::new();
    ctx.profiling = Some(profiling::ProfileLog::default());
    ctx
  }

  pub fn color(&self) -> &ColorContext {
    &self.color
  }

  pub fn set_color(&mut self, color: ColorContext) {
    self.color = color;
  }

  pub fn register_codec(&mut self, def: CodecDefinition) {
    self.codecs.insert(def.id, def);
  }

  pub fn codec(&self, id: CodecId) -> Option<&CodecDefinition> {
    self.codecs.get(&id)
  }

  pub fn allocate(&mut self, byte_count: usize, owner: Owner, destructor: Option<Destructor>) -> AllocKey {
    self.arena.allocate(byte_count, owner, destructor, "context", 0)
  }

  pub fn reallocate(&mut self, key: AllocKey, new_size: usize) -> crate::error::EngineResult<()> {
    self.arena.reallocate(key, new_size)
  }

  pub fn reparent(&mut self, key: AllocKey, new_owner: Owner) -> crate::error::EngineResult<()> {
    self.arena.reparent(key, new_owner)
  }

  pub fn set_destructor(&mut self, key: AllocKey, destructor: Destructor) -> crate::error::EngineResult<()> {
    self.arena.set_destructor(key, destructor)
  }

  /// Recursively destroys `key` and everything it owns, recording any
  /// destructor failures into the error state instead of stopping
  /// cleanup (spec §4.1).
  pub fn destroy(&mut self, key: AllocKey) {
    let failures = self.arena.destroy(key);
    for f in failures {
      self.error_state.record(f, Frame { file: file!(), line: line!(), function: "destroy" });
    }
  }

  /// Two-phase shutdown (spec §3): release every block owned by the
  /// context, then the registry itself is dropped with `self`.
  pub fn destroy_all(&mut self) {
    debug!("tearing down context: {} live allocations", self.arena.live_count());
    let failures = self.arena.destroy_all_owned_by(Owner::Context);
    for f in failures {
      self.error_state.record(f, Frame { file: file!(), line: line!(), function: "destroy_all" });
    }
  }

  pub fn live_allocation_count(&self) -> usize {
    self.arena.live_count()
  }

  pub fn error_state(&self) -> &ErrorState {
    &self.error_state
  }

  pub fn error_state_mut(&mut self) -> &mut ErrorState {
    &mut self.error_state
  }

  #[cfg(feature = "profiling")]
  pub fn profiling_mut(&mut self) -> Option<&mut profiling::ProfileLog> {
    self.profiling.as_mut()
  }
}
impl Drop for Context {
  fn drop(&mut self) {
    self.destroy_all();
  }
}
