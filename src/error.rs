//! Status codes, the bounded error callstack, and [`EngineError`].

use std::fmt;

pub type EngineResult<T> = Result<T, EngineError>;

/// Stable integer status codes (spec §6). Kept as a separate type from
/// [`EngineError`] so callers embedding this engine can match on the
/// integer without depending on the enum's variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
  NoError = 0,
  OutOfMemory = 10,
  Io = 20,
  InvalidInternalState = 30,
  InternalPanic = 31,
  NotImplemented = 40,
  InvalidArgument = 50,
  NullArgument = 51,
  InvalidDimensions = 52,
  UnsupportedPixelFormat = 53,
  ItemDoesNotExist = 54,
  ImageDecodingFailed = 60,
  ImageEncodingFailed = 61,
  ReportingInconsistency = 90,
  Other = 1024,
}

/// A single callstack frame, recorded at the point a failure is first
/// observed or re-raised.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
  pub file: &'static str,
  pub line: u32,
  pub function: &'static str,
}

/// Bounded error callstack (spec §4.1, §7): at most 8 frames, further
/// pushes are dropped silently rather than growing.
#[derive(Debug, Clone, Default)]
pub struct Callstack {
  frames: [Option<Frame>; 8],
  len: usize,
}
impl Callstack {
  pub fn push(&mut self, frame: Frame) {
    if self.len < self.frames.len() {
      self.frames[self.len] = Some(frame);
      self.len += 1;
    }
  }
  pub fn frames(&self) -> &[Option<Frame>] {
    &self.frames[..self.len]
  }
}

/// Per-context error state: first-error-wins, with a "locked" flag raised
/// once a second failure is suppressed (spec §4.1, §7).
#[derive(Debug, Default)]
pub struct ErrorState {
  error: Option<EngineError>,
  callstack: Callstack,
  locked: bool,
}
impl ErrorState {
  /// Records `err` if no error has been recorded yet; otherwise appends a
  /// callstack frame and sets `locked`, preserving the original error.
  pub fn record(&mut self, err: EngineError, frame: Frame) {
    if self.error.is_none() {
      error!("{err} (at {}:{})", frame.file, frame.line);
      self.error = Some(err);
      self.callstack.push(frame);
    } else {
      warn!("suppressing additional error after first: {err} (at {}:{})", frame.file, frame.line);
      self.locked = true;
      self.callstack.push(frame);
    }
  }

  pub fn is_set(&self) -> bool {
    self.error.is_some()
  }

  pub fn locked(&self) -> bool {
    self.locked
  }

  pub fn error(&self) -> Option<&EngineError> {
    self.error.as_ref()
  }

  pub fn callstack(&self) -> &Callstack {
    &self.callstack
  }

  /// The message spec §7 says the context exposes: the error's own
  /// message, plus every recorded frame.
  pub fn formatted_message(&self) -> String {
    let mut out = match &self.error {
      Some(e) => format!("{e}"),
      None => "no error".to_string(),
    };
    for frame in self.callstack.frames().iter().flatten() {
      out.push_str(&format!("\n  at {}:{} ({})", frame.file, frame.line, frame.function));
    }
    out
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  #[error("out of memory")]
  OutOfMemory,

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid internal state: {0}")]
  InvalidInternalState(String),

  #[error("internal panic: {0}")]
  InternalPanic(String),

  #[error("not implemented: {0}")]
  NotImplemented(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("null argument: {0}")]
  NullArgument(&'static str),

  #[error("invalid dimensions: {0}")]
  InvalidDimensions(String),

  #[error("unsupported pixel format: {0}")]
  UnsupportedPixelFormat(String),

  #[error("item does not exist: {0}")]
  ItemDoesNotExist(&'static str),

  #[error("image decoding failed: {0}")]
  ImageDecodingFailed(String),

  #[error("image encoding failed: {0}")]
  ImageEncodingFailed(String),
}
impl EngineError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      Self::OutOfMemory => StatusCode::OutOfMemory,
      Self::Io(_) => StatusCode::Io,
      Self::InvalidInternalState(_) => StatusCode::InvalidInternalState,
      Self::InternalPanic(_) => StatusCode::InternalPanic,
      Self::NotImplemented(_) => StatusCode::NotImplemented,
      Self::InvalidArgument(_) => StatusCode::InvalidArgument,
      Self::NullArgument(_) => StatusCode::NullArgument,
      Self::InvalidDimensions(_) => StatusCode::InvalidDimensions,
      Self::UnsupportedPixelFormat(_) => StatusCode::UnsupportedPixelFormat,
      Self::ItemDoesNotExist(_) => StatusCode::ItemDoesNotExist,
      Self::ImageDecodingFailed(_) => StatusCode::ImageDecodingFailed,
      Self::ImageEncodingFailed(_) => StatusCode::ImageEncodingFailed,
    }
  }
}

/// Records `$err` into `$ctx`'s error state at the call site, matching the
/// "deepest detector records, callers append frames" policy of spec §7.
#[macro_export]
macro_rules! record_error {
  ($ctx:expr, $err:expr) => {{
    let frame = $crate::error::Frame { file: file!(), line: line!(), function: "" };
    $ctx.error_state_mut().record($err, frame);
  }};
}

impl fmt::Display for StatusCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", *self as i32)
  }
}
