//! CLI front end (SPEC_FULL §6): `imageflow-rs <input> <output> [options]`.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use imageflow_rs::context::Context;
use imageflow_rs::error::EngineError;
use imageflow_rs::filters::InterpolationFilter;
use imageflow_rs::pipeline::{self, FillSpec, Flip, ImageFormat, PipelineOptions, RectSpec};
use imageflow_rs::Config;

/// Decode, transform, and re-encode one image.
#[derive(Parser, Debug)]
#[command(name = "imageflow-rs", version, about)]
struct Args {
  input: String,
  output: String,

  /// Interpolation filter used for --scale (see spec §4.5 for the full list).
  #[arg(long, default_value = "robidoux")]
  filter: String,

  /// Target dimensions, "WxH".
  #[arg(long)]
  scale: Option<String>,

  #[arg(long, default_value_t = 0.0)]
  sharpen: f32,

  /// "x1,y1,x2,y2"
  #[arg(long)]
  crop: Option<String>,

  /// "x1,y1,x2,y2,RRGGBBAA"
  #[arg(long)]
  fill: Option<String>,

  #[arg(long, value_enum)]
  flip: Option<FlipArg>,

  #[arg(long, default_value_t = 0)]
  rotate: u16,

  #[arg(long, default_value_t = false)]
  trim: bool,

  /// "RRGGBBAA", used as the scale canvas background.
  #[arg(long)]
  matte: Option<String>,

  #[arg(long, default_value_t = 90)]
  quality: u8,

  #[arg(long = "png-compression", default_value_t = -1)]
  png_compression: i32,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FlipArg {
  H,
  V,
}

fn parse_filter(name: &str) -> Result<InterpolationFilter, EngineError> {
  use InterpolationFilter::*;
  Ok(match name.to_ascii_lowercase().as_str() {
    "triangle" | "bilinear" => Triangle,
    "box" => Box,
    "cubicbspline" | "bspline" => CubicBSpline,
    "catmullrom" => CatmullRom,
    "mitchell" => Mitchell,
    "robidoux" => Robidoux,
    "robidouxsharp" => RobidouxSharp,
    "hermite" => Hermite,
    "cubicfast" => CubicFast,
    "lanczos2" => Lanczos2,
    "lanczos3" | "lanczos" => Lanczos3,
    "lanczos2sharp" => Lanczos2Sharp,
    "lanczos3sharp" | "lanczossharp" => Lanczos3Sharp,
    "rawlanczos2" => RawLanczos2,
    "rawlanczos3" => RawLanczos3,
    "ginseng" => Ginseng,
    "ginsengsharp" => GinsengSharp,
    "jinc" => Jinc,
    "fastest" => Fastest,
    other => return Err(EngineError::InvalidArgument(format!("unknown filter: {other}"))),
  })
}

fn parse_rect(s: &str) -> Result<RectSpec, EngineError> {
  let parts: Vec<u32> = s
    .split(',')
    .map(|p| p.trim().parse::<u32>())
    .collect::<Result<_, _>>()
    .map_err(|_| EngineError::InvalidArgument(format!("malformed rect: {s}")))?;
  match parts[..] {
    [x1, y1, x2, y2] => Ok(RectSpec { x1, y1, x2, y2 }),
    _ => Err(EngineError::InvalidArgument(format!("rect needs 4 components: {s}"))),
  }
}

fn parse_color(s: &str) -> Result<[u8; 4], EngineError> {
  if s.len() != 8 {
    return Err(EngineError::InvalidArgument(format!("color must be 8 hex digits RRGGBBAA: {s}")));
  }
  let byte = |i: usize| -> Result<u8, EngineError> {
    u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
      .map_err(|_| EngineError::InvalidArgument(format!("bad hex in color: {s}")))
  };
  let (r, g, b, a) = (byte(0)?, byte(1)?, byte(2)?, byte(3)?);
  Ok([b, g, r, a])
}

fn parse_fill(s: &str) -> Result<FillSpec, EngineError> {
  let parts: Vec<&str> = s.split(',').collect();
  if parts.len() != 5 {
    return Err(EngineError::InvalidArgument(format!("fill needs x1,y1,x2,y2,RRGGBBAA: {s}")));
  }
  let rect = parse_rect(&parts[..4].join(","))?;
  let color = parse_color(parts[4])?;
  Ok(FillSpec { rect, color })
}

fn parse_size(s: &str) -> Result<(u32, u32), EngineError> {
  let (w, h) = s
    .split_once('x')
    .ok_or_else(|| EngineError::InvalidArgument(format!("scale must be WxH: {s}")))?;
  let w: u32 = w.parse().map_err(|_| EngineError::InvalidArgument(format!("bad width: {w}")))?;
  let h: u32 = h.parse().map_err(|_| EngineError::InvalidArgument(format!("bad height: {h}")))?;
  Ok((w, h))
}

fn build_options(args: &Args) -> Result<PipelineOptions, EngineError> {
  Ok(PipelineOptions {
    crop: args.crop.as_deref().map(parse_rect).transpose()?,
    trim: args.trim,
    trim_threshold: 1,
    fill: args.fill.as_deref().map(parse_fill).transpose()?,
    target_size: args.scale.as_deref().map(parse_size).transpose()?,
    filter: parse_filter(&args.filter)?,
    sharpen_percent: args.sharpen,
    flip: args.flip.map(|f| match f {
      FlipArg::H => Flip::Horizontal,
      FlipArg::V => Flip::Vertical,
    }),
    rotate_degrees: args.rotate,
    matte: args.matte.as_deref().map(parse_color).transpose()?,
    jpeg_quality: args.quality,
    png_zlib_level: args.png_compression,
    disable_png_alpha: false,
  })
}

fn run(args: &Args) -> Result<(), EngineError> {
  let config = Config::default();
  config.init_logging();

  let input_bytes = std::fs::read(&args.input).map_err(EngineError::Io)?;
  let input_format = ImageFormat::from_extension(
    Path::new(&args.input).extension().and_then(|e| e.to_str()).unwrap_or(""),
  )?;
  let output_format = ImageFormat::from_extension(
    Path::new(&args.output).extension().and_then(|e| e.to_str()).unwrap_or(""),
  )?;

  let options = build_options(args)?;
  let mut ctx = Context::new();
  let encoded = pipeline::run(&mut ctx, &input_bytes, input_format, output_format, &options);
  match encoded {
    Ok(bytes) => std::fs::write(&args.output, bytes).map_err(EngineError::Io),
    Err(e) => {
      log::error!("{}", ctx.error_state().formatted_message());
      Err(e)
    }
  }
}

fn main() -> ExitCode {
  let args = Args::parse();
  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("imageflow-rs: {e} (status {})", e.status_code());
      ExitCode::from(1)
    }
  }
}
