//! Integration tests exercising the public API end to end: the ownership
//! heap, the resampler, and a PNG round trip.

use imageflow_rs::bitmap::ByteBitmap;
use imageflow_rs::context::{Context, Owner};
use imageflow_rs::pixel::PixelFormat;
use imageflow_rs::scale2d::{scale2d, Rect, ScaleParams};

#[test]
fn transpose_is_involutive() {
  let mut bmp = ByteBitmap::new(5, 3, PixelFormat::Bgra32).unwrap();
  bmp.fill_rect(0, 0, 5, 3, [10, 20, 30, 255]).unwrap();
  bmp.fill_rect(1, 1, 3, 2, [200, 100, 50, 255]).unwrap();
  let once = bmp.transpose().unwrap();
  let twice = once.transpose().unwrap();
  assert!(bmp.content_equals(&twice));
}

#[test]
fn scale_to_identical_size_preserves_a_solid_fill() {
  let mut src = ByteBitmap::new(16, 16, PixelFormat::Bgra32).unwrap();
  src.fill_rect(0, 0, 16, 16, [10, 20, 30, 255]).unwrap();
  let mut dst = ByteBitmap::new(16, 16, PixelFormat::Bgra32).unwrap();
  scale2d(&src, &mut dst, Rect { x: 0, y: 0, w: 16, h: 16 }, ScaleParams::default()).unwrap();
  for y in 0..16 {
    for px in dst.row(y).chunks_exact(4) {
      assert!((px[0] as i32 - 10).abs() <= 2, "blue channel drifted: {px:?}");
      assert!((px[1] as i32 - 20).abs() <= 2, "green channel drifted: {px:?}");
      assert!((px[2] as i32 - 30).abs() <= 2, "red channel drifted: {px:?}");
    }
  }
}

#[test]
fn scale_down_then_up_keeps_dimensions_consistent() {
  let mut src = ByteBitmap::new(64, 48, PixelFormat::Bgr32).unwrap();
  src.fill_rect(0, 0, 64, 48, [5, 5, 5, 255]).unwrap();
  let mut small = ByteBitmap::new(16, 12, PixelFormat::Bgr32).unwrap();
  scale2d(&src, &mut small, Rect { x: 0, y: 0, w: 16, h: 12 }, ScaleParams::default()).unwrap();
  assert_eq!((small.width, small.height), (16, 12));

  let mut back = ByteBitmap::new(64, 48, PixelFormat::Bgr32).unwrap();
  scale2d(&small, &mut back, Rect { x: 0, y: 0, w: 64, h: 48 }, ScaleParams::default()).unwrap();
  assert_eq!((back.width, back.height), (64, 48));
}

#[test]
fn destroying_a_context_tears_down_every_allocation() {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  let dropped = Arc::new(AtomicUsize::new(0));
  let mut ctx = Context::new();
  let parent = ctx.allocate(64, Owner::Context, None);
  {
    let dropped = Arc::clone(&dropped);
    ctx
      .set_destructor(
        parent,
        Box::new(move || {
          dropped.fetch_add(1, Ordering::SeqCst);
          Ok(())
        }),
      )
      .unwrap();
  }
  let child = ctx.allocate(32, Owner::Block(parent), None);
  {
    let dropped = Arc::clone(&dropped);
    ctx
      .set_destructor(
        child,
        Box::new(move || {
          dropped.fetch_add(1, Ordering::SeqCst);
          Ok(())
        }),
      )
      .unwrap();
  }
  assert_eq!(ctx.live_allocation_count(), 2);
  ctx.destroy_all();
  assert_eq!(ctx.live_allocation_count(), 0);
  assert_eq!(dropped.load(Ordering::SeqCst), 2);
}

#[cfg(feature = "png")]
#[test]
fn png_round_trip_preserves_pixel_content() {
  use imageflow_rs::codec::png::{PngDecoder, PngEncoder};
  use imageflow_rs::codec::{Decoder, Encoder, EncoderHints};

  let mut src = ByteBitmap::new(6, 4, PixelFormat::Bgra32).unwrap();
  src.fill_rect(0, 0, 6, 4, [1, 2, 3, 255]).unwrap();
  src.fill_rect(2, 1, 4, 3, [250, 10, 5, 128]).unwrap();

  let mut bytes = Vec::new();
  PngEncoder::new(&mut bytes).write_frame(&src, &EncoderHints::default()).unwrap();

  let mut decoder = PngDecoder::new(&bytes);
  let info = decoder.get_info().unwrap();
  assert_eq!((info.width, info.height), (6, 4));

  let frame = decoder.read_frame(&Default::default()).unwrap();
  assert!(src.content_equals(&frame.bitmap));
}

#[cfg(feature = "png")]
#[test]
fn png_decode_rejects_corrupted_chunk_data() {
  use imageflow_rs::codec::png::{PngDecoder, PngEncoder};
  use imageflow_rs::codec::{Decoder, Encoder, EncoderHints};

  let mut src = ByteBitmap::new(4, 4, PixelFormat::Bgra32).unwrap();
  src.fill_rect(0, 0, 4, 4, [9, 8, 7, 255]).unwrap();

  let mut bytes = Vec::new();
  PngEncoder::new(&mut bytes).write_frame(&src, &EncoderHints::default()).unwrap();

  // Flip a byte inside the IDAT payload without touching its CRC.
  let idat_pos = bytes.windows(4).position(|w| w == b"IDAT").unwrap();
  bytes[idat_pos + 8] ^= 0xFF;

  let mut decoder = PngDecoder::new(&bytes);
  assert!(decoder.read_frame(&Default::default()).is_err());
}
