use miniz_oxide::deflate::compress_to_vec_zlib;
use pngheight::{png::*, PngError};
use walkdir::WalkDir;

fn push_chunk(out: &mut Vec<u8>, name: &[u8; 4], content: &[u8]) {
  out.extend_from_slice(&(content.len() as u32).to_be_bytes());
  out.extend_from_slice(name);
  out.extend_from_slice(content);
  out.extend_from_slice(&chunk_crc(PngChunkTy(*name), content).to_be_bytes());
}

/// A real (if boring) RGB8 PNG of the given size, with the image data split
/// into several IDAT chunks.
pub(crate) fn rgb8_png(width: u32, height: u32) -> Vec<u8> {
  let line_len = width as usize * 3 + 1;
  let mut raw = Vec::with_capacity(line_len * height as usize);
  for y in 0..height as usize {
    raw.push(0); // filter: none
    raw.extend((0..width as usize * 3).map(|i| (i ^ y) as u8));
  }
  let zlib = compress_to_vec_zlib(&raw, 6);

  let mut ihdr = Vec::new();
  ihdr.extend_from_slice(&width.to_be_bytes());
  ihdr.extend_from_slice(&height.to_be_bytes());
  ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);

  let mut png = PNG_SIGNATURE.to_vec();
  push_chunk(&mut png, b"IHDR", &ihdr);
  push_chunk(&mut png, b"tEXt", b"Comment\0nothing to see here");
  for part in zlib.chunks(64) {
    push_chunk(&mut png, b"IDAT", part);
  }
  push_chunk(&mut png, b"IEND", &[]);
  png
}

/// Sets the declared height the way a lazy hex editor would: crc left alone.
pub(crate) fn lie_about_height(png: &mut [u8], height: u32) {
  png[20..24].copy_from_slice(&height.to_be_bytes());
}

#[test]
fn test_honest_png_matches() {
  let png = rgb8_png(4, 100);
  let analysis = analyze(&png, ZlibInflater::default()).unwrap();
  assert!(analysis.image_data_chunks >= 1);
  assert_eq!(analysis.report.declared_height, 100);
  assert_eq!(analysis.report.computed_height, 100);
  assert_eq!(analysis.report.scanline_length, 13);
  assert_eq!(analysis.report.trailing_bytes, 0);
  assert!(analysis.report.matches);
  assert!(analysis.header.checksum_is_valid());
}

#[test]
fn test_shortened_height_is_found_and_fixed() {
  let honest = rgb8_png(4, 100);
  let mut png = honest.clone();
  lie_about_height(&mut png, 150);

  let analysis = analyze(&png, ZlibInflater::default()).unwrap();
  assert_eq!(analysis.report.declared_height, 150);
  assert_eq!(analysis.report.computed_height, 100);
  assert!(!analysis.report.matches);
  assert!(!analysis.header.checksum_is_valid());

  let fixed = analysis.repair(&png).unwrap();
  // fixing the lie gives back exactly the honest file
  assert_eq!(fixed.as_bytes(), honest.as_slice());

  let header_chunk = find_header_chunk(fixed.as_bytes()).unwrap();
  let header = decode_header(fixed.as_bytes(), &header_chunk).unwrap();
  assert_eq!(header.height, 100);
  let content = header_chunk.content(fixed.as_bytes()).unwrap();
  let mut name_and_content = b"IHDR".to_vec();
  name_and_content.extend_from_slice(content);
  assert_eq!(header.declared_checksum, checksum(&name_and_content));

  let again = analyze(fixed.as_bytes(), ZlibInflater::default()).unwrap();
  assert!(again.report.matches);
}

#[test]
fn test_hidden_rows_are_found() {
  let mut png = rgb8_png(33, 80);
  lie_about_height(&mut png, 20);
  let analysis = analyze(&png, ZlibInflater::default()).unwrap();
  assert_eq!(analysis.report.computed_height, 80);
  assert_eq!(analysis.corrected_height(), Ok(80));
}

#[test]
fn test_palette_is_rejected() {
  let mut png = rgb8_png(4, 4);
  png[25] = 3;
  assert_eq!(analyze(&png, ZlibInflater::default()), Err(PngError::UnsupportedColorType(3)));
}

#[test]
fn test_truncated_file_is_malformed() {
  let png = rgb8_png(4, 100);
  // inside the tEXt chunk, then inside the last IDAT's crc
  for cut in [40, 60, png.len() - 12 - 1] {
    match analyze(&png[..cut], ZlibInflater::default()) {
      Err(PngError::MalformedChunk { offset }) => assert!(offset < cut),
      other => panic!("cut at {cut}: {other:?}"),
    }
  }
}

#[test]
fn test_garbage_image_data() {
  let mut png = PNG_SIGNATURE.to_vec();
  let mut ihdr = Vec::new();
  ihdr.extend_from_slice(&4_u32.to_be_bytes());
  ihdr.extend_from_slice(&4_u32.to_be_bytes());
  ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);
  push_chunk(&mut png, b"IHDR", &ihdr);
  push_chunk(&mut png, b"IDAT", b"definitely not zlib");
  push_chunk(&mut png, b"IEND", &[]);
  assert!(matches!(
    analyze(&png, ZlibInflater::default()),
    Err(PngError::Decompression(_))
  ));
}

#[test]
fn test_wrong_signature_is_not_a_png() {
  let png = rgb8_png(2, 2);
  for i in 0..8 {
    let mut bad = png.clone();
    bad[i] ^= 0x20;
    assert_eq!(analyze(&bad, ZlibInflater::default()), Err(PngError::NotAPng));
  }
  for _ in 0..20 {
    let mut v = super::rand_bytes(64);
    if v.starts_with(&PNG_SIGNATURE) {
      v[0] = 0;
    }
    assert_eq!(analyze(&v, ZlibInflater::default()), Err(PngError::NotAPng));
  }
}

#[test]
fn test_ChunkScanner_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(_) => continue,
    };
    for _ in ChunkScanner::after_signature(&v) {
      //
    }
    let _ = analyze(&v, ZlibInflater::with_limit(1 << 20));
  }
  // even totally random data should never panic the scanner!
  for _ in 0..10 {
    let mut v = super::rand_bytes(1024);
    for _ in ChunkScanner::after_signature(&v) {
      //
    }
    v[..8].copy_from_slice(&PNG_SIGNATURE);
    let _ = analyze(&v, ZlibInflater::with_limit(1 << 20));
  }
}
