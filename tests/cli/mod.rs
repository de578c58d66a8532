use std::{
  path::{Path, PathBuf},
  process::{Command, Output, Stdio},
};

use pngheight::png::{analyze, ZlibInflater};

use crate::png::{lie_about_height, rgb8_png};

/// `process::exit(-1)` as the OS reports it.
const EXIT_FAILURE: i32 = if cfg!(windows) { -1 } else { 255 };

/// A fresh directory for one test, so tests can run in parallel.
fn scratch_dir(name: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("pngheight-{}-{name}", std::process::id()));
  let _ = std::fs::remove_dir_all(&dir);
  std::fs::create_dir_all(&dir).unwrap();
  dir
}

fn pngheight(args: &[&str], file: &Path) -> Output {
  Command::new(env!("CARGO_BIN_EXE_pngheight"))
    .args(args)
    .arg(file)
    .stdin(Stdio::null())
    .output()
    .unwrap()
}

#[test]
fn test_cli_missing_file() {
  let dir = scratch_dir("missing");
  let out = pngheight(&[], &dir.join("nope.png"));
  assert_eq!(out.status.code(), Some(EXIT_FAILURE));
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.contains("can't read"), "{stderr}");
  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_not_a_png() {
  let dir = scratch_dir("not_png");
  let path = dir.join("notes.png");
  std::fs::write(&path, b"just some text, honest").unwrap();
  let out = pngheight(&[], &path);
  assert_eq!(out.status.code(), Some(EXIT_FAILURE));
  assert!(out.stdout.is_empty());
  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_honest_file_is_left_alone() {
  let dir = scratch_dir("honest");
  let path = dir.join("honest.png");
  std::fs::write(&path, rgb8_png(4, 12)).unwrap();
  let out = pngheight(&["-y"], &path);
  assert!(out.status.success());
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(stdout.contains("[+] Size matches"), "{stdout}");
  assert!(!dir.join("honest_fixed.png").exists());
  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_yes_writes_fixed_file() {
  let dir = scratch_dir("tampered");
  let path = dir.join("flag.png");
  let mut png = rgb8_png(4, 100);
  lie_about_height(&mut png, 40);
  std::fs::write(&path, &png).unwrap();

  let out = pngheight(&["-y"], &path);
  assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
  let stdout = String::from_utf8_lossy(&out.stdout);
  assert!(stdout.contains("[*] Height in IHDR: 0x28"), "{stdout}");
  assert!(stdout.contains("[*] Real Height: 0x64"), "{stdout}");
  assert!(stdout.contains("[!!] Wrong size in IHDR"), "{stdout}");

  let fixed = std::fs::read(dir.join("flag_fixed.png")).unwrap();
  let analysis = analyze(&fixed, ZlibInflater::default()).unwrap();
  assert!(analysis.report.matches);
  assert_eq!(analysis.report.declared_height, 100);
  assert!(analysis.header.checksum_is_valid());
  // the input is never touched
  assert_eq!(std::fs::read(&path).unwrap(), png);
  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_no_fix_writes_nothing() {
  let dir = scratch_dir("no_fix");
  let path = dir.join("flag.png");
  let mut png = rgb8_png(4, 10);
  lie_about_height(&mut png, 5);
  std::fs::write(&path, &png).unwrap();
  let out = pngheight(&["--no-fix"], &path);
  assert!(out.status.success());
  assert!(!dir.join("flag_fixed.png").exists());
  let _ = std::fs::remove_dir_all(&dir);
}
