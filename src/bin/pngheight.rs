//! CLI for pngheight: compare a PNG's declared height with its real height,
//! and optionally write out a copy with the header fixed.

use std::{
  error::Error,
  io::{BufRead, Write},
  path::{Path, PathBuf},
};

use clap::{error::ErrorKind, Parser};
use log::{debug, LevelFilter};
use pngheight::png::{analyze, Analysis, ZlibInflater};

#[derive(Parser)]
#[command(name = "pngheight", version)]
#[command(about = "Find (and fix) PNG files that hide rows behind a wrong IHDR height", long_about = None)]
struct Args {
  /// PNG file to check
  path: PathBuf,

  /// Write the fixed file without asking
  #[arg(short, long, conflicts_with = "no_fix")]
  yes: bool,

  /// Only report, never write a fixed file
  #[arg(short, long)]
  no_fix: bool,

  /// Where to write the fixed file. Default: `<name>_fixed.png` next to the input.
  #[arg(short, long, value_name = "PATH")]
  output: Option<PathBuf>,

  /// Refuse to inflate more than this many bytes of image data
  #[arg(long, value_name = "BYTES", default_value_t = ZlibInflater::DEFAULT_LIMIT)]
  max_inflate: usize,

  /// Log what the analysis is doing (RUST_LOG also works)
  #[arg(short, long)]
  verbose: bool,
}

fn main() {
  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
    Err(e) => {
      let _ = e.print();
      std::process::exit(-1);
    }
  };

  env_logger::Builder::new()
    .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Warn })
    .parse_default_env()
    .init();

  if let Err(e) = run(&args) {
    eprintln!("[-] {e}");
    std::process::exit(-1);
  }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
  let bytes = std::fs::read(&args.path)
    .map_err(|e| format!("can't read {}: {e}", args.path.display()))?;
  debug!("read {} bytes from {}", bytes.len(), args.path.display());

  let analysis = analyze(&bytes, ZlibInflater::with_limit(args.max_inflate))?;
  print_report(&mut std::io::stdout().lock(), &analysis)?;

  if analysis.report.matches || args.no_fix {
    return Ok(());
  }
  // nothing sensible to fix to, so don't even ask
  analysis.corrected_height()?;
  if !args.yes && !ask_yes_no("Fix the IHDR height? [y/N] ")? {
    return Ok(());
  }

  let fixed = analysis.repair(&bytes)?;
  let out_path = args.output.clone().unwrap_or_else(|| fixed_file_path(&args.path));
  std::fs::write(&out_path, fixed.as_bytes())
    .map_err(|e| format!("can't write {}: {e}", out_path.display()))?;
  println!("[+] Wrote {}", out_path.display());
  Ok(())
}

fn print_report(out: &mut impl Write, analysis: &Analysis) -> std::io::Result<()> {
  let report = &analysis.report;
  writeln!(out, "[*] Height in IHDR: {:#x}", report.declared_height)?;
  writeln!(out, "[*] Real Height: {:#x}", report.computed_height)?;
  if !analysis.header.checksum_is_valid() {
    writeln!(out, "[!] IHDR CRC does not match its contents")?;
  }
  if report.matches {
    writeln!(out, "[+] Size matches")
  } else {
    writeln!(out, "[!!] Wrong size in IHDR")
  }
}

fn ask_yes_no(question: &str) -> std::io::Result<bool> {
  let mut stdout = std::io::stdout().lock();
  stdout.write_all(question.as_bytes())?;
  stdout.flush()?;
  let mut line = String::new();
  std::io::stdin().lock().read_line(&mut line)?;
  Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// `dir/name.png` becomes `dir/name_fixed.png`.
fn fixed_file_path(input: &Path) -> PathBuf {
  let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
  input.with_file_name(format!("{stem}_fixed.png"))
}
