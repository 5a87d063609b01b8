use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use recxi_synth::{dump_container, LayoutConfig};

mod host;

use crate::host::{DirContentSource, StaticProbe};

fn parse_u32_with_hex(input: &str) -> Result<u32, String> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex value '{}': {}", input, e))
    } else {
        s.parse::<u32>()
            .map_err(|e| format!("invalid decimal value '{}': {}", input, e))
    }
}

fn parse_u64_with_hex(input: &str) -> Result<u64, String> {
    let s = input.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| format!("invalid title id '{}': {}", input, e))
}

/// Rebuilds an unencrypted CXI container from content blobs extracted out of
/// a running title.
#[derive(Debug, Parser)]
#[command(name = "recxi", version)]
struct Args {
    /// Directory holding code.bin, banner.bin, icon.bin, logo.bin and
    /// romfs.bin
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output path; defaults to <titleid>.cxi inside the input directory
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Title id, in hex
    #[arg(long = "title-id", value_parser = parse_u64_with_hex)]
    title_id: u64,

    /// Size of the mapped text region
    #[arg(long = "text-size", value_parser = parse_u32_with_hex)]
    text_size: u32,

    /// Size of the mapped read-only region
    #[arg(long = "ro-size", value_parser = parse_u32_with_hex)]
    ro_size: u32,

    /// Size of the mapped data region, bss included
    #[arg(long = "data-size", value_parser = parse_u32_with_hex)]
    data_size: u32,

    /// Main thread stack size
    #[arg(long = "stack-size", value_parser = parse_u32_with_hex, default_value = "0x4000")]
    stack_size: u32,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("{:#}", err);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.join(format!("{:016x}.cxi", args.title_id)));

    println!("Title ID: {:#018x}", args.title_id);
    println!("Dumping to \"{}\"", output.display());

    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut out = BufWriter::new(file);

    let cfg = LayoutConfig::default();
    let mut source = DirContentSource::new(&args.input);
    let probe = StaticProbe::from_layout(
        &cfg,
        args.text_size,
        args.ro_size,
        args.data_size,
        args.stack_size,
    );

    println!("Dumping ExeFS and RomFS...");
    let report = dump_container(&mut out, &mut source, &probe, &cfg, args.title_id)?;
    out.flush().context("failed to flush output")?;

    if let Some(warning) = &report.geometry {
        eprintln!("warning: {}", warning);
        eprintln!("warning: the extended header geometry is unreliable for this title");
    }

    if report.success {
        println!("Done!");
        Ok(())
    } else {
        if let Some(failure) = &report.failure {
            eprintln!("{}", failure);
        }
        anyhow::bail!("failure during dumping, output data is incomplete")
    }
}
