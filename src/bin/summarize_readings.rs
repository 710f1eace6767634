// SPDX-License-Identifier: AGPL-3.0-or-later
//! Summarize a readings file on the GPU.
//!
//! Loads whitespace-delimited sensor readings (last token per line),
//! runs the full reduction + sort pipeline, and prints the descriptive
//! statistics with per-kernel timing.
//!
//! Usage: `summarize_readings <readings-file> [-g GROUP_SIZE] [-s]`
//!
//! - `-g` overrides the reduction workgroup size (power of two, at most
//!   the dataset length and the device limit)
//! - `-s` prints the full sorted sequence

use std::path::PathBuf;
use std::process;

use streamgauge::error::Result;
use streamgauge::gpu::GpuContext;
use streamgauge::io::readings::load_readings;
use streamgauge::profile::TimingReport;
use streamgauge::stats::summary::{self, SummaryOptions};

struct Args {
    path: PathBuf,
    group_size: Option<u32>,
    show_sorted: bool,
}

fn usage() -> ! {
    eprintln!("usage: summarize_readings <readings-file> [-g GROUP_SIZE] [-s]");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut path = None;
    let mut group_size = None;
    let mut show_sorted = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-g" | "--group-size" => {
                let Some(value) = args.next() else { usage() };
                match value.parse::<u32>() {
                    Ok(g) => group_size = Some(g),
                    Err(_) => {
                        eprintln!("invalid group size: {value}");
                        usage();
                    }
                }
            }
            "-s" | "--show-sorted" => show_sorted = true,
            "-h" | "--help" => usage(),
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => usage(),
        }
    }

    let Some(path) = path else { usage() };
    Args {
        path,
        group_size,
        show_sorted,
    }
}

async fn run(args: &Args) -> Result<()> {
    let readings = load_readings(&args.path)?;
    println!(
        "Loaded {} readings from {}",
        readings.len(),
        args.path.display()
    );

    let ctx = GpuContext::new().await?;
    ctx.print_info();
    println!();

    let mut timings = TimingReport::new();
    let options = SummaryOptions {
        group_size: args.group_size,
        keep_sorted: args.show_sorted,
    };
    let summary = summary::compute_summary(&ctx, &readings, options, &mut timings).await?;

    println!("n         = {}", summary.n);
    println!("mean      = {:.6}", summary.mean);
    println!("min       = {:.6}", summary.min);
    println!("max       = {:.6}", summary.max);
    println!("variance  = {:.6}", summary.variance);
    println!("std dev   = {:.6}", summary.std_dev);
    println!("median    = {:.6}", summary.median);
    println!("Q1        = {:.6}", summary.lower_quartile);
    println!("Q3        = {:.6}", summary.upper_quartile);

    if let Some(sorted) = &summary.sorted {
        println!();
        println!("sorted sequence:");
        for chunk in sorted.chunks(10) {
            let line: Vec<String> = chunk.iter().map(|x| format!("{x:.2}")).collect();
            println!("  {}", line.join(" "));
        }
    }

    println!();
    timings.print_table();
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = parse_args();
    if let Err(e) = run(&args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
