//! Adder equivalence checking.
//!
//! Builds an `n`-bit ripple-carry adder and a carry-lookahead adder over the
//! same inputs, proves them equivalent output by output, and then shows the
//! counterexample found for a deliberately broken lookahead adder.
//!
//! Run with:
//! ```bash
//! cargo run --release --example adders -- 16 --verbose
//! ```

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use fraig_rs::aig::{Aig, FraigConfig};
use fraig_rs::reference::Ref;

#[derive(Debug, Parser)]
#[command(author, version, about = "Prove two adder implementations equivalent")]
struct Cli {
    /// Adder width in bits
    #[arg(default_value = "8")]
    bits: usize,

    /// Seed for the simulation patterns
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Build with structural hashing only
    #[arg(long)]
    no_reduction: bool,

    /// Log every verdict and print statistics on exit
    #[arg(long)]
    verbose: bool,

    /// Write the ripple-carry adder to this DOT file
    #[arg(long)]
    dot: Option<PathBuf>,
}

/// Inputs are `a[0..n]` followed by `b[0..n]`, least significant bit first.
fn operands(aig: &Aig, n: usize) -> (Vec<Ref>, Vec<Ref>) {
    let a = (0..n).map(|i| aig.input(i)).collect();
    let b = (0..n).map(|i| aig.input(n + i)).collect();
    (a, b)
}

fn ripple_carry(aig: &Aig, a: &[Ref], b: &[Ref]) -> Vec<Ref> {
    let mut outputs = Vec::with_capacity(a.len() + 1);
    let mut carry = aig.zero;
    for (&x, &y) in a.iter().zip(b) {
        let p = aig.apply_xor(x, y);
        outputs.push(aig.apply_xor(p, carry));
        let g = aig.apply_and(x, y);
        let t = aig.apply_and(p, carry);
        carry = aig.apply_or(g, t);
    }
    outputs.push(carry);
    outputs
}

/// Every carry is computed from the generate and propagate signals directly:
/// `c[i+1] = g[i] | p[i]&g[i-1] | p[i]&p[i-1]&g[i-2] | ...`
fn carry_lookahead(aig: &Aig, a: &[Ref], b: &[Ref], broken: bool) -> Vec<Ref> {
    let n = a.len();
    let g: Vec<Ref> = a.iter().zip(b).map(|(&x, &y)| aig.apply_and(x, y)).collect();
    let p: Vec<Ref> = a.iter().zip(b).map(|(&x, &y)| aig.apply_or(x, y)).collect();

    let mut carries = vec![aig.zero];
    for i in 0..n {
        let terms = (0..=i).map(|j| {
            let chain = aig.apply_and_many(p[j + 1..=i].iter().copied());
            aig.apply_and(g[j], chain)
        });
        let mut carry = aig.apply_or_many(terms);
        if broken && i == n / 2 {
            // XOR instead of OR: wrong when both terms are set.
            carry = aig.apply_xor(g[i], aig.apply_and(p[i], carries[i]));
        }
        carries.push(carry);
    }

    let mut outputs: Vec<Ref> = (0..n)
        .map(|i| {
            // x ^ y ^ c written as a mux on the carry.
            let h = aig.apply_and(p[i], !g[i]);
            aig.apply_mux(carries[i], !h, h)
        })
        .collect();
    outputs.push(carries[n]);
    outputs
}

fn to_int(bits: &[bool]) -> u128 {
    bits.iter().rev().fold(0, |acc, &b| (acc << 1) | b as u128)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.verbose {
        simplelog::LevelFilter::Info
    } else {
        simplelog::LevelFilter::Warn
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let n = cli.bits;
    if n == 0 || n > 64 {
        color_eyre::eyre::bail!("Adder width must be in 1..=64, got {}", n);
    }

    let config = FraigConfig::default()
        .with_seed(cli.seed)
        .with_verbose(cli.verbose)
        .with_functional_reduction(!cli.no_reduction);
    let aig = Aig::with_config(2 * n, n + 1, config);
    let (a, b) = operands(&aig, n);

    let time_build = Instant::now();
    let ripple = ripple_carry(&aig, &a, &b);
    let lookahead = carry_lookahead(&aig, &a, &b, false);
    let broken = carry_lookahead(&aig, &a, &b, true);
    println!("Built three {}-bit adders in {:?}", n, time_build.elapsed());
    println!("aig = {:?}", aig);

    for (i, &out) in ripple.iter().enumerate() {
        aig.set_output(i, out);
    }

    let time_check = Instant::now();
    let equal = aig.equivalent_outputs(&ripple, &lookahead);
    println!(
        "ripple-carry vs carry-lookahead: {} ({:?})",
        if equal { "EQUIVALENT" } else { "DIFFERENT" },
        time_check.elapsed()
    );

    let time_check = Instant::now();
    let failing = ripple
        .iter()
        .zip(&broken)
        .position(|(&r, &s)| !aig.is_equivalent(r, s, false, false));
    match failing {
        None => println!("ripple-carry vs broken lookahead: EQUIVALENT ({:?})", time_check.elapsed()),
        Some(bit) => {
            println!(
                "ripple-carry vs broken lookahead: output {} differs ({:?})",
                bit,
                time_check.elapsed()
            );
            if let Some(cex) = aig.counterexample() {
                let (x, y) = (to_int(&cex[..n]), to_int(&cex[n..]));
                let sum = |outs: &[Ref]| {
                    let bits: Vec<bool> = outs.iter().map(|&o| aig.evaluate(o, &cex)).collect();
                    to_int(&bits)
                };
                println!("  counterexample: a = {}, b = {}", x, y);
                println!("  ripple-carry:     {}", sum(&ripple));
                println!("  broken lookahead: {}", sum(&broken));
            }
        }
    }

    println!("\n{}", aig.stats());

    if let Some(path) = cli.dot {
        std::fs::write(&path, aig.to_dot(&aig.outputs())?)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
