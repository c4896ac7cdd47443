//! Register-resident peak-throughput kernels
//!
//! These never touch the vector buffers: each step runs `CHAINS` independent
//! accumulator chains of `LANES` floats for `STEPS` iterations, which the
//! compiler keeps in vector registers. Float addition is not reassociated,
//! so the repeated updates cannot be folded away.

use crate::timed::timed_loop;
use roofline_core::{KernelArgs, RoofCost, ThreadResult};
use std::hint::black_box;

/// Floats per accumulator (one 256-bit vector)
pub const LANES: usize = 8;

/// Independent accumulators, enough to cover add/mul latency
pub const CHAINS: usize = 4;

/// Updates per accumulator per step
pub const STEPS: usize = 64;

type Block = [[f32; LANES]; CHAINS];

/// Cost of one `peak_add` step.
pub const ADD_COST: RoofCost = RoofCost::compute((LANES * CHAINS * STEPS) as u64);

/// Cost of one `peak_mac` step: a multiply and an add per update.
pub const MAC_COST: RoofCost = RoofCost::compute((2 * LANES * CHAINS * STEPS) as u64);

#[inline(always)]
fn add_block(acc: &mut Block, inc: &[f32; LANES]) {
    for _ in 0..STEPS {
        for chain in acc.iter_mut() {
            for (v, &d) in chain.iter_mut().zip(inc) {
                *v += d;
            }
        }
    }
}

#[inline(always)]
fn mac_block(acc: &mut Block, mul: &[f32; LANES], inc: &[f32; LANES]) {
    for _ in 0..STEPS {
        for chain in acc.iter_mut() {
            for ((v, &m), &d) in chain.iter_mut().zip(mul).zip(inc) {
                *v = *v * m + d;
            }
        }
    }
}

/// Independent add chains; `a` is the increment.
pub fn peak_add(args: &mut KernelArgs<'_>) -> ThreadResult {
    let inc = black_box([args.a; LANES]);
    let mut acc: Block = [[0.0; LANES]; CHAINS];

    let round = timed_loop(args.ctx, args.timer, args.min_runtime, || {
        add_block(&mut acc, &inc);
        black_box(&acc);
    });

    black_box(acc);
    round.result(ADD_COST)
}

/// Independent multiply-add chains `v = v b + a`; `|b| < 1` keeps them bounded.
pub fn peak_mac(args: &mut KernelArgs<'_>) -> ThreadResult {
    let mul = black_box([args.b; LANES]);
    let inc = black_box([args.a; LANES]);
    let mut acc: Block = [[0.0; LANES]; CHAINS];

    let round = timed_loop(args.ctx, args.timer, args.min_runtime, || {
        mac_block(&mut acc, &mul, &inc);
        black_box(&acc);
    });

    black_box(acc);
    round.result(MAC_COST)
}
