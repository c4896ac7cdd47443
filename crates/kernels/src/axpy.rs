//! axpy-family vector operations
//!
//! | name  | operation                 | flops | loads    | stores |
//! |-------|---------------------------|-------|----------|--------|
//! | copy  | y = x                     | 0     | n        | n      |
//! | ax    | y = a x                   | n     | n        | n      |
//! | xpx   | y = x + x                 | n     | n        | n      |
//! | xpy   | y = x + y                 | n     | 2n       | n      |
//! | axpy  | y = a x + y               | 2n    | 2n       | n      |
//! | axpby | y = a x + b y             | 3n    | 2n       | n      |
//! | diffK | y[K:] = x[K:] + x[:-K]    | n-K   | 2(n-K)   | n-K    |
//!
//! Operations work on the first `n` elements of each slice.

use roofline_core::{Roof, RoofCost};

pub fn copy(n: usize, _a: f32, _b: f32, x: &[f32], y: &mut [f32]) {
    y[..n].copy_from_slice(&x[..n]);
}

pub fn ax(n: usize, a: f32, _b: f32, x: &[f32], y: &mut [f32]) {
    for (yi, &xi) in y[..n].iter_mut().zip(&x[..n]) {
        *yi = a * xi;
    }
}

pub fn xpx(n: usize, _a: f32, _b: f32, x: &[f32], y: &mut [f32]) {
    for (yi, &xi) in y[..n].iter_mut().zip(&x[..n]) {
        *yi = xi + xi;
    }
}

pub fn xpy(n: usize, _a: f32, _b: f32, x: &[f32], y: &mut [f32]) {
    for (yi, &xi) in y[..n].iter_mut().zip(&x[..n]) {
        *yi += xi;
    }
}

pub fn axpy(n: usize, a: f32, _b: f32, x: &[f32], y: &mut [f32]) {
    for (yi, &xi) in y[..n].iter_mut().zip(&x[..n]) {
        *yi += a * xi;
    }
}

pub fn axpby(n: usize, a: f32, b: f32, x: &[f32], y: &mut [f32]) {
    for (yi, &xi) in y[..n].iter_mut().zip(&x[..n]) {
        *yi = a * xi + b * *yi;
    }
}

/// Offset difference; a no-op when `n <= K`.
pub fn diff<const K: usize>(n: usize, _a: f32, _b: f32, x: &[f32], y: &mut [f32]) {
    if n <= K {
        return;
    }
    let x = &x[..n];
    for ((yi, &hi), &lo) in y[K..n].iter_mut().zip(&x[K..]).zip(&x[..n - K]) {
        *yi = hi + lo;
    }
}

fn elements(n: usize) -> u64 {
    n as u64
}

pub fn copy_cost(n: usize) -> RoofCost {
    RoofCost {
        flops: 0,
        loads: elements(n),
        stores: elements(n),
    }
}

/// Cost of `ax` and `xpx`: one flop, one load, one store per element.
pub fn unary_cost(n: usize) -> RoofCost {
    RoofCost {
        flops: elements(n),
        loads: elements(n),
        stores: elements(n),
    }
}

pub fn xpy_cost(n: usize) -> RoofCost {
    RoofCost {
        flops: elements(n),
        loads: 2 * elements(n),
        stores: elements(n),
    }
}

pub fn axpy_cost(n: usize) -> RoofCost {
    RoofCost {
        flops: 2 * elements(n),
        loads: 2 * elements(n),
        stores: elements(n),
    }
}

pub fn axpby_cost(n: usize) -> RoofCost {
    RoofCost {
        flops: 3 * elements(n),
        loads: 2 * elements(n),
        stores: elements(n),
    }
}

pub fn diff_cost<const K: usize>(n: usize) -> RoofCost {
    let m = elements(n.saturating_sub(K));
    RoofCost {
        flops: m,
        loads: 2 * m,
        stores: m,
    }
}

pub const COPY: Roof = Roof {
    op: copy,
    cost: copy_cost,
};

pub const AX: Roof = Roof {
    op: ax,
    cost: unary_cost,
};

pub const XPX: Roof = Roof {
    op: xpx,
    cost: unary_cost,
};

pub const XPY: Roof = Roof {
    op: xpy,
    cost: xpy_cost,
};

pub const AXPY: Roof = Roof {
    op: axpy,
    cost: axpy_cost,
};

pub const AXPBY: Roof = Roof {
    op: axpby,
    cost: axpby_cost,
};

pub const DIFF1: Roof = Roof {
    op: diff::<1>,
    cost: diff_cost::<1>,
};

pub const DIFF8: Roof = Roof {
    op: diff::<8>,
    cost: diff_cost::<8>,
};
