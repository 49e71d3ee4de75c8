use std::ops::{BitAnd, BitOr, BitXor};

use crate::aig::Aig;
use crate::reference::Ref;
use crate::sat::SatSolver;

pub struct AigAndOp {
    f: Ref,
    g: Ref,
}

impl BitAnd for Ref {
    type Output = AigAndOp;

    fn bitand(self, rhs: Self) -> Self::Output {
        AigAndOp { f: self, g: rhs }
    }
}

pub struct AigOrOp {
    f: Ref,
    g: Ref,
}

impl BitOr for Ref {
    type Output = AigOrOp;

    fn bitor(self, rhs: Self) -> Self::Output {
        AigOrOp { f: self, g: rhs }
    }
}

pub struct AigXorOp {
    f: Ref,
    g: Ref,
}

impl BitXor for Ref {
    type Output = AigXorOp;

    fn bitxor(self, rhs: Self) -> Self::Output {
        AigXorOp { f: self, g: rhs }
    }
}

/// A deferred expression, built with `&`, `|` and `^` on [`Ref`]s and
/// turned into a node by [`Aig::eval`].
pub trait Eval {
    fn eval<S: SatSolver>(&self, aig: &Aig<S>) -> Ref;
}

impl<S: SatSolver> Aig<S> {
    pub fn eval(&self, value: impl Eval) -> Ref {
        value.eval(self)
    }
}

impl Eval for Ref {
    fn eval<S: SatSolver>(&self, _aig: &Aig<S>) -> Ref {
        *self
    }
}

impl Eval for AigAndOp {
    fn eval<S: SatSolver>(&self, aig: &Aig<S>) -> Ref {
        aig.apply_and(self.f, self.g)
    }
}

impl Eval for AigOrOp {
    fn eval<S: SatSolver>(&self, aig: &Aig<S>) -> Ref {
        aig.apply_or(self.f, self.g)
    }
}

impl Eval for AigXorOp {
    fn eval<S: SatSolver>(&self, aig: &Aig<S>) -> Ref {
        aig.apply_xor(self.f, self.g)
    }
}
