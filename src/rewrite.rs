//! Rewrite driver: applies an ordered list of edit operations to a chain.

use crate::chain::Chain;
use crate::error::Result;
use crate::ops::{CaptureBag, EditOp};

/// The product of one recipe application: the final chain and every slot the
/// recipe's operations extracted along the way.
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub chain: Chain,
    pub captures: CaptureBag,
}

/// Applies `operations` strictly in order, each one on the chain produced by
/// the previous. One capture bag is threaded forward through the whole
/// sequence, so arguments extracted by an earlier operation can feed a later
/// one.
///
/// Any operation failure aborts this application; the input chain is left
/// untouched (chains are persistent).
pub fn rewrite(chain: &Chain, operations: &[EditOp]) -> Result<Rewritten> {
    let mut bag = CaptureBag::new();
    let mut current = chain.clone();

    for operation in operations {
        current = operation.apply(&current, &mut bag)?;
    }

    Ok(Rewritten {
        chain: current,
        captures: bag,
    })
}
