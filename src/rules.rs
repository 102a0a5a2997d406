//! Per-operator early-termination predicates.
//!
//! Each rule consumes [`ChildMessage`]s from the parent's channel and
//! returns the parent's value as soon as it is determined — the caller
//! (`worker::evaluate_node`) is responsible for cancelling and joining any
//! children that haven't delivered yet, uniformly across every rule.

use crossbeam_channel::Receiver;

use crate::cancel::CancelToken;
use crate::channel::{recv_cancellable, ChildMessage};
use crate::error::Cancelled;
use crate::node::Kind;

pub(crate) fn evaluate(
    kind: Kind,
    arity: usize,
    rx: &Receiver<ChildMessage>,
    cancel: &CancelToken,
) -> Result<bool, Cancelled> {
    match kind {
        Kind::Leaf => unreachable!("leaves are evaluated directly, not via an operator rule"),
        Kind::Not => eval_not(rx, cancel),
        Kind::And => eval_and(rx, arity, cancel),
        Kind::Or => eval_or(rx, arity, cancel),
        Kind::If => eval_if(rx, cancel),
        Kind::Gt(k) => eval_gt(k, arity, rx, cancel),
        Kind::Lt(k) => eval_lt(k, arity, rx, cancel),
    }
}

fn eval_not(rx: &Receiver<ChildMessage>, cancel: &CancelToken) -> Result<bool, Cancelled> {
    let message = recv_cancellable(rx, cancel)?;
    Ok(!message.value)
}

fn eval_and(
    rx: &Receiver<ChildMessage>,
    arity: usize,
    cancel: &CancelToken,
) -> Result<bool, Cancelled> {
    let mut seen = 0;
    while seen < arity {
        let message = recv_cancellable(rx, cancel)?;
        if !message.value {
            return Ok(false);
        }
        seen += 1;
    }
    Ok(true)
}

fn eval_or(
    rx: &Receiver<ChildMessage>,
    arity: usize,
    cancel: &CancelToken,
) -> Result<bool, Cancelled> {
    let mut seen = 0;
    while seen < arity {
        let message = recv_cancellable(rx, cancel)?;
        if message.value {
            return Ok(true);
        }
        seen += 1;
    }
    Ok(false)
}

/// `GT(k)`: true once strictly more than `k` children are true; false once
/// the remaining children can no longer push the true-count above `k`.
fn eval_gt(
    k: usize,
    arity: usize,
    rx: &Receiver<ChildMessage>,
    cancel: &CancelToken,
) -> Result<bool, Cancelled> {
    if k >= arity {
        return Ok(false); // unattainable
    }

    let mut trues = 0;
    let mut remaining = arity;
    while remaining > 0 {
        let message = recv_cancellable(rx, cancel)?;
        remaining -= 1;
        if message.value {
            trues += 1;
        }
        if trues > k {
            return Ok(true);
        }
        if trues + remaining <= k {
            return Ok(false);
        }
    }
    unreachable!("GT(k) with k < arity must decide before all children are consumed")
}

/// `LT(k)`: true once the remaining children can no longer reach `k` trues;
/// false once `k` trues have already been observed.
fn eval_lt(
    k: usize,
    arity: usize,
    rx: &Receiver<ChildMessage>,
    cancel: &CancelToken,
) -> Result<bool, Cancelled> {
    if k > arity {
        return Ok(true); // always satisfied
    }

    let mut trues = 0;
    let mut remaining = arity;
    while remaining > 0 {
        let message = recv_cancellable(rx, cancel)?;
        remaining -= 1;
        if message.value {
            trues += 1;
        }
        if trues >= k {
            return Ok(false);
        }
        if trues + remaining < k {
            return Ok(true);
        }
    }
    unreachable!("LT(k) with k <= arity must decide before all children are consumed")
}

/// `IF(condition, then, else)`: arrival order is the only ordering source,
/// but this is the one rule that cares which child delivered — the
/// condition (index 0) selects a branch (index 1 or 2), and if both
/// branches arrive and agree before the condition does, the condition is
/// moot.
fn eval_if(rx: &Receiver<ChildMessage>, cancel: &CancelToken) -> Result<bool, Cancelled> {
    let mut condition: Option<bool> = None;
    let mut branches: [Option<bool>; 2] = [None, None]; // [then, else]

    loop {
        if let (Some(then), Some(else_)) = (branches[0], branches[1]) {
            if then == else_ {
                return Ok(then);
            }
        }
        if let Some(condition) = condition {
            let chosen = if condition { 0 } else { 1 };
            if let Some(value) = branches[chosen] {
                return Ok(value);
            }
        }

        let message = recv_cancellable(rx, cancel)?;
        match message.index {
            0 => condition = Some(message.value),
            1 => branches[0] = Some(message.value),
            2 => branches[1] = Some(message.value),
            other => unreachable!("If has exactly 3 children, got index {other}"),
        }
    }
}
