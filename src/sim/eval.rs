//! Per-gate-type evaluation under the `{0, 1, X_k}` algebra (C3, SPEC_FULL.md §4.3).

use crate::value::{Value, XAllocator};

/// `AND`: controlling value `0`, else pass through a unanimous input, else squash a
/// complementary X-pair to `0`, else allocate a fresh X-tag.
///
/// Controlling-value detection runs before the all-equal/complementary checks, both
/// for correctness (a `0` input always wins) and so we never pay for the O(n^2)
/// complementary-pair scan unless the fast paths have already failed.
pub fn eval_and(fanin: &[Value], xalloc: &mut XAllocator) -> Value {
    let first = fanin[0];
    let mut all_equal = true;
    for &v in fanin {
        if v == Value::ZERO {
            return Value::ZERO;
        }
        if v != first {
            all_equal = false;
        }
    }
    if all_equal {
        return first;
    }
    if fanin.iter().any(|&v| fanin.contains(&v.complement())) {
        return Value::ZERO;
    }
    xalloc.fresh()
}

/// `OR`: dual of [`eval_and`], controlling value `1`. The all-equal fast path reads
/// fanin *values*, mirroring `eval_and` — the source this was translated from read
/// fanin gate-ids here instead, a defect corrected in this implementation
/// (SPEC_FULL.md §9).
pub fn eval_or(fanin: &[Value], xalloc: &mut XAllocator) -> Value {
    let first = fanin[0];
    let mut all_equal = true;
    for &v in fanin {
        if v == Value::ONE {
            return Value::ONE;
        }
        if v != first {
            all_equal = false;
        }
    }
    if all_equal {
        return first;
    }
    if fanin.iter().any(|&v| fanin.contains(&v.complement())) {
        return Value::ONE;
    }
    xalloc.fresh()
}

/// `XOR` of two inputs (a single-input `XOR` degenerates to `eval_xor(a, a)`, which is
/// always `0`).
pub fn eval_xor(a: Value, b: Value, xalloc: &mut XAllocator) -> Value {
    if let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) {
        return Value::from_bool(x ^ y);
    }
    if a == b {
        return Value::ZERO;
    }
    if a.complement() == b {
        return Value::ONE;
    }
    xalloc.fresh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_controlling_value_wins() {
        let mut xs = XAllocator::new();
        let x = xs.fresh();
        assert_eq!(eval_and(&[Value::ZERO, x], &mut xs), Value::ZERO);
    }

    #[test]
    fn and_complementary_x_squashes_to_zero() {
        let mut xs = XAllocator::new();
        let x = xs.fresh();
        assert_eq!(eval_and(&[x, x.complement()], &mut xs), Value::ZERO);
    }

    #[test]
    fn or_complementary_x_squashes_to_one() {
        let mut xs = XAllocator::new();
        let x = xs.fresh();
        assert_eq!(eval_or(&[x, x.complement()], &mut xs), Value::ONE);
    }

    #[test]
    fn or_all_equal_x_passes_through() {
        let mut xs = XAllocator::new();
        let x = xs.fresh();
        assert_eq!(eval_or(&[x, x], &mut xs), x);
    }

    #[test]
    fn xor_same_tag_cancels() {
        let mut xs = XAllocator::new();
        let x = xs.fresh();
        assert_eq!(eval_xor(x, x, &mut xs), Value::ZERO);
    }

    #[test]
    fn xor_complementary_tags_give_one() {
        let mut xs = XAllocator::new();
        let x = xs.fresh();
        assert_eq!(eval_xor(x, x.complement(), &mut xs), Value::ONE);
    }

    #[test]
    fn xor_of_constants() {
        let mut xs = XAllocator::new();
        assert_eq!(eval_xor(Value::ONE, Value::ZERO, &mut xs), Value::ONE);
        assert_eq!(eval_xor(Value::ONE, Value::ONE, &mut xs), Value::ZERO);
    }

    #[test]
    fn unrelated_x_tags_produce_fresh_x() {
        let mut xs = XAllocator::new();
        let a = xs.fresh();
        let b = xs.fresh();
        let result = eval_and(&[a, b], &mut xs);
        assert!(result.is_x());
        assert_ne!(result, a);
        assert_ne!(result, b);
    }
}
