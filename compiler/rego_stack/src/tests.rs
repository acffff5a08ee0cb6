use super::*;

#[test]
fn test_enter_refuses_past_ceiling() {
    let mut limit = DepthLimit::new(2);
    assert!(limit.enter());
    assert!(limit.enter());
    assert!(!limit.enter());
    // A refused enter leaves the depth untouched.
    assert_eq!(limit.depth(), 2);
    limit.leave();
    assert!(limit.enter());
}

#[test]
fn test_zero_ceiling_disables_check() {
    let mut limit = DepthLimit::new(0);
    for _ in 0..10_000 {
        assert!(limit.enter());
    }
    assert_eq!(limit.depth(), 10_000);
}

#[test]
fn test_balanced_enter_leave_returns_to_zero() {
    fn nest(limit: &mut DepthLimit, n: usize) {
        if n == 0 || !limit.enter() {
            return;
        }
        nest(limit, n - 1);
        limit.leave();
    }

    let mut limit = DepthLimit::default();
    nest(&mut limit, 500);
    assert_eq!(limit.depth(), 0);
}

#[test]
fn test_deep_recursion_with_stack_growth() {
    fn deep(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep(n - 1) + 1 })
    }

    assert_eq!(deep(100_000), 100_000);
}

#[test]
fn test_returns_closure_result() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}
