//! Stack safety for the recursive parts of goose.
//!
//! The parser descends once per nested expression and the evaluator once per
//! nested call, so a deeply recursive goose program (or a long chain of
//! binary operators) can exhaust the native stack. Wrapping those recursion
//! points in [`ensure_sufficient_stack`] grows the stack on demand instead.
//!
//! - **Red zone**: 128KB. Below this much remaining stack we grow.
//! - **Growth size**: 2MB per segment. A single goose call frame walks
//!   through several Rust frames (call, block, statement, expression), so
//!   segments are larger than a parser alone would need.
//!
//! Generator bodies and iteration producers run on their own threads;
//! [`spawn_worker`] starts those with a stack large enough that the red
//! zone check is rarely hit right after a resume.

/// Minimum stack space to keep available.
const RED_ZONE: usize = 128 * 1024;

/// Stack space allocated for each new segment.
const STACK_PER_SEGMENT: usize = 2 * 1024 * 1024;

/// Initial stack for worker threads.
const WORKER_STACK_SIZE: usize = 4 * 1024 * 1024;

/// Start a named worker thread running `f`.
pub fn spawn_worker<F, T>(name: &str, f: F) -> std::io::Result<std::thread::JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    std::thread::Builder::new()
        .name(name.to_string())
        .stack_size(WORKER_STACK_SIZE)
        .spawn(move || ensure_sufficient_stack(f))
}

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn eval_expr(&mut self, expr: &Expr, scope: ScopeId) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_SEGMENT, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_sum_survives_deep_recursion() {
        fn sum_to(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { n + sum_to(n - 1) })
        }

        assert_eq!(sum_to(200_000), 200_000 * 200_001 / 2);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<&str, String> = ensure_sufficient_stack(|| Ok("goose"));
        assert_eq!(result, Ok("goose"));
    }

    #[test]
    fn test_worker_runs_deep_recursion() {
        fn depth(n: u32) -> u32 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
        }

        let handle = spawn_worker("goose-test", || depth(100_000));
        let joined = handle.map(|h| h.join().ok());
        assert!(matches!(joined, Ok(Some(100_000))));
    }
}
