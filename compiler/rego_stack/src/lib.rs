//! Recursion safety for the recursive-descent parser.
//!
//! Two mechanisms work together:
//!
//! - [`DepthLimit`] is the semantic bound. Every non-terminal production
//!   calls [`DepthLimit::enter`] on the way in and [`DepthLimit::leave`] on
//!   the way out; once the configured ceiling is exceeded, `enter` refuses
//!   and the parser reports "max parsing recursion depth exceeded".
//! - [`ensure_sufficient_stack`] is the physical bound. It grows the native
//!   stack on demand so that the default ceiling (100 000 nested
//!   productions) is reachable without overflowing the thread's stack.
//!
//! # Configuration
//!
//! - **Red zone**: 128KB - If less than this remains, we grow the stack
//! - **Growth size**: 2MB - Each growth allocates this much additional space

/// Default ceiling on nested productions.
pub const DEFAULT_MAX_DEPTH: usize = 100_000;

/// Minimum stack space to keep available.
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Enter/leave counter bounding recursion depth.
///
/// A ceiling of `0` disables the check. The counter is balanced: a refused
/// `enter` does not count, so every successful `enter` must be matched by
/// exactly one `leave`.
#[derive(Clone, Debug)]
pub struct DepthLimit {
    depth: usize,
    max: usize,
}

impl DepthLimit {
    pub fn new(max: usize) -> Self {
        DepthLimit { depth: 0, max }
    }

    /// Increment the depth; returns `false` (leaving the depth unchanged)
    /// if that would exceed the ceiling.
    #[inline]
    pub fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.max > 0 && self.depth > self.max {
            self.depth -= 1;
            return false;
        }
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "unbalanced DepthLimit::leave");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for DepthLimit {
    fn default() -> Self {
        DepthLimit::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests;
