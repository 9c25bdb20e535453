//! Parser guards against runaway recursion and loops.

use super::ParseError;
use crate::parser::token::Span;

/// Maximum nesting depth before rejecting a parse. Deep enough for any
/// realistic source, shallow enough that debug-build stacks survive the
/// recursive descent.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Maximum iterations for any parser loop.
const MAX_LOOP_ITERATIONS: usize = 10_000;

/// Iteration counter for parser loops that must always terminate.
pub struct LoopGuard {
    name: &'static str,
    count: usize,
    max: usize,
}

impl LoopGuard {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            count: 0,
            max: MAX_LOOP_ITERATIONS,
        }
    }

    /// Count one iteration, failing once the limit is exceeded.
    #[inline]
    pub fn check(&mut self) -> Result<(), ParseError> {
        self.count += 1;
        if self.count > self.max {
            return Err(ParseError::parser_limit_exceeded(
                format!("Loop '{}' exceeded {} iterations", self.name, self.max),
                Span::default(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_guard_under_limit() {
        let mut guard = LoopGuard::new("test");
        for _ in 0..100 {
            assert!(guard.check().is_ok());
        }
    }

    #[test]
    fn test_loop_guard_exceeds_limit() {
        let mut guard = LoopGuard::new("test");
        for _ in 0..MAX_LOOP_ITERATIONS {
            let _ = guard.check();
        }
        assert!(guard.check().is_err());
    }
}
