use crate::error::DepthExceeded;

/// Deepest nesting level either direction will walk into. Containers at
/// depth `MAX_DEPTH` are still accepted; their children are not.
pub const MAX_DEPTH: usize = 1024;

/// Recursion context threaded through every nested call of the decode and
/// encode walks: the current depth plus the call's options.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Guard<O> {
    depth: usize,
    options: O,
}

impl<O: Copy> Guard<O> {
    #[inline]
    pub(crate) fn new(options: O) -> Self {
        Self { depth: 0, options }
    }

    #[inline]
    pub(crate) fn check(self) -> Result<Self, DepthExceeded> {
        if self.depth > MAX_DEPTH {
            return Err(DepthExceeded { limit: MAX_DEPTH });
        }
        Ok(self)
    }

    #[inline]
    pub(crate) fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            options: self.options,
        }
    }

    #[inline]
    pub(crate) fn options(&self) -> &O {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_one_past_the_limit() {
        let mut guard = Guard::new(());
        for _ in 0..MAX_DEPTH {
            guard = guard.nested();
        }
        assert!(guard.check().is_ok());
        assert_eq!(
            guard.nested().check().unwrap_err(),
            DepthExceeded { limit: MAX_DEPTH }
        );
    }

    #[test]
    fn carries_options_through_nesting() {
        let guard = Guard::new((true, false)).nested().nested();
        assert_eq!(*guard.options(), (true, false));
    }
}
