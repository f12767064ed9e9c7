//! Optimizer options with thread-confined scoped overrides.
//!
//! `Options::bind` pushes a value on the calling thread's stack and returns a
//! guard; dropping the guard pops it again, so the enclosing value is
//! restored on every exit path, including unwinding. Threads never observe
//! each other's bindings.

use std::cell::RefCell;
use std::marker::PhantomData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Options {
    sort_by_cost: bool,
    allow_force_strict: bool,
    keep_order: bool,
}

thread_local! {
    static OPTIONS_STACK: RefCell<Vec<Options>> = const { RefCell::new(Vec::new()) };
}

impl Options {
    pub fn new(sort_by_cost: bool, allow_force_strict: bool, keep_order: bool) -> Self {
        Options { sort_by_cost, allow_force_strict, keep_order }
    }

    pub fn with_sort_by_cost(mut self, value: bool) -> Self {
        self.sort_by_cost = value;
        self
    }

    pub fn with_allow_force_strict(mut self, value: bool) -> Self {
        self.allow_force_strict = value;
        self
    }

    pub fn with_keep_order(mut self, value: bool) -> Self {
        self.keep_order = value;
        self
    }

    pub fn sort_by_cost(&self) -> bool {
        self.sort_by_cost
    }

    pub fn allow_force_strict(&self) -> bool {
        self.allow_force_strict
    }

    pub fn keep_order(&self) -> bool {
        self.keep_order
    }

    /// The innermost bound value on this thread, or the default.
    pub fn current() -> Options {
        OPTIONS_STACK.with(|stack| stack.borrow().last().copied().unwrap_or_default())
    }

    /// Make `opts` current until the returned guard is dropped.
    #[must_use = "options are unbound as soon as the guard is dropped"]
    pub fn bind(opts: Options) -> OptionsGuard {
        let depth = OPTIONS_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(opts);
            stack.len()
        });
        OptionsGuard { depth, _not_send: PhantomData }
    }
}

/// Restores the enclosing options when dropped.
#[derive(Debug)]
pub struct OptionsGuard {
    depth: usize,
    // the guard refers to this thread's stack
    _not_send: PhantomData<*const ()>,
}

impl Drop for OptionsGuard {
    fn drop(&mut self) {
        OPTIONS_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(stack.len(), self.depth, "options guards dropped out of order");
            stack.truncate(self.depth - 1);
        });
    }
}

pub fn opt_sort_by_cost() -> bool {
    Options::current().sort_by_cost()
}

pub fn opt_allow_force_strict() -> bool {
    Options::current().allow_force_strict()
}

pub fn opt_keep_order() -> bool {
    Options::current().keep_order()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(sort_by_cost: bool, allow_force_strict: bool, keep_order: bool) {
        assert_eq!(opt_sort_by_cost(), sort_by_cost);
        assert_eq!(opt_allow_force_strict(), allow_force_strict);
        assert_eq!(opt_keep_order(), keep_order);
    }

    #[test]
    fn binding_and_nesting() {
        check(false, false, false);
        {
            let _outer = Options::bind(Options::new(true, true, false));
            check(true, true, false);
            {
                let _inner = Options::bind(Options::new(false, false, true));
                check(false, false, true);
            }
            check(true, true, false);
        }
        check(false, false, false);
    }

    #[test]
    fn early_return_restores_enclosing_value() {
        fn bail(level: u32) -> Option<()> {
            let _guard = Options::bind(Options::default().with_keep_order(level % 2 == 0));
            if level == 0 {
                return None;
            }
            bail(level - 1)?;
            Some(())
        }
        let _outer = Options::bind(Options::new(true, false, false));
        assert!(bail(5).is_none());
        check(true, false, false);
    }

    #[test]
    fn unwinding_restores_enclosing_value() {
        let result = std::panic::catch_unwind(|| {
            let _guard = Options::bind(Options::new(true, true, true));
            panic!("planner failure");
        });
        assert!(result.is_err());
        check(false, false, false);
    }

    #[test]
    fn bindings_are_thread_confined() {
        let _guard = Options::bind(Options::new(true, true, true));
        std::thread::spawn(|| check(false, false, false)).join().unwrap();
        check(true, true, true);
    }
}
