//! Continuation-based execution runtime.
//!
//! An [`Op`] is either a finished value or a suspension: a description of the
//! external effect the computation is waiting on (`E`), paired with a
//! continuation that accepts the effect's result (`R`) and yields the next
//! `Op`. Drivers execute chains of suspensions in a flat loop
//! ([`run_to_completion`]), so a computation suspending hundreds of thousands
//! of times consumes constant call stack.
//!
//! Continuations are one-shot by construction: resuming consumes the
//! [`Continuation`] by value, so invoking one twice is unrepresentable rather
//! than a runtime error. Dropping an unresumed continuation abandons the rest
//! of the chain; building a suspension has no side effect, so no teardown is
//! required.

use alloc::boxed::Box;

/// A suspendable operation yielding a `T`, suspending with effect
/// descriptions of type `E` and resuming with effect results of type `R`.
pub struct Op<E, R, T> {
    inner: Inner<E, R, T>,
}

enum Inner<E, R, T> {
    Done(T),
    Suspend(E, Box<dyn FnOnce(R) -> Op<E, R, T>>),
}

/// The rest of a suspended computation. Resuming consumes it.
pub struct Continuation<E, R, T> {
    resume: Box<dyn FnOnce(R) -> Op<E, R, T>>,
}

impl<E, R, T> Continuation<E, R, T> {
    /// Feeds the external effect's result into the computation, yielding the
    /// next operation to drive.
    #[must_use]
    pub fn resume(self, result: R) -> Op<E, R, T> {
        (self.resume)(result)
    }
}

/// The observable state of an [`Op`] after one driving step.
pub enum Flow<E, R, T> {
    /// The computation finished with a value.
    Finished(T),
    /// The computation is waiting on an external effect.
    Suspended(E, Continuation<E, R, T>),
}

impl<E, R, T> Op<E, R, T> {
    /// An already-finished operation.
    pub fn done(value: T) -> Self {
        Self {
            inner: Inner::Done(value),
        }
    }

    /// An operation that immediately yields control, waiting on `effect`.
    pub fn suspend<F>(effect: E, resume: F) -> Self
    where
        F: FnOnce(R) -> Op<E, R, T> + 'static,
    {
        Self {
            inner: Inner::Suspend(effect, Box::new(resume)),
        }
    }

    /// Inspects the operation, returning either its value or its suspension.
    pub fn step(self) -> Flow<E, R, T> {
        match self.inner {
            Inner::Done(value) => Flow::Finished(value),
            Inner::Suspend(effect, resume) => Flow::Suspended(effect, Continuation { resume }),
        }
    }

    /// Sequencing: run `self`, then feed its result to `f` to decide what to
    /// do next. The remainder is encoded in the continuation closure, not by
    /// recursive driving.
    pub fn and_then<U, F>(self, f: F) -> Op<E, R, U>
    where
        F: FnOnce(T) -> Op<E, R, U> + 'static,
        E: 'static,
        R: 'static,
        T: 'static,
    {
        match self.inner {
            Inner::Done(value) => f(value),
            Inner::Suspend(effect, resume) => {
                Op::suspend(effect, move |r| resume(r).and_then(f))
            }
        }
    }

    /// Maps the finished value.
    pub fn map<U, F>(self, f: F) -> Op<E, R, U>
    where
        F: FnOnce(T) -> U + 'static,
        E: 'static,
        R: 'static,
        T: 'static,
        U: 'static,
    {
        self.and_then(move |v| Op::done(f(v)))
    }
}

/// Drives `op` to completion, performing each requested effect inline via
/// `perform`. This is the only driver loop; it is iterative, so the number of
/// suspensions never grows the call stack.
pub fn run_to_completion<E, R, T>(mut op: Op<E, R, T>, mut perform: impl FnMut(E) -> R) -> T {
    loop {
        match op.step() {
            Flow::Finished(value) => return value,
            Flow::Suspended(effect, cont) => {
                let result = perform(effect);
                op = cont.resume(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Flow, Op, run_to_completion};

    fn countdown(n: u32, total: u32) -> Op<u32, u32, u32> {
        if n == 0 {
            Op::done(total)
        } else {
            // The recursive call happens inside the continuation, one level
            // per resume, so the chain is built lazily.
            Op::suspend(n, move |step| countdown(n - 1, total + step))
        }
    }

    #[test]
    fn pure_finishes_immediately() {
        match Op::<(), (), _>::done(7).step() {
            Flow::Finished(v) => assert_eq!(v, 7),
            Flow::Suspended(..) => panic!("unexpected suspension"),
        }
    }

    #[test]
    fn suspensions_resume_in_order() {
        let mut seen = alloc::vec::Vec::new();
        let result = run_to_completion(countdown(3, 0), |effect| {
            seen.push(effect);
            1
        });
        assert_eq!(result, 3);
        assert_eq!(seen, [3, 2, 1]);
    }

    #[test]
    fn and_then_chains_through_suspensions() {
        let op = countdown(2, 0).and_then(|total| Op::done(total * 10));
        let result = run_to_completion(op, |_| 1);
        assert_eq!(result, 20);
    }

    #[test]
    fn map_transforms_result() {
        let op = Op::<(), (), _>::done(21).map(|v| v * 2);
        let result = run_to_completion(op, |()| ());
        assert_eq!(result, 42);
    }

    #[test]
    fn hundreds_of_thousands_of_suspensions_run_flat() {
        let result = run_to_completion(countdown(300_000, 0), |_| 1);
        assert_eq!(result, 300_000);
    }

    #[test]
    fn dropping_a_continuation_abandons_the_chain() {
        let op = countdown(10, 0);
        match op.step() {
            Flow::Suspended(effect, cont) => {
                assert_eq!(effect, 10);
                drop(cont);
            }
            Flow::Finished(_) => panic!("expected a suspension"),
        }
    }
}
