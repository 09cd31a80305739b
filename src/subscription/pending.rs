use crate::subscription::client::Error;
use crate::subscription::messages::Transition;
use crate::subscription::registry::Handler;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;

/// Result storage shared by a pending operation and its [Completion](crate::subscription::Completion)
pub(crate) type Slot<T> = Rc<RefCell<Option<Result<T, Error>>>>;

/// Confirmations still expected by a (p)subscribe or (p)unsubscribe command
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Remaining {
    /// One confirmation per identifier sent
    Exactly(usize),
    /// Argument-less unsubscribe: confirmations until no subscription of that kind is left
    UntilEmpty,
}

/// In-flight (p)subscribe or (p)unsubscribe command
pub(crate) struct TransitionOperation<'a> {
    pub transition: Transition,

    /// Handler registered for every confirmed identifier, only set for subscribe commands
    pub handler: Option<Handler<'a>>,

    pub remaining: Remaining,

    /// First error observed while consuming confirmations
    error: Option<Error>,

    slot: Slot<()>,
}

impl<'a> TransitionOperation<'a> {
    pub fn new(transition: Transition, handler: Option<Handler<'a>>, remaining: Remaining, slot: Slot<()>) -> Self {
        Self {
            transition,
            handler,
            remaining,
            error: None,
            slot,
        }
    }

    /// Consumes one confirmation slot. Returns true once all expected confirmations were received.
    ///
    /// `drained` signals that the subscription kind of the operation has no entry left, which
    /// completes argument-less unsubscribe commands.
    pub fn consume(&mut self, error: Option<Error>, drained: bool) -> bool {
        if self.error.is_none() {
            self.error = error;
        }

        match &mut self.remaining {
            Remaining::Exactly(count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            Remaining::UntilEmpty => drained,
        }
    }

    /// Resolves the completion with the first recorded error, if any
    pub fn complete(self) {
        let result = match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        };

        *self.slot.borrow_mut() = Some(result);
    }

    pub fn fail(self, error: Error) {
        *self.slot.borrow_mut() = Some(Err(error));
    }
}

/// In-flight PUBLISH or PUBSUB command, answered by exactly one reply frame
pub(crate) struct RequestOperation<'a, F> {
    /// Evaluates the reply and resolves the typed completion
    resolve: Box<dyn FnOnce(Result<F, Error>) + 'a>,
}

impl<'a, F> RequestOperation<'a, F> {
    pub fn new(resolve: Box<dyn FnOnce(Result<F, Error>) + 'a>) -> Self {
        Self { resolve }
    }

    pub fn resolve(self, result: Result<F, Error>) {
        (self.resolve)(result)
    }
}

pub(crate) enum PendingOperation<'a, F> {
    Transition(TransitionOperation<'a>),
    Request(RequestOperation<'a, F>),
}

impl<F> PendingOperation<'_, F> {
    pub fn fail(self, error: Error) {
        match self {
            PendingOperation::Transition(operation) => operation.fail(error),
            PendingOperation::Request(operation) => operation.resolve(Err(error)),
        }
    }
}

/// Commands awaiting confirmations or replies, in send order
///
/// Redis answers in command order, so the head of the queue owns the next non-message frame.
pub(crate) struct PendingQueue<'a, F> {
    operations: VecDeque<PendingOperation<'a, F>>,
}

impl<'a, F> PendingQueue<'a, F> {
    pub fn new() -> Self {
        Self {
            operations: VecDeque::new(),
        }
    }

    pub fn push(&mut self, operation: PendingOperation<'a, F>) {
        self.operations.push_back(operation);
    }

    /// Head operation, if it awaits confirmations of the given command type
    pub fn front_transition(&mut self, transition: Transition) -> Option<&mut TransitionOperation<'a>> {
        match self.operations.front_mut() {
            Some(PendingOperation::Transition(operation)) if operation.transition == transition => Some(operation),
            _ => None,
        }
    }

    pub fn head_is_request(&self) -> bool {
        matches!(self.operations.front(), Some(PendingOperation::Request(_)))
    }

    /// Command type of the head operation, if it awaits confirmations
    pub fn head_transition(&self) -> Option<Transition> {
        match self.operations.front() {
            Some(PendingOperation::Transition(operation)) => Some(operation.transition),
            _ => None,
        }
    }

    /// Pops the head operation if it awaits a reply
    pub fn pop_request(&mut self) -> Option<RequestOperation<'a, F>> {
        if !self.head_is_request() {
            return None;
        }

        match self.operations.pop_front() {
            Some(PendingOperation::Request(operation)) => Some(operation),
            _ => None,
        }
    }

    /// Pops the head operation if it awaits confirmations
    pub fn pop_transition(&mut self) -> Option<TransitionOperation<'a>> {
        self.head_transition()?;

        match self.operations.pop_front() {
            Some(PendingOperation::Transition(operation)) => Some(operation),
            _ => None,
        }
    }

    /// Takes all pending operations, so they can be failed without holding the queue
    pub fn drain(&mut self) -> VecDeque<PendingOperation<'a, F>> {
        core::mem::take(&mut self.operations)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
