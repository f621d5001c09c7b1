//! Frame timing sources.
//!
//! The host owns real frame timing. A [`FrameClock`] only books and cancels
//! the next frame; when the host's frame arrives, the embedder hands the
//! request and timestamp to [`FrameScheduler::run_frame`](crate::FrameScheduler::run_frame).

use std::cell::RefCell;
use std::rc::Rc;

/// Ticket for one booked frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Host frame-timing primitive.
pub trait FrameClock {
    /// Book one callback before the next paint.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancel a booked frame. Unknown or already-fired requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

impl<C: FrameClock + ?Sized> FrameClock for Box<C> {
    fn request_frame(&mut self) -> FrameRequest {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        (**self).cancel_frame(request);
    }
}

#[derive(Debug, Default)]
struct ManualClockInner {
    now: f64,
    next_id: u64,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

/// Frame clock advanced by hand, for headless runs and tests.
///
/// Cloneable handle; the scheduler keeps one clone while the embedder
/// advances time through another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    inner: Rc<RefCell<ManualClockInner>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `now` milliseconds.
    #[must_use]
    pub fn starting_at(now: f64) -> Self {
        let clock = Self::new();
        clock.inner.borrow_mut().now = now;
        clock
    }

    /// Current timestamp in milliseconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    /// Booked, not yet fired request.
    #[must_use]
    pub fn pending(&self) -> Option<FrameRequest> {
        self.inner.borrow().pending
    }

    /// Total requests booked and cancelled so far.
    #[must_use]
    pub fn counts(&self) -> (u64, u64) {
        let inner = self.inner.borrow();
        (inner.requested, inner.cancelled)
    }

    /// Move time forward by `ms` and fire the pending frame, if any.
    pub fn advance(&self, ms: f64) -> Option<(FrameRequest, f64)> {
        let mut inner = self.inner.borrow_mut();
        inner.now += ms;
        let now = inner.now;
        inner.pending.take().map(|request| (request, now))
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> FrameRequest {
        let mut inner = self.inner.borrow_mut();
        let request = FrameRequest::new(inner.next_id);
        inner.next_id += 1;
        inner.requested += 1;
        inner.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut inner = self.inner.borrow_mut();
        if inner.pending == Some(request) {
            inner.pending = None;
            inner.cancelled += 1;
        }
    }
}
