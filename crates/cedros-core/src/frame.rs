//! Frame-synchronous callback queue
//!
//! A single-threaded stand-in for the platform's animation-frame service.
//! Every subsystem instance registers as an owner and keeps at most one
//! pending callback: requesting a new frame replaces the previous request.
//!
//! The host calls [`FrameScheduler::run_frame`] once per display frame.
//! Callbacks requested while a frame is running are deferred to the next one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

/// Identifies the instance that owns a pending frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

/// Handle to one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Timestamp passed to frame callbacks (time since the host clock started)
pub type FrameTime = Duration;

type FrameCallback = Box<dyn FnOnce(FrameTime)>;

struct PendingFrame {
    handle: FrameHandle,
    owner: OwnerId,
    callback: FrameCallback,
}

#[derive(Default)]
struct Queue {
    next_owner: u64,
    next_handle: u64,
    pending: Vec<PendingFrame>,
    by_owner: HashMap<OwnerId, FrameHandle>,
    frames_run: u64,
}

impl Queue {
    /// Detach a pending frame. The caller drops it after releasing the borrow,
    /// since captured state may touch the scheduler when dropped.
    fn remove(&mut self, handle: FrameHandle) -> Option<PendingFrame> {
        let pos = self.pending.iter().position(|p| p.handle == handle)?;
        let removed = self.pending.remove(pos);
        if self.by_owner.get(&removed.owner) == Some(&handle) {
            self.by_owner.remove(&removed.owner);
        }
        Some(removed)
    }
}

/// Cloneable handle to a shared frame queue
#[derive(Clone, Default)]
pub struct FrameScheduler {
    queue: Rc<RefCell<Queue>>,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("FrameScheduler")
            .field("pending", &queue.pending.len())
            .field("frames_run", &queue.frames_run)
            .finish()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new owner key for a subsystem instance
    pub fn register_owner(&self) -> OwnerId {
        let mut queue = self.queue.borrow_mut();
        queue.next_owner += 1;
        OwnerId(queue.next_owner)
    }

    /// Request `callback` to run on the next frame
    ///
    /// Any callback the same owner still has pending is cancelled first,
    /// so an owner never has two computations in flight.
    pub fn request<F>(&self, owner: OwnerId, callback: F) -> FrameHandle
    where
        F: FnOnce(FrameTime) + 'static,
    {
        let (handle, replaced) = {
            let mut queue = self.queue.borrow_mut();
            let replaced = queue
                .by_owner
                .get(&owner)
                .copied()
                .and_then(|previous| queue.remove(previous));
            queue.next_handle += 1;
            let handle = FrameHandle(queue.next_handle);
            queue.pending.push(PendingFrame {
                handle,
                owner,
                callback: Box::new(callback),
            });
            queue.by_owner.insert(owner, handle);
            (handle, replaced)
        };
        if let Some(previous) = replaced {
            trace!(?owner, previous = ?previous.handle, "replaced pending frame");
        }
        handle
    }

    /// Cancel a pending callback. No-op if it already ran or was cancelled.
    pub fn cancel(&self, handle: FrameHandle) {
        let removed = self.queue.borrow_mut().remove(handle);
        drop(removed);
    }

    /// Cancel whatever the owner has pending
    pub fn cancel_owner(&self, owner: OwnerId) {
        let removed = {
            let mut queue = self.queue.borrow_mut();
            queue
                .by_owner
                .get(&owner)
                .copied()
                .and_then(|handle| queue.remove(handle))
        };
        drop(removed);
    }

    #[inline]
    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.queue
            .borrow()
            .pending
            .iter()
            .any(|p| p.handle == handle)
    }

    #[inline]
    pub fn has_pending(&self, owner: OwnerId) -> bool {
        self.queue.borrow().by_owner.contains_key(&owner)
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Number of frames run so far
    pub fn frames_run(&self) -> u64 {
        self.queue.borrow().frames_run
    }

    /// Run every callback that was pending when the frame began
    ///
    /// Callbacks run in request order. A callback cancelled by an earlier
    /// callback of the same frame does not run. Returns how many ran.
    pub fn run_frame(&self, now: FrameTime) -> usize {
        let batch: Vec<FrameHandle> = {
            let mut queue = self.queue.borrow_mut();
            queue.frames_run += 1;
            queue.pending.iter().map(|p| p.handle).collect()
        };

        let mut ran = 0;
        for handle in batch {
            // Take the callback out before running it so it can re-request.
            let callback = {
                let removed = self.queue.borrow_mut().remove(handle);
                let Some(pending) = removed else {
                    continue;
                };
                pending.callback
            };
            callback(now);
            ran += 1;
        }
        ran
    }
}
