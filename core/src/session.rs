use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, Ref, RefCell};
use core::mem;

use crate::*;

/// Work to run on the next display frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Host primitive that runs a callback once on the next display frame, like `requestAnimationFrame`.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback);
}

/// Scheduler advanced by hand, one frame per [`ManualScheduler::run_frame`] call.
#[derive(Default)]
pub struct ManualScheduler {
    pending: RefCell<VecDeque<FrameCallback>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs every callback requested before this frame started. Callbacks they request wait for the next
    /// frame. Returns how many callbacks ran.
    pub fn run_frame(&self) -> usize {
        let batch = mem::take(&mut *self.pending.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push_back(callback);
    }
}

/// Cancellation token for a running animation loop.
#[derive(Clone, Debug, Default)]
pub struct AnimationHandle {
    cancelled: Rc<Cell<bool>>,
}

impl AnimationHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Owns the current board and the animation loop that runs on it after a win.
///
/// The loop only holds a weak reference to the board and a cancellation handle, so replacing the board
/// with [`GameSession::new_game`] or dropping the session stops it before it can touch the old board again.
pub struct GameSession<S: FrameScheduler + 'static> {
    board: Rc<RefCell<Board>>,
    scheduler: Rc<S>,
    animation: Option<AnimationHandle>,
}

impl<S: FrameScheduler + 'static> GameSession<S> {
    pub fn new(board: Board, scheduler: Rc<S>) -> Self {
        let mut session = Self {
            board: Rc::new(RefCell::new(board)),
            scheduler,
            animation: None,
        };
        session.sync_animation();
        session
    }

    pub fn board(&self) -> Ref<'_, Board> {
        self.board.borrow()
    }

    pub fn scheduler(&self) -> &Rc<S> {
        &self.scheduler
    }

    pub fn open(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let outcome = self.board.borrow_mut().open(coords)?;
        self.sync_animation();
        Ok(outcome)
    }

    pub fn flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let outcome = self.board.borrow_mut().flag(coords)?;
        self.sync_animation();
        Ok(outcome)
    }

    pub fn lose(&mut self) {
        self.board.borrow_mut().lose();
    }

    pub fn auto_win(&mut self) -> RevealOutcome {
        let outcome = self.board.borrow_mut().auto_win();
        self.sync_animation();
        outcome
    }

    /// Swaps in a fresh board. The previous board's animation is cancelled first.
    pub fn new_game(&mut self, board: Board) {
        self.stop_animation();
        log::debug!("New game: {:?}", board.config());
        self.board = Rc::new(RefCell::new(board));
        self.sync_animation();
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn stop_animation(&mut self) {
        if let Some(handle) = self.animation.take() {
            log::debug!("Win animation cancelled");
            handle.cancel();
        }
    }

    fn sync_animation(&mut self) {
        if self.animation.is_some() || !self.board.borrow().is_animating() {
            return;
        }

        let handle = AnimationHandle::default();
        schedule_frame(
            Rc::downgrade(&self.board),
            self.scheduler.clone(),
            handle.clone(),
        );
        self.animation = Some(handle);
    }
}

impl<S: FrameScheduler + 'static> Drop for GameSession<S> {
    fn drop(&mut self) {
        self.stop_animation();
    }
}

/// Requests one animation frame which ticks the board and re-requests itself, until cancelled or the
/// board is gone.
fn schedule_frame<S: FrameScheduler + 'static>(
    board: Weak<RefCell<Board>>,
    scheduler: Rc<S>,
    handle: AnimationHandle,
) {
    let next_scheduler = scheduler.clone();
    scheduler.request_frame(Box::new(move || {
        if handle.is_cancelled() {
            return;
        }
        let Some(live_board) = board.upgrade() else {
            log::debug!("Win animation stopped, board was dropped");
            return;
        };

        // a host still reading the board skips this frame
        if let Ok(mut live_board) = live_board.try_borrow_mut() {
            live_board.tick();
        }

        schedule_frame(board, next_scheduler, handle);
    }));
}
