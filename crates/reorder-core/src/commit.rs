use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use crate::gesture::{GestureController, Release, ReorderEvent};

/// Clears the reordering flag and resets the drag when dropped.
///
/// Created at the moment a commit starts, so the list recovers whether the
/// commit future completes, fails, or is dropped before it ever runs. When the
/// controller is borrowed at that point the reset is left to the next call
/// into it.
#[must_use]
pub struct CommitGuard {
    controller: Rc<RefCell<GestureController>>,
    settle_pending: Rc<Cell<bool>>,
}

impl CommitGuard {
    pub fn new(controller: Rc<RefCell<GestureController>>) -> Self {
        let settle_pending = controller.borrow().settle_flag();
        Self {
            controller,
            settle_pending,
        }
    }
}

impl Drop for CommitGuard {
    fn drop(&mut self) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.finish_commit(),
            Err(_) => {
                log::debug!("gesture controller busy, deferring reorder settle");
                self.settle_pending.set(true);
            }
        }
    }
}

/// Settle the commit started by [`GestureController::release`] once `commit`
/// resolves. The error of `commit`, if any, is returned unchanged.
pub fn commit_with<F>(
    controller: &Rc<RefCell<GestureController>>,
    commit: F,
) -> impl Future<Output = anyhow::Result<()>> + use<F>
where
    F: Future<Output = anyhow::Result<()>> + 'static,
{
    let guard = CommitGuard::new(Rc::clone(controller));
    async move {
        let result = commit.await;
        drop(guard);
        result
    }
}

/// Release the current gesture and run the controller's `on_reordered`
/// callback if the item moved.
///
/// The release itself happens synchronously: the list is in its committing
/// state as soon as this returns, which is what keeps a second drag from
/// starting before the first reorder settled.
pub fn release_and_commit(
    controller: &Rc<RefCell<GestureController>>,
) -> impl Future<Output = anyhow::Result<()>> + use<> {
    let (release, on_reordered) = {
        let mut this = controller.borrow_mut();
        let release = this.release();
        (release, this.callbacks_ref().reordered())
    };

    let pending = match (release, on_reordered) {
        (Release::Reset | Release::Busy, _) => None,
        (Release::Commit(_), None) => {
            controller.borrow_mut().finish_commit();
            None
        }
        (Release::Commit(event), Some(on_reordered)) => {
            let guard = CommitGuard::new(Rc::clone(controller));
            Some((guard, on_reordered(event)))
        }
    };

    async move {
        let Some((guard, commit)) = pending else {
            return Ok(());
        };
        let result = commit.await;
        drop(guard);
        if let Err(err) = &result {
            log::warn!("reorder callback failed: {err:#}");
        }
        result
    }
}

/// Apply `event` to a caller-owned sequence: remove the item at `from` and
/// insert it at `to`, clamped to the end of the list.
pub fn apply_reorder<T>(items: &mut Vec<T>, event: &ReorderEvent) {
    if event.from >= items.len() || event.from == event.to {
        return;
    }
    let item = items.remove(event.from);
    let to = event.to.min(items.len());
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(from: usize, to: usize) -> ReorderEvent {
        ReorderEvent {
            key: String::new(),
            from,
            to,
        }
    }

    #[test]
    fn apply_reorder_moves_items() {
        let mut items = vec!["A", "B", "C", "D", "E"];
        apply_reorder(&mut items, &event(0, 3));
        assert_eq!(items, ["B", "C", "D", "A", "E"]);

        let mut items = vec!["A", "B", "C", "D", "E"];
        apply_reorder(&mut items, &event(4, 1));
        assert_eq!(items, ["A", "E", "B", "C", "D"]);

        let mut items = vec!["A", "B", "C"];
        apply_reorder(&mut items, &event(0, 3));
        assert_eq!(items, ["B", "C", "A"]);
    }

    #[test]
    fn apply_reorder_ignores_out_of_range_source() {
        let mut items = vec!["A", "B"];
        apply_reorder(&mut items, &event(5, 0));
        assert_eq!(items, ["A", "B"]);
    }
}
