//! Synchronous hooks run inside key dispatch.
//!
//! Hooks run on the dispatching call stack, before the action reaches its
//! gate, so they can fill in or veto what is about to be sent. A hook may
//! call back into the registry (including adding or removing hooks); the
//! list is detached while it runs, and a key dispatched from inside a hook
//! does not run its action.

use std::cell::{Cell, RefCell};

use serde_json::Value;
use till_common::{ActionItem, KeybindingError};

/// Handle for removing a hook again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub(crate) u64);

/// Raised just before a matched action runs, so a subscriber can supply its
/// payload.
#[derive(Debug, Clone)]
pub struct PayloadRequest {
    pub zone_id: String,
    pub action: ActionItem,
    pub payload: Option<Value>,
}

/// Raised after the payload is settled. Setting `cancel` stops the action.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub zone_id: String,
    pub action: ActionItem,
    pub payload: Option<Value>,
    pub cancel: bool,
}

pub type PayloadHook = dyn FnMut(&mut PayloadRequest) -> Result<(), KeybindingError>;
pub type PendingActionHook = dyn FnMut(&mut PendingAction);

pub(crate) struct HookList<F: ?Sized> {
    hooks: RefCell<Vec<(HookId, Box<F>)>>,
    running: Cell<bool>,
    /// Ids of the hooks detached by the pass in progress.
    running_ids: RefCell<Vec<HookId>>,
    removed_while_running: RefCell<Vec<HookId>>,
}

impl<F: ?Sized> HookList<F> {
    pub(crate) fn new() -> Self {
        Self {
            hooks: RefCell::new(Vec::new()),
            running: Cell::new(false),
            running_ids: RefCell::new(Vec::new()),
            removed_while_running: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, id: HookId, hook: Box<F>) {
        self.hooks.borrow_mut().push((id, hook));
    }

    /// Removes `id` if this list owns it, including while the list runs.
    pub(crate) fn remove(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        if hooks.len() != before {
            return true;
        }
        if self.running.get() && self.running_ids.borrow().contains(&id) {
            let mut removed = self.removed_while_running.borrow_mut();
            if removed.contains(&id) {
                return false;
            }
            removed.push(id);
            return true;
        }
        false
    }

    /// Calls `f` on every hook in registration order until it returns
    /// `false`. Hooks removed by an earlier hook are skipped.
    ///
    /// Returns `false` without calling anything when the list is already
    /// running further up the stack.
    pub(crate) fn each(&self, mut f: impl FnMut(&mut F) -> bool) -> bool {
        if self.running.replace(true) {
            return false;
        }
        let mut detached = std::mem::take(&mut *self.hooks.borrow_mut());
        *self.running_ids.borrow_mut() = detached.iter().map(|(id, _)| *id).collect();

        for (id, hook) in detached.iter_mut() {
            if self.removed_while_running.borrow().contains(id) {
                continue;
            }
            if !f(hook.as_mut()) {
                break;
            }
        }

        let removed = std::mem::take(&mut *self.removed_while_running.borrow_mut());
        self.running_ids.borrow_mut().clear();
        detached.retain(|(id, _)| !removed.contains(id));
        let mut hooks = self.hooks.borrow_mut();
        let added = std::mem::take(&mut *hooks);
        detached.extend(added);
        *hooks = detached;
        self.running.set(false);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Counter = dyn FnMut(&mut u32);

    #[test]
    fn runs_in_registration_order() {
        let list: HookList<Counter> = HookList::new();
        list.add(HookId(1), Box::new(|n: &mut u32| *n = *n * 10 + 1));
        list.add(HookId(2), Box::new(|n: &mut u32| *n = *n * 10 + 2));

        let mut value = 0;
        list.each(|hook| {
            hook(&mut value);
            true
        });
        assert_eq!(value, 12);
    }

    #[test]
    fn stops_when_asked() {
        let list: HookList<Counter> = HookList::new();
        list.add(HookId(1), Box::new(|n: &mut u32| *n += 1));
        list.add(HookId(2), Box::new(|n: &mut u32| *n += 1));

        let mut value = 0;
        list.each(|hook| {
            hook(&mut value);
            false
        });
        assert_eq!(value, 1);
    }

    #[test]
    fn hooks_may_add_and_remove_hooks_while_running() {
        let list: Rc<HookList<Counter>> = Rc::new(HookList::new());

        let inner = Rc::clone(&list);
        list.add(
            HookId(1),
            Box::new(move |n: &mut u32| {
                *n += 1;
                inner.remove(HookId(2));
                inner.add(HookId(3), Box::new(|n: &mut u32| *n += 100));
            }),
        );
        list.add(HookId(2), Box::new(|n: &mut u32| *n += 10));

        let mut value = 0;
        list.each(|hook| {
            hook(&mut value);
            true
        });
        // Hook 2 was removed before its turn; hook 3 joins the next pass.
        assert_eq!(value, 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_unknown_hook_is_false() {
        let list: HookList<Counter> = HookList::new();
        assert!(!list.remove(HookId(7)));
    }

    #[test]
    fn running_list_only_claims_its_own_hooks() {
        let list: Rc<HookList<Counter>> = Rc::new(HookList::new());
        let claims = Rc::new(RefCell::new(Vec::new()));

        let (inner, seen) = (Rc::clone(&list), Rc::clone(&claims));
        list.add(
            HookId(1),
            Box::new(move |_: &mut u32| {
                let mut seen = seen.borrow_mut();
                seen.push(inner.remove(HookId(9)));
                seen.push(inner.remove(HookId(1)));
                seen.push(inner.remove(HookId(1)));
            }),
        );

        list.each(|hook| {
            hook(&mut 0);
            true
        });
        assert_eq!(*claims.borrow(), [false, true, false]);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn nested_pass_reports_that_it_did_not_run() {
        let list: Rc<HookList<Counter>> = Rc::new(HookList::new());
        let nested = Rc::new(Cell::new(None));

        let (inner, result) = (Rc::clone(&list), Rc::clone(&nested));
        list.add(
            HookId(1),
            Box::new(move |n: &mut u32| {
                *n += 1;
                result.set(Some(inner.each(|_| true)));
            }),
        );

        let mut value = 0;
        assert!(list.each(|hook| {
            hook(&mut value);
            true
        }));
        assert_eq!(value, 1);
        assert_eq!(nested.get(), Some(false));
    }
}
