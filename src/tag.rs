use std::cell::RefCell;

thread_local! {
    /// Log tag for the calling thread. Set by `tag`, cleared by `auto`, read
    /// by the untagged logging calls. Never auto-cleared: a tag persists for
    /// its thread until overwritten or cleared.
    static THREAD_TAG: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub(crate) fn set(tag: Option<String>) {
    THREAD_TAG.with(|slot| *slot.borrow_mut() = tag);
}

pub(crate) fn get() -> Option<String> {
    THREAD_TAG.with(|slot| slot.borrow().clone())
}

/// Scoped thread tag: applies `tag` for the lifetime of the guard and
/// restores the previous tag on drop, so it cannot leak into unrelated
/// log lines the way a bare `tag()` call can.
pub struct TagScope {
    prev: Option<String>,
}

impl TagScope {
    pub fn new(tag: &str) -> Self {
        let prev = THREAD_TAG.with(|slot| slot.borrow_mut().replace(tag.into()));
        Self { prev }
    }
}

impl Drop for TagScope {
    fn drop(&mut self) {
        set(self.prev.take());
    }
}

#[test]
fn test_tag_scope_restores_previous_tag() {
    set(Some("outer".into()));
    {
        let _scope = TagScope::new("inner");
        assert_eq!(get().as_deref(), Some("inner"));
    }
    assert_eq!(get().as_deref(), Some("outer"));
    set(None);
}

#[test]
fn test_tag_scope_restores_empty_slot() {
    set(None);
    {
        let _scope = TagScope::new("inner");
        assert_eq!(get().as_deref(), Some("inner"));
    }
    assert_eq!(get(), None);
}
