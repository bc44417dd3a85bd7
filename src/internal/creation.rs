//! Creation stack used for circular dependency detection.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

// Names under construction on this thread, tagged with the owning container
thread_local! {
    static CREATION_TLS: RefCell<Vec<(u64, String)>> = const { RefCell::new(Vec::new()) };
}

/// Scoped entry on the creation stack.
///
/// Entering pushes the bean name and dropping pops it, so the entry is
/// released on success, on error and when a cycle is reported.
pub(crate) struct CreationGuard {
    container: u64,
    name: String,
}

impl CreationGuard {
    pub(crate) fn enter(container: u64, name: &str, max_depth: usize) -> DiResult<Self> {
        CREATION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Circular detection BEFORE pushing the new name
            if stack.iter().any(|(owner, entry)| *owner == container && entry == name) {
                let mut path = in_progress(&stack, container);
                path.push(name.to_string());
                return Err(DiError::Circular(path));
            }

            let depth = stack.iter().filter(|(owner, _)| *owner == container).count();
            if depth >= max_depth {
                return Err(DiError::DepthExceeded(depth));
            }

            stack.push((container, name.to_string()));
            Ok(Self { container, name: name.to_string() })
        })
    }
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        let _ = CREATION_TLS.try_with(|tls| {
            let mut stack = tls.borrow_mut();
            if let Some(pos) = stack
                .iter()
                .rposition(|(owner, entry)| *owner == self.container && *entry == self.name)
            {
                stack.remove(pos);
            }
        });
    }
}

fn in_progress(stack: &[(u64, String)], container: u64) -> Vec<String> {
    stack
        .iter()
        .filter(|(owner, _)| *owner == container)
        .map(|(_, name)| name.clone())
        .collect()
}

/// Names currently under construction for `container` on this thread.
pub(crate) fn current_path(container: u64) -> Vec<String> {
    CREATION_TLS.with(|tls| in_progress(&tls.borrow(), container))
}

/// Drops any entries of `container` left on this thread's stack.
pub(crate) fn clear(container: u64) {
    let _ = CREATION_TLS.try_with(|tls| {
        tls.borrow_mut().retain(|(owner, _)| *owner != container);
    });
}
