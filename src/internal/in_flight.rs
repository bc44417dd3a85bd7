//! Beans under construction across threads.
//!
//! Each bean name is claimed by the thread constructing it. A thread that
//! finds the name claimed elsewhere waits for the claim to be released,
//! unless the chain of waiting threads leads back to itself, which is a
//! dependency cycle split across threads.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::error::{DiError, DiResult};

#[derive(Default)]
pub(crate) struct InFlight {
    table: Mutex<Table>,
    released: Condvar,
}

#[derive(Default)]
struct Table {
    /// Bean name -> thread constructing it
    owners: HashMap<String, ThreadId>,
    /// Blocked thread -> (name it waits for, its creation path)
    waiting: HashMap<ThreadId, (String, Vec<String>)>,
}

/// Exclusive right to construct one bean. Released on drop.
pub(crate) struct Claim<'a> {
    in_flight: &'a InFlight,
    name: String,
}

impl InFlight {
    /// Claims `name` for the current thread, waiting while another thread
    /// holds it.
    ///
    /// `path` is the current thread's creation path ending with `name`.
    /// Fails with [`DiError::Circular`] when the owner is, directly or
    /// through other waiting threads, blocked on this thread.
    pub(crate) fn claim(&self, name: &str, path: &[String]) -> DiResult<Claim<'_>> {
        let me = thread::current().id();
        let mut table = self.table.lock();
        loop {
            let owner = match table.owners.get(name) {
                Some(&owner) => owner,
                None => {
                    table.owners.insert(name.to_string(), me);
                    return Ok(Claim { in_flight: self, name: name.to_string() });
                }
            };
            if let Some(cycle) = table.cycle(me, owner, name, path) {
                return Err(DiError::Circular(cycle));
            }

            table.waiting.insert(me, (name.to_string(), path.to_vec()));
            self.released.wait(&mut table);
            table.waiting.remove(&me);
        }
    }
}

impl Table {
    /// Follows owner -> waited-for name -> owner from `owner`. Returns the
    /// combined creation path when the chain reaches `me`.
    fn cycle(&self, me: ThreadId, mut owner: ThreadId, name: &str, path: &[String]) -> Option<Vec<String>> {
        let mut cycle = path.to_vec();
        let mut blocked_on = name;
        for _ in 0..=self.waiting.len() {
            if owner == me {
                return Some(cycle);
            }
            let (next, owner_path) = self.waiting.get(&owner)?;
            let start = owner_path
                .iter()
                .position(|entry| entry == blocked_on)
                .map_or(0, |pos| pos + 1);
            cycle.extend_from_slice(&owner_path[start..]);
            blocked_on = next.as_str();
            owner = *self.owners.get(next)?;
        }
        None
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.in_flight.table.lock().owners.remove(&self.name);
        self.in_flight.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn path(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn claim_is_released_on_drop() {
        let in_flight = InFlight::default();
        {
            let _claim = in_flight.claim("a", &path(&["a"])).unwrap();
            assert!(in_flight.table.lock().owners.contains_key("a"));
        }
        assert!(in_flight.table.lock().owners.is_empty());
        assert!(in_flight.claim("a", &path(&["a"])).is_ok());
    }

    #[test]
    fn waiting_chain_back_to_caller_is_a_cycle() {
        let in_flight = InFlight::default();
        let _a = in_flight.claim("a", &path(&["a"])).unwrap();

        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        {
            let mut table = in_flight.table.lock();
            table.owners.insert("b".to_string(), other);
            table.waiting.insert(other, ("a".to_string(), path(&["b", "a"])));
        }

        match in_flight.claim("b", &path(&["a", "b"])) {
            Err(DiError::Circular(cycle)) => assert_eq!(cycle, path(&["a", "b", "a"])),
            _ => panic!("expected circular error"),
        };
    }

    #[test]
    fn waiter_proceeds_after_release() {
        let in_flight = Arc::new(InFlight::default());
        let claim = in_flight.claim("slow", &path(&["slow"])).unwrap();

        let waiter = {
            let in_flight = in_flight.clone();
            thread::spawn(move || in_flight.claim("slow", &path(&["slow"])).is_ok())
        };
        while in_flight.table.lock().waiting.is_empty() {
            thread::yield_now();
        }
        drop(claim);

        assert!(waiter.join().unwrap());
    }
}
