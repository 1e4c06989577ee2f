//! States are identified by their canonical `"GroupName:field"` string, not
//! by type or address, so the wire representation (stored in [`Storage`])
//! and comparisons against a bare `&str` both just work.
//!
//! The Python original derives a state's name at class-definition time via
//! `__set_name__`, which Rust has no equivalent hook for. This crate's
//! [`states_group!`] macro reproduces the same effect by having each
//! constant register its own name from the macro invocation, rather than
//! reflecting over the group after the fact.

use std::fmt::{self, Display, Formatter};

use super::Storage;

/// One named state within a [`StatesGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    name: &'static str,
}

impl State {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq<str> for State {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<State> for str {
    fn eq(&self, other: &State) -> bool {
        self == other.name
    }
}

/// A named group of related [`State`]s, e.g. the steps of a registration
/// flow. Implemented by [`states_group!`]; `all()` lists every member in
/// declaration order, used for `/cancel`-style "leave this flow from
/// anywhere in it" filters.
pub trait StatesGroup {
    fn all() -> &'static [State];
}

/// Declares a [`StatesGroup`] with its [`State`] members, canonically
/// named `"<GroupName>:<field>"`.
///
/// ```ignore
/// states_group! {
///     Registration {
///         AwaitingName,
///         AwaitingAge,
///     }
/// }
/// ```
#[macro_export]
macro_rules! states_group {
    ($group:ident { $($state:ident),+ $(,)? }) => {
        pub struct $group;

        impl $group {
            $(
                pub const $state: $crate::fsm::State =
                    $crate::fsm::State::new(concat!(stringify!($group), ":", stringify!($state)));
            )+
        }

        impl $crate::fsm::StatesGroup for $group {
            fn all() -> &'static [$crate::fsm::State] {
                static STATES: &[$crate::fsm::State] = &[$($group::$state),+];
                STATES
            }
        }
    };
}

/// Which part of an update's `(chat_id, user_id)` pair forms an FSM
/// [`super::StorageKey`]. `UserInChat` is the default and matches what
/// most bots want: the same user in two different chats gets independent
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Key on both `chat_id` and `user_id`.
    UserInChat,
    /// Key on `chat_id` only — one shared state per chat.
    Chat,
    /// Key on `user_id` only — one state per user across all chats.
    GlobalUser,
}

impl Strategy {
    #[must_use]
    pub fn key(self, bot_id: i64, chat_id: Option<i64>, user_id: Option<i64>) -> super::StorageKey {
        match self {
            Self::UserInChat => super::StorageKey::new(bot_id, chat_id, user_id),
            Self::Chat => super::StorageKey::new(bot_id, chat_id, None),
            Self::GlobalUser => super::StorageKey::new(bot_id, None, user_id),
        }
    }
}

#[allow(unused)]
fn _assert_storage_object_safe(_: &dyn Storage) {}

#[cfg(test)]
mod tests {
    use super::*;

    states_group! {
        Registration {
            AwaitingName,
            AwaitingAge,
        }
    }

    #[test]
    fn states_get_canonical_names() {
        assert_eq!(Registration::AwaitingName.name(), "Registration:AwaitingName");
        assert_eq!(Registration::AwaitingAge.name(), "Registration:AwaitingAge");
    }

    #[test]
    fn all_lists_members_in_declaration_order() {
        let names: Vec<_> = Registration::all().iter().map(State::name).collect();
        assert_eq!(names, ["Registration:AwaitingName", "Registration:AwaitingAge"]);
    }

    #[test]
    fn state_compares_equal_to_its_canonical_str() {
        let canonical: &str = "Registration:AwaitingName";
        assert!(Registration::AwaitingName == *canonical);
    }

    #[test]
    fn strategy_narrows_the_key() {
        assert_eq!(
            Strategy::Chat.key(1, Some(10), Some(20)),
            super::super::StorageKey::new(1, Some(10), None)
        );
        assert_eq!(
            Strategy::GlobalUser.key(1, Some(10), Some(20)),
            super::super::StorageKey::new(1, None, Some(20))
        );
    }
}
