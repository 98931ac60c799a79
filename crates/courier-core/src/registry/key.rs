//! Type identity keys for the registries.
//!
//! Both keys wrap a [`TypeId`]; the type name is carried along for logs and
//! snapshots only and never takes part in equality or hashing.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::typed::AsAny;

/// Identity of a concrete message type.
#[derive(Debug, Clone, Copy)]
pub struct MessageKey {
    id: TypeId,
    name: &'static str,
}

impl MessageKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key of the value's runtime type. Works through trait objects.
    pub fn of_value<M: AsAny + ?Sized>(message: &M) -> Self {
        Self {
            id: message.as_any().type_id(),
            name: message.type_name(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Identity of a concrete handler type, used to dedupe subscriptions.
#[derive(Debug, Clone, Copy)]
pub struct HandlerKey {
    id: TypeId,
    name: &'static str,
}

impl HandlerKey {
    pub fn of<H: Any>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: std::any::type_name::<H>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

macro_rules! identity_by_type_id {
    ($key:ty) => {
        impl PartialEq for $key {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $key {}

        impl Hash for $key {
            fn hash<S: Hasher>(&self, state: &mut S) {
                self.id.hash(state);
            }
        }

        impl fmt::Display for $key {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name)
            }
        }
    };
}

identity_by_type_id!(MessageKey);
identity_by_type_id!(HandlerKey);
