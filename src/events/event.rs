//! # Dispatchable events and their type keys.
//!
//! An [`Event`] is an immutable value whose concrete Rust type is the dispatch key.
//! Rust has no class inheritance, so "is-instance-of" is expressed through **views**:
//! an event declares which other types it can be viewed as, together with a
//! projection `fn(&Self) -> &Super` (usually a field holding the embedded parent value).
//!
//! ## Matching
//! ```text
//! OrderShipped ──view──► OrderEvent ──view──► Audited
//!      │                     │                   │
//!  listeners of          listeners of        listeners of
//!  OrderShipped          OrderEvent          Audited
//! ```
//! Views are transitive: an `OrderShipped` is an instance of `OrderShipped`,
//! `OrderEvent` and `Audited`, and reaches the listeners of all three.
//!
//! ## Declaring events
//! ```rust
//! use typebus::{Event, EventType, impl_event};
//!
//! #[derive(Clone, Debug)]
//! struct OrderEvent { id: u64 }
//!
//! #[derive(Clone, Debug)]
//! struct OrderShipped { order: OrderEvent, carrier: String }
//!
//! impl_event!(OrderEvent);
//! impl_event!(OrderShipped: OrderEvent => |e| &e.order);
//!
//! let shipped = OrderShipped { order: OrderEvent { id: 7 }, carrier: "ups".into() };
//! assert!(shipped.is_a(&EventType::of::<OrderEvent>()));
//! assert_eq!(shipped.view_as::<OrderEvent>().map(|o| o.id), Some(7));
//! assert!(!OrderEvent { id: 7 }.is_a(&EventType::of::<OrderShipped>()));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of an event type: the key of a registry bucket.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for logs.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Returns the key for `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type name (as produced by [`std::any::type_name`]).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An immutable, shareable value that can be dispatched.
///
/// Prefer [`impl_event!`](crate::impl_event) over implementing this by hand.
///
/// ### Implementation requirements
/// - `view(TypeId::of::<Self>())` must return `self`.
/// - `view(id)` for a declared supertype must return a value of exactly that type,
///   so that `downcast_ref` on the result succeeds.
/// - `view` must be pure: selection and delivery call it independently.
/// - `view` runs while the registry's read lock is held; it must not register,
///   unregister or dispatch, or it may deadlock.
pub trait Event: Any + Send + Sync {
    /// Returns this event viewed as the type identified by `ty`, or `None`
    /// if the event is not an instance of that type.
    fn view(&self, ty: TypeId) -> Option<&dyn Any>;

    /// Returns the runtime type key of this event.
    fn event_type(&self) -> EventType;

    /// Returns `true` if this event is an instance of `ty` (same type or a declared supertype).
    fn is_a(&self, ty: &EventType) -> bool {
        self.view(ty.id()).is_some()
    }

    /// Returns this event viewed as `T`, if it is an instance of `T`.
    fn view_as<T: Any>(&self) -> Option<&T>
    where
        Self: Sized,
    {
        self.view(TypeId::of::<T>())?.downcast_ref::<T>()
    }
}

impl dyn Event {
    /// Returns this type-erased event viewed as `T`, if it is an instance of `T`.
    ///
    /// Counterpart of [`Event::view_as`] for `dyn Event`.
    pub fn downcast_view<T: Any>(&self) -> Option<&T> {
        self.view(TypeId::of::<T>())?.downcast_ref::<T>()
    }
}

/// Implements [`Event`] for a type, optionally declaring supertypes.
///
/// Each supertype is given with a projection from the event to the supertype value.
/// Supertypes must implement [`Event`] themselves; their own supertypes are
/// reached transitively.
///
/// ```rust
/// use typebus::impl_event;
///
/// struct Audited { actor: String }
/// struct Base { id: u64, audit: Audited }
/// struct Derived { base: Base }
///
/// impl_event!(Audited);
/// impl_event!(Base: Audited => |e| &e.audit);
/// impl_event!(Derived: Base => |e| &e.base);
/// ```
#[macro_export]
macro_rules! impl_event {
    ($ty:ty $(: $($sup:ty => $via:expr),+)?) => {
        impl $crate::Event for $ty {
            fn view(&self, ty: ::std::any::TypeId) -> ::std::option::Option<&dyn ::std::any::Any> {
                if ty == ::std::any::TypeId::of::<$ty>() {
                    return ::std::option::Option::Some(self);
                }
                $($(
                    {
                        let up: fn(&$ty) -> &$sup = $via;
                        if let ::std::option::Option::Some(found) = $crate::Event::view(up(self), ty) {
                            return ::std::option::Option::Some(found);
                        }
                    }
                )+)?
                ::std::option::Option::None
            }

            fn event_type(&self) -> $crate::EventType {
                $crate::EventType::of::<$ty>()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    struct Root {
        marker: Marker,
    }
    struct Middle {
        root: Root,
    }
    struct Leaf {
        middle: Middle,
    }
    struct Unrelated;

    crate::impl_event!(Marker);
    crate::impl_event!(Root: Marker => |e| &e.marker);
    crate::impl_event!(Middle: Root => |e| &e.root);
    crate::impl_event!(Leaf: Middle => |e| &e.middle);
    crate::impl_event!(Unrelated);

    fn leaf() -> Leaf {
        Leaf {
            middle: Middle {
                root: Root { marker: Marker },
            },
        }
    }

    #[test]
    fn test_event_is_instance_of_itself() {
        let ev = Unrelated;
        assert!(ev.is_a(&EventType::of::<Unrelated>()));
        assert_eq!(ev.event_type(), EventType::of::<Unrelated>());
    }

    #[test]
    fn test_views_are_transitive() {
        let ev = leaf();
        assert!(ev.is_a(&EventType::of::<Leaf>()));
        assert!(ev.is_a(&EventType::of::<Middle>()));
        assert!(ev.is_a(&EventType::of::<Root>()));
        assert!(ev.is_a(&EventType::of::<Marker>()));
        assert!(!ev.is_a(&EventType::of::<Unrelated>()));
    }

    #[test]
    fn test_supertype_is_not_instance_of_subtype() {
        let root = Root { marker: Marker };
        assert!(!root.is_a(&EventType::of::<Middle>()));
        assert!(!root.is_a(&EventType::of::<Leaf>()));
    }

    #[test]
    fn test_downcast_view_through_dyn() {
        let ev: Box<dyn Event> = Box::new(leaf());
        assert!(ev.downcast_view::<Root>().is_some());
        assert!(ev.downcast_view::<Leaf>().is_some());
        assert!(ev.downcast_view::<Unrelated>().is_none());

        let shared: std::sync::Arc<dyn Event> = std::sync::Arc::new(leaf());
        assert!(shared.downcast_view::<Marker>().is_some());
    }

    #[test]
    fn test_event_type_identity_ignores_name() {
        let a = EventType::of::<Leaf>();
        let b = EventType::of::<Leaf>();
        assert_eq!(a, b);
        assert_ne!(a, EventType::of::<Middle>());
        assert!(a.name().ends_with("Leaf"));
    }
}
