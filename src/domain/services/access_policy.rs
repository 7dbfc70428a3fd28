//! Access policy domain service.
//!
//! Two predicates cover every resource in the system:
//!
//! - [`OwnershipPolicy`]: anyone may read, only the owner may write. Direct
//!   messages are owned by their sender. [`SelfPolicy`] applies the same rule
//!   to accounts, which own themselves.
//! - [`MembershipPolicy`]: only holders of a membership in the resource's room
//!   may read or write. Applies to rooms, memberships and room messages.
//!
//! Both are pure functions of the caller and a snapshot of the resource.
//! Services never compare identities themselves; they build the snapshot and
//! call [`authorize`].
//!
//! Trust inside a room is flat: every member may manage the roster and the
//! messages. There is no owner, admin or role hierarchy.

use crate::domain::entities::{DirectMessage, Membership, Room, RoomMessage, User};
use crate::shared::error::AppError;

/// What the caller intends to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Reads never mutate state.
    pub fn is_read_only(self) -> bool {
        matches!(self, Action::Read)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Read is open to everyone; writes require `caller_id == owner_id`.
pub struct OwnershipPolicy;

impl OwnershipPolicy {
    pub fn evaluate(caller_id: i64, action: Action, owner_id: i64) -> Decision {
        Decision::from(action.is_read_only() || caller_id == owner_id)
    }
}

/// Accounts belong to themselves: reads are open, mutation requires
/// `caller_id == account_id`. No admin override.
pub struct SelfPolicy;

impl SelfPolicy {
    pub fn evaluate(caller_id: i64, action: Action, account_id: i64) -> Decision {
        OwnershipPolicy::evaluate(caller_id, action, account_id)
    }
}

/// Access requires the caller's own membership in the resource's room.
pub struct MembershipPolicy;

impl MembershipPolicy {
    /// `membership` is whatever the store returned for the caller; it only
    /// counts if it actually belongs to the caller and to `room_id`.
    pub fn evaluate(caller_id: i64, room_id: i64, membership: Option<&Membership>) -> Decision {
        Decision::from(membership.is_some_and(|m| m.grants(caller_id, room_id)))
    }
}

/// A resource with a policy attached.
pub trait AccessControlled {
    /// Resource name used in logs.
    const KIND: &'static str;

    fn decide(&self, caller_id: i64, action: Action) -> Decision;

    /// Message surfaced with the `Forbidden` error.
    fn denial_message(&self, action: Action) -> String {
        format!("You do not have permission to {} this {}", action, Self::KIND)
    }
}

/// The single authorization entry point.
///
/// Maps a denial to `AppError::Forbidden`. Callers decide beforehand whether
/// the resource is visible at all (and answer `NotFound` if not).
pub fn authorize<R: AccessControlled>(caller_id: i64, action: Action, resource: &R) -> Result<(), AppError> {
    match resource.decide(caller_id, action) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::debug!(caller_id, action = action.as_str(), resource = R::KIND, "Access denied");
            Err(AppError::Forbidden(resource.denial_message(action)))
        }
    }
}

impl AccessControlled for User {
    const KIND: &'static str = "account";

    fn decide(&self, caller_id: i64, action: Action) -> Decision {
        SelfPolicy::evaluate(caller_id, action, self.id)
    }

    fn denial_message(&self, action: Action) -> String {
        match action {
            Action::Delete => "You can only delete your own account".into(),
            _ => "You can only update your own profile".into(),
        }
    }
}

impl AccessControlled for DirectMessage {
    const KIND: &'static str = "message";

    fn decide(&self, caller_id: i64, action: Action) -> Decision {
        OwnershipPolicy::evaluate(caller_id, action, self.sender_id)
    }

    fn denial_message(&self, action: Action) -> String {
        format!("Only the sender can {} this message", action)
    }
}

/// Something that lives inside a room.
pub trait InRoom {
    fn room_id(&self) -> i64;
}

impl InRoom for Room {
    fn room_id(&self) -> i64 {
        self.id
    }
}

impl InRoom for Membership {
    fn room_id(&self) -> i64 {
        self.room_id
    }
}

impl InRoom for RoomMessage {
    fn room_id(&self) -> i64 {
        self.room_id
    }
}

/// Snapshot of a room-scoped resource together with the caller's membership
/// in that room, as read from the store.
#[derive(Debug, Clone, Copy)]
pub struct RoomScoped<'a, T> {
    pub resource: &'a T,
    pub membership: Option<&'a Membership>,
}

impl<'a, T: InRoom> RoomScoped<'a, T> {
    pub fn new(resource: &'a T, membership: Option<&'a Membership>) -> Self {
        Self { resource, membership }
    }

    fn member_decision(&self, caller_id: i64) -> Decision {
        MembershipPolicy::evaluate(caller_id, self.resource.room_id(), self.membership)
    }
}

impl AccessControlled for RoomScoped<'_, Room> {
    const KIND: &'static str = "room";

    fn decide(&self, caller_id: i64, _action: Action) -> Decision {
        self.member_decision(caller_id)
    }

    fn denial_message(&self, _action: Action) -> String {
        "You must be a member of this room".into()
    }
}

impl AccessControlled for RoomScoped<'_, Membership> {
    const KIND: &'static str = "membership";

    fn decide(&self, caller_id: i64, action: Action) -> Decision {
        // Leaving a room never requires anyone else's consent.
        if action == Action::Delete && self.resource.user_id == caller_id {
            return Decision::Allow;
        }
        self.member_decision(caller_id)
    }

    fn denial_message(&self, action: Action) -> String {
        match action {
            Action::Create => "You must be a member of this room to add others".into(),
            Action::Delete => {
                "You can only remove yourself or manage members if you are in the room".into()
            }
            _ => "You must be a member of this room".into(),
        }
    }
}

impl AccessControlled for RoomScoped<'_, RoomMessage> {
    const KIND: &'static str = "room message";

    fn decide(&self, caller_id: i64, _action: Action) -> Decision {
        self.member_decision(caller_id)
    }

    fn denial_message(&self, action: Action) -> String {
        match action {
            Action::Create => "You must be a member of this room to send messages".into(),
            _ => "You must be a member of this room".into(),
        }
    }
}
