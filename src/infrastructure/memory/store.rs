//! In-memory tables with the same constraints as the PostgreSQL schema.
//!
//! Writes go through [`MemoryDatabase::transaction`]: the closure mutates the
//! live tables through a [`Transaction`], which journals the previous value of
//! every row it touches. If the closure returns `Err` the journal is replayed
//! in reverse. The write lock is held for the whole closure, so transactions
//! are serializable.

use std::collections::BTreeMap;
use std::ops::Deref;

use parking_lot::RwLock;

use crate::domain::{DirectMessage, Membership, Room, RoomMessage, User};
use crate::shared::error::AppError;

/// Rows of every table, keyed by id.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: BTreeMap<i64, User>,
    pub direct_messages: BTreeMap<i64, DirectMessage>,
    pub rooms: BTreeMap<i64, Room>,
    pub memberships: BTreeMap<i64, Membership>,
    pub room_messages: BTreeMap<i64, RoomMessage>,
}

impl Tables {
    pub fn require_user(&self, id: i64) -> Result<(), AppError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User with id {} not found", id)))
        }
    }

    pub fn require_room(&self, id: i64) -> Result<(), AppError> {
        if self.rooms.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Room with id {} not found", id)))
        }
    }

    pub fn membership_of(&self, room_id: i64, user_id: i64) -> Option<&Membership> {
        self.memberships
            .values()
            .find(|m| m.room_id == room_id && m.user_id == user_id)
    }

    pub fn is_member(&self, room_id: i64, user_id: i64) -> bool {
        self.membership_of(room_id, user_id).is_some()
    }
}

/// A row type stored in one of the [`Tables`].
pub trait Row: Clone + 'static {
    fn id(&self) -> i64;
    fn table(tables: &mut Tables) -> &mut BTreeMap<i64, Self>;
}

impl Row for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn table(tables: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut tables.users
    }
}

impl Row for DirectMessage {
    fn id(&self) -> i64 {
        self.id
    }

    fn table(tables: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut tables.direct_messages
    }
}

impl Row for Room {
    fn id(&self) -> i64 {
        self.id
    }

    fn table(tables: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut tables.rooms
    }
}

impl Row for Membership {
    fn id(&self) -> i64 {
        self.id
    }

    fn table(tables: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut tables.memberships
    }
}

impl Row for RoomMessage {
    fn id(&self) -> i64 {
        self.id
    }

    fn table(tables: &mut Tables) -> &mut BTreeMap<i64, Self> {
        &mut tables.room_messages
    }
}

type Undo = Box<dyn FnOnce(&mut Tables)>;

/// Write access to the live tables for the duration of one transaction.
///
/// Reads go through `Deref`; every mutation goes through [`Transaction::upsert`]
/// or [`Transaction::remove`] so it can be undone.
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    journal: Vec<Undo>,
}

impl Deref for Transaction<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &*self.tables
    }
}

impl<'a> Transaction<'a> {
    fn new(tables: &'a mut Tables) -> Self {
        Self {
            tables,
            journal: Vec::new(),
        }
    }

    fn rollback(self) {
        let Transaction { tables, journal } = self;
        for undo in journal.into_iter().rev() {
            undo(&mut *tables);
        }
    }

    /// Insert or replace a row.
    pub fn upsert<R: Row>(&mut self, row: R) -> R {
        let id = row.id();
        let previous = R::table(&mut *self.tables).insert(id, row.clone());
        self.journal.push(Box::new(move |t: &mut Tables| {
            let table = R::table(t);
            match previous {
                Some(previous) => {
                    table.insert(id, previous);
                }
                None => {
                    table.remove(&id);
                }
            }
        }));
        row
    }

    /// Remove a row, returning it if it existed.
    pub fn remove<R: Row>(&mut self, id: i64) -> Option<R> {
        let removed = R::table(&mut *self.tables).remove(&id)?;
        let previous = removed.clone();
        self.journal.push(Box::new(move |t: &mut Tables| {
            R::table(t).insert(id, previous);
        }));
        Some(removed)
    }

    fn remove_where<R: Row>(&mut self, pred: impl Fn(&R) -> bool) {
        let ids: Vec<i64> = R::table(&mut *self.tables)
            .values()
            .filter(|row| pred(*row))
            .map(Row::id)
            .collect();
        for id in ids {
            self.remove::<R>(id);
        }
    }

    /// Insert or replace a user, enforcing unique username and email.
    pub fn put_user(&mut self, user: User) -> Result<User, AppError> {
        let taken = self.users.values().any(|u| {
            u.id != user.id && (u.username == user.username || u.email == user.email)
        });
        if taken {
            return Err(AppError::Conflict(
                "A user with that username or email already exists".to_string(),
            ));
        }
        Ok(self.upsert(user))
    }

    /// Remove a user and every row referencing it.
    pub fn delete_user(&mut self, id: i64) -> Result<(), AppError> {
        if self.remove::<User>(id).is_none() {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        self.remove_where::<DirectMessage>(|m| m.sender_id == id || m.receiver_id == id);
        self.remove_where::<Membership>(|m| m.user_id == id);
        self.remove_where::<RoomMessage>(|m| m.sender_id == id);
        Ok(())
    }

    pub fn insert_direct_message(&mut self, message: DirectMessage) -> Result<DirectMessage, AppError> {
        self.require_user(message.sender_id)?;
        self.require_user(message.receiver_id)?;
        if self.direct_messages.contains_key(&message.id) {
            return Err(AppError::Conflict("Message already exists".to_string()));
        }
        Ok(self.upsert(message))
    }

    pub fn put_room(&mut self, room: Room) -> Room {
        self.upsert(room)
    }

    /// Remove a room together with its memberships and messages.
    pub fn delete_room(&mut self, id: i64) -> Result<(), AppError> {
        if self.remove::<Room>(id).is_none() {
            return Err(AppError::NotFound(format!("Room with id {} not found", id)));
        }
        self.remove_where::<Membership>(|m| m.room_id == id);
        self.remove_where::<RoomMessage>(|m| m.room_id == id);
        Ok(())
    }

    /// Insert a membership, enforcing one membership per (room, user).
    pub fn insert_membership(&mut self, membership: Membership) -> Result<Membership, AppError> {
        self.require_room(membership.room_id)?;
        self.require_user(membership.user_id)?;
        if self.is_member(membership.room_id, membership.user_id) {
            return Err(AppError::Conflict(
                "User is already a member of this room".to_string(),
            ));
        }
        Ok(self.upsert(membership))
    }

    pub fn insert_room_message(&mut self, message: RoomMessage) -> Result<RoomMessage, AppError> {
        self.require_room(message.room_id)?;
        self.require_user(message.sender_id)?;
        if self.room_messages.contains_key(&message.id) {
            return Err(AppError::Conflict("Message already exists".to_string()));
        }
        Ok(self.upsert(message))
    }
}

/// Process-local database used by tests and the `memory` storage backend.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only closure against a consistent view of the tables.
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&self.tables.read())
    }

    /// Run `f` atomically. Its writes are undone if it returns `Err`.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut tables = self.tables.write();
        let mut tx = Transaction::new(&mut tables);
        let result = f(&mut tx);
        if result.is_err() {
            tx.rollback();
        }
        result
    }
}
