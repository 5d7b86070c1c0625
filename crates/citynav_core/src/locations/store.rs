//! Per-identity location set with baseline merge and dedup.
//!
//! # Responsibility
//! - Own the authoritative point set for the active identity.
//! - Merge the shared baseline catalog with persisted custom points.
//! - Mediate every create/update/remove and keep the backing store in sync.
//! - Notify registered observers after each visible change.
//!
//! # Invariants
//! - The materialized sequence never contains two place-equal entries and
//!   never two entries with the same id.
//! - Custom entries precede filtered-in baseline entries, each side in
//!   its own stable order.
//! - Persisted bytes only ever hold custom entries; the baseline catalog
//!   is never written back.
//! - All state mutation happens through `&mut self` on a single control
//!   flow; there is no interior locking.

use crate::kv::{KeyValueStore, KvError};
use crate::locations::codec;
use crate::model::catalog::Catalog;
use crate::model::point::{AnnotatedPoint, Coordinate, PointId, PointValidationError};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy for location-store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected before touching the model.
    Validation(PointValidationError),
    /// Referenced id is absent from the mutable custom set. Baseline ids
    /// land here too: baseline entries cannot be updated or removed.
    NotFound(PointId),
    /// Edit would make the point place-equal to another custom entry,
    /// which the materialized sequence never allows.
    DuplicatePlace,
    /// Mutation requested while no identity is active.
    NoActiveIdentity,
    /// The in-memory mutation was applied but the backing write failed;
    /// changes may not survive a restart.
    Persistence(KvError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "point not found in custom set: {id}"),
            Self::DuplicatePlace => {
                write!(f, "another custom point already marks the same place")
            }
            Self::NoActiveIdentity => write!(f, "no active identity"),
            Self::Persistence(err) => {
                write!(f, "point set changed in memory but was not persisted: {err}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NotFound(_) | Self::DuplicatePlace | Self::NoActiveIdentity => None,
        }
    }
}

impl From<PointValidationError> for StoreError {
    fn from(value: PointValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Outcome of an `add` call. A duplicate is a normal, expected result,
/// not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// A place-equal entry already exists; state and storage untouched.
    Duplicate,
}

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Activated,
    Deactivated,
    Added(PointId),
    Updated(PointId),
    Removed(PointId),
}

/// Payload handed to observers after a visible change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub kind: ChangeKind,
    /// Identity active after the change; `None` after deactivation.
    pub identity: Option<String>,
}

/// Observer callback contract.
///
/// Called synchronously on the control flow that performed the mutation,
/// after the store state is fully consistent. Observers must not attempt
/// to re-enter the store (the `&mut` receiver on every mutation makes
/// that impossible to express anyway).
pub trait StoreObserver {
    fn on_change(&self, change: &StoreChange);
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Authoritative per-identity point set over a key-value backend.
pub struct LocationStore<'kv> {
    catalog: Catalog,
    kv: &'kv dyn KeyValueStore,
    active_identity: Option<String>,
    custom: Vec<AnnotatedPoint>,
    materialized: Vec<AnnotatedPoint>,
    selected: Option<PointId>,
    observers: BTreeMap<ObserverId, Rc<dyn StoreObserver>>,
    next_observer_id: u64,
}

impl<'kv> LocationStore<'kv> {
    /// Creates a store with no active identity.
    ///
    /// The materialized view stays empty until `activate` is called; a
    /// location set only exists for an active identity.
    pub fn new(catalog: Catalog, kv: &'kv dyn KeyValueStore) -> Self {
        Self {
            catalog,
            kv,
            active_identity: None,
            custom: Vec::new(),
            materialized: Vec::new(),
            selected: None,
            observers: BTreeMap::new(),
            next_observer_id: 0,
        }
    }

    /// Sets the active identity and loads its persisted custom points.
    ///
    /// Never fails: a missing slot or an undecodable payload both start
    /// the identity with an empty custom set, logged as a diagnostic.
    /// Activating the already-active identity re-reads the slot and is
    /// observably idempotent for a consistent backend.
    pub fn activate(&mut self, identity: &str) {
        let key = storage_key(identity);
        let custom = match self.kv.get(&key) {
            Ok(Some(bytes)) => match codec::decode(&bytes) {
                Ok(points) => points,
                Err(err) => {
                    // Decode failure means "no prior data", never a
                    // user-facing error.
                    warn!(
                        "event=locations_load module=locations status=reset identity={identity} error_code=decode_failed error={err}"
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                // Read failure is treated like absent data; the identity
                // still activates with an empty set.
                error!(
                    "event=locations_load module=locations status=error identity={identity} error_code=kv_read_failed error={err}"
                );
                Vec::new()
            }
        };

        self.active_identity = Some(identity.to_string());
        self.custom = custom;
        let changed = self.recompute();
        info!(
            "event=locations_activate module=locations status=ok identity={identity} custom={} materialized={}",
            self.custom.len(),
            self.materialized.len()
        );
        if changed {
            self.notify(ChangeKind::Activated);
        }
    }

    /// Clears the active identity and its in-memory set.
    ///
    /// Deliberately performs no write: previously saved data must survive
    /// a logout.
    pub fn deactivate(&mut self) {
        let identity = self.active_identity.take();
        self.custom.clear();
        let changed = self.recompute();
        if let Some(identity) = identity {
            info!("event=locations_deactivate module=locations status=ok identity={identity}");
        }
        if changed {
            self.notify(ChangeKind::Deactivated);
        }
    }

    /// Adds a point to the active identity's custom set.
    ///
    /// Place-equal duplicates of anything already visible are reported as
    /// `AddOutcome::Duplicate` and change nothing.
    ///
    /// # Errors
    /// - `NoActiveIdentity` when called before `activate`.
    /// - `Validation` for a point edited into an invalid state.
    /// - `Persistence` when the backing write fails; the point is still
    ///   in the visible set.
    pub fn add(&mut self, point: AnnotatedPoint) -> StoreResult<AddOutcome> {
        if self.active_identity.is_none() {
            return Err(StoreError::NoActiveIdentity);
        }
        point.validate()?;

        if self.materialized.iter().any(|entry| entry.same_place(&point)) {
            debug!(
                "event=locations_add module=locations status=duplicate name={}",
                point.name
            );
            return Ok(AddOutcome::Duplicate);
        }

        let id = point.id;
        self.custom.push(point);
        self.recompute();
        let persisted = self.persist();
        self.notify(ChangeKind::Added(id));
        persisted?;
        Ok(AddOutcome::Added)
    }

    /// Replaces a custom point in place, matched by id.
    ///
    /// Baseline entries are immutable: their ids are reported as
    /// `NotFound` and nothing changes. An edit that would collide with
    /// a different custom entry's place is rejected as `DuplicatePlace`;
    /// colliding with a baseline place is allowed and shadows it.
    pub fn update(&mut self, point: AnnotatedPoint) -> StoreResult<()> {
        if self.active_identity.is_none() {
            return Err(StoreError::NoActiveIdentity);
        }
        point.validate()?;

        let Some(index) = self.custom.iter().position(|entry| entry.id == point.id) else {
            return Err(StoreError::NotFound(point.id));
        };

        if self
            .custom
            .iter()
            .any(|entry| entry.id != point.id && entry.same_place(&point))
        {
            debug!(
                "event=locations_update module=locations status=duplicate name={}",
                point.name
            );
            return Err(StoreError::DuplicatePlace);
        }

        let id = point.id;
        self.custom[index] = point;
        self.recompute();
        let persisted = self.persist();
        self.notify(ChangeKind::Updated(id));
        persisted
    }

    /// Removes a custom point by id.
    ///
    /// Baseline entries cannot be removed; their ids are reported as
    /// `NotFound` with no state change.
    pub fn remove(&mut self, id: PointId) -> StoreResult<()> {
        if self.active_identity.is_none() {
            return Err(StoreError::NoActiveIdentity);
        }

        let Some(index) = self.custom.iter().position(|entry| entry.id == id) else {
            return Err(StoreError::NotFound(id));
        };

        self.custom.remove(index);
        self.recompute();
        let persisted = self.persist();
        self.notify(ChangeKind::Removed(id));
        persisted
    }

    /// Point-in-time immutable copy of the materialized sequence.
    pub fn snapshot(&self) -> Vec<AnnotatedPoint> {
        self.materialized.clone()
    }

    /// Read-only coordinate lookup for the navigation collaborator.
    pub fn coordinate_of(&self, id: PointId) -> Option<Coordinate> {
        self.materialized
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.coordinate)
    }

    /// Marks a visible point as selected.
    ///
    /// # Errors
    /// - `NotFound` when the id is not in the materialized sequence.
    pub fn select(&mut self, id: PointId) -> StoreResult<()> {
        if !self.materialized.iter().any(|entry| entry.id == id) {
            return Err(StoreError::NotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Currently selected point, if any.
    ///
    /// Selection is dropped automatically whenever the selected id leaves
    /// the materialized sequence.
    pub fn selected(&self) -> Option<&AnnotatedPoint> {
        let id = self.selected?;
        self.materialized.iter().find(|entry| entry.id == id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Identity the store is currently bound to.
    pub fn active_identity(&self) -> Option<&str> {
        self.active_identity.as_deref()
    }

    /// Registers an observer; returns the handle used to unsubscribe.
    pub fn subscribe(&mut self, observer: Rc<dyn StoreObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Removes an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    /// Rebuilds the materialized sequence from custom + filtered baseline.
    ///
    /// Returns whether the visible sequence changed. Also drops a
    /// selection whose id is no longer visible.
    fn recompute(&mut self) -> bool {
        let mut next = self.custom.clone();
        if self.active_identity.is_some() {
            for entry in self.catalog.iter() {
                if !self.custom.iter().any(|custom| custom.same_place(entry)) {
                    next.push(entry.clone());
                }
            }
        }

        let changed = next != self.materialized;
        self.materialized = next;

        if let Some(id) = self.selected {
            if !self.materialized.iter().any(|entry| entry.id == id) {
                self.selected = None;
            }
        }

        changed
    }

    /// Writes the custom set to the identity's slot.
    ///
    /// Entries place-equal to a baseline member are stripped before
    /// encoding; the baseline is never re-persisted. The write is
    /// synchronous relative to the mutation that triggered it.
    fn persist(&self) -> StoreResult<()> {
        let Some(identity) = self.active_identity.as_deref() else {
            return Err(StoreError::NoActiveIdentity);
        };

        let own: Vec<AnnotatedPoint> = self
            .custom
            .iter()
            .filter(|point| {
                !self
                    .catalog
                    .iter()
                    .any(|baseline| baseline.same_place(point))
            })
            .cloned()
            .collect();

        let bytes = codec::encode(&own).map_err(|err| {
            error!(
                "event=locations_persist module=locations status=error identity={identity} error_code=encode_failed error={err}"
            );
            StoreError::Persistence(KvError::Backend(err.to_string()))
        })?;

        match self.kv.set(&storage_key(identity), &bytes) {
            Ok(()) => {
                debug!(
                    "event=locations_persist module=locations status=ok identity={identity} count={}",
                    own.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=locations_persist module=locations status=error identity={identity} error_code=kv_write_failed error={err}"
                );
                Err(StoreError::Persistence(err))
            }
        }
    }

    fn notify(&self, kind: ChangeKind) {
        if self.observers.is_empty() {
            return;
        }
        let change = StoreChange {
            kind,
            identity: self.active_identity.clone(),
        };
        let observers: Vec<Rc<dyn StoreObserver>> = self.observers.values().cloned().collect();
        for observer in observers {
            observer.on_change(&change);
        }
    }
}

/// Deterministic per-identity slot key.
pub fn storage_key(identity: &str) -> String {
    format!("locations_{identity}")
}
