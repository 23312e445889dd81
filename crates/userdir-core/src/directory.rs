//! The list cache controller.
//!
//! `UserDirectory` owns the working set of user records. It loads once,
//! preferring the local mirror and falling back to the remote source, and
//! writes the whole set back to the mirror after every change. Deletes go
//! to the remote first and only touch local state once the remote agrees.
//!
//! All access to the working set is serialized through one async mutex.
//! Load state is published separately on a watch channel so readers can
//! see `Loading` while the initial fetch holds the lock.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::api::UserSource;
use crate::cache::MirrorStore;
use crate::error::DirectoryError;
use crate::models::{NewUser, UserId, UserRecord, UserUpdate};
use crate::paging::{self, PageView, DEFAULT_PAGE_SIZE};

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Initialization state. Moves forward only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    /// Initial fetch failed; carries the reason shown to the user.
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Uninitialized => write!(f, "uninitialized"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::Ready => write!(f, "ready"),
            LoadState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Where the working set came from on initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Mirror,
    Remote,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Mirror => write!(f, "mirror"),
            Origin::Remote => write!(f, "remote"),
        }
    }
}

struct WorkingSet {
    users: Vec<UserRecord>,
    /// Next identifier handed out by `add`. Never decreases; `None` once
    /// the identifier space is used up.
    next_id: Option<UserId>,
    current_page: usize,
    origin: Option<Origin>,
}

impl WorkingSet {
    fn empty() -> Self {
        Self {
            users: Vec::new(),
            next_id: Some(1),
            current_page: 1,
            origin: None,
        }
    }

    fn adopt(&mut self, users: Vec<UserRecord>, origin: Origin) {
        self.users = deduplicate(users);
        self.next_id = match self.users.iter().map(|u| u.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        self.current_page = 1;
        self.origin = Some(origin);
    }

    fn position(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }
}

/// Keep the first record for each identifier, preserving arrival order.
fn deduplicate(users: Vec<UserRecord>) -> Vec<UserRecord> {
    let mut seen = HashSet::with_capacity(users.len());
    let before = users.len();
    let unique: Vec<UserRecord> = users.into_iter().filter(|u| seen.insert(u.id)).collect();
    if unique.len() != before {
        warn!(dropped = before - unique.len(), "Dropped records with duplicate ids");
    }
    unique
}

/// Controller for the user directory working set.
pub struct UserDirectory<S, M> {
    source: S,
    mirror: M,
    page_size: NonZeroUsize,
    state_tx: watch::Sender<LoadState>,
    inner: Mutex<WorkingSet>,
}

impl<S, M> UserDirectory<S, M>
where
    S: UserSource,
    M: MirrorStore,
{
    pub fn new(source: S, mirror: M) -> Self {
        let (state_tx, _) = watch::channel(LoadState::Uninitialized);
        let page_size = NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN);

        Self {
            source,
            mirror,
            page_size,
            state_tx,
            inner: Mutex::new(WorkingSet::empty()),
        }
    }

    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    // =========================================================================
    // Load state
    // =========================================================================

    pub fn state(&self) -> LoadState {
        self.state_tx.borrow().clone()
    }

    /// Watch load state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: LoadState) {
        debug!(state = %state, "Directory state change");
        self.state_tx.send_replace(state);
    }

    fn ensure_ready(&self) -> Result<()> {
        let state = self.state();
        if state.is_ready() {
            Ok(())
        } else {
            Err(DirectoryError::NotReady(state))
        }
    }

    /// Load the working set: mirror first, remote on a miss.
    ///
    /// Runs once. Later calls report the settled outcome without touching
    /// the mirror or the remote.
    pub async fn initialize(&self) -> Result<Origin> {
        let mut set = self.inner.lock().await;

        match self.state() {
            LoadState::Ready => {
                if let Some(origin) = set.origin {
                    debug!("Directory already initialized");
                    return Ok(origin);
                }
            }
            LoadState::Failed(reason) => return Err(DirectoryError::SourceUnavailable(reason)),
            LoadState::Uninitialized | LoadState::Loading => {}
        }

        self.set_state(LoadState::Loading);

        match self.mirror.load() {
            Ok(Some(cached)) => {
                info!(
                    count = cached.data.len(),
                    age = %cached.age_display(),
                    "Loaded users from mirror"
                );
                set.adopt(cached.data, Origin::Mirror);
                self.set_state(LoadState::Ready);
                return Ok(Origin::Mirror);
            }
            Ok(None) => debug!("Mirror empty, fetching users from source"),
            Err(e) => warn!(error = %e, "Mirror unreadable, fetching users from source"),
        }

        match self.source.fetch_users().await {
            Ok(users) => {
                info!(count = users.len(), "Loaded users from source");
                set.adopt(users, Origin::Remote);
                self.persist(&set.users);
                self.set_state(LoadState::Ready);
                Ok(Origin::Remote)
            }
            Err(e) => {
                error!(error = %e, "Failed to load users");
                let reason = e.to_string();
                self.set_state(LoadState::Failed(reason.clone()));
                Err(DirectoryError::SourceUnavailable(reason))
            }
        }
    }

    /// Where the working set came from, once loaded.
    pub async fn origin(&self) -> Option<Origin> {
        self.inner.lock().await.origin
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the working set in arrival order.
    pub async fn users(&self) -> Vec<UserRecord> {
        self.inner.lock().await.users.clone()
    }

    pub async fn get(&self, id: UserId) -> Option<UserRecord> {
        let set = self.inner.lock().await;
        set.position(id).map(|idx| set.users[idx].clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn persist(&self, users: &[UserRecord]) {
        if let Err(e) = self.mirror.save(users) {
            warn!(error = %e, "Failed to write users to mirror");
        }
    }

    /// Add a user. The directory assigns the identifier.
    pub async fn add(&self, fields: NewUser) -> Result<UserRecord> {
        self.ensure_ready()?;
        let mut set = self.inner.lock().await;

        let id = set.next_id.ok_or_else(|| {
            warn!("No identifiers left to allocate");
            DirectoryError::OperationFailed("identifier space exhausted".to_string())
        })?;
        set.next_id = id.checked_add(1);

        let user = UserRecord::new(id, fields);
        set.users.push(user.clone());
        self.persist(&set.users);

        info!(id, "Added user");
        Ok(user)
    }

    /// Replace fields of an existing user in place.
    pub async fn edit(&self, id: UserId, update: UserUpdate) -> Result<UserRecord> {
        self.ensure_ready()?;
        let mut set = self.inner.lock().await;

        let idx = set
            .position(id)
            .ok_or_else(|| DirectoryError::OperationFailed(format!("No user with id {}", id)))?;

        set.users[idx].apply(update);
        let user = set.users[idx].clone();
        self.persist(&set.users);

        info!(id, "Updated user");
        Ok(user)
    }

    /// Delete a user on the remote, then locally.
    ///
    /// Returns `Ok(false)` when the id is not in the working set; nothing is
    /// sent in that case. A remote failure leaves the working set untouched.
    pub async fn delete(&self, id: UserId) -> Result<bool> {
        self.ensure_ready()?;
        let mut set = self.inner.lock().await;

        let Some(idx) = set.position(id) else {
            debug!(id, "Delete of unknown user ignored");
            return Ok(false);
        };

        self.source.delete_user(id).await.map_err(|e| {
            warn!(id, error = %e, "Remote delete failed");
            DirectoryError::OperationFailed(format!("Failed to delete user {}: {}", id, e))
        })?;

        set.users.remove(idx);
        self.persist(&set.users);

        info!(id, "Deleted user");
        Ok(true)
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// View of page `page`, newest records first. Out-of-range requests
    /// clamp. The clamped page becomes the current page.
    pub async fn page(&self, page: usize) -> Result<PageView> {
        self.ensure_ready()?;
        let mut set = self.inner.lock().await;

        let view = paging::page_view(&set.users, page, self.page_size.get());
        set.current_page = view.number;
        Ok(view)
    }

    pub async fn current_page(&self) -> usize {
        self.inner.lock().await.current_page
    }

    /// View of the current page, clamped against the current set size.
    pub async fn current(&self) -> Result<PageView> {
        let page = self.current_page().await;
        self.page(page).await
    }

    pub async fn next_page(&self) -> Result<PageView> {
        let page = self.current_page().await;
        self.page(page.saturating_add(1)).await
    }

    pub async fn prev_page(&self) -> Result<PageView> {
        let page = self.current_page().await;
        self.page(page.saturating_sub(1)).await
    }
}
