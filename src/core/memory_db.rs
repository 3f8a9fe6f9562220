//! In-process registry backing the repositories when `APP_BACKEND=memory`
//!
//! All tables sit behind one async mutex, so every repository call is
//! atomic with respect to every other, including a purge that awaits the
//! blob store while holding the lock.

use tokio::sync::{Mutex, MutexGuard};

use crate::features::favorites::models::Favorite;
use crate::features::files::models::File;
use crate::features::users::models::User;

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    /// Kept in insertion order
    pub files: Vec<File>,
    pub favorites: Vec<Favorite>,
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }
}
