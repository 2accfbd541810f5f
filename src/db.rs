//! LMDB-backed user and custom grant store
//!
//! Storage patterns:
//! - `users`: `user_id` → role name
//! - `role_grants`: `ROLE/permission` → epoch millis when granted

use std::collections::BTreeSet;
use std::path::Path;

use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::{debug, info};

use crate::error::{store_err, RbacError, Result};
use crate::role::Role;
use crate::store::{check_grant, AdminStore, CustomGrant, CustomGrantStore, UserStore};

type UserDb = Database<Str, Str>;
type GrantDb = Database<Str, U64<byteorder::BigEndian>>;

#[inline]
fn grant_key(role: Role, permission: &str) -> String {
    format!("{}/{}", role, permission)
}

#[inline]
fn role_prefix(role: Role) -> String {
    format!("{}/", role)
}

fn current_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct LmdbStore {
    env: Env,
    users: UserDb,
    grants: GrantDb,
}

impl LmdbStore {
    /// Open (creating if needed) a store rooted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(store_err)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(1 << 30)
                .max_dbs(2)
                .open(path)
                .map_err(store_err)?
        };
        let mut tx = env.write_txn().map_err(store_err)?;
        let users = env.create_database(&mut tx, Some("users")).map_err(store_err)?;
        let grants = env.create_database(&mut tx, Some("role_grants")).map_err(store_err)?;
        tx.commit().map_err(store_err)?;
        info!(path = %path.display(), "opened lmdb store");
        Ok(LmdbStore { env, users, grants })
    }

    fn read<T, F: FnOnce(&RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.env.read_txn().map_err(store_err)?)
    }

    /// LMDB rejects empty keys and keys above its compile-time limit.
    fn is_storable_key(&self, k: &str) -> bool {
        !k.is_empty() && k.len() <= self.env.max_key_size()
    }

    fn write<T, F: FnOnce(&mut RwTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = self.env.write_txn().map_err(store_err)?;
        let r = f(&mut tx)?;
        tx.commit().map_err(store_err)?;
        Ok(r)
    }

    pub fn set_user_role(&self, user_id: &str, role: Role) -> Result<()> {
        if !self.is_storable_key(user_id) {
            return Err(RbacError::Store(format!("user id of {} bytes cannot be stored", user_id.len())));
        }
        self.write(|tx| self.users.put(tx, user_id, role.as_str()).map_err(store_err))
    }

    pub fn remove_user(&self, user_id: &str) -> Result<bool> {
        if !self.is_storable_key(user_id) {
            return Ok(false);
        }
        self.write(|tx| self.users.delete(tx, user_id).map_err(store_err))
    }

    /// Returns false if the grant already existed.
    pub fn add_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        check_grant(permission)?;
        let k = grant_key(role, permission);
        self.write(|tx| {
            if self.grants.get(tx, &k).map_err(store_err)?.is_some() {
                return Ok(false);
            }
            self.grants.put(tx, &k, &current_epoch()).map_err(store_err)?;
            Ok(true)
        })
    }

    pub fn remove_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        let k = grant_key(role, permission);
        self.write(|tx| self.grants.delete(tx, &k).map_err(store_err))
    }

    /// Every stored grant with the time it was added.
    pub fn list_custom_grants(&self) -> Result<Vec<(CustomGrant, u64)>> {
        self.read(|tx| {
            let mut r = Vec::new();
            for item in self.grants.iter(tx).map_err(store_err)? {
                let (k, epoch) = item.map_err(store_err)?;
                r.push((parse_grant_key(k)?, epoch));
            }
            Ok(r)
        })
    }

    /// Clear all databases (for testing)
    pub fn clear_all(&self) -> Result<()> {
        self.write(|tx| {
            self.users.clear(tx).map_err(store_err)?;
            self.grants.clear(tx).map_err(store_err)
        })
    }
}

fn parse_grant_key(k: &str) -> Result<CustomGrant> {
    let (role, permission) = k
        .split_once('/')
        .ok_or_else(|| RbacError::Store(format!("malformed grant key: {}", k)))?;
    let role = role
        .parse::<Role>()
        .map_err(|_| RbacError::Store(format!("unknown role in grant key: {}", k)))?;
    Ok(CustomGrant::new(role, permission))
}

impl UserStore for LmdbStore {
    fn role_of(&self, user_id: &str) -> Result<Option<Role>> {
        // no such key can exist, so the principal is simply unknown
        if !self.is_storable_key(user_id) {
            debug!(len = user_id.len(), "principal id not storable; treating as unknown");
            return Ok(None);
        }
        self.read(|tx| match self.users.get(tx, user_id).map_err(store_err)? {
            None => Ok(None),
            Some(s) => s.parse::<Role>().map(Some).map_err(|_| {
                RbacError::Store(format!("corrupt role record for user {}: {}", user_id, s))
            }),
        })
    }
}

impl AdminStore for LmdbStore {
    fn add_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        LmdbStore::add_custom_grant(self, role, permission)
    }

    fn remove_custom_grant(&self, role: Role, permission: &str) -> Result<bool> {
        LmdbStore::remove_custom_grant(self, role, permission)
    }

    fn list_custom_grants(&self) -> Result<Vec<CustomGrant>> {
        Ok(LmdbStore::list_custom_grants(self)?.into_iter().map(|(g, _)| g).collect())
    }
}

impl CustomGrantStore for LmdbStore {
    fn grants_for(&self, roles: &[Role]) -> Result<BTreeSet<CustomGrant>> {
        self.read(|tx| {
            let mut r = BTreeSet::new();
            for &role in roles {
                for item in self.grants.prefix_iter(tx, &role_prefix(role)).map_err(store_err)? {
                    let (k, _) = item.map_err(store_err)?;
                    r.insert(parse_grant_key(k)?);
                }
            }
            debug!(?roles, count = r.len(), "read custom grants");
            Ok(r)
        })
    }
}
