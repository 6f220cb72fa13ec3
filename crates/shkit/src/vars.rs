//! Shell variable store
//!
//! Maps variable names to `(value, exported, read_only)` triples. Every
//! mutation bumps a monotone generation counter; the `NAME=VALUE` array
//! handed to child processes is cached and considered valid exactly when its
//! stored generation equals the current one. Failed writes leave the store
//! (and the generation) untouched.

use std::collections::HashMap;

use thiserror::Error;

/// Maximum length of a variable name in bytes.
pub const NAME_MAX: usize = 1024;

/// Maximum length of a variable value in bytes.
pub const VALUE_MAX: usize = 131_072;

/// Single-character names the shell maintains itself (`$?`, `$-`, `$$`, `$!`)
/// that are accepted by name validation despite not matching the identifier
/// grammar.
const SPECIAL_NAMES: &[char] = &['?', '-', '$', '!'];

/// Validation and lookup failures for the variable store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VarError {
    #[error("empty variable name")]
    EmptyName,

    #[error("variable name too long")]
    NameTooLong,

    #[error("variable name must not start with a digit")]
    NameStartsWithDigit,

    #[error("invalid character in variable name")]
    NameInvalidChar,

    #[error("variable value too long")]
    ValueTooLong,

    #[error("{0}: readonly variable")]
    ReadOnly(String),

    #[error("{0}: not found")]
    NotFound(String),
}

/// A shell variable: value plus the exported and read-only flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    value: String,
    exported: bool,
    read_only: bool,
}

impl Variable {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn exported(&self) -> bool {
        self.exported
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }
}

/// Cached `NAME=VALUE` array, stamped with the generation it was built at.
#[derive(Debug, Clone)]
struct EnvCache {
    entries: Vec<String>,
    generation: u64,
}

/// The variable store.
///
/// Iteration order over entries is unspecified but stable within a single
/// call. Absent and empty values are distinct states: an absent name is not
/// in the store at all.
#[derive(Debug, Clone, Default)]
pub struct VarStore {
    vars: HashMap<String, Variable>,
    generation: u64,
    env_cache: Option<EnvCache>,
}

/// Validate a variable name against the store's naming rules.
pub fn validate_name(name: &str) -> Result<(), VarError> {
    if name.is_empty() {
        return Err(VarError::EmptyName);
    }
    if name.len() > NAME_MAX {
        return Err(VarError::NameTooLong);
    }
    let bytes = name.as_bytes();
    if name.len() == 1 && SPECIAL_NAMES.contains(&(bytes[0] as char)) {
        return Ok(());
    }
    if bytes[0].is_ascii_digit() {
        return Err(VarError::NameStartsWithDigit);
    }
    for &b in bytes {
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return Err(VarError::NameInvalidChar);
        }
    }
    Ok(())
}

impl VarStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a `NAME=VALUE` environment array.
    ///
    /// Seeded entries are marked exported. Entries that do not validate are
    /// skipped; a hostile environment must not prevent shell startup.
    pub fn from_environ<S: AsRef<str>>(environ: &[S]) -> Self {
        let mut store = Self::new();
        for entry in environ {
            let entry = entry.as_ref();
            if let Some(eq) = entry.find('=') {
                let (name, value) = (&entry[..eq], &entry[eq + 1..]);
                let _ = store.add(name, Some(value), true, false);
            }
        }
        store
    }

    /// Number of variables in the store.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Current generation. Strictly increases with every successful mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    /// Add or update a variable.
    ///
    /// `value` of `None` creates the variable with an empty value (used by
    /// `export name` / `readonly name` on a previously unset name) or leaves
    /// an existing value unchanged while merging flags. Read-only rejects
    /// value writes only; flag-only updates on a read-only variable succeed,
    /// so `readonly R; readonly R` is a no-op rather than an error.
    pub fn add(
        &mut self,
        name: &str,
        value: Option<&str>,
        exported: bool,
        read_only: bool,
    ) -> Result<(), VarError> {
        validate_name(name)?;
        if let Some(v) = value {
            if v.len() > VALUE_MAX {
                return Err(VarError::ValueTooLong);
            }
        }
        if let Some(existing) = self.vars.get_mut(name) {
            if let Some(v) = value {
                if existing.read_only {
                    return Err(VarError::ReadOnly(name.to_string()));
                }
                existing.value = v.to_string();
            }
            existing.exported = existing.exported || exported;
            existing.read_only = existing.read_only || read_only;
        } else {
            self.vars.insert(
                name.to_string(),
                Variable {
                    value: value.unwrap_or_default().to_string(),
                    exported,
                    read_only,
                },
            );
        }
        self.bump();
        Ok(())
    }

    /// Update just the value, preserving flags; creates the variable if
    /// absent. Used by `${name:=word}` and arithmetic assignment.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), VarError> {
        validate_name(name)?;
        if value.len() > VALUE_MAX {
            return Err(VarError::ValueTooLong);
        }
        match self.vars.get_mut(name) {
            Some(existing) => {
                if existing.read_only {
                    return Err(VarError::ReadOnly(name.to_string()));
                }
                existing.value = value.to_string();
            }
            None => {
                self.vars.insert(
                    name.to_string(),
                    Variable {
                        value: value.to_string(),
                        exported: false,
                        read_only: false,
                    },
                );
            }
        }
        self.bump();
        Ok(())
    }

    /// Remove a variable. Removing an unknown name reports `NotFound`;
    /// removing a read-only variable fails.
    pub fn remove(&mut self, name: &str) -> Result<(), VarError> {
        match self.vars.get(name) {
            None => Err(VarError::NotFound(name.to_string())),
            Some(v) if v.read_only => Err(VarError::ReadOnly(name.to_string())),
            Some(_) => {
                self.vars.remove(name);
                self.bump();
                Ok(())
            }
        }
    }

    /// Remove a batch of names, returning how many were removed.
    ///
    /// Removing more than roughly an eighth of the entries switches from
    /// per-key removal to a single O(n) rebuild. Read-only entries and
    /// unknown names are skipped. The post-state is identical on both paths.
    pub fn remove_many<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let before = self.vars.len();
        if before == 0 || names.is_empty() {
            return 0;
        }
        if names.len() * 8 > before {
            let doomed: std::collections::HashSet<&str> =
                names.iter().map(|n| n.as_ref()).collect();
            self.vars
                .retain(|name, var| var.read_only || !doomed.contains(name.as_str()));
        } else {
            for name in names {
                let name = name.as_ref();
                if self.vars.get(name).is_some_and(|v| !v.read_only) {
                    self.vars.remove(name);
                }
            }
        }
        let removed = before - self.vars.len();
        if removed > 0 {
            self.bump();
        }
        removed
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// Look up just the value.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|v| v.value.as_str())
    }

    /// Set or clear the exported flag. Fails on read-only variables.
    pub fn set_exported(&mut self, name: &str, exported: bool) -> Result<(), VarError> {
        match self.vars.get_mut(name) {
            None => Err(VarError::NotFound(name.to_string())),
            Some(v) if v.read_only => Err(VarError::ReadOnly(name.to_string())),
            Some(v) => {
                v.exported = exported;
                self.bump();
                Ok(())
            }
        }
    }

    /// Set or clear the read-only flag. Clearing it on a read-only variable
    /// fails: the flag is a one-way latch.
    pub fn set_read_only(&mut self, name: &str, read_only: bool) -> Result<(), VarError> {
        match self.vars.get_mut(name) {
            None => Err(VarError::NotFound(name.to_string())),
            Some(v) if v.read_only && !read_only => Err(VarError::ReadOnly(name.to_string())),
            Some(v) => {
                if v.read_only != read_only {
                    v.read_only = read_only;
                    self.bump();
                }
                Ok(())
            }
        }
    }

    /// A deep copy holding only the exported entries. The copy starts at
    /// generation zero with no cache.
    pub fn clone_exported_only(&self) -> Self {
        Self {
            vars: self
                .vars
                .iter()
                .filter(|(_, v)| v.exported)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            generation: 0,
            env_cache: None,
        }
    }

    /// Visit every variable. Order is unspecified but stable within the call.
    pub fn for_each<F: FnMut(&str, &Variable)>(&self, mut f: F) {
        for (name, var) in &self.vars {
            f(name, var);
        }
    }

    /// Variable names in byte-wise sorted order, for the printing builtins.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// The `NAME=VALUE` array of exactly the exported entries.
    ///
    /// The result is cached; a lookup returns the cache when its generation
    /// matches the store's, and any successful mutation since the last build
    /// forces a rebuild. The cache owns its strings and is dropped on the
    /// next rebuild.
    pub fn envp(&mut self) -> &[String] {
        let stale = self
            .env_cache
            .as_ref()
            .is_none_or(|c| c.generation != self.generation);
        if stale {
            let mut entries: Vec<String> = self
                .vars
                .iter()
                .filter(|(_, v)| v.exported)
                .map(|(k, v)| format!("{}={}", k, v.value))
                .collect();
            entries.sort_unstable();
            self.env_cache = Some(EnvCache {
                entries,
                generation: self.generation,
            });
        }
        &self.env_cache.as_ref().expect("cache just built").entries
    }
}
