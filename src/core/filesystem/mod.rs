//! In-memory hierarchical filesystem.
//!
//! The tree is an ownership tree: every directory exclusively owns its
//! children and there are no back-references. Operations re-walk from the
//! root by path, so aliasing and cycles cannot happen.

pub mod path;
mod template;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SNAPSHOT_VERSION;
use crate::core::error::VfsError;
use crate::core::storage::{NullStorage, Storage};

pub use path::{AbsolutePath, resolve};

// =============================================================================
// Nodes
// =============================================================================

/// Access flag on a node. Restricted nodes cannot be read, listed,
/// entered, modified or removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Normal,
    Restricted,
}

impl Permission {
    fn is_normal(&self) -> bool {
        *self == Self::Normal
    }
}

/// A file or directory in the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FsNode {
    Directory {
        children: BTreeMap<String, FsNode>,
        #[serde(default, skip_serializing_if = "Permission::is_normal")]
        permission: Permission,
    },
    File {
        content: String,
        #[serde(default, skip_serializing_if = "Permission::is_normal")]
        permission: Permission,
    },
}

impl FsNode {
    pub fn directory() -> Self {
        Self::Directory {
            children: BTreeMap::new(),
            permission: Permission::Normal,
        }
    }

    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
            permission: Permission::Normal,
        }
    }

    /// Builder: add a child to a directory. No-op on files.
    pub fn with_child(mut self, name: &str, child: FsNode) -> Self {
        if let Self::Directory { children, .. } = &mut self {
            children.insert(name.to_string(), child);
        }
        self
    }

    /// Builder: mark the node restricted.
    pub fn restricted(mut self) -> Self {
        match &mut self {
            Self::Directory { permission, .. } | Self::File { permission, .. } => {
                *permission = Permission::Restricted;
            }
        }
        self
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    pub fn permission(&self) -> Permission {
        match self {
            Self::Directory { permission, .. } | Self::File { permission, .. } => *permission,
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.permission() == Permission::Restricted
    }

    /// Children of a directory, `None` for files.
    pub fn children(&self) -> Option<&BTreeMap<String, FsNode>> {
        match self {
            Self::Directory { children, .. } => Some(children),
            Self::File { .. } => None,
        }
    }

    /// Content length for files, entry count for directories.
    pub fn size(&self) -> usize {
        match self {
            Self::Directory { children, .. } => children.len(),
            Self::File { content, .. } => content.len(),
        }
    }

    /// True if this node or anything below it is restricted.
    fn contains_restricted(&self) -> bool {
        self.is_restricted()
            || self
                .children()
                .is_some_and(|c| c.values().any(FsNode::contains_restricted))
    }

    /// Names must be usable as single path segments.
    fn has_valid_names(&self) -> bool {
        self.children().is_none_or(|children| {
            children.iter().all(|(name, child)| {
                !name.is_empty()
                    && name != "."
                    && name != ".."
                    && !name.contains('/')
                    && child.has_valid_names()
            })
        })
    }
}

/// Directory entry returned by [`VirtualFs::list_directory`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: usize,
    pub restricted: bool,
}

// =============================================================================
// Snapshots
// =============================================================================

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    cwd: &'a AbsolutePath,
    root: &'a FsNode,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    cwd: AbsolutePath,
    root: FsNode,
}

/// A validated copy operation, computed before anything is mutated.
struct CopyPlan {
    source: AbsolutePath,
    target: AbsolutePath,
    node: FsNode,
}

// =============================================================================
// VirtualFs
// =============================================================================

/// Virtual filesystem owning the node tree and the working directory.
///
/// Paths given to every operation may be absolute, relative to the working
/// directory, or start with `~`. Successful mutations are flushed to the
/// attached [`Storage`]; a failed flush is logged and otherwise ignored.
pub struct VirtualFs {
    root: FsNode,
    cwd: AbsolutePath,
    storage: Box<dyn Storage>,
}

impl VirtualFs {
    /// Stock tree, working directory at home, flushing to `storage`.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            root: template::stock_tree(),
            cwd: AbsolutePath::home(),
            storage,
        }
    }

    /// Stock tree without persistence.
    pub fn in_memory() -> Self {
        Self::new(Box::new(NullStorage))
    }

    /// Restore the last saved snapshot from `storage`, or start from the
    /// stock tree if there is none or it cannot be used.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let mut fs = Self::new(storage);
        match fs.storage.load() {
            Ok(Some(blob)) => {
                if let Err(err) = fs.restore(&blob) {
                    log::warn!("discarding saved filesystem: {err}");
                    fs.reinitialize();
                }
            }
            Ok(None) => {}
            Err(err) => log::warn!("filesystem storage unreadable: {err}"),
        }
        fs
    }

    // -------------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------------

    pub fn cwd(&self) -> &AbsolutePath {
        &self.cwd
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve(&self, path: &str) -> AbsolutePath {
        resolve(path, &self.cwd)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Look up a node. Fails if a segment is missing or an intermediate
    /// segment is not a directory.
    pub fn get_node(&self, path: &str) -> Result<&FsNode, VfsError> {
        self.walk(&self.resolve(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.get_node(path).is_ok()
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.get_node(path).is_ok_and(FsNode::is_directory)
    }

    /// Read a file's content.
    pub fn read_file(&self, path: &str) -> Result<&str, VfsError> {
        let abs = self.resolve(path);
        match self.walk(&abs)? {
            FsNode::Directory { .. } => Err(VfsError::IsADirectory(abs.to_string())),
            FsNode::File { content, .. } => {
                self.ensure_accessible(&abs)?;
                Ok(content)
            }
        }
    }

    /// Describe a single node, as a directory listing would.
    ///
    /// The node itself may be restricted; its directory must be readable.
    pub fn stat(&self, path: &str) -> Result<DirEntry, VfsError> {
        let abs = self.resolve(path);
        if let Some(parent) = abs.parent() {
            self.ensure_accessible(&parent)
                .map_err(|_| VfsError::PermissionDenied(abs.to_string()))?;
        }
        let node = self.walk(&abs)?;
        Ok(DirEntry {
            name: abs.file_name().unwrap_or("/").to_string(),
            is_dir: node.is_directory(),
            size: node.size(),
            restricted: node.is_restricted(),
        })
    }

    /// List a directory.
    ///
    /// Sorted: directories first, then regular files, then hidden files;
    /// alphabetical within each group.
    pub fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let abs = self.resolve(path);
        let children = self
            .walk(&abs)?
            .children()
            .ok_or_else(|| VfsError::NotADirectory(abs.to_string()))?;
        self.ensure_accessible(&abs)?;

        let mut items: Vec<DirEntry> = children
            .iter()
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                is_dir: node.is_directory(),
                size: node.size(),
                restricted: node.is_restricted(),
            })
            .collect();

        items.sort_by(|a, b| {
            let a_hidden = a.name.starts_with('.');
            let b_hidden = b.name.starts_with('.');

            match (a.is_dir, b.is_dir, a_hidden, b_hidden) {
                (true, false, _, _) => std::cmp::Ordering::Less,
                (false, true, _, _) => std::cmp::Ordering::Greater,
                (_, _, false, true) => std::cmp::Ordering::Less,
                (_, _, true, false) => std::cmp::Ordering::Greater,
                _ => a.name.cmp(&b.name),
            }
        });
        Ok(items)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Create a directory. With `parents`, missing ancestors are created and
    /// an existing directory at `path` is not an error.
    pub fn create_directory(&mut self, path: &str, parents: bool) -> Result<(), VfsError> {
        let abs = self.resolve(path);
        if let Some(parent) = abs.parent() {
            self.ensure_accessible(&parent)?;
        }

        if parents {
            let mut current = AbsolutePath::root();
            for segment in abs.segments() {
                current = current.join(segment);
                match self.walk(&current) {
                    Ok(node) if node.is_directory() => continue,
                    Ok(_) => return Err(VfsError::NotADirectory(current.to_string())),
                    Err(VfsError::NotFound(_)) => {
                        self.insert_node(&current, FsNode::directory())?;
                    }
                    Err(err) => return Err(err),
                }
            }
        } else {
            match self.walk(&abs) {
                Ok(_) => return Err(VfsError::AlreadyExists(abs.to_string())),
                Err(VfsError::NotFound(_)) => self.insert_node(&abs, FsNode::directory())?,
                Err(err) => return Err(err),
            }
        }

        self.persist();
        Ok(())
    }

    /// Create a file, replacing the content of an existing one.
    pub fn create_file(&mut self, path: &str, content: &str) -> Result<(), VfsError> {
        self.write_file(path, content, false)
    }

    /// Append to a file, creating it if missing.
    pub fn append_file(&mut self, path: &str, content: &str) -> Result<(), VfsError> {
        self.write_file(path, content, true)
    }

    /// Remove a node. Non-empty directories need `recursive`.
    pub fn delete(&mut self, path: &str, recursive: bool) -> Result<(), VfsError> {
        let abs = self.resolve(path);
        self.check_removable(&abs, recursive)?;
        self.detach(&abs)?;
        self.repair_cwd(&abs, None);
        self.persist();
        Ok(())
    }

    /// Deep-copy `src` to `dst`. Returns the path the copy landed at.
    ///
    /// If `dst` is an existing directory the copy goes inside it under the
    /// source's name. An existing file at the target is overwritten by a
    /// file; directories are never merged.
    pub fn copy(&mut self, src: &str, dst: &str) -> Result<AbsolutePath, VfsError> {
        let plan = self.plan_copy(src, dst)?;
        self.insert_node(&plan.target, plan.node)?;
        self.persist();
        Ok(plan.target)
    }

    /// Move `src` to `dst`: a copy followed by a recursive delete of the
    /// source. Everything is validated before the tree is touched.
    pub fn move_node(&mut self, src: &str, dst: &str) -> Result<AbsolutePath, VfsError> {
        let source = self.resolve(src);
        self.check_removable(&source, true)?;
        let plan = self.plan_copy(src, dst)?;

        self.insert_node(&plan.target, plan.node)?;
        self.detach(&plan.source)?;
        self.repair_cwd(&plan.source, Some(&plan.target));
        self.persist();
        Ok(plan.target)
    }

    /// Change the working directory.
    pub fn set_cwd(&mut self, path: &str) -> Result<(), VfsError> {
        let abs = self.resolve(path);
        if !self.walk(&abs)?.is_directory() {
            return Err(VfsError::NotADirectory(abs.to_string()));
        }
        self.ensure_accessible(&abs)?;
        self.cwd = abs;
        self.persist();
        Ok(())
    }

    /// Throw away all changes and start again from the stock tree.
    pub fn reset(&mut self) {
        self.reinitialize();
        self.persist();
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Serialize the whole tree and the working directory as one blob.
    pub fn serialize(&self) -> String {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            cwd: &self.cwd,
            root: &self.root,
        };
        serde_json::to_string(&snapshot).unwrap_or_else(|err| {
            log::error!("failed to serialize filesystem: {err}");
            String::new()
        })
    }

    /// Replace the tree and working directory with a serialized snapshot.
    ///
    /// Malformed input re-initializes from the stock tree instead of leaving
    /// a partially applied tree, and reports [`VfsError::CorruptSnapshot`].
    pub fn deserialize(&mut self, blob: &str) -> Result<(), VfsError> {
        let result = self.restore(blob);
        if let Err(err) = &result {
            log::warn!("{err}; falling back to the stock filesystem");
            self.reinitialize();
        }
        self.persist();
        result
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn reinitialize(&mut self) {
        self.root = template::stock_tree();
        self.cwd = AbsolutePath::home();
    }

    fn restore(&mut self, blob: &str) -> Result<(), VfsError> {
        let snapshot: Snapshot =
            serde_json::from_str(blob).map_err(|e| VfsError::CorruptSnapshot(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(VfsError::CorruptSnapshot(format!(
                "unsupported version {}",
                snapshot.version
            )));
        }
        if !snapshot.root.is_directory() {
            return Err(VfsError::CorruptSnapshot("root is not a directory".into()));
        }
        if !snapshot.root.has_valid_names() {
            return Err(VfsError::CorruptSnapshot("invalid entry name".into()));
        }

        let cwd_ok = walk_from(&snapshot.root, &snapshot.cwd).is_ok_and(FsNode::is_directory);
        if !cwd_ok {
            return Err(VfsError::CorruptSnapshot(format!(
                "working directory {} does not exist",
                snapshot.cwd
            )));
        }

        self.root = snapshot.root;
        self.cwd = snapshot.cwd;
        Ok(())
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.serialize()) {
            log::warn!("filesystem snapshot not saved: {err}");
        }
    }

    fn walk(&self, path: &AbsolutePath) -> Result<&FsNode, VfsError> {
        walk_from(&self.root, path)
    }

    fn walk_mut(&mut self, path: &AbsolutePath) -> Result<&mut FsNode, VfsError> {
        let mut current = &mut self.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            current = match current {
                FsNode::Directory { children, .. } => children
                    .get_mut(segment)
                    .ok_or_else(|| VfsError::NotFound(path.to_string()))?,
                FsNode::File { .. } => {
                    return Err(VfsError::NotADirectory(prefix(path, depth).to_string()));
                }
            };
        }
        Ok(current)
    }

    /// Fail with `PermissionDenied` if `path` or any existing ancestor is
    /// restricted. Missing components are left for the caller to report.
    fn ensure_accessible(&self, path: &AbsolutePath) -> Result<(), VfsError> {
        let denied = || VfsError::PermissionDenied(path.to_string());
        let mut current = &self.root;
        if current.is_restricted() {
            return Err(denied());
        }
        for segment in path.segments() {
            let Some(next) = current.children().and_then(|c| c.get(segment)) else {
                return Ok(());
            };
            if next.is_restricted() {
                return Err(denied());
            }
            current = next;
        }
        Ok(())
    }

    /// Children map of the directory that will hold `path`.
    fn parent_children_mut(
        &mut self,
        path: &AbsolutePath,
    ) -> Result<(&mut BTreeMap<String, FsNode>, String), VfsError> {
        let (parent, name) = path
            .split_last()
            .ok_or_else(|| VfsError::AlreadyExists(path.to_string()))?;
        let name = name.to_string();
        self.check_parent(&parent)?;
        match self.walk_mut(&parent)? {
            FsNode::Directory { children, .. } => Ok((children, name)),
            FsNode::File { .. } => Err(VfsError::NotADirectory(parent.to_string())),
        }
    }

    /// The parent must exist, be a directory and be accessible.
    fn check_parent(&self, parent: &AbsolutePath) -> Result<(), VfsError> {
        if !self.walk(parent)?.is_directory() {
            return Err(VfsError::NotADirectory(parent.to_string()));
        }
        self.ensure_accessible(parent)
    }

    fn insert_node(&mut self, path: &AbsolutePath, node: FsNode) -> Result<(), VfsError> {
        let (children, name) = self.parent_children_mut(path)?;
        children.insert(name, node);
        Ok(())
    }

    fn detach(&mut self, path: &AbsolutePath) -> Result<FsNode, VfsError> {
        let (children, name) = self.parent_children_mut(path)?;
        children
            .remove(&name)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    fn write_file(&mut self, path: &str, content: &str, append: bool) -> Result<(), VfsError> {
        let abs = self.resolve(path);
        match self.walk(&abs) {
            Ok(FsNode::Directory { .. }) => return Err(VfsError::IsADirectory(abs.to_string())),
            Ok(FsNode::File { .. }) => {
                self.ensure_accessible(&abs)?;
                if let FsNode::File { content: existing, .. } = self.walk_mut(&abs)? {
                    if append {
                        existing.push_str(content);
                    } else {
                        *existing = content.to_string();
                    }
                }
            }
            Err(VfsError::NotFound(_)) => self.insert_node(&abs, FsNode::file(content))?,
            Err(err) => return Err(err),
        }
        self.persist();
        Ok(())
    }

    fn check_removable(&self, abs: &AbsolutePath, recursive: bool) -> Result<(), VfsError> {
        if abs.is_root() {
            return Err(VfsError::CannotDeleteRoot(abs.to_string()));
        }
        let node = self.walk(abs)?;
        self.ensure_accessible(abs)?;
        if !recursive && node.children().is_some_and(|c| !c.is_empty()) {
            return Err(VfsError::DirectoryNotEmpty(abs.to_string()));
        }
        if node.contains_restricted() {
            return Err(VfsError::PermissionDenied(abs.to_string()));
        }
        Ok(())
    }

    fn plan_copy(&self, src: &str, dst: &str) -> Result<CopyPlan, VfsError> {
        let source = self.resolve(src);
        let destination = self.resolve(dst);

        let node = self.walk(&source)?;
        self.ensure_accessible(&source)?;

        let target = match self.walk(&destination) {
            Ok(existing) if existing.is_directory() => match source.file_name() {
                Some(name) => destination.join(name),
                None => return Err(VfsError::CopyIntoSelf(source.to_string())),
            },
            Ok(_) => destination,
            Err(VfsError::NotFound(_)) => destination,
            Err(err) => return Err(err),
        };

        if target.starts_with(&source) {
            return Err(VfsError::CopyIntoSelf(source.to_string()));
        }

        match self.walk(&target) {
            Ok(existing) if existing.is_directory() || node.is_directory() => {
                return Err(VfsError::AlreadyExists(target.to_string()));
            }
            Ok(_) => self.ensure_accessible(&target)?,
            Err(VfsError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        if let Some(parent) = target.parent() {
            self.check_parent(&parent)?;
        }

        Ok(CopyPlan {
            source,
            node: node.clone(),
            target,
        })
    }

    /// Keep the working directory pointing at an existing directory after
    /// `removed` disappears: follow it to `moved_to`, or fall back to the
    /// nearest surviving ancestor.
    fn repair_cwd(&mut self, removed: &AbsolutePath, moved_to: Option<&AbsolutePath>) {
        if !self.cwd.starts_with(removed) {
            return;
        }
        self.cwd = match moved_to.and_then(|to| self.cwd.rebase(removed, to)) {
            Some(rebased) => rebased,
            None => removed.parent().unwrap_or_default(),
        };
    }
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn walk_from<'a>(root: &'a FsNode, path: &AbsolutePath) -> Result<&'a FsNode, VfsError> {
    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        let children = current
            .children()
            .ok_or_else(|| VfsError::NotADirectory(prefix(path, depth).to_string()))?;
        current = children
            .get(segment)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
    }
    Ok(current)
}

/// The first `depth` segments of `path`.
fn prefix(path: &AbsolutePath, depth: usize) -> AbsolutePath {
    path.segments()[..depth]
        .iter()
        .fold(AbsolutePath::root(), |acc, segment| acc.join(segment))
}
