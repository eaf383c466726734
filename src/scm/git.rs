//! Git backend
//!
//! Implements [`ScmSession`](super::ScmSession) over libgit2. Only local
//! branches and tags are reported; remote-tracking references are invisible
//! to the miner.

use super::ScmSession;
use crate::commit::{Commit, Contributor};
use crate::reference::{Reference, ReferenceType};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// An open libgit2 session
pub struct GitSession {
    repo: git2::Repository,
}

fn retrieval(e: git2::Error) -> Error {
    Error::Retrieval(e.message().to_string())
}

impl GitSession {
    /// Open an existing repository. Failure here is a resource-acquisition
    /// error: nothing has been persisted yet.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = git2::Repository::open(path).map_err(|e| {
            Error::ResourceAcquisition(format!(
                "cannot open git repository at {}: {}",
                path.display(),
                e.message()
            ))
        })?;
        Ok(Self { repo })
    }

    /// Walk a reference's history tip-first, yielding raw commit ids
    fn walk(&self, ref_path: &str) -> Result<git2::Revwalk<'_>> {
        let target = self
            .repo
            .revparse_single(ref_path)
            .map_err(retrieval)?
            .peel_to_commit()
            .map_err(retrieval)?;

        let mut walk = self.repo.revwalk().map_err(retrieval)?;
        walk.push(target.id()).map_err(retrieval)?;
        Ok(walk)
    }

    fn to_commit(&self, oid: git2::Oid) -> Result<Commit> {
        let commit = self.repo.find_commit(oid).map_err(retrieval)?;
        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        let committer = signature_identity(&commit.committer());
        let author = signature_identity(&commit.author());
        Ok(Commit::new(
            oid.to_string(),
            message,
            committer,
            author,
            commit.time().seconds(),
        ))
    }
}

fn signature_identity(sig: &git2::Signature<'_>) -> Contributor {
    Contributor::new(
        String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        String::from_utf8_lossy(sig.email_bytes()).into_owned(),
    )
}

impl ScmSession for GitSession {
    fn references(&self) -> Result<Vec<Reference>> {
        let mut refs = Vec::new();
        for entry in self.repo.references().map_err(retrieval)? {
            let entry = entry.map_err(retrieval)?;
            let ref_type = if entry.is_branch() {
                ReferenceType::Branch
            } else if entry.is_tag() {
                ReferenceType::Tag
            } else {
                continue;
            };

            let (Some(name), Some(path)) = (entry.shorthand(), entry.name()) else {
                continue;
            };
            refs.push(Reference::new(name, path, ref_type));
        }
        Ok(refs)
    }

    fn reference_commit_ids(
        &self,
        ref_path: &str,
        _ref_type: ReferenceType,
    ) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for oid in self.walk(ref_path)? {
            ids.push(oid.map_err(retrieval)?.to_string());
        }
        Ok(ids)
    }

    fn fetch_commits(
        &self,
        skip: usize,
        max_count: usize,
        reference: &Reference,
        visited: &HashSet<String>,
    ) -> Result<Vec<Commit>> {
        let mut batch = Vec::new();
        for (position, oid) in self.walk(&reference.path)?.enumerate() {
            if position < skip {
                continue;
            }
            if position >= skip + max_count {
                break;
            }

            let oid = oid.map_err(retrieval)?;
            if visited.contains(&oid.to_string()) {
                continue;
            }
            batch.push(self.to_commit(oid)?);
        }
        Ok(batch)
    }

    fn close(&mut self) -> Result<()> {
        // libgit2 releases handles on drop; the explicit close exists so the
        // orchestrator can release on every exit path and surface failures.
        tracing::debug!("closing git session");
        Ok(())
    }
}
