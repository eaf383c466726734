//! Mining orchestrator and commit harvester
//!
//! One run sequences: scratch copy + session open, repository persistence,
//! reference selection, per-reference snapshot + commit harvesting,
//! one contributor update, optional working-directory materialization and
//! downstream analysis, then unconditional resource release.
//!
//! The harvester owns the run-scoped visited set: a commit reachable from
//! several references is persisted for the first one only. The whole run is
//! single-threaded; batching bounds memory, not concurrency.

use crate::commit::Contributor;
use crate::config::MinerConfig;
use crate::issue::IssueExtractor;
use crate::reference::{self, Reference};
use crate::repository::Repository;
use crate::scm::{self, ScmSession};
use crate::scratch::ScratchCopy;
use crate::storage::SqliteStore;
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Produces on-disk per-commit snapshots for the selected references.
/// External collaborator; the miner only sequences the call.
pub trait WorkdirMaterializer {
    fn materialize(&mut self, repository_id: i64, references: &[Reference]) -> Result<()>;
}

/// Runs downstream metric/code-smell analysis against the scratch copy.
/// External collaborator; invoked only when file processing is enabled and
/// at least one reference was selected.
pub trait AnalysisRunner {
    fn run(
        &mut self,
        session: &mut dyn ScmSession,
        repository_id: i64,
        scratch: &Path,
    ) -> Result<()>;
}

/// Per-run state: the cross-reference visited set and the contributor set.
///
/// Owned by a single run, never shared, so concurrent runs against different
/// repositories cannot interfere.
#[derive(Debug, Default)]
pub struct RunContext {
    visited: HashSet<String>,
    contributors: HashSet<Contributor>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The commit ids persisted so far in this run
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn mark_visited(&mut self, commit_id: String) {
        self.visited.insert(commit_id);
    }

    /// Idempotent: equal identities collapse to one entry
    pub fn add_contributor(&mut self, contributor: Contributor) {
        self.contributors.insert(contributor);
    }

    /// The final deduplicated contributor set, in a stable order
    pub fn into_contributors(self) -> Vec<Contributor> {
        let mut contributors: Vec<Contributor> = self.contributors.into_iter().collect();
        contributors.sort_by(|a, b| (&a.name, &a.email).cmp(&(&b.name, &b.email)));
        contributors
    }
}

/// Outcome of one mining run
#[derive(Debug)]
pub struct MiningReport {
    /// Identity assigned to the repository record
    pub repository_id: i64,
    /// References persisted and harvested
    pub references_processed: usize,
    /// Distinct commits persisted across all references
    pub commits_persisted: usize,
    /// Size of the deduplicated contributor set
    pub contributors: usize,
    /// Whether the downstream analysis step ran
    pub analysis_ran: bool,
    /// Non-fatal problems encountered along the way
    pub warnings: Vec<String>,
}

/// The mining entry point.
///
/// Owns the run configuration and the optional downstream collaborators.
/// A `Miner` instance is not designed for concurrent use; each run owns its
/// own [`RunContext`].
pub struct Miner {
    config: MinerConfig,
    extractor: IssueExtractor,
    materializer: Option<Box<dyn WorkdirMaterializer>>,
    analysis: Option<Box<dyn AnalysisRunner>>,
}

impl Miner {
    pub fn new(config: MinerConfig) -> Self {
        Self {
            config,
            extractor: IssueExtractor::default(),
            materializer: None,
            analysis: None,
        }
    }

    /// Replace the default issue extraction rules
    pub fn with_extractor(mut self, extractor: IssueExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_materializer(mut self, m: impl WorkdirMaterializer + 'static) -> Self {
        self.materializer = Some(Box::new(m));
        self
    }

    pub fn with_analysis(mut self, a: impl AnalysisRunner + 'static) -> Self {
        self.analysis = Some(Box::new(a));
        self
    }

    /// Run a full mining pass.
    ///
    /// Acquires a scratch copy and a version-control session, mines into
    /// `store`, and releases both on every exit path. Errors raised mid-run
    /// still reach the caller after cleanup.
    pub fn mine(&mut self, store: &mut SqliteStore) -> Result<MiningReport> {
        let scratch = ScratchCopy::create(&self.config.path, &self.config.name)?;
        let mut session = scm::open_session(self.config.scm, scratch.path())?;

        let outcome = self.mine_session(session.as_mut(), store, scratch.path());

        let close_outcome = session.close();
        drop(scratch);

        let report = outcome?;
        close_outcome?;
        Ok(report)
    }

    /// Mine through an already-open session.
    ///
    /// This is the whole workflow minus resource acquisition/release; `mine`
    /// wraps it. Useful for custom backends and for tests.
    pub fn mine_session(
        &mut self,
        session: &mut dyn ScmSession,
        store: &mut SqliteStore,
        scratch: &Path,
    ) -> Result<MiningReport> {
        self.config.validate()?;

        let repository = Repository::new(&self.config.name, self.config.scm, &self.config.path);
        let repository_id = store.insert_repository(&repository)?;
        tracing::info!(
            "mining {} ({}) as repository {}",
            repository.name,
            repository.path,
            repository_id
        );

        let mut ctx = RunContext::new();
        let mut report = MiningReport {
            repository_id,
            references_processed: 0,
            commits_persisted: 0,
            contributors: 0,
            analysis_ran: false,
            warnings: Vec::new(),
        };

        let discovered = session.references()?;
        let selected = reference::select(&discovered, &self.config.references);
        tracing::info!("{} of {} references selected", selected.len(), discovered.len());

        let mut processed: Vec<Reference> = Vec::with_capacity(selected.len());
        let mut retrieval_failure = None;

        for reference in selected {
            match self.process_reference(session, store, repository_id, reference, &mut ctx) {
                Ok((reference, persisted)) => {
                    report.commits_persisted += persisted;
                    processed.push(reference);
                }
                Err(Error::Retrieval(msg)) => {
                    // Partial failure: persisted batches stay, remaining
                    // pages and references are abandoned, and the run still
                    // writes contributors and cleans up before propagating.
                    report.warnings.push(format!("retrieval failed: {}", msg));
                    retrieval_failure = Some(Error::Retrieval(msg));
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        report.references_processed = processed.len();

        // Written exactly once, after all reference processing, as an update.
        let contributors = ctx.into_contributors();
        store.update_contributors(repository_id, &contributors)?;
        report.contributors = contributors.len();

        if let Some(e) = retrieval_failure {
            return Err(e);
        }

        if let Some(materializer) = self.materializer.as_mut() {
            materializer.materialize(repository_id, &processed)?;
        }

        if self.config.process_files && !processed.is_empty() {
            if let Some(analysis) = self.analysis.as_mut() {
                match analysis.run(session, repository_id, scratch) {
                    Ok(()) => report.analysis_ran = true,
                    Err(Error::Encoding(msg)) => {
                        // Scoped to the affected artifact; skip and continue
                        tracing::warn!("analysis skipped an artifact: {}", msg);
                        report.warnings.push(format!("encoding: {}", msg));
                        report.analysis_ran = true;
                    }
                    Err(e) => return Err(e),
                }
            }
        } else {
            tracing::debug!("analysis skipped (process_files or selection empty)");
        }

        Ok(report)
    }

    /// Persist one reference record, then harvest its commits.
    ///
    /// The unfiltered snapshot is captured first and stored with the record;
    /// the reference id is assigned strictly before any of its commits are
    /// persisted, and the snapshot is cleared rather than kept live.
    fn process_reference(
        &self,
        session: &mut dyn ScmSession,
        store: &mut SqliteStore,
        repository_id: i64,
        mut reference: Reference,
        ctx: &mut RunContext,
    ) -> Result<(Reference, usize)> {
        reference.repository_id = Some(repository_id);
        reference.commit_ids =
            session.reference_commit_ids(&reference.path, reference.ref_type)?;

        let reference_id = store.insert_reference(&reference)?;
        reference.id = Some(reference_id);
        reference.commit_ids = Vec::new();

        let persisted = self.harvest(session, store, repository_id, &reference, ctx)?;
        tracing::info!(
            "reference {} ({}): {} commits persisted",
            reference.name,
            reference.ref_type,
            persisted
        );
        Ok((reference, persisted))
    }

    /// Paginate through a reference's unseen commits.
    ///
    /// The offset is local to the reference; the visited set is not. An
    /// empty batch terminates the reference.
    fn harvest(
        &self,
        session: &mut dyn ScmSession,
        store: &mut SqliteStore,
        repository_id: i64,
        reference: &Reference,
        ctx: &mut RunContext,
    ) -> Result<usize> {
        let page_size = self.config.page_size;
        let mut offset = 0;
        let mut persisted = 0;

        loop {
            let mut batch =
                session.fetch_commits(offset, page_size, reference, ctx.visited())?;
            if batch.is_empty() {
                break;
            }

            for commit in &mut batch {
                commit.repository_id = Some(repository_id);
                commit.issues = self.extractor.extract(&commit.message);
                ctx.add_contributor(commit.committer.clone());
                ctx.mark_visited(commit.id.clone());
                tracing::trace!("{}: harvested {}", reference.name, commit.short_id());
            }

            store.insert_commits(&batch)?;
            persisted += batch.len();
            tracing::debug!(
                "{}: batch of {} at offset {}",
                reference.name,
                batch.len(),
                offset
            );
            offset += page_size;
        }

        Ok(persisted)
    }
}
