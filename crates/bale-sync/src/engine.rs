//! Dependency-ordered push: envelope first, then every member still
//! waiting, relations after both endpoints exist.

use tracing::{debug, info, warn};

use bale_api::{Credentials, EnvelopeLink, Ledger, PartLink};
use bale_store::{Filter, StagingStore};
use bale_types::{valid_uuid, ArtifactId, ArtifactRecord};

use crate::error::{SyncError, SyncResult};
use crate::report::{PushFailure, SyncReport};

/// Pushes staged records to one ledger node and keeps the local
/// lifecycle flags in step with what the ledger acknowledged.
pub struct SyncEngine<'a, L: Ledger> {
    store: &'a StagingStore,
    ledger: &'a L,
    creds: Credentials,
}

impl<'a, L: Ledger> SyncEngine<'a, L> {
    pub fn new(store: &'a StagingStore, ledger: &'a L, creds: Credentials) -> Self {
        Self {
            store,
            ledger,
            creds,
        }
    }

    /// Push the envelope and every pending member to the ledger.
    ///
    /// The envelope goes first; if its push fails the run aborts with
    /// nothing else attempted, since members reference it by UUID.
    /// Member failures are independent: each is reported and the loop
    /// moves on. Flags are only advanced on a positive acknowledgment,
    /// and records already on the ledger are skipped without any
    /// network call, so re-running after a partial failure retries
    /// exactly the records that still need it.
    pub fn push_envelope(&self, envelope_id: ArtifactId, part_uuid: &str) -> SyncResult<SyncReport> {
        if !valid_uuid(part_uuid) {
            return Err(SyncError::PartNotSet(part_uuid.to_string()));
        }

        let mut report = SyncReport::default();

        let entry = self.store.get_by_uuid(envelope_id)?;
        if !entry.record().is_envelope() {
            return Err(SyncError::NotAnEnvelope(envelope_id));
        }

        if entry.staged.on_ledger {
            debug!(envelope = %entry.record().name, "envelope already on ledger");
            report.skipped += 1;
        } else {
            match self.push_record(entry.record()) {
                Err(err) => {
                    warn!(envelope = %entry.record().name, %err, "envelope push failed; aborting");
                    report.failed.push(PushFailure {
                        name: entry.record().name.clone(),
                        error: err.to_string(),
                    });
                    report.aborted = true;
                    return Ok(report);
                }
                Ok(()) => {
                    self.store.set_on_ledger(entry.id, true)?;
                    let link = PartLink {
                        part_uuid: part_uuid.to_string(),
                        artifact_uuid: envelope_id,
                    };
                    if let Err(err) = self.ledger.link_to_part(&self.creds, &link) {
                        report.warnings.push(format!(
                            "part relation for '{}' not recorded: {err}",
                            entry.record().name
                        ));
                    }
                    info!(envelope = %entry.record().name, "envelope pushed");
                    report.pushed.push(entry.record().name.clone());
                }
            }
        }

        // Every staged non-envelope record belongs to this push.
        for member in self.store.artifacts(Filter::Leaves)? {
            if member.staged.on_ledger {
                report.skipped += 1;
                continue;
            }
            let record = member.record();
            match self.push_record(record) {
                Err(err) => {
                    warn!(artifact = %record.name, %err, "artifact push failed");
                    report.failed.push(PushFailure {
                        name: record.name.clone(),
                        error: err.to_string(),
                    });
                    continue;
                }
                Ok(()) => {
                    self.store.set_on_ledger(member.id, true)?;
                    self.store.set_envelope(member.id, Some(envelope_id))?;
                    let link = EnvelopeLink {
                        artifact_uuid: record.uuid,
                        envelope_uuid: envelope_id,
                        path: member.staged.envelope_path.clone(),
                    };
                    if let Err(err) = self.ledger.link_to_envelope(&self.creds, &link) {
                        report.warnings.push(format!(
                            "envelope relation for '{}' not recorded: {err}",
                            record.name
                        ));
                    }
                    info!(artifact = %record.name, "artifact pushed");
                    report.pushed.push(record.name.clone());
                }
            }
        }

        Ok(report)
    }

    /// One record post plus its URI attachments. The push only counts
    /// when the record and every URI are all acknowledged; on a URI
    /// failure the caller leaves the flags alone and the next run
    /// re-posts the record, which the ledger treats as an upsert.
    fn push_record(&self, record: &ArtifactRecord) -> SyncResult<()> {
        self.ledger.create_artifact(&self.creds, record)?;

        let mut problems = Vec::new();
        for uri in &record.uri_list {
            if let Err(err) = self.ledger.add_uri(&self.creds, record.uuid, uri) {
                problems.push(format!("uri '{}' not attached: {err}", uri.location));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Api(bale_api::ApiError::Remote(
                problems.join("; "),
            )))
        }
    }
}
