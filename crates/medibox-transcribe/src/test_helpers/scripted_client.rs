use async_trait::async_trait;
use medibox_storage::Storage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::job::{
    JobName, JobRequest, JobState, JobStatus, StartOutcome, TranscribeError,
    TranscriptionJobClient,
};

/// Job client replaying a fixed script of status observations.
///
/// The last scripted status repeats once the script runs out. When the client reports
/// `Completed` and an output document was configured, the document is written to
/// `<jobName>.json` first, the way the real service does.
pub struct ScriptedJobClient {
    start: Mutex<Result<StartOutcome, TranscribeError>>,
    statuses: Mutex<VecDeque<Result<JobState, TranscribeError>>>,
    output: Option<(Arc<dyn Storage>, Vec<u8>)>,
    started: Mutex<Vec<JobRequest>>,
    polled: Mutex<Vec<JobName>>,
}

impl ScriptedJobClient {
    pub fn new(statuses: impl IntoIterator<Item = JobStatus>) -> Self {
        Self::with_states(statuses.into_iter().map(|status| Ok(JobState::new(status))))
    }

    pub fn with_states(states: impl IntoIterator<Item = Result<JobState, TranscribeError>>) -> Self {
        Self {
            start: Mutex::new(Ok(StartOutcome::Started)),
            statuses: Mutex::new(states.into_iter().collect()),
            output: None,
            started: Mutex::new(Vec::new()),
            polled: Mutex::new(Vec::new()),
        }
    }

    /// Outcome returned by every `start_job` call
    pub fn on_start(self, outcome: Result<StartOutcome, TranscribeError>) -> Self {
        *self.start.lock().unwrap() = outcome;
        self
    }

    /// Document the "service" writes when the job completes
    pub fn with_output(mut self, storage: Arc<dyn Storage>, document: Vec<u8>) -> Self {
        self.output = Some((storage, document));
        self
    }

    pub fn started(&self) -> Vec<JobRequest> {
        self.started.lock().unwrap().clone()
    }

    pub fn polled(&self) -> Vec<JobName> {
        self.polled.lock().unwrap().clone()
    }

    fn next_state(&self) -> Result<JobState, TranscribeError> {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap_or_else(|| Ok(JobState::new(JobStatus::InProgress)))
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(JobState::new(JobStatus::InProgress)))
        }
    }
}

#[async_trait]
impl TranscriptionJobClient for ScriptedJobClient {
    async fn start_job(&self, request: &JobRequest) -> Result<StartOutcome, TranscribeError> {
        self.started.lock().unwrap().push(request.clone());
        self.start.lock().unwrap().clone()
    }

    async fn job_status(&self, name: &JobName) -> Result<JobState, TranscribeError> {
        self.polled.lock().unwrap().push(name.clone());
        let state = self.next_state()?;

        if state.status == JobStatus::Completed {
            if let Some((storage, document)) = &self.output {
                storage
                    .put(&name.output_key(), document.clone(), "application/json")
                    .await
                    .map_err(|e| TranscribeError::Status(e.to_string()))?;
            }
        }

        Ok(state)
    }
}
