use std::path::PathBuf;

use reclaim_cli::writers::WrittenOutputs;
use reclaim_pipeline::RunOutput;

#[derive(Debug)]
pub struct RunResult {
    pub input: PathBuf,
    pub output: RunOutput,
    /// `None` on a dry run.
    pub written: Option<WrittenOutputs>,
}

impl RunResult {
    pub fn has_escalations(&self) -> bool {
        self.output.has_escalations()
    }
}
