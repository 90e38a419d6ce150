//! Multi-agent scene generation pipeline.
//!
//! A [`Swarm`] runs five agents strictly in order:
//!
//! 1. Director designs a [`quill_core::SceneSpec`]
//! 2. Writer drafts prose from the design
//! 3. Checker reports continuity issues
//! 4. Editor revises the draft, only when issues were found
//! 5. Committer folds the result into memory, off the response path
//!
//! Director and Writer failures abort the run. Checker and Editor failures
//! degrade to a safe fallback. Commits run on a bounded background queue
//! that is drained by [`Swarm::shutdown`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agents;
mod commit;
mod extraction;
mod memory;
mod metrics;
mod swarm;

pub use agents::{
    CheckInput, CheckerAgent, CommitterAgent, DirectorAgent, DraftInput, EditorAgent, ReviseInput,
    WriterAgent, CHECKER_TEXT_LIMIT, FACT_TEXT_LIMIT, MAX_EXTRACTED_FACTS,
};
pub use commit::{CommitJob, CommitQueue, DEFAULT_COMMIT_QUEUE_CAPACITY};
pub use extraction::{parse_issues, parse_scene_spec, parse_string_list, SpecSource};
pub use memory::InMemoryStore;
pub use metrics::SwarmMetrics;
pub use swarm::{Swarm, SwarmOptions};
