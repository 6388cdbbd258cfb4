pub mod extract;
pub mod session;
pub mod task;
pub mod vendor;

pub use extract::{ExtractStats, ExtractedResult};
pub use session::{ChatMessage, ChatSession, MessageRole};
pub use task::{PipelineProgress, PipelineStage, PipelineTask, StageOutput, TaskState};
pub use vendor::{ChatVendorReply, JobSubmitReply, StageReply, TaskStatus};
