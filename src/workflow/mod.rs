pub mod extract_flow;
pub mod translate_flow;

pub use extract_flow::{ExtractFlow, ExtractJobApi};
pub use translate_flow::{StageExecutor, TranslateFlow};
