//! Terminal-facing helpers shared by the TaaS command handlers: inline
//! markup, tables, fuzzy search, timestamps, prompts and the terminal
//! abstraction itself.

pub mod date_handling;
pub mod markup;
pub mod prompt;
pub mod table;
pub mod terminal;
pub mod text_processing;

pub use date_handling::format_time_of_day;
pub use prompt::{PromptError, Prompter, ScriptedPrompter, StdinPrompter, Validator, any_answer};
pub use table::{Row, render_table, render_value, render_vtable, rows_from_values};
pub use terminal::{Output, RecordingTerminal, Spinner, StdTerminal, Terminal};
pub use text_processing::{fuzzy_filter, fuzzy_score};
