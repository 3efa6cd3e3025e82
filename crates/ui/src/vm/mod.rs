mod difficulty_vm;
mod quiz_vm;
mod results_vm;
mod time_fmt;

pub use difficulty_vm::{DifficultyOptionVm, load_difficulty_options, map_difficulty_option};
pub use quiz_vm::{OptionState, OptionVm, QuizScreen, QuizVm};
pub use results_vm::{
    EMPTY_RESULTS_MESSAGE, ResultRowVm, ResultsSummaryVm, ResultsVm, map_results,
};
pub use time_fmt::{format_countdown, format_datetime, format_elapsed};
