use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    #[error("expected DD/MM/YYYY, got {input:?}")]
    NotDayMonthYear { input: String },
    #[error("{part} in {input:?} is not numeric")]
    NonNumericPart { part: &'static str, input: String },
    #[error("{input:?} is not a calendar date")]
    NotACalendarDate { input: String },
}
