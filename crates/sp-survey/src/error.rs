use sp_core::CoreError;
use sp_design::DesignError;
use sp_output::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("configuration error: {0}")]
    Core(#[from] CoreError),

    #[error("design error: {0}")]
    Design(#[from] DesignError),

    #[error("design has {got} scenarios, configured for {expected}")]
    DesignMismatch {
        expected: usize,
        got:      usize,
    },

    #[error("could not record responses: {0}")]
    Output(#[from] OutputError),
}

pub type SurveyResult<T> = Result<T, SurveyError>;
