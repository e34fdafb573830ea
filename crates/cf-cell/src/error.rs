use thiserror::Error;

pub type CellResult<T> = Result<T, CellError>;

#[derive(Error, Debug)]
pub enum CellError {
    #[error("Invalid mesh: {what}")]
    Mesh { what: &'static str },

    #[error("Invalid electrode parameter: {what}")]
    Electrode { what: &'static str },

    #[error("Layout construction failed: {what}")]
    Layout { what: &'static str },

    #[error("Invalid experiment: {what}")]
    Experiment { what: &'static str },
}
