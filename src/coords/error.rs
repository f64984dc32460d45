use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
  #[error("invalid direction, must be N, S, E, or W")]
  InvalidDirection,
  #[error("invalid format: missing degree symbol")]
  MissingDegreeSymbol,
  #[error("invalid format: missing minute symbol")]
  MissingMinuteSymbol,
  #[error("invalid number {0:?}")]
  InvalidNumber(String),
  #[error("{0}")]
  OutOfRange(String),
  #[error("latitude must use N or S direction")]
  LatitudeDirection,
  #[error("longitude must use E or W direction")]
  LongitudeDirection,
  #[error("invalid coordinate pair: {0}")]
  InvalidPair(Box<FormatError>),
}

impl FormatError {
  pub fn is_range_error(&self) -> bool {
    match self {
      FormatError::OutOfRange(_) => true,
      FormatError::InvalidPair(inner) => inner.is_range_error(),
      _ => false,
    }
  }
}
