pub mod collapsed;
pub mod frame;

use crate::model::ProfileTable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("frame: {0}")]
    Frame(#[from] frame::FrameParseError),
    #[error("collapsed: {0}")]
    Collapsed(#[from] collapsed::CollapsedParseError),
    #[error("unable to detect format")]
    UnknownFormat,
}

/// Detect the input format and parse it into a profile table.
///
/// JSON objects carrying `schema` and `data` are data frames; anything
/// else is tried as collapsed stacks.
pub fn parse_auto(data: &[u8]) -> Result<ProfileTable, ParseError> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Some(obj) = value.as_object()
            && obj.contains_key("schema")
            && obj.contains_key("data")
        {
            return Ok(frame::parse_frame(data)?);
        }
        return Err(ParseError::UnknownFormat);
    }

    match collapsed::parse_collapsed(data) {
        Ok(table) => Ok(table),
        Err(collapsed::CollapsedParseError::Empty) => Err(ParseError::UnknownFormat),
        Err(e) => Err(e.into()),
    }
}
