//! Extraction of the embedded player response from watch page HTML

use crate::core::video_info::PlayerResponse;
use crate::error::InfoError;
use crate::utils::scan::block_after;
use tracing::debug;

/// Assignment that introduces the embedded player configuration
pub const PLAYER_RESPONSE_ANCHOR: &str = "ytInitialPlayerResponse = ";

/// Isolate the raw JSON text of the embedded player response
pub fn extract_player_response_json(html: &str) -> Result<&str, InfoError> {
    if !html.contains(PLAYER_RESPONSE_ANCHOR) {
        return Err(InfoError::PatternNotFound("player response assignment"));
    }

    let json = block_after(html, PLAYER_RESPONSE_ANCHOR)
        .ok_or(InfoError::PatternNotFound("player response object"))?;
    debug!("Isolated player response: {} bytes", json.len());
    Ok(json)
}

/// Locate and parse the embedded player response
pub fn parse_player_response(html: &str) -> Result<PlayerResponse, InfoError> {
    let json = extract_player_response_json(html)?;
    Ok(serde_json::from_str(json)?)
}
