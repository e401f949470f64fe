//! Video platform page, script and stream handling

pub mod cipher;
pub mod client;
pub mod jsops;
pub mod player_response;
pub mod streams;

pub use self::cipher::*;
pub use self::client::*;
pub use self::player_response::*;
pub use self::streams::*;
