use corelib::Asset;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VenueError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0} not listed")]
    MissingAsset(Asset),

    #[error("cannot parse `{field}` for {asset}")]
    Parse { asset: Asset, field: &'static str },
}
