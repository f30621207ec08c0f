//! Text level source.
//!
//! ```text
//! <start x> <start y> <width> <height>
//! <width*height tile ids, row-major: y outer, x inner>
//! ```
//!
//! Tokens are separated by arbitrary whitespace; line breaks carry no meaning.

/*=======================================================================*/
/*                     Aggregate returned by `parse_level`               */
/*=======================================================================*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLevel {
    pub start_x: i64,
    pub start_y: i64,
    pub width: usize,
    pub height: usize,
    /// Raw tile ids, `width * height` of them.
    pub ids: Vec<i64>,
}

/*=======================================================================*/
/*                                Errors                                 */
/*=======================================================================*/

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token #{index} `{token}` is not an integer")]
    Token { index: usize, token: String },

    #[error("level data truncated: expected {expected} values, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("level dimensions {width}x{height} must be positive")]
    BadDimensions { width: i64, height: i64 },

    #[error("{extra} unexpected values after the tile data")]
    TrailingData { extra: usize },

    #[error("unknown tile id {id} at ({x}, {y})")]
    UnknownTile { id: i64, x: usize, y: usize },

    #[error("spawn ({x}, {y}) lies outside the {width}x{height} grid")]
    SpawnOutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    #[error("spawn ({x}, {y}) is inside a solid tile")]
    SpawnBlocked { x: i64, y: i64 },

    #[error("border cell ({x}, {y}) does not seal the level")]
    OpenBorder { x: i32, y: i32 },
}

const HEADER_LEN: usize = 4;

/// Tokenise and size-check a level source.  Tile ids are not resolved here.
pub fn parse_level(src: &str) -> Result<RawLevel, LevelError> {
    let values = src
        .split_whitespace()
        .enumerate()
        .map(|(index, tok)| {
            tok.parse::<i64>().map_err(|_| LevelError::Token {
                index,
                token: tok.to_owned(),
            })
        })
        .collect::<Result<Vec<i64>, _>>()?;

    if values.len() < HEADER_LEN {
        return Err(LevelError::Truncated {
            expected: HEADER_LEN,
            found: values.len(),
        });
    }
    let (start_x, start_y, w, h) = (values[0], values[1], values[2], values[3]);
    if w <= 0 || h <= 0 {
        return Err(LevelError::BadDimensions {
            width: w,
            height: h,
        });
    }

    let (width, height) = (w as usize, h as usize);
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or(LevelError::BadDimensions {
            width: w,
            height: h,
        })?;
    if values.len() < expected {
        return Err(LevelError::Truncated {
            expected,
            found: values.len(),
        });
    }
    if values.len() > expected {
        return Err(LevelError::TrailingData {
            extra: values.len() - expected,
        });
    }

    Ok(RawLevel {
        start_x,
        start_y,
        width,
        height,
        ids: values[HEADER_LEN..].to_vec(),
    })
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
