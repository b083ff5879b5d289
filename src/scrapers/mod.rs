//! Result page fetching.
//!
//! Each lottery source is fetched from an ordered list of candidate URLs:
//! the canonical page first, then any configured [`Mirror`](crate::config::Mirror)
//! rewrites of it. The first candidate that answers with a success status wins;
//! failures are logged and skipped.
//!
//! | Candidate | Example |
//! |-----------|---------|
//! | Origin | `https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยฮานอยปกติ/` |
//! | Read mode | `https://r.jina.ai/https://www.raakaadee.com/...` |
//! | AllOrigins | `https://api.allorigins.win/raw?url=https%3A%2F%2F...` |

pub mod fetch;

pub use fetch::PageFetcher;

use crate::config::LotterySource;

/// Candidate URLs for `source`, in the order they should be tried.
pub fn candidates(source: &LotterySource) -> Vec<String> {
    std::iter::once(source.url.clone())
        .chain(source.mirrors.iter().map(|mirror| mirror.rewrite(&source.url)))
        .collect()
}
