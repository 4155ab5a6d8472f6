//! Tagged region injection
//!
//! A region is the text between a start tag line and an end tag line that both
//! carry the same key:
//!
//! ```text
//! // CODE GENERATION Pod START
//! ...
//! // CODE GENERATION Pod END
//! ```
//!
//! The key is always followed by a space in the tag, so `1` never matches the
//! tags of `12` and `Pod` never matches `PodGroup`.

use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::constants::REGION_TAG_PREFIX;
use crate::CodegenError;
use crate::Result;

/// Owner of one region inside a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKey {
    /// Client regions are keyed by resource name
    Name(String),
    /// Server regions are keyed by a numeric index
    Index(u32),
}

impl fmt::Display for RegionKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            RegionKey::Name(name) => f.write_str(name),
            RegionKey::Index(index) => write!(f, "{index}"),
        }
    }
}

impl RegionKey {
    pub fn start_tag(&self) -> String {
        format!("{REGION_TAG_PREFIX} {self} START")
    }

    pub fn end_tag(&self) -> String {
        format!("{REGION_TAG_PREFIX} {self} END")
    }

    fn tag_line_pattern(tag: &str) -> String {
        format!(r"^[ \t]*{}[ \t]*\r?$", regex::escape(tag))
    }

    fn region_regex(&self) -> Result<Regex> {
        let pattern = format!(
            "(?ms){}.*{}",
            Self::tag_line_pattern(&self.start_tag()),
            Self::tag_line_pattern(&self.end_tag())
        );
        Ok(Regex::new(&pattern).map_err(CodegenError::from)?)
    }

    /// Number of (start, end) tag lines for this key in `text`
    fn count_tags(
        &self,
        text: &str,
    ) -> Result<(usize, usize)> {
        let count = |tag: String| -> Result<usize> {
            let pattern = format!("(?m){}", Self::tag_line_pattern(&tag));
            let re = Regex::new(&pattern).map_err(CodegenError::from)?;
            Ok(re.find_iter(text).count())
        };
        Ok((count(self.start_tag())?, count(self.end_tag())?))
    }
}

/// Replaces the region owned by `key` in `existing` with `rendered`, or
/// appends `rendered` after a blank line when no such region exists.
///
/// `rendered` must contain the tags for `key`; it is trimmed of surrounding
/// newlines so that injecting the same rendering twice is a no-op.
///
/// # Errors
/// - [`CodegenError::UntaggedRegion`] when `rendered` is not delimited by
///   exactly one pair of tags for `key`
/// - [`CodegenError::MalformedRegion`] when `existing` holds more than one
///   start or end tag for `key`, or only one of them
pub fn inject(
    existing: &str,
    key: &RegionKey,
    rendered: &str,
) -> Result<String> {
    let region = rendered.trim_matches('\n');
    if key.count_tags(region)? != (1, 1) {
        return Err(CodegenError::UntaggedRegion { key: key.to_string() }.into());
    }

    let (starts, ends) = key.count_tags(existing)?;

    match (starts, ends) {
        (0, 0) => {
            debug!(%key, "No existing region, appending");
            let mut out = String::with_capacity(existing.len() + region.len() + 2);
            out.push_str(existing);
            out.push_str("\n\n");
            out.push_str(region);
            Ok(out)
        }
        (1, 1) => match key.region_regex()?.find(existing) {
            Some(found) => {
                debug!(%key, start = found.start(), end = found.end(), "Replacing existing region");
                let mut out = String::with_capacity(existing.len() - found.len() + region.len());
                out.push_str(&existing[..found.start()]);
                out.push_str(region);
                out.push_str(&existing[found.end()..]);
                Ok(out)
            }
            // end tag precedes start tag
            None => Err(malformed(key, starts, ends)),
        },
        _ => Err(malformed(key, starts, ends)),
    }
}

fn malformed(
    key: &RegionKey,
    starts: usize,
    ends: usize,
) -> crate::Error {
    CodegenError::MalformedRegion {
        key: key.to_string(),
        starts,
        ends,
    }
    .into()
}
