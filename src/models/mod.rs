pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub use comment::{Comment, CommentWithAuthor};
pub use post::Post;
pub use tag::Tag;
pub use user::User;

/// Characters that must be percent-encoded inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
