pub mod paths;
pub mod strings;

pub use paths::{canonical, resolve_against, some_if_dir};
pub use strings::{
    dashes_to_colons, escape_title, move_article_to_front, strip_numeric_suffix,
    strip_trailing_parenthetical,
};
